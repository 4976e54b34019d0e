//! Command implementations for the CLI
//!
//! - start: Start the HTTP server
//! - test: Test configuration validity
//! - config: Configuration display
//! - lookup: One-off price lookup against the live sheet

pub mod config;
pub mod lookup;
pub mod start;
