pub mod debug;
pub mod health;
pub mod login;
pub mod metrics_handler;
pub mod price;

use std::sync::Arc;

use crate::{auth::TokenSigner, config::Config, sheet::RowSource};

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub rows: Arc<dyn RowSource>,
    /// `None` while no token secret is configured
    pub tokens: Option<Arc<TokenSigner>>,
}

impl AppState {
    pub fn new(config: Arc<Config>, rows: Arc<dyn RowSource>) -> Self {
        let tokens = config
            .auth
            .token_secret
            .as_deref()
            .map(|secret| Arc::new(TokenSigner::new(secret, config.auth.token_ttl_hours)));

        Self {
            config,
            rows,
            tokens,
        }
    }
}
