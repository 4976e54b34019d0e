//! Published spreadsheet access.
//!
//! The pipeline is: fetch CSV text ([`source`]) → decode into [`Row`]s
//! ([`csv`]) → pick the row for a model ([`matcher`]) → read its price
//! ([`price`]).

pub mod cache;
pub mod csv;
pub mod matcher;
pub mod price;
pub mod source;

pub use cache::CachedRowSource;
pub use csv::decode;
pub use matcher::{find_by_model, norm};
pub use price::quote_price;
pub use source::{LiveRowSource, RowSource};

use serde::ser::{Serialize, SerializeMap, Serializer};
use thiserror::Error;

/// Column holding the model name of each row
pub const MODEL_COLUMN: &str = "model";

/// Column holding the quoted price in INR
pub const QUOTE_PRICE_COLUMN: &str = "quote price";

/// Errors raised while obtaining rows from the spreadsheet
#[derive(Debug, Error)]
pub enum SheetError {
    /// Sheet identifier is not configured
    #[error("Missing sheet id (set SHEET_ID or sheet.id)")]
    MissingSheetId,

    /// Export endpoint answered with a non-success status
    #[error("Google Sheet fetch failed: {status} {snippet}")]
    Fetch {
        status: reqwest::StatusCode,
        snippet: String,
    },

    /// Export endpoint served an HTML page instead of CSV
    #[error("Google Sheet not accessible. Set Share → Anyone with the link → Viewer.")]
    SharingNotEnabled,

    /// Transport-level failure
    #[error("Google Sheet request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// One decoded spreadsheet record, keyed by header column name.
///
/// Keys keep header order. A repeated header name keeps the position of its
/// first occurrence and the value of its last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    cells: Vec<(String, String)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, overwriting an existing value in place
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(k, _)| *k == key) {
            Some(cell) => cell.1 = value,
            None => self.cells.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Value of the `model` column
    pub fn model(&self) -> Option<&str> {
        self.get(MODEL_COLUMN)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (k, v) in &self.cells {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_insert_overwrites_in_place() {
        let mut row = Row::new();
        row.insert("model", "A");
        row.insert("price", "1");
        row.insert("model", "B");

        assert_eq!(row.len(), 2);
        assert_eq!(row.get("model"), Some("B"));
        assert_eq!(row.keys().collect::<Vec<_>>(), vec!["model", "price"]);
    }

    #[test]
    fn test_row_serializes_in_header_order() {
        let row: Row = [("zeta", "1"), ("alpha", "2")].into_iter().collect();
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"zeta":"1","alpha":"2"}"#);
    }

    #[test]
    fn test_sheet_error_messages() {
        assert!(SheetError::SharingNotEnabled
            .to_string()
            .contains("Anyone with the link"));

        let err = SheetError::Fetch {
            status: reqwest::StatusCode::NOT_FOUND,
            snippet: "nope".to_string(),
        };
        assert_eq!(err.to_string(), "Google Sheet fetch failed: 404 Not Found nope");
    }
}
