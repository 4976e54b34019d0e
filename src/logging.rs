//! Masking of secrets before they reach logs or terminal output.

use std::fmt;

/// Number of leading characters left readable
const VISIBLE_CHARS: usize = 4;

/// Display wrapper that shows only the first few characters of a secret.
///
/// ```
/// use sheet_price::logging::SensitiveValue;
///
/// let token = "eyJhbGciOiJIUzI1NiJ9.payload.signature";
/// assert_eq!(SensitiveValue::new(token).to_string(), "eyJh***");
/// ```
#[derive(Clone, Debug)]
pub struct SensitiveValue<'a> {
    inner: &'a str,
}

impl<'a> SensitiveValue<'a> {
    pub fn new(value: &'a str) -> Self {
        Self { inner: value }
    }
}

impl<'a> fmt::Display for SensitiveValue<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // short values are hidden entirely
        if self.inner.chars().count() <= VISIBLE_CHARS * 2 {
            return write!(f, "***");
        }
        let visible: String = self.inner.chars().take(VISIBLE_CHARS).collect();
        write!(f, "{}***", visible)
    }
}

/// Mask an optional secret for display; unset values stay unset
pub fn mask_secret(value: Option<&str>) -> Option<String> {
    value.map(|v| SensitiveValue::new(v).to_string())
}
