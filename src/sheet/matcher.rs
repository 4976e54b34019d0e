use regex::Regex;
use std::sync::LazyLock;

use super::Row;

static PARENTHESIZED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(.*?\)").unwrap());
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Fold a model name for comparison.
///
/// Lowercases, maps NBSP, `-` and `_` to spaces, drops `(...)` segments and
/// collapses whitespace, e.g. `"Duke-R9 (India)"` → `"duke r9"`.
pub fn norm(s: &str) -> String {
    let folded: String = s
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            '\u{00A0}' | '-' | '_' => ' ',
            other => other,
        })
        .collect();

    let without_parens = PARENTHESIZED.replace_all(&folded, "");
    WHITESPACE_RUN
        .replace_all(&without_parens, " ")
        .trim()
        .to_string()
}

/// Find the row whose `model` column corresponds to `model`.
///
/// An exact normalized match wins; otherwise the first row (in sheet order)
/// whose normalized model contains the query or is contained in it. Empty
/// normalized values never match.
pub fn find_by_model<'a>(rows: &'a [Row], model: &str) -> Option<&'a Row> {
    let key = norm(model);
    if key.is_empty() {
        return None;
    }

    let normalized: Vec<String> = rows.iter().map(|r| norm(r.model().unwrap_or(""))).collect();

    let candidates = || {
        rows.iter()
            .zip(normalized.iter())
            .filter(|(_, candidate)| !candidate.is_empty())
    };

    if let Some((row, _)) = candidates().find(|(_, candidate)| **candidate == key) {
        return Some(row);
    }

    candidates()
        .find(|(_, candidate)| candidate.contains(key.as_str()) || key.contains(candidate.as_str()))
        .map(|(row, _)| row)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(models: &[&str]) -> Vec<Row> {
        models
            .iter()
            .map(|m| [("model", *m), ("quote price", "1")].into_iter().collect())
            .collect()
    }

    #[test]
    fn test_norm_folds_punctuation_and_parens() {
        assert_eq!(norm("Duke-R9 (India)"), "duke r9");
        assert_eq!(norm("duke r9"), "duke r9");
        assert_eq!(norm("Duke-R9 (India)"), norm("duke r9"));
    }

    #[test]
    fn test_norm_whitespace_and_nbsp() {
        assert_eq!(norm("  SUPER\u{00A0}\u{00A0}R9_pro\t "), "super r9 pro");
        assert_eq!(norm(""), "");
    }

    #[test]
    fn test_norm_parens_are_non_greedy() {
        assert_eq!(norm("A (x) B (y) C"), "a b c");
        assert_eq!(norm("open (paren"), "open (paren");
    }

    #[test]
    fn test_find_prefers_exact_match() {
        let rows = rows(&["DUKE R9 PRO", "Duke-R9"]);
        let found = find_by_model(&rows, "duke r9").unwrap();
        assert_eq!(found.model(), Some("Duke-R9"));
    }

    #[test]
    fn test_find_falls_back_to_containment_in_row_order() {
        let rows = rows(&["DUKE R9", "SUPER R9"]);
        let found = find_by_model(&rows, "R9").unwrap();
        assert_eq!(found.model(), Some("DUKE R9"));

        // query longer than the sheet value
        let found = find_by_model(&rows, "super r9 (2024 batch) deluxe").unwrap();
        assert_eq!(found.model(), Some("SUPER R9"));
    }

    #[test]
    fn test_find_unknown_model_is_none() {
        let rows = rows(&["DUKE R9", "SUPER R9"]);
        assert!(find_by_model(&rows, "UNKNOWN").is_none());
        assert!(find_by_model(&[], "DUKE R9").is_none());
    }

    #[test]
    fn test_find_ignores_blank_models_and_queries() {
        let mut sheet = rows(&["", "DUKE R9"]);
        sheet.push([("quote price", "5")].into_iter().collect());

        assert!(find_by_model(&sheet, "UNKNOWN").is_none());
        assert!(find_by_model(&sheet, "  ").is_none());
        assert!(find_by_model(&sheet, "(only parens)").is_none());
        assert_eq!(
            find_by_model(&sheet, "duke r9").and_then(|r| r.model()),
            Some("DUKE R9")
        );
    }
}
