use super::{Row, QUOTE_PRICE_COLUMN};

/// Quoted price of a row, rounded to the nearest integer.
///
/// Returns `None` when the `quote price` cell is missing, blank, or not a
/// finite number. Halves round up, so `2.5` becomes `3` and `-2.5`
/// becomes `-2`.
pub fn quote_price(row: &Row) -> Option<i64> {
    let raw = row.get(QUOTE_PRICE_COLUMN)?.trim();
    if raw.is_empty() {
        return None;
    }

    let value: f64 = raw.parse().ok()?;
    if !value.is_finite() {
        return None;
    }

    Some(round_half_up(value) as i64)
}

/// Nearest integer, ties toward +∞. Exact for every `f64` below 2^53.
fn round_half_up(value: f64) -> f64 {
    let floor = value.floor();
    if value - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}
