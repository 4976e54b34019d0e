//! CSV decoding for spreadsheet exports.
//!
//! The export is small and regular, so decoding is a single character scan
//! rather than a full RFC 4180 reader. Quoting is honoured anywhere inside a
//! field and malformed quoting is never rejected.

use super::Row;

/// Decode CSV text into rows keyed by the header line.
///
/// The first non-blank record is the header. Records whose cells are all
/// blank are skipped. Short records are padded with empty strings; surplus
/// cells are ignored. Keys and values are trimmed.
pub fn decode(text: &str) -> Vec<Row> {
    let mut records = split_records(text)
        .into_iter()
        .filter(|record| !is_blank(record));

    let header: Vec<String> = match records.next() {
        Some(header) => header.iter().map(|cell| cell.trim().to_string()).collect(),
        None => return Vec::new(),
    };

    records
        .map(|record| {
            header
                .iter()
                .enumerate()
                .map(|(idx, key)| {
                    let value = record.get(idx).map(|cell| cell.trim()).unwrap_or("");
                    (key.clone(), value.to_string())
                })
                .collect()
        })
        .collect()
}

/// Split text into records of raw (untrimmed) cells.
///
/// `""` inside a quoted field yields a literal quote. `\r`, `\n` and `\r\n`
/// each end a record when outside quotes. Unterminated quotes run to the end
/// of input, where any pending content is flushed as a final record.
fn split_records(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                chars.next();
                field.push('"');
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => record.push(std::mem::take(&mut field)),
            '\r' | '\n' if !in_quotes => {
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(ch),
        }
    }

    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    records
}

fn is_blank(record: &[String]) -> bool {
    record.iter().all(|cell| cell.trim().is_empty())
}
