use crate::spreadsheet::cell::Cell;
use tracing::debug;

/// Number of leading rows searched for the header.
pub(crate) const HEADER_SCAN_ROWS: usize = 15;

/// Minimum keyword hits for a row to qualify as the header.
pub(crate) const HEADER_KEYWORD_THRESHOLD: usize = 3;

/// Largest row index accepted as an explicit header override.
pub(crate) const MAX_HEADER_ROW: usize = 20;

const HEADER_KEYWORDS: [&str; 15] = [
    "model",
    "serial",
    "user",
    "department",
    "asset",
    "workstation",
    "location",
    "site",
    "computer",
    "employee",
    "email",
    "product",
    "mobile",
    "programme",
    "program",
];

/// Counts the distinct header keywords found in at least one cell of the row.
pub(crate) fn keyword_hits(row: &[Cell]) -> usize {
    let texts: Vec<String> = row.iter().map(|cell| cell.text().to_lowercase()).collect();
    HEADER_KEYWORDS
        .iter()
        .filter(|keyword| texts.iter().any(|text| text.contains(*keyword)))
        .count()
}

/// Finds the header row among the first `HEADER_SCAN_ROWS` rows.
///
/// The first row with at least `HEADER_KEYWORD_THRESHOLD` keyword hits wins;
/// when no row qualifies the header is assumed to be row 0.
pub(crate) fn detect_header_row(rows: &[Vec<Cell>]) -> usize {
    let detected = rows
        .iter()
        .take(HEADER_SCAN_ROWS)
        .position(|row| keyword_hits(row) >= HEADER_KEYWORD_THRESHOLD);
    match detected {
        Some(row) => {
            debug!(row, "detected header row");
            row
        }
        None => {
            debug!("no header row detected, using row 0");
            0
        }
    }
}
