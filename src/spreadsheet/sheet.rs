use crate::spreadsheet::cell::{cell_position, Cell};
use crate::spreadsheet::SpreadsheetError;
use crate::spreadsheet::SpreadsheetError::{EmptySheet, HeaderRowOutOfRange};
use calamine::{Data, Range};
use std::collections::{HashMap, HashSet};

/// A sheet read into a dense grid anchored at absolute cell A1.
///
/// Every row has the same width, and cells that were never written hold `Data::Empty`,
/// so `rows[r][c]` is always the cell at absolute row `r`, column `c`.
#[derive(Debug)]
pub(crate) struct Sheet {
    /// Source file name
    pub(crate) file_name: String,
    /// Sheet name
    pub(crate) name: String,
    /// Padded cell grid
    pub(crate) rows: Vec<Vec<Cell>>,
}

impl Sheet {
    /// Builds a sheet from raw row values, padding short rows with empty cells.
    pub(crate) fn new(file_name: &str, name: &str, values: Vec<Vec<Data>>) -> Self {
        let width = values.iter().map(Vec::len).max().unwrap_or(0);
        let rows = values
            .into_iter()
            .enumerate()
            .map(|(row, mut values)| {
                values.resize(width, Data::Empty);
                values
                    .into_iter()
                    .enumerate()
                    .map(|(column, value)| Cell::new(row, column, value))
                    .collect()
            })
            .collect();
        Self {
            file_name: file_name.to_owned(),
            name: name.to_owned(),
            rows,
        }
    }

    /// Builds a sheet from a calamine range, which may start anywhere in the worksheet.
    pub(crate) fn from_range(file_name: &str, name: &str, range: &Range<Data>) -> Result<Self, SpreadsheetError> {
        let (start_row, start_column) = range
            .start()
            .map(|(row, column)| (row as usize, column as usize))
            .ok_or(EmptySheet)?;
        if range.is_empty() {
            return Err(EmptySheet);
        }

        let mut values: Vec<Vec<Data>> = vec![Vec::new(); start_row];
        for row in range.rows() {
            let mut padded = vec![Data::Empty; start_column];
            padded.extend(row.iter().cloned());
            values.push(padded);
        }
        Ok(Self::new(file_name, name, values))
    }

    /// Returns true if no cell in the sheet holds a value.
    pub(crate) fn is_empty(&self) -> bool {
        self.rows.iter().all(|row| row.iter().all(Cell::is_blank))
    }

    /// Number of columns in the padded grid.
    pub(crate) fn width(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    /// Reads the header names from the given absolute row.
    ///
    /// Names are trimmed, blank names become `Unnamed: {column}`, and repeated
    /// names get a `.{n}` suffix so every name is unique.
    ///
    /// # Errors
    ///
    /// Returns `HeaderRowOutOfRange` when the row lies past the end of the sheet.
    pub(crate) fn header(&self, row: usize) -> Result<Vec<String>, SpreadsheetError> {
        let cells = self.rows.get(row).ok_or_else(|| HeaderRowOutOfRange {
            row,
            rows: self.rows.len(),
        })?;
        let names = cells
            .iter()
            .map(|cell| match cell.text() {
                text if text.is_empty() => format!("Unnamed: {}", cell.column),
                text => text,
            })
            .collect();
        Ok(make_unique(names))
    }

    /// Data rows below the header row, skipping rows whose cells are all blank.
    pub(crate) fn records_after(&self, header_row: usize) -> impl Iterator<Item = &[Cell]> + '_ {
        self.rows
            .iter()
            .skip(header_row + 1)
            .filter(|row| !row.iter().all(Cell::is_blank))
            .map(Vec::as_slice)
    }

    /// Excel-style range covering the whole grid, e.g. `A1:M40`.
    pub(crate) fn dimension(&self) -> String {
        if self.rows.is_empty() || self.width() == 0 {
            return String::new();
        }
        format!(
            "A1:{}",
            cell_position(self.rows.len() - 1, self.width() - 1)
        )
    }
}

/// Disambiguates repeated names: the first keeps its name, later ones get `.1`, `.2`, ...
/// skipping any suffix already taken by an earlier name.
pub(crate) fn make_unique(names: Vec<String>) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut emitted: HashSet<String> = HashSet::new();
    let mut unique = Vec::with_capacity(names.len());
    for name in names {
        let count = counts.entry(name.clone()).or_insert(0);
        let mut candidate = name.clone();
        while emitted.contains(&candidate) {
            *count += 1;
            candidate = format!("{name}.{count}");
        }
        emitted.insert(candidate.clone());
        unique.push(candidate);
    }
    unique
}
