use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::SpreadsheetError;
use calamine::Data;

/// One data row, holding the cells under each header.
#[derive(Clone, Debug)]
pub(crate) struct Record {
    /// Absolute sheet row (0-based)
    pub(crate) row: usize,
    pub(crate) cells: Vec<Cell>,
}

impl Record {
    pub(crate) fn cell(&self, column: usize) -> Option<&Cell> {
        self.cells.get(column)
    }

    /// Trimmed display text of a column, empty when the column is missing.
    pub(crate) fn text(&self, column: usize) -> String {
        self.cell(column).map(Cell::text).unwrap_or_default()
    }
}

/// A sheet reduced to unique headers and the non-empty rows beneath them.
#[derive(Clone, Debug)]
pub(crate) struct AssetTable {
    pub(crate) file_name: String,
    pub(crate) sheet_name: String,
    /// Absolute sheet row of the header (0-based)
    pub(crate) header_row: usize,
    pub(crate) headers: Vec<String>,
    pub(crate) records: Vec<Record>,
}

impl AssetTable {
    /// Splits a sheet at the header row.
    pub(crate) fn from_sheet(sheet: &Sheet, header_row: usize) -> Result<Self, SpreadsheetError> {
        let headers = sheet.header(header_row)?;
        let records = sheet
            .records_after(header_row)
            .map(|cells| Record {
                row: cells.first().map(|cell| cell.row).unwrap_or_default(),
                cells: cells.to_vec(),
            })
            .collect();
        Ok(Self {
            file_name: sheet.file_name.clone(),
            sheet_name: sheet.name.clone(),
            header_row,
            headers,
            records,
        })
    }

    /// Builds a table from in-memory rows placed directly below a header at row 0.
    pub(crate) fn from_values(name: &str, headers: &[&str], rows: Vec<Vec<Data>>) -> Result<Self, SpreadsheetError> {
        let mut values = vec![headers.iter().map(|header| Data::String(header.to_string())).collect()];
        values.extend(rows);
        Self::from_sheet(&Sheet::new(name, name, values), 0)
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Raw values of a record, one per header.
    pub(crate) fn values(&self, record: usize) -> Vec<Data> {
        self.records[record]
            .cells
            .iter()
            .map(|cell| cell.value.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> Data {
        Data::String(value.to_owned())
    }

    #[test]
    fn splits_sheet_at_header() {
        let sheet = Sheet::new(
            "inventory.xlsx",
            "Devices",
            vec![
                vec![text("Asset register")],
                vec![text("Model"), text("User"), text("Model")],
                vec![text("OptiPlex 7090"), text("Ana"), Data::Empty],
                vec![],
                vec![text("Latitude 5420")],
            ],
        );
        let table = AssetTable::from_sheet(&sheet, 1).unwrap();
        assert_eq!(table.headers, vec!["Model", "User", "Model.1"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].row, 2);
        assert_eq!(table.records[1].row, 4);
        assert_eq!(table.records[1].text(1), "");
        assert_eq!(table.records[0].text(0), "OptiPlex 7090");
        assert_eq!(table.records[0].text(9), "");
    }

    #[test]
    fn builds_from_values() {
        let table = AssetTable::from_values(
            "Workstation",
            &["Asset Tag", "Model"],
            vec![vec![text("WS001"), text("OptiPlex 7090")], vec![text("WS002")]],
        )
        .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[1].row, 2);
        assert_eq!(table.values(1), vec![text("WS002"), Data::Empty]);
    }
}
