//! # Inventory Module
//!
//! The asset pipeline over one sheet: header detection picks the header row, columns are
//! bound to semantic roles, the sheet is classified as a workstation or mobile inventory,
//! and every record gets its derived columns. The resulting [`Inventory`] is immutable and
//! feeds validation, filtering, summaries and exports.
pub(crate) mod classify;
pub(crate) mod derive;
pub(crate) mod normalize;
pub(crate) mod query;
pub(crate) mod role;
pub(crate) mod summary;
pub(crate) mod table;
pub(crate) mod template;
pub(crate) mod validate;

use crate::error::AssetSheetError;
use crate::inventory::classify::{classify, AssetType};
use crate::inventory::derive::{derive, Derived};
use crate::inventory::role::{ColumnBinding, SemanticRole};
use crate::inventory::table::AssetTable;
use crate::spreadsheet::export::write_workbook;
use crate::spreadsheet::header::{detect_header_row, keyword_hits};
use crate::spreadsheet::Spreadsheet;
use calamine::Data;
use chrono::{Local, NaiveDate};
use rust_xlsxwriter::XlsxError;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Headers of the derived columns appended to exports.
pub(crate) const DERIVED_HEADERS: [&str; 4] = ["Category", "Asset Age", "Age Category", "Warranty Status"];

#[derive(Error, Debug)]
pub enum InventoryError {
    /// Neither a model nor a product column could be found
    #[error("No {asset_type} model column found: expected a header containing '{keyword}', found [{headers}]")]
    MissingModelColumn {
        asset_type: &'static str,
        keyword: &'static str,
        headers: String,
    },

    /// Malformed filter expression
    #[error("Invalid filter '{expression}': {message}")]
    InvalidFilter { expression: String, message: String },
}

/// How a workbook is turned into an inventory.
#[derive(Clone, Debug, Default)]
pub(crate) struct LoadOptions {
    /// Sheet to read, first sheet when absent
    pub(crate) sheet_name: Option<String>,
    /// Header row override, detected when absent
    pub(crate) header_row: Option<usize>,
    /// Reference date for ages and warranties, local today when absent
    pub(crate) as_of: Option<NaiveDate>,
}

impl LoadOptions {
    pub(crate) fn today(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Local::now().date_naive())
    }
}

/// A resolved, classified and derived asset table.
#[derive(Clone, Debug)]
pub(crate) struct Inventory {
    pub(crate) table: AssetTable,
    pub(crate) binding: ColumnBinding,
    pub(crate) asset_type: AssetType,
    /// Derived columns, parallel to `table.records`
    pub(crate) derived: Vec<Derived>,
    pub(crate) as_of: NaiveDate,
    model_column: usize,
}

impl Inventory {
    /// Reads a workbook and runs the pipeline on the selected sheet.
    pub(crate) fn load<P>(path: P, options: &LoadOptions) -> Result<Self, AssetSheetError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file_name = path.to_string_lossy().to_string();
        let mut spreadsheet = Spreadsheet::open(path)?;
        let sheet = spreadsheet.open_sheet(&file_name, options.sheet_name.as_deref())?;

        let header_row = match options.header_row {
            Some(row) => {
                if sheet.rows.get(row).map(|cells| keyword_hits(cells)) == Some(0) {
                    warn!(row, sheet = %sheet.name, "header row override contains no header keywords");
                }
                row
            }
            None => detect_header_row(&sheet.rows),
        };
        debug!(sheet = %sheet.name, dimension = %sheet.dimension(), header_row, "header row selected");

        let table = AssetTable::from_sheet(&sheet, header_row)?;
        let inventory = Self::build(table, options.today())?;
        if inventory.is_empty() {
            warn!(sheet = %sheet.name, header_row, "no records below the header row");
        }
        Ok(inventory)
    }

    /// Binds, classifies and derives an already split table.
    ///
    /// # Errors
    ///
    /// Returns `MissingModelColumn` when the classified profile has no model column.
    pub(crate) fn build(table: AssetTable, as_of: NaiveDate) -> Result<Self, InventoryError> {
        let binding = ColumnBinding::resolve(&table.headers);
        let asset_type = classify(&table.headers);
        let model_role = asset_type.model_role();

        let model_column = binding.column(model_role).ok_or_else(|| InventoryError::MissingModelColumn {
            asset_type: asset_type.as_str(),
            keyword: model_role.keywords()[0],
            headers: table.headers.join(", "),
        })?;
        for role in asset_type.optional_roles() {
            if binding.column(*role).is_none() {
                debug!(role = role.name(), asset_type = asset_type.as_str(), "optional column absent");
            }
        }

        let derived = derive(&table, &binding, asset_type, as_of);
        info!(
            file = %table.file_name,
            sheet = %table.sheet_name,
            header_row = table.header_row,
            asset_type = asset_type.as_str(),
            records = table.len(),
            "inventory loaded"
        );
        Ok(Self {
            table,
            binding,
            asset_type,
            derived,
            as_of,
            model_column,
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.table.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Column of the model or product field.
    pub(crate) fn model_column(&self) -> usize {
        self.model_column
    }

    pub(crate) fn column(&self, role: SemanticRole) -> Option<usize> {
        self.binding.column(role)
    }

    /// Trimmed text of a role for one record, `None` when the role is unresolved.
    pub(crate) fn text(&self, record: usize, role: SemanticRole) -> Option<String> {
        self.column(role).map(|column| self.table.records[record].text(column))
    }

    /// Model or product text of a record.
    pub(crate) fn model(&self, record: usize) -> String {
        self.table.records[record].text(self.model_column)
    }

    /// Headers and values of the given records, with the derived columns appended on request.
    pub(crate) fn rows(&self, records: &[usize], with_derived: bool) -> (Vec<String>, Vec<Vec<Data>>) {
        let mut headers = self.table.headers.clone();
        if with_derived {
            headers.extend(DERIVED_HEADERS.iter().map(|header| header.to_string()));
        }
        let rows = records
            .iter()
            .map(|record| {
                let mut values = self.table.values(*record);
                if with_derived {
                    let derived = &self.derived[*record];
                    values.extend([
                        Data::String(derived.category.to_owned()),
                        Data::Int(derived.asset_age),
                        Data::String(derived.age_category.as_str().to_owned()),
                        Data::String(derived.warranty_status.as_str().to_owned()),
                    ]);
                }
                values
            })
            .collect();
        (headers, rows)
    }

    /// Writes the given records to a single-sheet workbook.
    pub(crate) fn export<P>(&self, path: P, sheet_name: &str, records: &[usize], with_derived: bool) -> Result<usize, XlsxError>
    where
        P: AsRef<Path>,
    {
        let (headers, rows) = self.rows(records, with_derived);
        write_workbook(path, sheet_name, &headers, &rows)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::inventory::query::{AssetQuery, Dimension, ExportView};
    use rust_xlsxwriter::Workbook;
    use tempfile::tempdir;

    pub(crate) fn text(value: &str) -> Data {
        Data::String(value.to_owned())
    }

    pub(crate) fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    /// Five workstations with a duplicated tag, a missing user, a bad email and an expired warranty.
    pub(crate) fn workstations() -> Inventory {
        let table = AssetTable::from_values(
            "workstations.xlsx",
            &["Asset Tag", "Model", "Serial Number", "User", "User Email", "Department", "Location", "Year of Purchase", "Warranty Expiry"],
            vec![
                vec![text("WS001"), text("Dell OptiPlex 7090"), text("SN001"), text("Ana"), text("ana@corp.com"), text("IT"), text("HQ"), Data::Int(2020), text("2025-05-01")],
                vec![text("WS001"), text("Latitude 5420"), text("SN002"), text("Ben"), text("ben@corp"), text("HR"), text("HQ"), Data::Int(2023), text("2027-01-01")],
                vec![text("WS002"), text("TravelMate P2"), text("SN003"), Data::Empty, Data::Empty, text("IT"), text("Branch"), Data::Float(2018.0), text("2025-07-01")],
                vec![text("WS003"), text("Latitude 7220 Rugged"), text("SN004"), text("Cy"), text("cy@corp.com"), text("Ops"), Data::Empty, text("N/A"), text("soon")],
                vec![text("WS004"), text("Generic Box"), text("SN005"), text("Di"), text("di@corp.com"), Data::Empty, text("HQ"), Data::Int(2024), Data::Empty],
            ],
        )
        .unwrap();
        Inventory::build(table, as_of()).unwrap()
    }

    #[test]
    fn builds_workstation_inventory() {
        let inventory = workstations();
        assert_eq!(inventory.asset_type, AssetType::Workstation);
        assert_eq!(inventory.len(), 5);
        assert_eq!(inventory.model_column(), 1);
        assert_eq!(inventory.model(1), "Latitude 5420");
        assert_eq!(inventory.text(0, SemanticRole::Department), Some("IT".to_owned()));
        assert_eq!(inventory.text(0, SemanticRole::Site), None);

        let categories: Vec<&str> = inventory.derived.iter().map(|derived| derived.category).collect();
        assert_eq!(categories, vec!["Desktop", "Laptop Dell", "Laptop Acer", "Toughbook", "Other"]);
        let ages: Vec<i64> = inventory.derived.iter().map(|derived| derived.asset_age).collect();
        assert_eq!(ages, vec![5, 2, 7, 0, 1]);
    }

    #[test]
    fn missing_model_column_is_fatal() {
        let table = AssetTable::from_values("devices.xlsx", &["Product", "Programme", "User"], vec![]).unwrap();
        assert!(Inventory::build(table, as_of()).is_ok());

        let table = AssetTable::from_values("devices.xlsx", &["Asset Tag", "User"], vec![]).unwrap();
        let error = Inventory::build(table, as_of()).unwrap_err();
        assert!(matches!(error, InventoryError::MissingModelColumn { asset_type: "Mobile", keyword: "product", .. }));
        assert!(error.to_string().contains("Asset Tag, User"));
    }

    #[test]
    fn loads_workbook_with_title_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("register.xlsx");
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.write_string(0, 0, "Asset register 2025").unwrap();
        for (column, header) in ["Asset Tag", "Model", "Serial Number", "User", "Department"].iter().enumerate() {
            worksheet.write_string(2, column as u16, *header).unwrap();
        }
        worksheet.write_string(3, 0, "WS001").unwrap();
        worksheet.write_string(3, 1, "OptiPlex 7090").unwrap();
        worksheet.write_string(5, 0, "WS002").unwrap();
        worksheet.write_string(5, 1, "iPad Air").unwrap();
        workbook.save(&path).unwrap();

        let options = LoadOptions {
            as_of: Some(as_of()),
            ..LoadOptions::default()
        };
        let inventory = Inventory::load(&path, &options).unwrap();
        assert_eq!(inventory.table.header_row, 2);
        assert_eq!(inventory.len(), 2);
        assert_eq!(inventory.table.records[1].row, 5);
        assert_eq!(inventory.derived[1].category, "iPad");

        let options = LoadOptions {
            header_row: Some(40),
            ..LoadOptions::default()
        };
        assert!(Inventory::load(&path, &options).is_err());
    }

    #[test]
    fn export_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("filtered.xlsx");
        let inventory = workstations();
        let selection = AssetQuery::default()
            .filter(Dimension::Role(SemanticRole::Location), ["HQ"])
            .apply(&inventory);
        let records = ExportView::Filtered.rows(&selection, &inventory);
        assert_eq!(inventory.export(&path, ExportView::Filtered.sheet_name(), &records, true).unwrap(), 3);

        let options = LoadOptions {
            as_of: Some(as_of()),
            ..LoadOptions::default()
        };
        let exported = Inventory::load(&path, &options).unwrap();
        assert_eq!(exported.table.sheet_name, "Filtered Assets");
        assert_eq!(exported.len(), 3);
        assert_eq!(&exported.table.headers[..9], &inventory.table.headers[..]);
        assert_eq!(&exported.table.headers[9..], &DERIVED_HEADERS.map(String::from)[..]);
        for (index, record) in records.iter().enumerate() {
            for column in 0..inventory.table.headers.len() {
                assert_eq!(
                    exported.table.records[index].text(column),
                    inventory.table.records[*record].text(column)
                );
            }
            assert_eq!(exported.derived[index], inventory.derived[*record]);
        }
    }

    #[test]
    fn rows_without_derived_columns() {
        let inventory = workstations();
        let (headers, rows) = inventory.rows(&[4], false);
        assert_eq!(headers, inventory.table.headers);
        assert_eq!(rows, vec![inventory.table.values(4)]);
    }
}
