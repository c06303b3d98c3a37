//! # Validate Assets Table Function
//!
//! `validate_assets(path, ...)` runs the data-quality checks and returns one row per
//! affected record of every triggered issue.
use crate::error::{AssetSheetError, ResultMessage};
use crate::extension::result_set::{ResultSet, ResultSetInitData};
use crate::extension::{load_parameters, AssetParameters};
use crate::inventory::validate::validate;
use crate::inventory::Inventory;
use crate::spreadsheet::cell::CellKind;
use calamine::Data;
use duckdb::{
    core::{DataChunkHandle, LogicalTypeHandle, LogicalTypeId},
    vtab::{BindInfo, InitInfo, TableFunctionInfo, VTab},
};
use std::error::Error;

pub(crate) fn validation_result_set(inventory: &Inventory) -> ResultSet {
    let mut result_set = ResultSet::new(vec![
        ("kind".to_owned(), CellKind::Varchar),
        ("severity".to_owned(), CellKind::Varchar),
        ("count".to_owned(), CellKind::BigInt),
        ("summary".to_owned(), CellKind::Varchar),
        ("row_number".to_owned(), CellKind::BigInt),
        ("details".to_owned(), CellKind::Varchar),
    ]);
    for issue in validate(inventory) {
        for record in &issue.rows {
            result_set.push(vec![
                Data::String(issue.kind.label().to_owned()),
                Data::String(issue.severity().as_str().to_owned()),
                Data::Int(issue.count as i64),
                Data::String(issue.summary.clone()),
                // 1-based, as shown by spreadsheet programs
                Data::Int(inventory.table.records[*record].row as i64 + 1),
                Data::String(issue.details(inventory, *record)),
            ]);
        }
    }
    result_set
}

fn validate_assets(bind: &BindInfo) -> Result<ResultSet, AssetSheetError> {
    let parameters = AssetParameters::try_from(bind)?;
    Inventory::load(&parameters.file_name, &parameters.options)
        .map(|inventory| validation_result_set(&inventory))
        .with_prefix(parameters.file_name.as_str())
}

pub(crate) struct ValidateAssetsTableFunction;

impl VTab for ValidateAssetsTableFunction {
    type InitData = ResultSetInitData;
    type BindData = ResultSet;

    fn bind(bind: &BindInfo) -> Result<Self::BindData, Box<dyn Error>> {
        let data = validate_assets(bind)?;
        data.register(bind);
        Ok(data)
    }

    fn init(_: &InitInfo) -> Result<Self::InitData, Box<dyn Error>> {
        Ok(ResultSetInitData::default())
    }

    fn func(func: &TableFunctionInfo<Self>, output: &mut DataChunkHandle) -> Result<(), Box<dyn Error>> {
        func.get_bind_data().scan(func.get_init_data(), output)
    }

    fn parameters() -> Option<Vec<LogicalTypeHandle>> {
        Some(vec![LogicalTypeHandle::from(LogicalTypeId::Varchar)])
    }

    fn named_parameters() -> Option<Vec<(String, LogicalTypeHandle)>> {
        Some(load_parameters())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::tests::workstations;

    #[test]
    fn one_row_per_affected_record() {
        let inventory = workstations();
        let result_set = validation_result_set(&inventory);
        // 2 duplicate tags, then one row each for user, email, department, location, warranty
        assert_eq!(result_set.rows.len(), 7);

        let first = &result_set.rows[0];
        assert_eq!(first[0].text(), "Duplicate Asset Tags");
        assert_eq!(first[1].text(), "high");
        assert_eq!(first[2].get_bigint(), Some(1));
        assert_eq!(first[4].get_bigint(), Some(2));
        assert!(first[5].text().starts_with("Asset Tag: WS001"));

        let expired = result_set.rows.last().unwrap();
        assert_eq!(expired[0].text(), "Expired Warranty");
        assert!(expired[5].text().ends_with("Warranty Expiry: 2025-05-01"));
    }
}
