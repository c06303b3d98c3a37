//! # Asset Template Table Function
//!
//! `asset_template('workstation' | 'mobile')` returns the example dataset of a profile as
//! text columns. With `output := path` the same dataset is also written as an xlsx workbook.
use crate::error::AssetSheetError;
use crate::extension::result_set::{ResultSet, ResultSetInitData};
use crate::extension::ExtensionError::InvalidParameter;
use crate::extension::{NamedParam, OutputParam};
use crate::inventory::classify::AssetType;
use crate::inventory::table::AssetTable;
use crate::inventory::template::template;
use crate::spreadsheet::cell::CellKind;
use crate::spreadsheet::export::write_workbook;
use duckdb::{
    core::{DataChunkHandle, LogicalTypeHandle, LogicalTypeId},
    vtab::{BindInfo, InitInfo, TableFunctionInfo, VTab},
};
use std::error::Error;

fn parse_kind(text: &str) -> Result<AssetType, AssetSheetError> {
    AssetType::parse(text).ok_or_else(|| {
        InvalidParameter {
            name: String::from("kind"),
            message: format!("'{text}' is not one of workstation, mobile"),
        }
        .into()
    })
}

pub(crate) fn template_result_set(table: &AssetTable) -> ResultSet {
    let mut result_set = ResultSet::new(
        table
            .headers
            .iter()
            .map(|header| (header.clone(), CellKind::Varchar))
            .collect(),
    );
    for record in 0..table.len() {
        result_set.push(table.values(record));
    }
    result_set
}

fn asset_template(bind: &BindInfo) -> Result<ResultSet, AssetSheetError> {
    let asset_type = parse_kind(bind.get_parameter(0).to_string().as_str())?;
    let table = template(asset_type)?;
    if let Some(output) = OutputParam::read(bind)? {
        let rows: Vec<_> = (0..table.len()).map(|record| table.values(record)).collect();
        write_workbook(&output, &table.sheet_name, &table.headers, &rows)?;
    }
    Ok(template_result_set(&table))
}

pub(crate) struct AssetTemplateTableFunction;

impl VTab for AssetTemplateTableFunction {
    type InitData = ResultSetInitData;
    type BindData = ResultSet;

    fn bind(bind: &BindInfo) -> Result<Self::BindData, Box<dyn Error>> {
        let data = asset_template(bind)?;
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
        Some(vec![OutputParam::definition()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_is_case_insensitive() {
        assert_eq!(parse_kind("Workstation").unwrap(), AssetType::Workstation);
        assert_eq!(parse_kind(" MOBILE ").unwrap(), AssetType::Mobile);
        let error = parse_kind("tablet").unwrap_err();
        assert!(error.to_string().contains("'kind'"));
    }

    #[test]
    fn template_rows_are_text() {
        let table = template(AssetType::Mobile).unwrap();
        let result_set = template_result_set(&table);
        assert_eq!(result_set.rows.len(), 5);
        assert!(result_set.columns.iter().all(|(_, kind)| *kind == CellKind::Varchar));
        assert_eq!(result_set.columns.len(), table.headers.len());
    }
}
