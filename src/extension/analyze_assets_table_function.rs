//! # Analyze Assets Table Function
//!
//! `analyze_assets(path, ...)` reports how the sheet was understood: the header row,
//! the asset type and the column bound to every semantic role.
use crate::error::{AssetSheetError, ResultMessage};
use crate::extension::result_set::{ResultSet, ResultSetInitData};
use crate::extension::{load_parameters, AssetParameters};
use crate::inventory::role::SemanticRole;
use crate::inventory::Inventory;
use crate::spreadsheet::cell::CellKind;
use calamine::Data;
use duckdb::{
    core::{DataChunkHandle, LogicalTypeHandle, LogicalTypeId},
    vtab::{BindInfo, InitInfo, TableFunctionInfo, VTab},
};
use std::error::Error;

pub(crate) fn analysis_result_set(inventory: &Inventory) -> ResultSet {
    let mut result_set = ResultSet::new(vec![
        ("role".to_owned(), CellKind::Varchar),
        ("column_name".to_owned(), CellKind::Varchar),
        ("column_type".to_owned(), CellKind::Varchar),
        ("required".to_owned(), CellKind::Bool),
        ("asset_type".to_owned(), CellKind::Varchar),
        ("header_row".to_owned(), CellKind::BigInt),
    ]);
    let model_role = inventory.asset_type.model_role();
    for role in SemanticRole::ALL {
        let column_type = inventory.column(role).map(|column| {
            CellKind::infer(inventory.table.records.iter().filter_map(|record| record.cell(column)))
        });
        result_set.push(vec![
            Data::String(role.name().to_owned()),
            inventory
                .binding
                .header(role)
                .map(|header| Data::String(header.to_owned()))
                .unwrap_or(Data::Empty),
            column_type
                .map(|kind| Data::String(kind.as_str().to_owned()))
                .unwrap_or(Data::Empty),
            Data::Bool(role == model_role),
            Data::String(inventory.asset_type.as_str().to_owned()),
            Data::Int(inventory.table.header_row as i64),
        ]);
    }
    result_set
}

fn analyze_assets(bind: &BindInfo) -> Result<ResultSet, AssetSheetError> {
    let parameters = AssetParameters::try_from(bind)?;
    Inventory::load(&parameters.file_name, &parameters.options)
        .map(|inventory| analysis_result_set(&inventory))
        .with_prefix(parameters.file_name.as_str())
}

pub(crate) struct AnalyzeAssetsTableFunction;

impl VTab for AnalyzeAssetsTableFunction {
    type InitData = ResultSetInitData;
    type BindData = ResultSet;

    fn bind(bind: &BindInfo) -> Result<Self::BindData, Box<dyn Error>> {
        let data = analyze_assets(bind)?;
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
