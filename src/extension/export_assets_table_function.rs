//! # Export Assets Table Function
//!
//! `export_assets(path, output := ...)` writes one view of the selected rows to an xlsx
//! workbook and returns a single row describing what was written.
use crate::error::{AssetSheetError, ResultMessage};
use crate::extension::result_set::{ResultSet, ResultSetInitData};
use crate::extension::{
    load_parameters, query_parameters, AssetParameters, DerivedParam, ExtensionError, NamedParam, OutputParam,
    ViewParam,
};
use crate::inventory::query::{ExportView, Selection};
use crate::inventory::Inventory;
use crate::spreadsheet::cell::CellKind;
use calamine::Data;
use duckdb::{
    core::{DataChunkHandle, LogicalTypeHandle, LogicalTypeId},
    vtab::{BindInfo, InitInfo, TableFunctionInfo, VTab},
};
use std::error::Error;

/// Where and what to export.
pub(crate) struct ExportTarget {
    pub(crate) output: String,
    pub(crate) view: ExportView,
    pub(crate) derived: bool,
}

impl TryFrom<&BindInfo> for ExportTarget {
    type Error = ExtensionError;

    fn try_from(bind: &BindInfo) -> Result<Self, Self::Error> {
        let output = OutputParam::read(bind)?
            .ok_or_else(|| OutputParam::invalid(String::from("an output path is required")))?;
        Ok(Self {
            output,
            view: ViewParam::read(bind)?.unwrap_or(ExportView::Filtered),
            derived: DerivedParam::read(bind)?.unwrap_or(true),
        })
    }
}

/// Writes the view and reports the output path, view name and row count.
pub(crate) fn export_result_set(
    inventory: &Inventory,
    selection: &Selection,
    target: &ExportTarget,
) -> Result<ResultSet, AssetSheetError> {
    let records = target.view.rows(selection, inventory);
    let written = inventory.export(&target.output, target.view.sheet_name(), &records, target.derived)?;

    let mut result_set = ResultSet::new(vec![
        ("output".to_owned(), CellKind::Varchar),
        ("view".to_owned(), CellKind::Varchar),
        ("rows".to_owned(), CellKind::BigInt),
    ]);
    result_set.push(vec![
        Data::String(target.output.clone()),
        Data::String(target.view.as_str().to_owned()),
        Data::Int(written as i64),
    ]);
    Ok(result_set)
}

fn export_assets(bind: &BindInfo) -> Result<ResultSet, AssetSheetError> {
    let parameters = AssetParameters::try_from(bind)?;
    let target = ExportTarget::try_from(bind)?;
    parameters
        .run()
        .and_then(|(inventory, selection)| export_result_set(&inventory, &selection, &target))
        .with_prefix(parameters.file_name.as_str())
}

pub(crate) struct ExportAssetsTableFunction;

impl VTab for ExportAssetsTableFunction {
    type InitData = ResultSetInitData;
    type BindData = ResultSet;

    fn bind(bind: &BindInfo) -> Result<Self::BindData, Box<dyn Error>> {
        let data = export_assets(bind)?;
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
        let mut parameters = load_parameters();
        parameters.extend(query_parameters());
        parameters.extend([
            ViewParam::definition(),
            OutputParam::definition(),
            DerivedParam::definition(),
        ]);
        Some(parameters)
    }
}
