//! # Summarize Assets Table Function
//!
//! `summarize_assets(path, ...)` returns the summary metrics of the selected rows.
use crate::error::{AssetSheetError, ResultMessage};
use crate::extension::result_set::{ResultSet, ResultSetInitData};
use crate::extension::{load_parameters, query_parameters, AssetParameters};
use crate::inventory::query::Selection;
use crate::inventory::summary::Summary;
use crate::inventory::Inventory;
use crate::spreadsheet::cell::CellKind;
use calamine::Data;
use duckdb::{
    core::{DataChunkHandle, LogicalTypeHandle, LogicalTypeId},
    vtab::{BindInfo, InitInfo, TableFunctionInfo, VTab},
};
use std::error::Error;

pub(crate) fn summary_result_set(inventory: &Inventory, selection: &Selection) -> ResultSet {
    let mut result_set = ResultSet::new(vec![
        ("metric".to_owned(), CellKind::Varchar),
        ("label".to_owned(), CellKind::Varchar),
        ("count".to_owned(), CellKind::BigInt),
        ("share".to_owned(), CellKind::Double),
    ]);
    for metric in Summary::of(inventory, selection).metrics() {
        result_set.push(vec![
            Data::String(metric.metric.to_owned()),
            Data::String(metric.label),
            Data::Int(metric.count as i64),
            Data::Float(metric.share),
        ]);
    }
    result_set
}

fn summarize_assets(bind: &BindInfo) -> Result<ResultSet, AssetSheetError> {
    let parameters = AssetParameters::try_from(bind)?;
    parameters
        .run()
        .map(|(inventory, selection)| summary_result_set(&inventory, &selection))
        .with_prefix(parameters.file_name.as_str())
}

pub(crate) struct SummarizeAssetsTableFunction;

impl VTab for SummarizeAssetsTableFunction {
    type InitData = ResultSetInitData;
    type BindData = ResultSet;

    fn bind(bind: &BindInfo) -> Result<Self::BindData, Box<dyn Error>> {
        let data = summarize_assets(bind)?;
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
        Some(parameters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::tests::workstations;

    #[test]
    fn metrics_become_rows() {
        let inventory = workstations();
        let result_set = summary_result_set(&inventory, &Selection::all(&inventory));
        let first = &result_set.rows[0];
        assert_eq!(first[0].text(), "total");
        assert_eq!(first[2].get_bigint(), Some(5));
        assert_eq!(first[3].get_double(), Some(100.0));
        assert!(result_set
            .rows
            .iter()
            .any(|row| row[0].text() == "department" && row[1].text() == "(blank)"));
    }
}
