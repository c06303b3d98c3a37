//! # Read Assets Table Function
//!
//! `read_assets(path, ...)` returns the selected rows of an inventory sheet with their
//! source columns typed by inference, followed by the derived columns.
use crate::error::{AssetSheetError, ResultMessage};
use crate::extension::result_set::{unique_column_names, ResultSet, ResultSetInitData};
use crate::extension::{load_parameters, query_parameters, AssetParameters, NamedParam, ViewParam};
use crate::inventory::query::{ExportView, Selection};
use crate::inventory::Inventory;
use crate::spreadsheet::cell::CellKind;
use calamine::Data;
use duckdb::{
    core::{DataChunkHandle, LogicalTypeHandle, LogicalTypeId},
    vtab::{BindInfo, InitInfo, TableFunctionInfo, VTab},
};
use std::error::Error;

/// Derived output columns and their types.
const DERIVED_COLUMNS: [(&str, CellKind); 6] = [
    ("category", CellKind::Varchar),
    ("asset_age", CellKind::BigInt),
    ("age_category", CellKind::Varchar),
    ("warranty_status", CellKind::Varchar),
    ("days_to_expiry", CellKind::BigInt),
    ("replacement", CellKind::Bool),
];

/// Builds the output of `read_assets` for one view of the selection.
pub(crate) fn assets_result_set(inventory: &Inventory, selection: &Selection, view: ExportView) -> ResultSet {
    let kinds: Vec<CellKind> = (0..inventory.table.headers.len())
        .map(|column| CellKind::infer(inventory.table.records.iter().filter_map(|record| record.cell(column))))
        .collect();
    let names = unique_column_names(
        inventory
            .table
            .headers
            .iter()
            .cloned()
            .chain(DERIVED_COLUMNS.iter().map(|(name, _)| name.to_string())),
    );
    let columns = names
        .into_iter()
        .zip(kinds.into_iter().chain(DERIVED_COLUMNS.iter().map(|(_, kind)| *kind)))
        .collect();

    let mut result_set = ResultSet::new(columns);
    for record in view.rows(selection, inventory) {
        let derived = &inventory.derived[record];
        let mut values = inventory.table.values(record);
        values.extend([
            Data::String(derived.category.to_owned()),
            Data::Int(derived.asset_age),
            Data::String(derived.age_category.as_str().to_owned()),
            Data::String(derived.warranty_status.as_str().to_owned()),
            derived.days_to_expiry.map(Data::Int).unwrap_or(Data::Empty),
            Data::Bool(selection.is_marked(record)),
        ]);
        result_set.push(values);
    }
    result_set
}

fn read_assets(bind: &BindInfo) -> Result<ResultSet, AssetSheetError> {
    let parameters = AssetParameters::try_from(bind)?;
    let view = ViewParam::read(bind)?.unwrap_or(ExportView::Filtered);
    parameters
        .run()
        .map(|(inventory, selection)| assets_result_set(&inventory, &selection, view))
        .with_prefix(parameters.file_name.as_str())
}

pub(crate) struct ReadAssetsTableFunction;

impl VTab for ReadAssetsTableFunction {
    type InitData = ResultSetInitData;
    type BindData = ResultSet;

    fn bind(bind: &BindInfo) -> Result<Self::BindData, Box<dyn Error>> {
        let data = read_assets(bind)?;
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
        parameters.push(ViewParam::definition());
        Some(parameters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::query::AssetQuery;
    use crate::inventory::tests::workstations;

    #[test]
    fn columns_are_typed_and_derived_appended() {
        let inventory = workstations();
        let selection = Selection::all(&inventory);
        let result_set = assets_result_set(&inventory, &selection, ExportView::Filtered);

        let kinds: Vec<(&str, CellKind)> = result_set
            .columns
            .iter()
            .map(|(name, kind)| (name.as_str(), *kind))
            .collect();
        assert_eq!(kinds[0], ("Asset Tag", CellKind::Varchar));
        // "N/A" in the purchase year makes the column textual
        assert_eq!(kinds[7], ("Year of Purchase", CellKind::Varchar));
        assert_eq!(kinds[9], ("category", CellKind::Varchar));
        assert_eq!(kinds[13], ("days_to_expiry", CellKind::BigInt));
        assert_eq!(kinds[14], ("replacement", CellKind::Bool));
        assert_eq!(result_set.rows.len(), 5);
        assert_eq!(result_set.rows[0][13].get_bigint(), Some(-31));
        assert_eq!(result_set.rows[3][13].get_bigint(), None);
    }

    #[test]
    fn replacement_view_keeps_marked_rows() {
        let inventory = workstations();
        let selection = AssetQuery::default().replace(["Generic Box"]).apply(&inventory);
        let result_set = assets_result_set(&inventory, &selection, ExportView::Replacement);
        assert_eq!(result_set.rows.len(), 1);
        assert_eq!(result_set.rows[0][0].text(), "WS004");
        assert_eq!(result_set.rows[0][14].get_bool(), Some(true));
    }
}
