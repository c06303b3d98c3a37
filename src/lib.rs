//! # DuckDB Asset Sheet Extension
//!
//! A DuckDB extension that turns IT-asset inventory spreadsheets into queryable tables.
//! Inventory sheets come in many shapes: title rows above the header, renamed columns,
//! and two different device profiles. The extension finds the header row, binds columns
//! to semantic roles by keyword, classifies the sheet as a Workstation or Mobile
//! inventory and derives category, age and warranty fields for every row.
//!
//! ## Features
//!
//! - **Multi-format support**: Excel files (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`) and OpenDocument (`.ods`)
//! - **Header detection**: the header row is located by keyword hits among the first rows
//! - **Column resolution**: headers are matched to roles after normalization
//! - **Derived fields**: category, asset age, age category, warranty status and days to expiry
//! - **Validation**: duplicate identifiers, missing fields, malformed emails and expired warranties
//! - **Filtering**: per-dimension filters, free-text search and replacement marking
//! - **Export**: filtered, replacement or expired rows written back to xlsx
//!
//! ## Table Functions
//!
//! - `read_assets`: Rows of an inventory with the derived columns
//! - `analyze_assets`: Header row, asset type and column bound to each role
//! - `validate_assets`: Data-quality issues, one row per affected record
//! - `summarize_assets`: Totals and breakdowns of the selected rows
//! - `export_assets`: Writes a view of the selected rows to an xlsx workbook
//! - `asset_template`: Example dataset of a profile
extern crate duckdb;
extern crate duckdb_loadable_macros;
extern crate libduckdb_sys;

mod error;
mod extension;
mod inventory;
mod spreadsheet;

use crate::extension::analyze_assets_table_function::AnalyzeAssetsTableFunction;
use crate::extension::asset_template_table_function::AssetTemplateTableFunction;
use crate::extension::export_assets_table_function::ExportAssetsTableFunction;
use crate::extension::read_assets_table_function::ReadAssetsTableFunction;
use crate::extension::summarize_assets_table_function::SummarizeAssetsTableFunction;
use crate::extension::validate_assets_table_function::ValidateAssetsTableFunction;
use anyhow::{Context, Result};
use duckdb::Connection;
use duckdb_loadable_macros::duckdb_entrypoint_c_api;
use libduckdb_sys as ffi;

/// Extension entry point for DuckDB.
///
/// Registers every table function of the extension on the given connection.
///
/// # Errors
///
/// Returns an error if any table function fails to register with DuckDB.
#[duckdb_entrypoint_c_api()]
pub unsafe fn extension_entrypoint(connection: Connection) -> Result<()> {
    connection
        .register_table_function::<ReadAssetsTableFunction>("read_assets")
        .context("Failed to register read_assets table function")?;
    connection
        .register_table_function::<AnalyzeAssetsTableFunction>("analyze_assets")
        .context("Failed to register analyze_assets table function")?;
    connection
        .register_table_function::<ValidateAssetsTableFunction>("validate_assets")
        .context("Failed to register validate_assets table function")?;
    connection
        .register_table_function::<SummarizeAssetsTableFunction>("summarize_assets")
        .context("Failed to register summarize_assets table function")?;
    connection
        .register_table_function::<ExportAssetsTableFunction>("export_assets")
        .context("Failed to register export_assets table function")?;
    connection
        .register_table_function::<AssetTemplateTableFunction>("asset_template")
        .context("Failed to register asset_template table function")?;
    Ok(())
}
