//! # Extension Core Module
//!
//! Named parameter handling and the pipeline entry shared by the table functions.
use crate::error::AssetSheetError;
use crate::extension::ExtensionError::InvalidParameter;
use crate::inventory::query::{parse_values, AssetQuery, Dimension, ExportView, Selection};
use crate::inventory::{Inventory, LoadOptions};
use crate::spreadsheet::header::MAX_HEADER_ROW;
use chrono::NaiveDate;
use duckdb::core::{LogicalTypeHandle, LogicalTypeId};
use duckdb::vtab::BindInfo;
use std::collections::BTreeSet;
use thiserror::Error;

pub(crate) mod analyze_assets_table_function;
pub(crate) mod asset_template_table_function;
pub(crate) mod export_assets_table_function;
pub(crate) mod read_assets_table_function;
pub(crate) mod result_set;
pub(crate) mod summarize_assets_table_function;
pub(crate) mod validate_assets_table_function;

#[derive(Error, Debug)]
pub enum ExtensionError {
    /// Invalid parameter provided to a table function
    #[error("Invalid parameter '{name}': {message}")]
    InvalidParameter { name: String, message: String },
}

/// Trait for handling named parameters in DuckDB table functions.
///
/// Every parameter is read as text and parsed here, so malformed values are
/// reported as `InvalidParameter` instead of being silently dropped.
pub(crate) trait NamedParam<T> {
    /// Returns the parameter name as used in SQL
    fn name() -> &'static str;

    /// Returns the DuckDB logical type for this parameter
    fn kind() -> LogicalTypeHandle {
        LogicalTypeHandle::from(LogicalTypeId::Varchar)
    }

    /// Returns the complete parameter definition (name and type)
    fn definition() -> (String, LogicalTypeHandle) {
        (Self::name().to_string(), Self::kind())
    }

    /// Parses the textual parameter value
    fn parse(text: &str) -> Result<T, ExtensionError>;

    /// Extracts the parameter value from bind information, `None` when not provided
    fn read(bind: &BindInfo) -> Result<Option<T>, ExtensionError> {
        bind.get_named_parameter(Self::name())
            .map(|value| Self::parse(value.to_string().as_str()))
            .transpose()
    }

    fn invalid(message: String) -> ExtensionError {
        InvalidParameter {
            name: Self::name().to_string(),
            message,
        }
    }
}

pub(crate) struct SheetNameParam;
pub(crate) struct HeaderRowParam;
pub(crate) struct AsOfParam;
pub(crate) struct FilterParam;
pub(crate) struct SearchParam;
pub(crate) struct ReplaceParam;
pub(crate) struct ViewParam;
pub(crate) struct OutputParam;
pub(crate) struct DerivedParam;

impl NamedParam<String> for SheetNameParam {
    fn name() -> &'static str {
        "sheet_name"
    }

    fn parse(text: &str) -> Result<String, ExtensionError> {
        Ok(text.to_owned())
    }
}

impl NamedParam<usize> for HeaderRowParam {
    fn name() -> &'static str {
        "header_row"
    }

    fn kind() -> LogicalTypeHandle {
        LogicalTypeHandle::from(LogicalTypeId::Bigint)
    }

    /// 0-based header row, at most `MAX_HEADER_ROW`.
    fn parse(text: &str) -> Result<usize, ExtensionError> {
        text.trim()
            .parse::<usize>()
            .ok()
            .filter(|row| *row <= MAX_HEADER_ROW)
            .ok_or_else(|| Self::invalid(format!("'{text}' is not a row between 0 and {MAX_HEADER_ROW}")))
    }
}

impl NamedParam<NaiveDate> for AsOfParam {
    fn name() -> &'static str {
        "as_of"
    }

    fn parse(text: &str) -> Result<NaiveDate, ExtensionError> {
        NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
            .map_err(|e| Self::invalid(format!("'{text}' is not a YYYY-MM-DD date: {e}")))
    }
}

impl NamedParam<Vec<(Dimension, BTreeSet<String>)>> for FilterParam {
    fn name() -> &'static str {
        "filter"
    }

    fn parse(text: &str) -> Result<Vec<(Dimension, BTreeSet<String>)>, ExtensionError> {
        AssetQuery::parse_filters(text).map_err(|e| Self::invalid(e.to_string()))
    }
}

impl NamedParam<String> for SearchParam {
    fn name() -> &'static str {
        "search"
    }

    fn parse(text: &str) -> Result<String, ExtensionError> {
        Ok(text.to_owned())
    }
}

impl NamedParam<BTreeSet<String>> for ReplaceParam {
    fn name() -> &'static str {
        "replace"
    }

    fn parse(text: &str) -> Result<BTreeSet<String>, ExtensionError> {
        Ok(parse_values(text))
    }
}

impl NamedParam<ExportView> for ViewParam {
    fn name() -> &'static str {
        "view"
    }

    fn parse(text: &str) -> Result<ExportView, ExtensionError> {
        ExportView::parse(text)
            .ok_or_else(|| Self::invalid(format!("'{text}' is not one of filtered, replacement, expired")))
    }
}

impl NamedParam<String> for OutputParam {
    fn name() -> &'static str {
        "output"
    }

    fn parse(text: &str) -> Result<String, ExtensionError> {
        match text.trim() {
            "" => Err(Self::invalid(String::from("output path is empty"))),
            path => Ok(path.to_owned()),
        }
    }
}

impl NamedParam<bool> for DerivedParam {
    fn name() -> &'static str {
        "derived"
    }

    fn kind() -> LogicalTypeHandle {
        LogicalTypeHandle::from(LogicalTypeId::Boolean)
    }

    fn parse(text: &str) -> Result<bool, ExtensionError> {
        match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(Self::invalid(format!("'{text}' is not a boolean"))),
        }
    }
}

/// Named parameters accepted by every function that reads a workbook.
pub(crate) fn load_parameters() -> Vec<(String, LogicalTypeHandle)> {
    vec![
        SheetNameParam::definition(),
        HeaderRowParam::definition(),
        AsOfParam::definition(),
    ]
}

/// Named parameters of functions that select rows.
pub(crate) fn query_parameters() -> Vec<(String, LogicalTypeHandle)> {
    vec![
        FilterParam::definition(),
        SearchParam::definition(),
        ReplaceParam::definition(),
    ]
}

/// Workbook path plus load options and query, read from bind information.
pub(crate) struct AssetParameters {
    /// Path to the spreadsheet file
    pub(crate) file_name: String,
    pub(crate) options: LoadOptions,
    pub(crate) query: AssetQuery,
}

impl TryFrom<&BindInfo> for AssetParameters {
    type Error = ExtensionError;

    fn try_from(bind: &BindInfo) -> Result<Self, Self::Error> {
        let options = LoadOptions {
            sheet_name: SheetNameParam::read(bind)?,
            header_row: HeaderRowParam::read(bind)?,
            as_of: AsOfParam::read(bind)?,
        };
        let mut query = AssetQuery::default();
        for (dimension, values) in FilterParam::read(bind)?.unwrap_or_default() {
            query = query.filter(dimension, values);
        }
        if let Some(text) = SearchParam::read(bind)? {
            query = query.search(&text);
        }
        if let Some(models) = ReplaceParam::read(bind)? {
            query = query.replace(models);
        }
        Ok(Self {
            file_name: bind.get_parameter(0).to_string(),
            options,
            query,
        })
    }
}

impl AssetParameters {
    /// Loads the workbook and applies the query.
    pub(crate) fn run(&self) -> Result<(Inventory, Selection), AssetSheetError> {
        let inventory = Inventory::load(&self.file_name, &self.options)?;
        let selection = self.query.apply(&inventory);
        Ok((inventory, selection))
    }
}
