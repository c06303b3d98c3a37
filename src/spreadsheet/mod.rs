//! # Spreadsheet Module
//!
//! Reading and writing of workbook files. Excel (.xlsx, .xlsm, .xlam, .xlsb, .xls, .xla)
//! and OpenDocument (.ods) files are read through calamine into a padded [`Sheet`]
//! grid; exports are written as xlsx through rust_xlsxwriter.
pub(crate) mod cell;
pub(crate) mod export;
pub(crate) mod header;
pub(crate) mod sheet;

use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::SpreadsheetError::{EmptySheet, InvalidFileFormat, SheetNotFound};
use calamine::{open_workbook, Ods, OdsError, Reader, Xls, XlsError, Xlsb, XlsbError, Xlsx, XlsxError};
use std::ffi::OsStr;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors raised while opening workbooks and reading sheets.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    /// Error in Excel 2007+ format (.xlsx, .xlsm, .xlam)
    #[error("Cannot read xlsx workbook: {0}. Check that the file is not open in another program or password protected, and save a fresh copy as .xlsx")]
    InvalidXlsxFileFormat(#[from] XlsxError),

    /// Error in Excel Binary format (.xlsb)
    #[error("Cannot read xlsb workbook: {0}. Save a fresh copy as .xlsx and try again")]
    InvalidXlsbFileFormat(#[from] XlsbError),

    /// Error in legacy Excel format (.xls, .xla)
    #[error("Cannot read xls workbook: {0}. Legacy or password protected workbooks should be saved as .xlsx")]
    InvalidXlsFileFormat(#[from] XlsError),

    /// Error in OpenDocument format (.ods)
    #[error("Cannot read ods workbook: {0}. Save a fresh copy as .xlsx and try again")]
    InvalidOdsFileFormat(#[from] OdsError),

    /// Unsupported or unrecognized file extension
    #[error("Cannot detect file format for '{name}', expected .xlsx or .xls")]
    InvalidFileFormat { name: String },

    /// Requested sheet not found or workbook has no sheets
    #[error("Sheet '{name}' not found")]
    SheetNotFound { name: String },

    /// Sheet exists but contains no data
    #[error("Empty sheet or missing data")]
    EmptySheet,

    /// Header row points past the last row of the sheet
    #[error("Header row {row} is out of range, the sheet has {rows} rows")]
    HeaderRowOutOfRange { row: usize, rows: usize },
}

/// Type alias for buffered file reader
pub(crate) type FileReader = BufReader<File>;

/// Wrapper over the calamine readers, selected by file extension.
pub(crate) enum Spreadsheet {
    /// Excel 2007+ format reader (.xlsx, .xlsm, .xlam)
    Xlsx(Xlsx<FileReader>),
    /// Excel Binary format reader (.xlsb)
    Xlsb(Xlsb<FileReader>),
    /// Legacy Excel format reader (.xls, .xla)
    Xls(Xls<FileReader>),
    /// OpenDocument format reader (.ods)
    Ods(Ods<FileReader>),
}

impl Spreadsheet {
    /// Opens a workbook, picking the reader from the file extension (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `InvalidFileFormat` for unknown extensions, or the reader's error
    /// when the file is missing, locked, encrypted or corrupted.
    pub(crate) fn open<P>(path: P) -> Result<Self, SpreadsheetError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(OsStr::to_str)
            .map(str::to_ascii_lowercase);
        debug!(path = %path.display(), "opening workbook");
        match extension.as_deref() {
            Some("xlsx") | Some("xlsm") | Some("xlam") => Ok(Self::Xlsx(open_workbook(path)?)),
            Some("xlsb") => Ok(Self::Xlsb(open_workbook(path)?)),
            Some("xls") | Some("xla") => Ok(Self::Xls(open_workbook(path)?)),
            Some("ods") => Ok(Self::Ods(open_workbook(path)?)),
            _ => Err(InvalidFileFormat {
                name: path.to_string_lossy().to_string(),
            }),
        }
    }

    /// Returns the names of all sheets in workbook order.
    pub(crate) fn sheet_names(&self) -> Vec<String> {
        match self {
            Self::Xlsx(xlsx) => xlsx.sheet_names(),
            Self::Xlsb(xlsb) => xlsb.sheet_names(),
            Self::Xls(xls) => xls.sheet_names(),
            Self::Ods(ods) => ods.sheet_names(),
        }
    }

    /// Returns the name of the sheet at the specified index.
    pub(crate) fn sheet_name_at(&self, index: usize) -> Option<String> {
        self.sheet_names().get(index).map(|name| name.to_owned())
    }

    /// Reads a sheet by name, or the first sheet when no name is given.
    ///
    /// # Errors
    ///
    /// Returns `SheetNotFound` for unknown names and `EmptySheet` when the sheet holds no values.
    pub(crate) fn open_sheet(&mut self, file_name: &str, sheet_name: Option<&str>) -> Result<Sheet, SpreadsheetError> {
        let name = match sheet_name {
            Some(name) if self.sheet_names().iter().any(|sheet| sheet == name) => name.to_owned(),
            Some(name) => return Err(SheetNotFound { name: name.to_owned() }),
            None => self.sheet_name_at(0).ok_or_else(|| SheetNotFound {
                name: String::from("<first sheet>"),
            })?,
        };

        let range = match self {
            Self::Xlsx(xlsx) => xlsx.worksheet_range(&name)?,
            Self::Xlsb(xlsb) => xlsb.worksheet_range(&name)?,
            Self::Xls(xls) => xls.worksheet_range(&name)?,
            Self::Ods(ods) => ods.worksheet_range(&name)?,
        };
        let sheet = Sheet::from_range(file_name, &name, &range)?;
        if sheet.is_empty() {
            return Err(EmptySheet);
        }
        debug!(sheet = %name, rows = sheet.rows.len(), columns = sheet.width(), "sheet loaded");
        Ok(sheet)
    }
}
