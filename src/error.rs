use thiserror::Error;

/// Main error type for the asset sheet extension.
/// Aggregates errors from dependencies and the internal modules.
#[derive(Error, Debug)]
pub(crate) enum AssetSheetError {
    #[error("{0}")]
    WithContextError(String),

    // Third-party library errors
    #[error("Write workbook failed: {0}")]
    XlsxWriterError(#[from] rust_xlsxwriter::XlsxError),

    // Internal module errors
    #[error("{0}")]
    SpreadsheetError(#[from] crate::spreadsheet::SpreadsheetError),

    #[error("{0}")]
    InventoryError(#[from] crate::inventory::InventoryError),

    #[error("{0}")]
    ExtensionError(#[from] crate::extension::ExtensionError),
}

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, AssetSheetError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| AssetSheetError::WithContextError(format!("{}: {}", message, e)))
    }
}
