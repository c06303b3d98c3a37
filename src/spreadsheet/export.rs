use crate::spreadsheet::cell::display_text;
use calamine::Data;
use rust_xlsxwriter::{ColNum, Format, RowNum, Workbook, XlsxError};
use std::path::Path;
use tracing::info;

/// Writes a single-sheet xlsx workbook with a bold header row.
///
/// Numbers and booleans keep their type, dates are written as their display text,
/// and empty or error values leave the cell blank. Returns the number of data rows written.
pub(crate) fn write_workbook<P>(
    path: P,
    sheet_name: &str,
    headers: &[String],
    rows: &[Vec<Data>],
) -> Result<usize, XlsxError>
where
    P: AsRef<Path>,
{
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    for (column, header) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, column as ColNum, header.as_str(), &bold)?;
    }

    for (index, row) in rows.iter().enumerate() {
        let row_number = (index + 1) as RowNum;
        for (column, value) in row.iter().enumerate() {
            let column = column as ColNum;
            match value {
                Data::Int(value) => {
                    worksheet.write_number(row_number, column, *value as f64)?;
                }
                Data::Float(value) => {
                    worksheet.write_number(row_number, column, *value)?;
                }
                Data::Bool(value) => {
                    worksheet.write_boolean(row_number, column, *value)?;
                }
                Data::Empty | Data::Error(_) => {}
                other => {
                    if let Some(text) = display_text(other) {
                        worksheet.write_string(row_number, column, text.as_str())?;
                    }
                }
            }
        }
    }

    workbook.save(path.as_ref())?;
    info!(path = %path.as_ref().display(), rows = rows.len(), "workbook written");
    Ok(rows.len())
}
