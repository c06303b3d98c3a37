use calamine::Data;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use duckdb::core::LogicalTypeId;
use std::fmt::Display;

/// Date layouts accepted for free-text date cells, tried in order.
/// Month-first is tried before day-first, so `03/04/2026` reads as March 4th.
const DATE_FORMATS: [&str; 11] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d %b %Y",
    "%d-%b-%Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

/// Date-time layouts accepted for free-text cells; only the date part is kept.
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Output column types, inferred from the cells of a source column.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum CellKind {
    /// Boolean values (true/false)
    Bool,
    /// 64-bit signed integers
    BigInt,
    /// Double precision floating point numbers
    Double,
    /// Variable-length character strings
    Varchar,
    /// Date-only values
    Date,
    /// Date and time values
    DateTime,
}

impl CellKind {
    /// Returns the SQL name of the kind.
    pub(crate) const fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "boolean",
            Self::BigInt => "bigint",
            Self::Double => "double",
            Self::Varchar => "varchar",
            Self::Date => "date",
            Self::DateTime => "timestamp",
        }
    }

    /// Converts the cell kind to the corresponding DuckDB logical type ID.
    pub(crate) const fn to_logical_type_id(&self) -> LogicalTypeId {
        match self {
            Self::Bool => LogicalTypeId::Boolean,
            Self::BigInt => LogicalTypeId::Bigint,
            Self::Double => LogicalTypeId::Double,
            Self::Varchar => LogicalTypeId::Varchar,
            Self::Date => LogicalTypeId::Date,
            Self::DateTime => LogicalTypeId::Timestamp,
        }
    }

    /// Infers the most specific kind shared by every non-empty cell.
    ///
    /// Priority, most to least specific: Bool, BigInt, Double, Date, DateTime.
    /// Mixed or textual columns, and columns without any value, fall back to Varchar.
    pub(crate) fn infer<'a, I>(cells: I) -> Self
    where
        I: IntoIterator<Item = &'a Cell>,
    {
        let cells: Vec<&Cell> = cells.into_iter().filter(|cell| !cell.is_blank()).collect();
        if cells.is_empty() {
            Self::Varchar
        } else if cells.iter().all(|cell| cell.is_bool()) {
            Self::Bool
        } else if cells.iter().all(|cell| cell.is_bigint()) {
            Self::BigInt
        } else if cells.iter().all(|cell| cell.is_double()) {
            Self::Double
        } else if cells.iter().all(|cell| cell.is_date()) {
            Self::Date
        } else if cells.iter().all(|cell| cell.is_datetime()) {
            Self::DateTime
        } else {
            Self::Varchar
        }
    }
}

/// Convert 0-based row & column indexes to an Excel-style cell position (e.g. "B3").
pub(crate) fn cell_position(row: usize, column: usize) -> String {
    let mut column = column + 1;
    let mut position = String::new();
    while column > 0 {
        column -= 1;
        position.insert(0, (b'A' + (column % 26) as u8) as char);
        column /= 26;
    }
    position.push_str((row + 1).to_string().as_str());
    position
}

/// Renders a cell value the way it is shown in the report and written on export.
///
/// Returns `None` for empty and error cells.
pub(crate) fn display_text(value: &Data) -> Option<String> {
    match value {
        Data::Empty | Data::Error(_) => None,
        Data::String(value) => Some(value.to_owned()),
        Data::Int(value) => Some(value.to_string()),
        Data::Float(value) => Some(value.to_string()),
        Data::Bool(value) => Some(value.to_string()),
        Data::DateTime(value) if value.is_duration() => Some(value.as_f64().to_string()),
        Data::DateTime(value) => value.as_datetime().map(|datetime| {
            if datetime.time() == NaiveTime::MIN {
                datetime.format("%Y-%m-%d").to_string()
            } else {
                datetime.format("%Y-%m-%d %H:%M:%S").to_string()
            }
        }),
        Data::DateTimeIso(value) => Some(value.replace('T', " ")),
        Data::DurationIso(value) => Some(value.to_owned()),
    }
}

/// Parses a free-text date, accepting the layouts in `DATE_FORMATS` and `DATETIME_FORMATS`.
pub(crate) fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
                .map(|datetime| datetime.date())
        })
}

/// A single spreadsheet cell with its absolute position.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Cell {
    /// Row index (0-based)
    pub(crate) row: usize,
    /// Column index (0-based)
    pub(crate) column: usize,
    /// The cell data as read by calamine
    pub(crate) value: Data,
}

impl Cell {
    pub(crate) fn new(row: usize, column: usize, value: Data) -> Self {
        Self { row, column, value }
    }

    /// Excel-style cell position.
    pub(crate) fn position(&self) -> String {
        cell_position(self.row, self.column)
    }

    /// True for empty cells, error cells and whitespace-only strings.
    pub(crate) fn is_blank(&self) -> bool {
        match &self.value {
            Data::Empty | Data::Error(_) => true,
            Data::String(value) => value.trim().is_empty(),
            _ => false,
        }
    }

    pub(crate) fn is_bool(&self) -> bool {
        matches!(self.value, Data::Bool(_))
    }

    pub(crate) fn get_bool(&self) -> Option<bool> {
        match self.value {
            Data::Bool(value) => Some(value),
            _ => None,
        }
    }

    /// Integers, including floats with no fractional part.
    pub(crate) fn is_bigint(&self) -> bool {
        match self.value {
            Data::Int(_) => true,
            Data::Float(value) => value.fract() == 0.0,
            _ => false,
        }
    }

    pub(crate) fn get_bigint(&self) -> Option<i64> {
        match self.value {
            Data::Int(value) => Some(value),
            Data::Float(value) => Some(value as i64),
            _ => None,
        }
    }

    pub(crate) fn is_double(&self) -> bool {
        matches!(self.value, Data::Int(_) | Data::Float(_))
    }

    pub(crate) fn get_double(&self) -> Option<f64> {
        match self.value {
            Data::Int(value) => Some(value as f64),
            Data::Float(value) => Some(value),
            _ => None,
        }
    }

    /// String representation of the value, `None` for empty and error cells.
    pub(crate) fn get_varchar(&self) -> Option<String> {
        display_text(&self.value)
    }

    /// Display text, trimmed; empty string when the cell holds nothing.
    pub(crate) fn text(&self) -> String {
        self.get_varchar()
            .map(|text| text.trim().to_owned())
            .unwrap_or_default()
    }

    /// Typed date-time cells (Excel serial dates or ISO strings from ODS).
    pub(crate) fn get_datetime(&self) -> Option<NaiveDateTime> {
        match &self.value {
            Data::DateTime(value) if !value.is_duration() => value.as_datetime(),
            Data::DateTimeIso(value) => NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .or_else(|| {
                    NaiveDate::parse_from_str(value, "%Y-%m-%d")
                        .ok()
                        .map(|date| date.and_time(NaiveTime::MIN))
                }),
            _ => None,
        }
    }

    pub(crate) fn is_datetime(&self) -> bool {
        self.get_datetime().is_some()
    }

    /// Date-time cells whose time part is midnight.
    pub(crate) fn is_date(&self) -> bool {
        self.get_datetime()
            .map(|datetime| datetime.time() == NaiveTime::MIN)
            .unwrap_or(false)
    }

    pub(crate) fn get_date(&self) -> Option<NaiveDate> {
        self.get_datetime().map(|datetime| datetime.date())
    }

    /// Lenient date: a typed date cell, or a string in one of the accepted layouts.
    pub(crate) fn parse_date(&self) -> Option<NaiveDate> {
        match &self.value {
            Data::String(value) => parse_date_text(value),
            _ => self.get_date(),
        }
    }

    /// Lenient year: integers, whole or fractional numbers, numeric strings, or a date's year.
    pub(crate) fn parse_year(&self) -> Option<i32> {
        match &self.value {
            Data::Int(value) => i32::try_from(*value).ok(),
            Data::Float(value) if value.is_finite() => Some(value.trunc() as i32),
            Data::String(value) => {
                let value = value.trim();
                value.parse::<i32>().ok().or_else(|| {
                    value
                        .parse::<f64>()
                        .ok()
                        .filter(|year| year.is_finite())
                        .map(|year| year.trunc() as i32)
                })
            }
            _ => self.get_date().map(|date| date.year()),
        }
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.get_varchar().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(value: Data) -> Cell {
        Cell::new(0, 0, value)
    }

    #[test]
    fn position_uses_excel_letters() {
        assert_eq!(cell_position(0, 0), "A1");
        assert_eq!(cell_position(2, 25), "Z3");
        assert_eq!(cell_position(9, 26), "AA10");
        assert_eq!(cell_position(0, 51), "AZ1");
    }

    #[test]
    fn blank_cells() {
        assert!(cell(Data::Empty).is_blank());
        assert!(cell(Data::String("   ".to_owned())).is_blank());
        assert!(!cell(Data::String(" x ".to_owned())).is_blank());
        assert!(!cell(Data::Int(0)).is_blank());
    }

    #[test]
    fn text_is_trimmed_display() {
        assert_eq!(cell(Data::String("  IT ".to_owned())).text(), "IT");
        assert_eq!(cell(Data::Float(2020.0)).text(), "2020");
        assert_eq!(cell(Data::Float(1.5)).text(), "1.5");
        assert_eq!(cell(Data::Bool(true)).text(), "true");
        assert_eq!(cell(Data::Empty).text(), "");
    }

    #[test]
    fn parse_date_text_layouts() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        assert_eq!(parse_date_text("2026-03-15"), Some(date));
        assert_eq!(parse_date_text("2026/03/15"), Some(date));
        assert_eq!(parse_date_text("03/15/2026"), Some(date));
        assert_eq!(parse_date_text("15/03/2026"), Some(date));
        assert_eq!(parse_date_text("15.03.2026"), Some(date));
        assert_eq!(parse_date_text("15 Mar 2026"), Some(date));
        assert_eq!(parse_date_text("March 15, 2026"), Some(date));
        assert_eq!(parse_date_text("2026-03-15 10:30:00"), Some(date));
        assert_eq!(parse_date_text("not a date"), None);
        assert_eq!(parse_date_text(""), None);
    }

    #[test]
    fn parse_year_variants() {
        assert_eq!(cell(Data::Int(2020)).parse_year(), Some(2020));
        assert_eq!(cell(Data::Float(2019.0)).parse_year(), Some(2019));
        assert_eq!(cell(Data::String(" 2021 ".to_owned())).parse_year(), Some(2021));
        assert_eq!(cell(Data::String("2018.0".to_owned())).parse_year(), Some(2018));
        assert_eq!(cell(Data::String("N/A".to_owned())).parse_year(), None);
        assert_eq!(cell(Data::Empty).parse_year(), None);
    }

    #[test]
    fn parse_date_prefers_typed_iso_cells() {
        let iso = cell(Data::DateTimeIso("2027-01-31T00:00:00".to_owned()));
        assert_eq!(iso.parse_date(), NaiveDate::from_ymd_opt(2027, 1, 31));
        assert!(iso.is_date());
        assert_eq!(cell(Data::Int(45000)).parse_date(), None);
    }

    #[test]
    fn infer_kinds() {
        let ints = [cell(Data::Int(1)), cell(Data::Float(2.0)), cell(Data::Empty)];
        assert_eq!(CellKind::infer(ints.iter()), CellKind::BigInt);

        let doubles = [cell(Data::Int(1)), cell(Data::Float(2.5))];
        assert_eq!(CellKind::infer(doubles.iter()), CellKind::Double);

        let mixed = [cell(Data::Int(1)), cell(Data::String("x".to_owned()))];
        assert_eq!(CellKind::infer(mixed.iter()), CellKind::Varchar);

        let bools = [cell(Data::Bool(true)), cell(Data::Bool(false))];
        assert_eq!(CellKind::infer(bools.iter()), CellKind::Bool);

        let empty: [Cell; 0] = [];
        assert_eq!(CellKind::infer(empty.iter()), CellKind::Varchar);
    }
}
