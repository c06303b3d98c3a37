//! # Result Set
//!
//! Every table function runs the whole pipeline during bind and keeps the output as a
//! [`ResultSet`]. The scan phase then streams that result set into DuckDB chunks.
use crate::spreadsheet::cell::{Cell, CellKind};
use calamine::Data;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use duckdb::{
    core::{DataChunkHandle, FlatVector, Inserter, LogicalTypeHandle},
    ffi::{duckdb_date, duckdb_timestamp},
    vtab::BindInfo,
};
use std::collections::HashMap;
use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Rows emitted per output chunk
const STEP: usize = 2048;

/// Typed columns and their rows, computed once at bind time.
#[repr(C)]
#[derive(Debug, Default)]
pub(crate) struct ResultSet {
    pub(crate) columns: Vec<(String, CellKind)>,
    pub(crate) rows: Vec<Vec<Cell>>,
}

/// Scan cursor over a result set.
#[repr(C)]
#[derive(Debug, Default)]
pub(crate) struct ResultSetInitData {
    /// Next row to emit
    row: AtomicUsize,
}

/// Makes names unique ignoring case, since DuckDB column names are case-insensitive.
pub(crate) fn unique_column_names<I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut unique = Vec::new();
    for name in names {
        let mut candidate = name.clone();
        let mut count = seen.get(&name.to_lowercase()).copied().unwrap_or(0);
        while seen.contains_key(&candidate.to_lowercase()) {
            count += 1;
            candidate = format!("{name}.{count}");
        }
        seen.insert(name.to_lowercase(), count);
        seen.insert(candidate.to_lowercase(), 0);
        unique.push(candidate);
    }
    unique
}

impl ResultSet {
    pub(crate) fn new(columns: Vec<(String, CellKind)>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends a row; values are matched to columns by position.
    pub(crate) fn push(&mut self, values: Vec<Data>) {
        let row = self.rows.len();
        self.rows.push(
            values
                .into_iter()
                .enumerate()
                .map(|(column, value)| Cell::new(row, column, value))
                .collect(),
        );
    }

    /// Registers the output columns with DuckDB.
    pub(crate) fn register(&self, bind: &BindInfo) {
        for (name, kind) in &self.columns {
            bind.add_result_column(name, LogicalTypeHandle::from(kind.to_logical_type_id()));
        }
    }

    /// Fills the next chunk of rows, or an empty chunk once every row was emitted.
    pub(crate) fn scan(&self, init: &ResultSetInitData, output: &mut DataChunkHandle) -> Result<(), Box<dyn Error>> {
        let row_lower_bound = init.row.fetch_add(STEP, Ordering::Relaxed);
        let row_upper_bound = self.rows.len().min(row_lower_bound + STEP);

        if row_lower_bound < row_upper_bound {
            output.set_len(row_upper_bound - row_lower_bound);
            for (index, (_, kind)) in self.columns.iter().enumerate() {
                let cells: Vec<Option<&Cell>> = self.rows[row_lower_bound..row_upper_bound]
                    .iter()
                    .map(|row| row.get(index))
                    .collect();
                let mut vector = output.flat_vector(index);
                populate(&mut vector, kind, &cells);
            }
        } else {
            output.set_len(0);
        }
        Ok(())
    }
}

/// Type alias for cell value extraction functions
type Getter<T> = fn(&Cell) -> Option<T>;

/// Type alias for DuckDB vector population functions
type Setter<T> = fn(&mut FlatVector, usize, T);

fn populate(vector: &mut FlatVector, kind: &CellKind, values: &[Option<&Cell>]) {
    match kind {
        CellKind::Varchar => populate_values(vector, values, Cell::get_varchar, string_setter),
        CellKind::Bool => populate_values(vector, values, Cell::get_bool, primitive_setter),
        CellKind::BigInt => populate_values(vector, values, Cell::get_bigint, primitive_setter),
        CellKind::Double => populate_values(vector, values, Cell::get_double, primitive_setter),
        CellKind::Date => populate_values(vector, values, Cell::get_date, date_setter),
        CellKind::DateTime => populate_values(vector, values, Cell::get_datetime, datetime_setter),
    }
}

/// Applies the getter to every cell and stores the result, NULL when there is no value.
fn populate_values<T>(vector: &mut FlatVector, values: &[Option<&Cell>], getter: Getter<T>, setter: Setter<T>) {
    for (index, option) in values.iter().enumerate() {
        match option.and_then(getter) {
            Some(value) => setter(vector, index, value),
            None => vector.set_null(index),
        }
    }
}

fn string_setter(vector: &mut FlatVector, index: usize, value: String) {
    vector.insert(index, value.as_str());
}

/// Sets a primitive value in a DuckDB vector using direct memory access.
fn primitive_setter<T>(vector: &mut FlatVector, index: usize, value: T) {
    let pointer: *mut T = unsafe { vector.as_mut_ptr() };
    unsafe {
        std::ptr::write(pointer.add(index), value);
    }
}

/// Stores microseconds since the Unix epoch.
fn datetime_setter(vector: &mut FlatVector, index: usize, value: NaiveDateTime) {
    let pointer: *mut duckdb_timestamp = unsafe { vector.as_mut_ptr() };
    unsafe {
        let pointer = pointer.add(index);
        (*pointer).micros = value.and_utc().timestamp_micros();
    }
}

/// Stores days since the Unix epoch.
fn date_setter(vector: &mut FlatVector, index: usize, value: NaiveDate) {
    let pointer: *mut duckdb_date = unsafe { vector.as_mut_ptr() };
    unsafe {
        let pointer = pointer.add(index);
        // Common Era days to Unix epoch days
        (*pointer).days = value.num_days_from_ce() - 719_163;
    }
}
