//! Spreadsheet sources.
//!
//! A `Workbook` is open only for the duration of one read. Each named sheet
//! is copied into a `Table`: the first used row holds the column headers,
//! every following row is one record.

use super::ColumnSource;
use crate::error::{EntityError, EntityResult};
use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Conversion of one cell into a typed value.
pub trait FromCell: Sized {
    /// Human-readable kind, used in error messages.
    const KIND: &'static str;

    fn from_cell(cell: &Data) -> Option<Self>;
}

impl FromCell for f64 {
    const KIND: &'static str = "a number";

    fn from_cell(cell: &Data) -> Option<Self> {
        match cell {
            Data::Float(v) => Some(*v),
            Data::Int(v) => Some(*v as f64),
            Data::Empty => Some(f64::NAN),
            _ => None,
        }
    }
}

impl FromCell for i64 {
    const KIND: &'static str = "an integer";

    fn from_cell(cell: &Data) -> Option<Self> {
        match cell {
            Data::Int(v) => Some(*v),
            Data::Float(v) if v.is_finite() && v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }
}

impl FromCell for String {
    const KIND: &'static str = "text";

    fn from_cell(cell: &Data) -> Option<Self> {
        match cell {
            Data::String(s) => Some(s.trim().to_string()),
            Data::Int(v) => Some(v.to_string()),
            Data::Float(v) => Some(v.to_string()),
            Data::Empty => Some(String::new()),
            _ => None,
        }
    }
}

pub struct Workbook {
    sheets: Sheets<BufReader<File>>,
}

impl Workbook {
    pub fn open(file_name: &Path) -> EntityResult<Self> {
        log::info!("Reading file: {}", file_name.display());
        Ok(Self { sheets: open_workbook_auto(file_name)? })
    }

    pub fn has_sheet(&self, name: &str) -> bool {
        self.sheets.sheet_names().iter().any(|s| s == name)
    }

    /// The named sheet. `MissingSheet` if the workbook has none.
    pub fn table(&mut self, name: &str) -> EntityResult<Table> {
        if !self.has_sheet(name) {
            return Err(EntityError::MissingSheet { sheet: name.to_string() });
        }
        log::info!("Reading sheet '{name}'");
        let range = self.sheets.worksheet_range(name)?;
        Ok(Table::from_range(name, &range))
    }

    /// The named sheet, or None if the workbook has none.
    pub fn optional_table(&mut self, name: &str) -> EntityResult<Option<Table>> {
        if !self.has_sheet(name) {
            return Ok(None);
        }
        self.table(name).map(Some)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name:    String,
    headers: Vec<String>,
    rows:    Vec<Vec<Data>>,
}

impl Table {
    /// Build a table from headers and rows. Short rows are padded with
    /// empty cells.
    pub fn new(name: &str, headers: &[&str], rows: Vec<Vec<Data>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width.max(row.len()), Data::Empty);
                row
            })
            .collect();
        Self {
            name:    name.to_string(),
            headers: headers.iter().map(|h| h.trim().to_string()).collect(),
            rows,
        }
    }

    pub fn from_range(name: &str, range: &Range<Data>) -> Self {
        let mut rows = range.rows();
        let headers = rows
            .next()
            .map(|row| row.iter().map(|c| c.to_string().trim().to_string()).collect())
            .unwrap_or_default();
        let mut rows: Vec<Vec<Data>> = rows.map(<[Data]>::to_vec).collect();
        while rows.last().is_some_and(|row| row.iter().all(|c| *c == Data::Empty)) {
            rows.pop();
        }
        Self { name: name.to_string(), headers, rows }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of records (rows below the header).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, header: &str) -> bool {
        self.column_index(header).is_some()
    }

    fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Value in column `value_header` of the first row whose `key_header`
    /// cell equals `key`.
    pub fn lookup<T: FromCell>(
        &self,
        key_header: &str,
        key: &str,
        value_header: &str,
    ) -> EntityResult<Option<T>> {
        let (Some(k), Some(v)) = (self.column_index(key_header), self.column_index(value_header))
        else {
            return Ok(None);
        };
        let found = self.rows.iter().enumerate().find(|(_, row)| {
            matches!(row.get(k), Some(Data::String(s)) if s.trim() == key)
        });
        match found {
            Some((i, row)) => self.cell(row, v, i, value_header).map(Some),
            None => Ok(None),
        }
    }

    fn cell<T: FromCell>(&self, row: &[Data], idx: usize, row_idx: usize, header: &str) -> EntityResult<T> {
        let cell = row.get(idx).unwrap_or(&Data::Empty);
        T::from_cell(cell).ok_or_else(|| EntityError::InvalidCell {
            sheet:  self.name.clone(),
            column: header.to_string(),
            // header is spreadsheet row 1
            row:    row_idx + 2,
            found:  format!("'{cell}', expected {}", T::KIND),
        })
    }
}

impl<T: FromCell> ColumnSource<T> for Table {
    fn source_name(&self) -> &str {
        &self.name
    }

    fn column(&self, header: &str) -> EntityResult<Option<Vec<T>>> {
        let Some(idx) = self.column_index(header) else {
            return Ok(None);
        };
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| self.cell(row, idx, i, header))
            .collect::<EntityResult<Vec<T>>>()
            .map(Some)
    }

    /// Blank cells are skipped.
    fn first_or(&self, header: &str, default: T) -> EntityResult<T> {
        let Some(idx) = self.column_index(header) else {
            return Ok(default);
        };
        match self
            .rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.get(idx).is_some_and(|c| *c != Data::Empty))
        {
            Some((i, row)) => self.cell(row, idx, i, header),
            None => Ok(default),
        }
    }
}
