//! Source readers shared by every sub-entity: spreadsheet tables and
//! MAT-file structs.
//!
//! Both expose their data column by column through `ColumnSource`, so a
//! sub-entity parses either format with the same code. Column lookups come
//! in three policies:
//!   - `required`: absent column is `MissingColumn`.
//!   - `optional`: absent column yields an empty vec.
//!   - `or_default`: absent column yields the caller's default.

pub mod mat;
pub mod sheet;

pub use mat::{MatFile, MatTable, MatValue};
pub use sheet::{Table, Workbook};

use crate::error::{EntityError, EntityResult};
use std::fmt::Display;

/// A named table whose columns can be read as `T`.
pub trait ColumnSource<T> {
    /// Sheet name or dotted struct path, used in errors.
    fn source_name(&self) -> &str;

    /// All values under `key`, or None if there is no such column.
    fn column(&self, key: &str) -> EntityResult<Option<Vec<T>>>;

    fn required(&self, key: &str) -> EntityResult<Vec<T>> {
        self.column(key)?.ok_or_else(|| EntityError::MissingColumn {
            sheet:  self.source_name().to_string(),
            column: key.to_string(),
        })
    }

    fn optional(&self, key: &str) -> EntityResult<Vec<T>> {
        Ok(self.column(key)?.unwrap_or_default())
    }

    fn or_default(&self, key: &str, default: impl FnOnce() -> Vec<T>) -> EntityResult<Vec<T>> {
        match self.column(key)? {
            Some(values) => Ok(values),
            None => {
                log::debug!("{}: '{key}' absent, default used", self.source_name());
                Ok(default())
            }
        }
    }

    /// First value under `key`, or `default` when there is none.
    fn first_or(&self, key: &str, default: T) -> EntityResult<T> {
        Ok(self
            .column(key)?
            .and_then(|values| values.into_iter().next())
            .unwrap_or(default))
    }
}

/// `MalformedMat` unless every `(key, len)` of `source` holds `n` rows.
/// Spreadsheet columns always share the sheet's row count, so only MAT
/// structs with arrays of unequal length fail here.
pub(crate) fn check_rows<K: Display>(source: &str, n: usize, what: &str, fields: &[(K, usize)]) -> EntityResult<()> {
    match fields.iter().find(|(_, len)| *len != n) {
        Some((key, len)) => Err(EntityError::MalformedMat {
            reason: format!("{source}.{key}: {len} values for {n} {what}"),
        }),
        None => Ok(()),
    }
}
