//! Loader trait and source format dispatch.
//!
//! RULE: Every sub-entity and the Entity itself implement Loader.
//! read() fully replaces the receiver's data; check() never mutates it.
//! A failed load() leaves the receiver in an unspecified state.

use crate::error::{EntityError, EntityResult};
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// The contract every loadable dataset must fulfill.
pub trait Loader {
    /// Populate from `file_name`, replacing any previously held data.
    fn read(&mut self, file_name: &Path, description: Option<&str>) -> EntityResult<()>;

    /// Validate the held data.
    ///
    /// Hard violations are returned as errors. Soft ones are returned as
    /// diagnostics, in the order they were found.
    fn check(&self) -> EntityResult<Vec<Diagnostic>>;

    /// read() then check().
    fn load(&mut self, file_name: &Path, description: Option<&str>) -> EntityResult<Vec<Diagnostic>> {
        self.read(file_name, description)?;
        self.check()
    }
}

/// A non-fatal finding of a check pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Qualified field name, e.g. `Exposures.assigned`.
    pub field:   String,
    pub message: String,
}

impl Diagnostic {
    /// Warning for an optional field the source left out.
    pub fn not_set(entity: &str, field: &str) -> Self {
        let field = format!("{entity}.{field}");
        let message = format!("{field} not set.");
        log::warn!("{message}");
        Self { field, message }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Reader family selected from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// `.xls` / `.xlsx` workbooks with named sheets.
    Spreadsheet,
    /// MAT level-5 files holding an `entity` struct.
    MatTable,
}

impl SourceFormat {
    pub fn from_path(file_name: &Path) -> EntityResult<Self> {
        let extension = file_name
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        match extension {
            "mat" => Ok(SourceFormat::MatTable),
            "xls" | "xlsx" => Ok(SourceFormat::Spreadsheet),
            other => Err(EntityError::UnsupportedFormat {
                extension: format!(".{other}"),
            }),
        }
    }
}

/// Length rule shared by the check passes.
pub(crate) fn check_size(field: &str, expected: usize, actual: usize) -> EntityResult<()> {
    if expected != actual {
        return Err(EntityError::LengthMismatch {
            field: field.to_string(),
            actual,
            expected,
        });
    }
    Ok(())
}
