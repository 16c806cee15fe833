//! Exposures from a MAT file: struct `entity.assets`, one array per field.

use super::{parse_assets, to_year, Exposures, ExposuresColumns};
use crate::{
    config,
    error::EntityResult,
    loader::{Diagnostic, Loader},
    source::{ColumnSource, MatFile, MatTable},
    tag::Tag,
};
use std::path::Path;

pub const ASSETS_PATH: [&str; 2] = ["entity", "assets"];

#[derive(Debug, Clone, PartialEq)]
pub struct ExposuresMat {
    exposures: Exposures,
    columns:   ExposuresColumns,
}

impl Default for ExposuresMat {
    fn default() -> Self {
        Self::new()
    }
}

impl ExposuresMat {
    pub fn new() -> Self {
        Self::with_columns(ExposuresColumns::mat())
    }

    pub fn with_columns(columns: ExposuresColumns) -> Self {
        Self { exposures: Exposures::default(), columns }
    }

    pub fn columns(&self) -> &ExposuresColumns {
        &self.columns
    }

    pub fn as_inner(&self) -> &Exposures {
        &self.exposures
    }

    pub fn into_inner(self) -> Exposures {
        self.exposures
    }

    /// Exposures from the assets struct. `tag` is left empty.
    pub fn parse_table(&self, assets: &MatTable<'_>) -> EntityResult<Exposures> {
        let mut exposures = parse_assets(assets, &self.columns)?;
        let default = i64::from(config::global().present_ref_year);
        let year: i64 = assets.first_or(&self.columns.ref_year, default)?;
        exposures.ref_year = to_year("Exposures.ref_year", year)?;
        Ok(exposures)
    }
}

impl Loader for ExposuresMat {
    fn read(&mut self, file_name: &Path, description: Option<&str>) -> EntityResult<()> {
        let mat = MatFile::open(file_name)?;
        let mut exposures = self.parse_table(&mat.table(&ASSETS_PATH)?)?;
        exposures.tag = Tag::new(file_name, description);
        self.exposures = exposures;
        Ok(())
    }

    fn check(&self) -> EntityResult<Vec<Diagnostic>> {
        self.exposures.check()
    }
}

impl From<ExposuresMat> for Exposures {
    fn from(reader: ExposuresMat) -> Self {
        reader.exposures
    }
}
