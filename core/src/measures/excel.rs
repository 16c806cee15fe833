use super::{parse_measures, Measures, MeasuresColumns};
use crate::{
    error::EntityResult,
    loader::{Diagnostic, Loader},
    source::{Table, Workbook},
    tag::Tag,
};
use std::path::Path;

pub const MEASURES_SHEET: &str = "measures";

#[derive(Debug, Clone, PartialEq)]
pub struct MeasuresExcel {
    measures: Measures,
    columns:  MeasuresColumns,
}

impl Default for MeasuresExcel {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasuresExcel {
    pub fn new() -> Self {
        Self::with_columns(MeasuresColumns::excel())
    }

    pub fn with_columns(columns: MeasuresColumns) -> Self {
        Self { measures: Measures::default(), columns }
    }

    pub fn as_inner(&self) -> &Measures {
        &self.measures
    }

    pub fn into_inner(self) -> Measures {
        self.measures
    }

    pub fn parse_table(&self, table: &Table) -> EntityResult<Measures> {
        parse_measures(table, &self.columns)
    }
}

impl Loader for MeasuresExcel {
    fn read(&mut self, file_name: &Path, description: Option<&str>) -> EntityResult<()> {
        let mut workbook = Workbook::open(file_name)?;
        let mut measures = self.parse_table(&workbook.table(MEASURES_SHEET)?)?;
        measures.tag = Tag::new(file_name, description);
        self.measures = measures;
        Ok(())
    }

    fn check(&self) -> EntityResult<Vec<Diagnostic>> {
        self.measures.check()
    }
}

impl From<MeasuresExcel> for Measures {
    fn from(reader: MeasuresExcel) -> Self {
        reader.measures
    }
}
