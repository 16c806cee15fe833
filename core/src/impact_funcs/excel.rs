use super::{parse_funcs, ImpactFuncs, ImpactFuncsColumns};
use crate::{
    error::EntityResult,
    loader::{Diagnostic, Loader},
    source::{Table, Workbook},
    tag::Tag,
};
use std::path::Path;

pub const FUNCS_SHEET: &str = "damagefunctions";

/// Reads sheet `damagefunctions`, one row per curve point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImpactFuncsExcel {
    funcs:   ImpactFuncs,
    columns: ImpactFuncsColumns,
}

impl ImpactFuncsExcel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_columns(columns: ImpactFuncsColumns) -> Self {
        Self { funcs: ImpactFuncs::default(), columns }
    }

    pub fn as_inner(&self) -> &ImpactFuncs {
        &self.funcs
    }

    pub fn into_inner(self) -> ImpactFuncs {
        self.funcs
    }

    pub fn parse_table(&self, table: &Table) -> EntityResult<ImpactFuncs> {
        parse_funcs(table, &self.columns)
    }
}

impl Loader for ImpactFuncsExcel {
    fn read(&mut self, file_name: &Path, description: Option<&str>) -> EntityResult<()> {
        let mut workbook = Workbook::open(file_name)?;
        let mut funcs = self.parse_table(&workbook.table(FUNCS_SHEET)?)?;
        funcs.tag = Tag::new(file_name, description);
        self.funcs = funcs;
        Ok(())
    }

    fn check(&self) -> EntityResult<Vec<Diagnostic>> {
        self.funcs.check()
    }
}

impl From<ImpactFuncsExcel> for ImpactFuncs {
    fn from(reader: ImpactFuncsExcel) -> Self {
        reader.funcs
    }
}
