use super::{parse_funcs, ImpactFuncs, ImpactFuncsColumns};
use crate::{
    error::EntityResult,
    loader::{Diagnostic, Loader},
    source::{MatFile, MatTable},
    tag::Tag,
};
use std::path::Path;

pub const FUNCS_PATH: [&str; 2] = ["entity", "damagefunctions"];

/// Reads struct `entity.damagefunctions`, one array element per curve point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImpactFuncsMat {
    funcs:   ImpactFuncs,
    columns: ImpactFuncsColumns,
}

impl ImpactFuncsMat {
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

    pub fn parse_table(&self, table: &MatTable<'_>) -> EntityResult<ImpactFuncs> {
        parse_funcs(table, &self.columns)
    }
}

impl Loader for ImpactFuncsMat {
    fn read(&mut self, file_name: &Path, description: Option<&str>) -> EntityResult<()> {
        let mat = MatFile::open(file_name)?;
        let mut funcs = self.parse_table(&mat.table(&FUNCS_PATH)?)?;
        funcs.tag = Tag::new(file_name, description);
        self.funcs = funcs;
        Ok(())
    }

    fn check(&self) -> EntityResult<Vec<Diagnostic>> {
        self.funcs.check()
    }
}

impl From<ImpactFuncsMat> for ImpactFuncs {
    fn from(reader: ImpactFuncsMat) -> Self {
        reader.funcs
    }
}
