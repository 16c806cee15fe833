use super::{parse_discounts, Discounts, DiscountsColumns};
use crate::{
    error::EntityResult,
    loader::{Diagnostic, Loader},
    source::{MatFile, MatTable},
    tag::Tag,
};
use std::path::Path;

pub const DISCOUNT_PATH: [&str; 2] = ["entity", "discount"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscountsMat {
    discounts: Discounts,
    columns:   DiscountsColumns,
}

impl DiscountsMat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_columns(columns: DiscountsColumns) -> Self {
        Self { discounts: Discounts::default(), columns }
    }

    pub fn as_inner(&self) -> &Discounts {
        &self.discounts
    }

    pub fn into_inner(self) -> Discounts {
        self.discounts
    }

    pub fn parse_table(&self, table: &MatTable<'_>) -> EntityResult<Discounts> {
        parse_discounts(table, &self.columns)
    }
}

impl Loader for DiscountsMat {
    fn read(&mut self, file_name: &Path, description: Option<&str>) -> EntityResult<()> {
        let mat = MatFile::open(file_name)?;
        let mut discounts = self.parse_table(&mat.table(&DISCOUNT_PATH)?)?;
        discounts.tag = Tag::new(file_name, description);
        self.discounts = discounts;
        Ok(())
    }

    fn check(&self) -> EntityResult<Vec<Diagnostic>> {
        self.discounts.check()
    }
}

impl From<DiscountsMat> for Discounts {
    fn from(reader: DiscountsMat) -> Self {
        reader.discounts
    }
}
