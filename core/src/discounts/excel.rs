use super::{parse_discounts, Discounts, DiscountsColumns};
use crate::{
    error::EntityResult,
    loader::{Diagnostic, Loader},
    source::{Table, Workbook},
    tag::Tag,
};
use std::path::Path;

pub const DISCOUNT_SHEET: &str = "discount";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscountsExcel {
    discounts: Discounts,
    columns:   DiscountsColumns,
}

impl DiscountsExcel {
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

    pub fn parse_table(&self, table: &Table) -> EntityResult<Discounts> {
        parse_discounts(table, &self.columns)
    }
}

impl Loader for DiscountsExcel {
    fn read(&mut self, file_name: &Path, description: Option<&str>) -> EntityResult<()> {
        let mut workbook = Workbook::open(file_name)?;
        let mut discounts = self.parse_table(&workbook.table(DISCOUNT_SHEET)?)?;
        discounts.tag = Tag::new(file_name, description);
        self.discounts = discounts;
        Ok(())
    }

    fn check(&self) -> EntityResult<Vec<Diagnostic>> {
        self.discounts.check()
    }
}

impl From<DiscountsExcel> for Discounts {
    fn from(reader: DiscountsExcel) -> Self {
        reader.discounts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EntityError;
    use calamine::Data;

    #[test]
    fn fractional_year_is_an_invalid_cell() {
        let table = Table::new(
            "discount",
            &["year", "discount_rate"],
            vec![
                vec![Data::Float(2000.0), Data::Float(0.02)],
                vec![Data::Float(2000.5), Data::Float(0.02)],
            ],
        );
        match DiscountsExcel::new().parse_table(&table) {
            Err(EntityError::InvalidCell { sheet, column, row, .. }) => {
                assert_eq!(sheet, "discount");
                assert_eq!(column, "year");
                assert_eq!(row, 3);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
