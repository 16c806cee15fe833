//! Exposures from a spreadsheet: sheet `assets`, one row per asset, plus
//! an optional `names` sheet carrying the reference year.

use super::{parse_assets, to_year, Exposures, ExposuresColumns};
use crate::{
    config,
    error::EntityResult,
    loader::{Diagnostic, Loader},
    source::{Table, Workbook},
    tag::Tag,
};
use std::path::Path;

pub const ASSETS_SHEET: &str = "assets";
pub const NAMES_SHEET: &str = "names";
const NAMES_KEY: &str = "name";
const NAMES_VALUE: &str = "Value";

/// Spreadsheet reader holding the exposures it read.
#[derive(Debug, Clone, PartialEq)]
pub struct ExposuresExcel {
    exposures: Exposures,
    columns:   ExposuresColumns,
}

impl Default for ExposuresExcel {
    fn default() -> Self {
        Self::new()
    }
}

impl ExposuresExcel {
    pub fn new() -> Self {
        Self::with_columns(ExposuresColumns::excel())
    }

    /// Reader with overridden column headers.
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

    /// Exposures from an `assets` table and an optional `names` table.
    /// `tag` is left empty.
    pub fn parse_tables(&self, assets: &Table, names: Option<&Table>) -> EntityResult<Exposures> {
        let mut exposures = parse_assets(assets, &self.columns)?;
        exposures.ref_year = self.parse_ref_year(names)?;
        Ok(exposures)
    }

    /// `reference_year` row of the `names` sheet, or the configured present
    /// year if the sheet or the row is absent.
    pub fn parse_ref_year(&self, names: Option<&Table>) -> EntityResult<i32> {
        let year = match names {
            Some(names) => names.lookup::<i64>(NAMES_KEY, &self.columns.ref_year, NAMES_VALUE)?,
            None => None,
        };
        match year {
            Some(year) => to_year("Exposures.ref_year", year),
            None => {
                let year = config::global().present_ref_year;
                log::debug!("No reference year in workbook, using {year}");
                Ok(year)
            }
        }
    }
}

impl Loader for ExposuresExcel {
    fn read(&mut self, file_name: &Path, description: Option<&str>) -> EntityResult<()> {
        let mut workbook = Workbook::open(file_name)?;
        let assets = workbook.table(ASSETS_SHEET)?;
        let names = workbook.optional_table(NAMES_SHEET)?;
        let mut exposures = self.parse_tables(&assets, names.as_ref())?;
        exposures.tag = Tag::new(file_name, description);
        self.exposures = exposures;
        Ok(())
    }

    fn check(&self) -> EntityResult<Vec<Diagnostic>> {
        self.exposures.check()
    }
}

impl From<ExposuresExcel> for Exposures {
    fn from(reader: ExposuresExcel) -> Self {
        reader.exposures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EntityError;
    use calamine::Data;

    fn assets(headers: &[&str]) -> Table {
        let rows = (0..3)
            .map(|i| {
                headers
                    .iter()
                    .map(|h| match *h {
                        "Value unit" if i == 0 => Data::String("EUR".into()),
                        "Value unit" => Data::Empty,
                        _ => Data::Float(i as f64 + 1.0),
                    })
                    .collect()
            })
            .collect();
        Table::new("assets", headers, rows)
    }

    #[test]
    fn minimal_sheet_fills_defaults() {
        let table = assets(&["Latitude", "Longitude", "Value", "DamageFunID"]);
        let expo = ExposuresExcel::new().parse_tables(&table, None).unwrap();
        assert_eq!(expo.id, vec![0, 1, 2]);
        assert_eq!(expo.cover, expo.value);
        assert_eq!(expo.deductible, vec![0.0; 3]);
        assert_eq!(expo.value_unit, "NA");
        assert_eq!(expo.ref_year, config::global().present_ref_year);
        assert!(expo.category_id.is_empty());
        assert_eq!(expo.coord[2], [3.0, 3.0]);
    }

    #[test]
    fn value_unit_is_first_non_blank() {
        let table = assets(&["Latitude", "Longitude", "Value", "DamageFunID", "Value unit"]);
        let expo = ExposuresExcel::new().parse_tables(&table, None).unwrap();
        assert_eq!(expo.value_unit, "EUR");
    }

    #[test]
    fn overridden_required_header_is_missing() {
        let mut columns = ExposuresColumns::excel();
        columns.value = "no valid value".into();
        let reader = ExposuresExcel::with_columns(columns);
        let table = assets(&["Latitude", "Longitude", "Value", "DamageFunID"]);
        match reader.parse_tables(&table, None) {
            Err(EntityError::MissingColumn { sheet, column }) => {
                assert_eq!(sheet, "assets");
                assert_eq!(column, "no valid value");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn ref_year_from_names_sheet() {
        let names = Table::new(
            "names",
            &["name", "Value"],
            vec![vec![Data::String("reference_year".into()), Data::Float(1999.0)]],
        );
        assert_eq!(ExposuresExcel::new().parse_ref_year(Some(&names)).unwrap(), 1999);
    }
}
