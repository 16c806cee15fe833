//! Yearly discount rates.

pub mod excel;
pub mod mat;

pub use excel::DiscountsExcel;
pub use mat::DiscountsMat;

use crate::{
    error::{EntityError, EntityResult},
    loader::{check_size, Diagnostic, Loader, SourceFormat},
    source::{check_rows, ColumnSource},
    tag::Tag,
};
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Discounts {
    pub tag:   Tag,
    pub years: Vec<i64>,
    /// Rate of the year at the same index.
    pub rates: Vec<f64>,
}

impl Discounts {
    pub fn new(years: Vec<i64>, rates: Vec<f64>) -> Self {
        Self { tag: Tag::default(), years, rates }
    }

    pub fn rate(&self, year: i64) -> Option<f64> {
        let idx = self.years.iter().position(|y| *y == year)?;
        self.rates.get(idx).copied()
    }

    /// Present value at `ini_year` of one value per year up to `end_year`
    /// inclusive, each year discounted at its own rate.
    pub fn net_present_value(&self, ini_year: i64, end_year: i64, values: &[f64]) -> EntityResult<f64> {
        let span = end_year
            .checked_sub(ini_year)
            .and_then(|d| d.checked_add(1))
            .ok_or_else(|| EntityError::InvalidData {
                field:  "net_present_value.end_year".into(),
                reason: format!("span {ini_year}..={end_year} is out of range"),
            })?;
        let span = usize::try_from(span).unwrap_or(0);
        check_size("net_present_value.values", span, values.len())?;
        let rates = (ini_year..=end_year)
            .map(|year| {
                self.rate(year).ok_or_else(|| EntityError::InvalidData {
                    field:  "Discounts.years".into(),
                    reason: format!("no discount rate for {year}"),
                })
            })
            .collect::<EntityResult<Vec<f64>>>()?;

        let Some((last, earlier)) = values.split_last() else {
            return Ok(0.0);
        };
        Ok(earlier
            .iter()
            .zip(&rates)
            .rev()
            .fold(*last, |npv, (value, rate)| value + npv / (1.0 + rate)))
    }
}

impl Loader for Discounts {
    fn read(&mut self, file_name: &Path, description: Option<&str>) -> EntityResult<()> {
        *self = match SourceFormat::from_path(file_name)? {
            SourceFormat::Spreadsheet => {
                let mut reader = DiscountsExcel::new();
                reader.read(file_name, description)?;
                reader.into_inner()
            }
            SourceFormat::MatTable => {
                let mut reader = DiscountsMat::new();
                reader.read(file_name, description)?;
                reader.into_inner()
            }
        };
        Ok(())
    }

    fn check(&self) -> EntityResult<Vec<Diagnostic>> {
        check_size("Discounts.rates", self.years.len(), self.rates.len())?;
        if self.years.is_empty() {
            return Ok(vec![Diagnostic::not_set("Discounts", "years")]);
        }
        let mut seen = HashSet::new();
        if let Some(year) = self.years.iter().find(|y| !seen.insert(**y)) {
            return Err(EntityError::DuplicateKey {
                entity: "Discounts",
                key:    year.to_string(),
            });
        }
        Ok(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscountsColumns {
    pub year: String,
    pub rate: String,
}

impl Default for DiscountsColumns {
    fn default() -> Self {
        Self { year: "year".into(), rate: "discount_rate".into() }
    }
}

pub(crate) fn parse_discounts<S>(src: &S, columns: &DiscountsColumns) -> EntityResult<Discounts>
where
    S: ColumnSource<f64> + ColumnSource<i64>,
{
    let years: Vec<i64> = src.required(&columns.year)?;
    let rates: Vec<f64> = src.required(&columns.rate)?;
    check_rows(ColumnSource::<f64>::source_name(src), years.len(), "years", &[(&columns.rate, rates.len())])?;
    Ok(Discounts::new(years, rates))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_rejects_short_rates() {
        let discounts = Discounts::new(vec![2020, 2021, 2022], vec![0.02, 0.02]);
        match discounts.check() {
            Err(EntityError::LengthMismatch { field, actual, expected }) => {
                assert_eq!(field, "Discounts.rates");
                assert_eq!((actual, expected), (2, 3));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn check_rejects_repeated_year() {
        let discounts = Discounts::new(vec![2020, 2021, 2020], vec![0.02; 3]);
        assert!(matches!(
            discounts.check(),
            Err(EntityError::DuplicateKey { ref key, .. }) if key == "2020"
        ));
    }

    #[test]
    fn empty_warns() {
        let warnings = Discounts::default().check().unwrap();
        assert_eq!(warnings[0].to_string(), "Discounts.years not set.");
    }

    #[test]
    fn npv_discounts_each_year() {
        let discounts = Discounts::new(vec![2000, 2001, 2002], vec![0.0, 0.25, 1.0]);
        // 1 + (2 + 4 / 1.25) / 1.0
        let npv = discounts.net_present_value(2000, 2002, &[1.0, 2.0, 4.0]).unwrap();
        assert!((npv - 6.2).abs() < 1e-12);
        assert_eq!(discounts.net_present_value(2001, 2001, &[3.0]).unwrap(), 3.0);
    }

    #[test]
    fn npv_rejects_span_beyond_i64() {
        let discounts = Discounts::new(vec![2000], vec![0.02]);
        assert!(matches!(
            discounts.net_present_value(i64::MIN, i64::MAX, &[1.0]),
            Err(EntityError::InvalidData { ref field, .. }) if field == "net_present_value.end_year"
        ));
        assert!(matches!(
            discounts.net_present_value(0, i64::MAX, &[]),
            Err(EntityError::InvalidData { .. })
        ));
    }

    #[test]
    fn npv_needs_a_rate_per_year_and_value() {
        let discounts = Discounts::new(vec![2000, 2001], vec![0.02; 2]);
        assert!(matches!(
            discounts.net_present_value(2000, 2002, &[1.0; 3]),
            Err(EntityError::InvalidData { .. })
        ));
        assert!(matches!(
            discounts.net_present_value(2000, 2001, &[1.0; 3]),
            Err(EntityError::LengthMismatch { .. })
        ));
    }
}
