//! Exposures: one row per insurable asset.
//!
//! Field policies, shared by the spreadsheet and MAT readers:
//!   required        value, impact_id, latitude, longitude
//!   optional-empty  category_id, region_id, assigned
//!   optional-default cover (= value), deductible (= 0), value_unit ("NA"),
//!                    ref_year (configured present reference year)
//!
//! `id` is always the row index.

pub mod excel;
pub mod mat;

pub use excel::ExposuresExcel;
pub use mat::ExposuresMat;

use crate::{
    config,
    error::{EntityError, EntityResult},
    loader::{check_size, Diagnostic, Loader, SourceFormat},
    source::{check_rows, ColumnSource},
    tag::Tag,
};
use serde::Serialize;
use std::path::Path;

pub const DEFAULT_VALUE_UNIT: &str = "NA";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exposures {
    pub tag:         Tag,
    pub ref_year:    i32,
    pub value_unit:  String,
    pub id:          Vec<i64>,
    /// (latitude, longitude) per asset.
    pub coord:       Vec<[f64; 2]>,
    pub value:       Vec<f64>,
    pub deductible:  Vec<f64>,
    pub cover:       Vec<f64>,
    pub impact_id:   Vec<i64>,
    /// Empty when the source has no category column.
    pub category_id: Vec<i64>,
    /// Empty when the source has no region column.
    pub region_id:   Vec<i64>,
    /// Centroid assigned to each asset. Empty when not set.
    pub assigned:    Vec<i64>,
}

impl Default for Exposures {
    fn default() -> Self {
        Self {
            tag:         Tag::default(),
            ref_year:    config::global().present_ref_year,
            value_unit:  DEFAULT_VALUE_UNIT.to_string(),
            id:          Vec::new(),
            coord:       Vec::new(),
            value:       Vec::new(),
            deductible:  Vec::new(),
            cover:       Vec::new(),
            impact_id:   Vec::new(),
            category_id: Vec::new(),
            region_id:   Vec::new(),
            assigned:    Vec::new(),
        }
    }
}

/// Header (spreadsheet) or key (MAT) of every exposures field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExposuresColumns {
    pub latitude:    String,
    pub longitude:   String,
    pub value:       String,
    pub deductible:  String,
    pub cover:       String,
    pub impact_id:   String,
    pub category_id: String,
    pub region_id:   String,
    pub value_unit:  String,
    pub assigned:    String,
    pub ref_year:    String,
}

impl ExposuresColumns {
    pub fn excel() -> Self {
        Self {
            latitude:    "Latitude".into(),
            longitude:   "Longitude".into(),
            value:       "Value".into(),
            deductible:  "Deductible".into(),
            cover:       "Cover".into(),
            impact_id:   "DamageFunID".into(),
            category_id: "Category_ID".into(),
            region_id:   "Region_ID".into(),
            value_unit:  "Value unit".into(),
            assigned:    "centroid_index".into(),
            ref_year:    "reference_year".into(),
        }
    }

    pub fn mat() -> Self {
        Self {
            latitude:    "lat".into(),
            longitude:   "lon".into(),
            value_unit:  "Value_unit".into(),
            ..Self::excel()
        }
    }
}

impl Exposures {
    pub fn len(&self) -> usize {
        self.id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }

    /// Append the assets of `other` after the current ones. Appended ids
    /// continue the current sequence. An optional-empty field survives only
    /// if both sides have it.
    pub fn append(&mut self, other: &Exposures) {
        let offset = self.id.iter().max().map_or(0, |m| m + 1);
        let keep_optional = |mine: &mut Vec<i64>, theirs: &[i64], name: &str| {
            if mine.is_empty() != theirs.is_empty() {
                log::warn!("Exposures.{name} dropped: not set on both sides of append");
                mine.clear();
            } else {
                mine.extend_from_slice(theirs);
            }
        };
        if self.is_empty() {
            let tag = std::mem::take(&mut self.tag);
            *self = other.clone();
            self.tag = tag;
            self.tag.append(&other.tag);
            return;
        }
        keep_optional(&mut self.category_id, &other.category_id, "category_id");
        keep_optional(&mut self.region_id, &other.region_id, "region_id");
        keep_optional(&mut self.assigned, &other.assigned, "assigned");
        if self.ref_year != other.ref_year {
            log::warn!(
                "Appending exposures of reference year {} to {}; keeping {}",
                other.ref_year, self.ref_year, self.ref_year
            );
        }
        self.id.extend(other.id.iter().map(|id| id + offset));
        self.coord.extend_from_slice(&other.coord);
        self.value.extend_from_slice(&other.value);
        self.deductible.extend_from_slice(&other.deductible);
        self.cover.extend_from_slice(&other.cover);
        self.impact_id.extend_from_slice(&other.impact_id);
        self.tag.append(&other.tag);
    }
}

impl Loader for Exposures {
    /// Read with the default reader of the file's format.
    fn read(&mut self, file_name: &Path, description: Option<&str>) -> EntityResult<()> {
        *self = match SourceFormat::from_path(file_name)? {
            SourceFormat::Spreadsheet => {
                let mut reader = ExposuresExcel::new();
                reader.read(file_name, description)?;
                reader.into_inner()
            }
            SourceFormat::MatTable => {
                let mut reader = ExposuresMat::new();
                reader.read(file_name, description)?;
                reader.into_inner()
            }
        };
        Ok(())
    }

    fn check(&self) -> EntityResult<Vec<Diagnostic>> {
        let n = self.id.len();
        check_size("Exposures.coord", n, self.coord.len())?;
        check_size("Exposures.value", n, self.value.len())?;
        check_size("Exposures.deductible", n, self.deductible.len())?;
        check_size("Exposures.cover", n, self.cover.len())?;
        check_size("Exposures.impact_id", n, self.impact_id.len())?;

        let mut diagnostics = Vec::new();
        for (field, values) in [
            ("category_id", &self.category_id),
            ("region_id", &self.region_id),
            ("assigned", &self.assigned),
        ] {
            if values.is_empty() {
                diagnostics.push(Diagnostic::not_set("Exposures", field));
            } else {
                check_size(&format!("Exposures.{field}"), n, values.len())?;
            }
        }
        Ok(diagnostics)
    }
}

/// Populate everything but `tag` and `ref_year` from one asset table.
pub(crate) fn parse_assets<S>(src: &S, columns: &ExposuresColumns) -> EntityResult<Exposures>
where
    S: ColumnSource<f64> + ColumnSource<i64> + ColumnSource<String>,
{
    let value: Vec<f64> = src.required(&columns.value)?;
    let impact_id: Vec<i64> = src.required(&columns.impact_id)?;
    let latitude: Vec<f64> = src.required(&columns.latitude)?;
    let longitude: Vec<f64> = src.required(&columns.longitude)?;
    let n = value.len();

    let cover: Vec<f64> = src.or_default(&columns.cover, || value.clone())?;
    let deductible: Vec<f64> = src.or_default(&columns.deductible, || vec![0.0; n])?;
    let category_id: Vec<i64> = src.optional(&columns.category_id)?;
    let region_id: Vec<i64> = src.optional(&columns.region_id)?;
    let assigned: Vec<i64> = src.optional(&columns.assigned)?;
    let value_unit: String = src.first_or(&columns.value_unit, DEFAULT_VALUE_UNIT.to_string())?;

    let mut rows = vec![
        (columns.impact_id.as_str(), impact_id.len()),
        (columns.latitude.as_str(), latitude.len()),
        (columns.longitude.as_str(), longitude.len()),
        (columns.cover.as_str(), cover.len()),
        (columns.deductible.as_str(), deductible.len()),
    ];
    for (key, values) in [
        (&columns.category_id, &category_id),
        (&columns.region_id, &region_id),
        (&columns.assigned, &assigned),
    ] {
        if !values.is_empty() {
            rows.push((key.as_str(), values.len()));
        }
    }
    check_rows(ColumnSource::<f64>::source_name(src), n, "assets", &rows)?;

    Ok(Exposures {
        id: (0..n as i64).collect(),
        coord: latitude.into_iter().zip(longitude).map(|(lat, lon)| [lat, lon]).collect(),
        value,
        deductible,
        cover,
        impact_id,
        category_id,
        region_id,
        assigned,
        value_unit,
        ..Exposures::default()
    })
}

pub(crate) fn to_year(field: &str, year: i64) -> EntityResult<i32> {
    i32::try_from(year).map_err(|_| EntityError::InvalidData {
        field:  field.to_string(),
        reason: format!("{year} is not a valid year"),
    })
}
