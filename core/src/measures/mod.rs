//! Adaptation measures, one record per measure, kept in source order.

pub mod excel;
pub mod mat;

pub use excel::MeasuresExcel;
pub use mat::MeasuresMat;

use crate::{
    error::{EntityError, EntityResult},
    loader::{Diagnostic, Loader, SourceFormat},
    source::{check_rows, ColumnSource},
    tag::Tag,
};
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

pub const DEFAULT_EVENT_SET: &str = "NA";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Measure {
    pub name:               String,
    pub color_rgb:          [f64; 3],
    pub cost:               f64,
    pub hazard_freq_cutoff: f64,
    pub hazard_event_set:   String,
    /// (a, b) applied to hazard intensity as `a * x + b`.
    pub hazard_inten_imp:   (f64, f64),
    pub mdd_impact:         (f64, f64),
    pub paa_impact:         (f64, f64),
    pub risk_transf_attach: f64,
    pub risk_transf_cover:  f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Measures {
    pub tag: Tag,
    data:    Vec<Measure>,
}

impl Measures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `measure`, or replace the one with the same name in place.
    pub fn add_measure(&mut self, measure: Measure) {
        match self.data.iter_mut().find(|m| m.name == measure.name) {
            Some(existing) => {
                log::warn!("Existing measure {} overwritten", measure.name);
                *existing = measure;
            }
            None => self.data.push(measure),
        }
    }

    pub fn get_measure(&self, name: &str) -> Option<&Measure> {
        self.data.iter().find(|m| m.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.data.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Measure> {
        self.data.iter()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Loader for Measures {
    fn read(&mut self, file_name: &Path, description: Option<&str>) -> EntityResult<()> {
        *self = match SourceFormat::from_path(file_name)? {
            SourceFormat::Spreadsheet => {
                let mut reader = MeasuresExcel::new();
                reader.read(file_name, description)?;
                reader.into_inner()
            }
            SourceFormat::MatTable => {
                let mut reader = MeasuresMat::new();
                reader.read(file_name, description)?;
                reader.into_inner()
            }
        };
        Ok(())
    }

    fn check(&self) -> EntityResult<Vec<Diagnostic>> {
        if self.is_empty() {
            return Ok(vec![Diagnostic::not_set("Measures", "data")]);
        }
        let mut seen = HashSet::new();
        for measure in &self.data {
            if !seen.insert(measure.name.as_str()) {
                return Err(EntityError::DuplicateKey {
                    entity: "Measures",
                    key:    measure.name.clone(),
                });
            }
            if measure.color_rgb.iter().any(|c| !(0.0..=1.0).contains(c)) {
                return Err(EntityError::InvalidData {
                    field:  "Measure.color_rgb".into(),
                    reason: format!("{}: {:?} outside [0, 1]", measure.name, measure.color_rgb),
                });
            }
        }
        Ok(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasuresColumns {
    pub name:             String,
    pub color:            String,
    pub cost:             String,
    pub hazard_inten_a:   String,
    pub hazard_inten_b:   String,
    pub hazard_freq_cut:  String,
    pub hazard_event_set: String,
    pub mdd_a:            String,
    pub mdd_b:            String,
    pub paa_a:            String,
    pub paa_b:            String,
    pub risk_att:         String,
    pub risk_cov:         String,
}

impl MeasuresColumns {
    pub fn excel() -> Self {
        Self {
            name:             "name".into(),
            color:            "color".into(),
            cost:             "cost".into(),
            hazard_inten_a:   "hazard intensity impact a".into(),
            hazard_inten_b:   "hazard intensity impact b".into(),
            hazard_freq_cut:  "hazard high frequency cutoff".into(),
            hazard_event_set: "hazard event set".into(),
            mdd_a:            "MDD impact a".into(),
            mdd_b:            "MDD impact b".into(),
            paa_a:            "PAA impact a".into(),
            paa_b:            "PAA impact b".into(),
            risk_att:         "risk transfer attachement".into(),
            risk_cov:         "risk transfer cover".into(),
        }
    }

    /// Spreadsheet headers with blanks as underscores.
    pub fn mat() -> Self {
        let excel = Self::excel();
        let key = |header: &str| header.replace(' ', "_");
        Self {
            name:             key(&excel.name),
            color:            key(&excel.color),
            cost:             key(&excel.cost),
            hazard_inten_a:   key(&excel.hazard_inten_a),
            hazard_inten_b:   key(&excel.hazard_inten_b),
            hazard_freq_cut:  key(&excel.hazard_freq_cut),
            hazard_event_set: key(&excel.hazard_event_set),
            mdd_a:            key(&excel.mdd_a),
            mdd_b:            key(&excel.mdd_b),
            paa_a:            key(&excel.paa_a),
            paa_b:            key(&excel.paa_b),
            risk_att:         key(&excel.risk_att),
            risk_cov:         key(&excel.risk_cov),
        }
    }
}

/// "r g b" as three floats.
fn parse_color(source: &str, text: &str) -> EntityResult<[f64; 3]> {
    let invalid = || EntityError::InvalidData {
        field:  "Measure.color_rgb".into(),
        reason: format!("{source}: '{text}' is not an RGB triplet"),
    };
    let parts = text
        .split_whitespace()
        .map(str::parse::<f64>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| invalid())?;
    <[f64; 3]>::try_from(parts).map_err(|_| invalid())
}

/// One measure per record of `src`. `tag` is left empty.
pub(crate) fn parse_measures<S>(src: &S, columns: &MeasuresColumns) -> EntityResult<Measures>
where
    S: ColumnSource<f64> + ColumnSource<String>,
{
    let names: Vec<String> = src.required(&columns.name)?;
    let colors: Vec<String> = src.required(&columns.color)?;
    let cost: Vec<f64> = src.required(&columns.cost)?;
    let inten_a: Vec<f64> = src.required(&columns.hazard_inten_a)?;
    let inten_b: Vec<f64> = src.required(&columns.hazard_inten_b)?;
    let mdd_a: Vec<f64> = src.required(&columns.mdd_a)?;
    let mdd_b: Vec<f64> = src.required(&columns.mdd_b)?;
    let paa_a: Vec<f64> = src.required(&columns.paa_a)?;
    let paa_b: Vec<f64> = src.required(&columns.paa_b)?;
    let n = names.len();
    let freq_cut: Vec<f64> = src.or_default(&columns.hazard_freq_cut, || vec![0.0; n])?;
    let event_set: Vec<String> =
        src.or_default(&columns.hazard_event_set, || vec![DEFAULT_EVENT_SET.to_string(); n])?;
    let risk_att: Vec<f64> = src.or_default(&columns.risk_att, || vec![0.0; n])?;
    let risk_cov: Vec<f64> = src.or_default(&columns.risk_cov, || vec![0.0; n])?;

    let source = ColumnSource::<f64>::source_name(src);
    check_rows(source, n, "measures", &[
        (&columns.color, colors.len()),
        (&columns.cost, cost.len()),
        (&columns.hazard_inten_a, inten_a.len()),
        (&columns.hazard_inten_b, inten_b.len()),
        (&columns.mdd_a, mdd_a.len()),
        (&columns.mdd_b, mdd_b.len()),
        (&columns.paa_a, paa_a.len()),
        (&columns.paa_b, paa_b.len()),
        (&columns.hazard_freq_cut, freq_cut.len()),
        (&columns.hazard_event_set, event_set.len()),
        (&columns.risk_att, risk_att.len()),
        (&columns.risk_cov, risk_cov.len()),
    ])?;

    let mut measures = Measures::new();
    for (i, (name, (color, event_set))) in names.into_iter().zip(colors.iter().zip(event_set)).enumerate() {
        measures.data.push(Measure {
            color_rgb:          parse_color(source, color)?,
            cost:               cost[i],
            hazard_freq_cutoff: freq_cut[i],
            hazard_event_set:   event_set,
            hazard_inten_imp:   (inten_a[i], inten_b[i]),
            mdd_impact:         (mdd_a[i], mdd_b[i]),
            paa_impact:         (paa_a[i], paa_b[i]),
            risk_transf_attach: risk_att[i],
            risk_transf_cover:  risk_cov[i],
            name,
        });
    }
    log::debug!("{source}: {} measures", measures.len());
    Ok(measures)
}
