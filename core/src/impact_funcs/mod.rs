//! Impact functions: damage curves keyed by (hazard type, id).
//!
//! Source layout is one row per curve point. Rows sharing
//! (`peril_ID`, `DamageFunID`) form one function, points in row order.

pub mod excel;
pub mod mat;

pub use excel::ImpactFuncsExcel;
pub use mat::ImpactFuncsMat;

use crate::{
    error::{EntityError, EntityResult},
    loader::{check_size, Diagnostic, Loader, SourceFormat},
    source::{check_rows, ColumnSource},
    tag::Tag,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

pub const DEFAULT_INTENSITY_UNIT: &str = "NA";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImpactFunc {
    /// Peril id, e.g. "TC".
    pub haz_type:       String,
    pub id:             i64,
    pub name:           String,
    pub intensity_unit: String,
    pub intensity:      Vec<f64>,
    /// Mean damage degree per intensity point.
    pub mdd:            Vec<f64>,
    /// Percentage of affected assets per intensity point.
    pub paa:            Vec<f64>,
}

impl ImpactFunc {
    /// Mean damage ratio (mdd * paa) at `intensity`, linearly interpolated
    /// between points and held constant beyond the first and last one.
    pub fn calc_mdr(&self, intensity: f64) -> f64 {
        let mdr = |i: usize| self.mdd[i] * self.paa[i];
        let n = self.intensity.len().min(self.mdd.len()).min(self.paa.len());
        if n == 0 {
            return 0.0;
        }
        if intensity <= self.intensity[0] {
            return mdr(0);
        }
        if intensity >= self.intensity[n - 1] {
            return mdr(n - 1);
        }
        let hi = self.intensity[..n].partition_point(|x| *x <= intensity);
        let lo = hi - 1;
        let (x0, x1) = (self.intensity[lo], self.intensity[hi]);
        mdr(lo) + (mdr(hi) - mdr(lo)) * (intensity - x0) / (x1 - x0)
    }

    fn check(&self) -> EntityResult<()> {
        let n = self.intensity.len();
        check_size("ImpactFunc.mdd", n, self.mdd.len())?;
        check_size("ImpactFunc.paa", n, self.paa.len())?;
        if self.intensity.windows(2).any(|w| w[1] < w[0]) {
            return Err(EntityError::InvalidData {
                field:  "ImpactFunc.intensity".into(),
                reason: format!("function {} {} is not sorted by intensity", self.haz_type, self.id),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImpactFuncs {
    pub tag: Tag,
    data:    BTreeMap<String, BTreeMap<i64, ImpactFunc>>,
}

impl ImpactFuncs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `func`, replacing any function with the same hazard type and id.
    pub fn add_func(&mut self, func: ImpactFunc) {
        let by_id = self.data.entry(func.haz_type.clone()).or_default();
        if by_id.contains_key(&func.id) {
            log::warn!("Existing impact function {} {} overwritten", func.haz_type, func.id);
        }
        by_id.insert(func.id, func);
    }

    pub fn get_func(&self, haz_type: &str, id: i64) -> Option<&ImpactFunc> {
        self.data.get(haz_type)?.get(&id)
    }

    pub fn haz_types(&self) -> Vec<&str> {
        self.data.keys().map(String::as_str).collect()
    }

    /// Ids of the functions of one hazard type, ascending.
    pub fn ids(&self, haz_type: &str) -> Vec<i64> {
        self.data.get(haz_type).map(|by_id| by_id.keys().copied().collect()).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImpactFunc> {
        self.data.values().flat_map(BTreeMap::values)
    }

    pub fn len(&self) -> usize {
        self.data.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Loader for ImpactFuncs {
    fn read(&mut self, file_name: &Path, description: Option<&str>) -> EntityResult<()> {
        *self = match SourceFormat::from_path(file_name)? {
            SourceFormat::Spreadsheet => {
                let mut reader = ImpactFuncsExcel::new();
                reader.read(file_name, description)?;
                reader.into_inner()
            }
            SourceFormat::MatTable => {
                let mut reader = ImpactFuncsMat::new();
                reader.read(file_name, description)?;
                reader.into_inner()
            }
        };
        Ok(())
    }

    fn check(&self) -> EntityResult<Vec<Diagnostic>> {
        if self.is_empty() {
            return Ok(vec![Diagnostic::not_set("ImpactFuncs", "data")]);
        }
        for func in self.iter() {
            func.check()?;
        }
        Ok(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImpactFuncsColumns {
    pub id:             String,
    pub intensity:      String,
    pub mdd:            String,
    pub paa:            String,
    pub haz_type:       String,
    pub name:           String,
    pub intensity_unit: String,
}

impl Default for ImpactFuncsColumns {
    fn default() -> Self {
        Self {
            id:             "DamageFunID".into(),
            intensity:      "Intensity".into(),
            mdd:            "MDD".into(),
            paa:            "PAA".into(),
            haz_type:       "peril_ID".into(),
            name:           "name".into(),
            intensity_unit: "Intensity_unit".into(),
        }
    }
}

/// Group the point rows of `src` into functions. `tag` is left empty.
pub(crate) fn parse_funcs<S>(src: &S, columns: &ImpactFuncsColumns) -> EntityResult<ImpactFuncs>
where
    S: ColumnSource<f64> + ColumnSource<i64> + ColumnSource<String>,
{
    let ids: Vec<i64> = src.required(&columns.id)?;
    let intensity: Vec<f64> = src.required(&columns.intensity)?;
    let mdd: Vec<f64> = src.required(&columns.mdd)?;
    let paa: Vec<f64> = src.required(&columns.paa)?;
    let haz_types: Vec<String> = src.required(&columns.haz_type)?;
    let n = ids.len();
    let source = ColumnSource::<f64>::source_name(src);
    let names: Vec<String> = src.or_default(&columns.name, || vec![String::new(); n])?;
    let units: Vec<String> =
        src.or_default(&columns.intensity_unit, || vec![DEFAULT_INTENSITY_UNIT.to_string(); n])?;

    check_rows(source, n, "function points", &[
        (&columns.intensity, intensity.len()),
        (&columns.mdd, mdd.len()),
        (&columns.paa, paa.len()),
        (&columns.haz_type, haz_types.len()),
        (&columns.name, names.len()),
        (&columns.intensity_unit, units.len()),
    ])?;

    let mut funcs = ImpactFuncs::new();
    for row in 0..n {
        let by_id = funcs.data.entry(haz_types[row].clone()).or_default();
        let func = by_id.entry(ids[row]).or_insert_with(|| ImpactFunc {
            haz_type: haz_types[row].clone(),
            id: ids[row],
            name: names[row].clone(),
            intensity_unit: units[row].clone(),
            ..ImpactFunc::default()
        });
        func.intensity.push(intensity[row]);
        func.mdd.push(mdd[row]);
        func.paa.push(paa[row]);
    }
    log::debug!("{source}: {} impact functions", funcs.len());
    Ok(funcs)
}
