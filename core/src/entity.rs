//! The entity aggregate: one of each sub-entity, loaded together from a
//! single source or assigned one by one.

use crate::{
    config,
    discounts::{Discounts, DiscountsExcel, DiscountsMat},
    error::{EntityError, EntityResult},
    exposures::{Exposures, ExposuresExcel, ExposuresMat},
    impact_funcs::{ImpactFuncs, ImpactFuncsExcel, ImpactFuncsMat},
    loader::{Diagnostic, Loader, SourceFormat},
    measures::{Measures, MeasuresExcel, MeasuresMat},
    tag::Tag,
};
use std::any::Any;
use std::path::Path;

/// Target of a dynamic assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubEntity {
    Exposures,
    ImpactFuncs,
    Measures,
    Discounts,
}

impl SubEntity {
    pub fn type_name(self) -> &'static str {
        match self {
            SubEntity::Exposures => "Exposures",
            SubEntity::ImpactFuncs => "ImpactFuncs",
            SubEntity::Measures => "Measures",
            SubEntity::Discounts => "Discounts",
        }
    }
}

/// `Default` is an entity with every sub-entity empty. `Entity::new()`
/// loads the configured default source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entity {
    exposures:    Exposures,
    impact_funcs: ImpactFuncs,
    measures:     Measures,
    discounts:    Discounts,
}

impl Entity {
    pub fn new() -> EntityResult<Self> {
        let file_name = config::global().paths.entity_default.clone();
        Self::from_file(&file_name, None)
    }

    /// Load and check every sub-entity from `file_name`.
    pub fn from_file(file_name: &Path, description: Option<&str>) -> EntityResult<Self> {
        let mut entity = Self::default();
        entity.load(file_name, description)?;
        Ok(entity)
    }

    pub fn exposures(&self) -> &Exposures {
        &self.exposures
    }

    pub fn impact_funcs(&self) -> &ImpactFuncs {
        &self.impact_funcs
    }

    pub fn measures(&self) -> &Measures {
        &self.measures
    }

    pub fn discounts(&self) -> &Discounts {
        &self.discounts
    }

    pub fn exposures_mut(&mut self) -> &mut Exposures {
        &mut self.exposures
    }

    pub fn impact_funcs_mut(&mut self) -> &mut ImpactFuncs {
        &mut self.impact_funcs
    }

    pub fn measures_mut(&mut self) -> &mut Measures {
        &mut self.measures
    }

    pub fn discounts_mut(&mut self) -> &mut Discounts {
        &mut self.discounts
    }

    /// Accepts the data type or any of its readers.
    pub fn set_exposures(&mut self, exposures: impl Into<Exposures>) {
        self.exposures = exposures.into();
    }

    pub fn set_impact_funcs(&mut self, impact_funcs: impl Into<ImpactFuncs>) {
        self.impact_funcs = impact_funcs.into();
    }

    pub fn set_measures(&mut self, measures: impl Into<Measures>) {
        self.measures = measures.into();
    }

    pub fn set_discounts(&mut self, discounts: impl Into<Discounts>) {
        self.discounts = discounts.into();
    }

    /// Assign a value whose type is only known at runtime. It must be the
    /// `kind` data type or one of its readers, else `TypeMismatch`.
    pub fn assign(&mut self, kind: SubEntity, value: Box<dyn Any>) -> EntityResult<()> {
        let mismatch = |_| EntityError::TypeMismatch { expected: kind.type_name() };
        match kind {
            SubEntity::Exposures => {
                self.exposures = downcast::<Exposures, ExposuresExcel, ExposuresMat>(value).map_err(mismatch)?;
            }
            SubEntity::ImpactFuncs => {
                self.impact_funcs =
                    downcast::<ImpactFuncs, ImpactFuncsExcel, ImpactFuncsMat>(value).map_err(mismatch)?;
            }
            SubEntity::Measures => {
                self.measures = downcast::<Measures, MeasuresExcel, MeasuresMat>(value).map_err(mismatch)?;
            }
            SubEntity::Discounts => {
                self.discounts = downcast::<Discounts, DiscountsExcel, DiscountsMat>(value).map_err(mismatch)?;
            }
        }
        Ok(())
    }

    /// Provenance of exposures, impact functions, measures and discounts,
    /// in that order.
    pub fn tags(&self) -> [&Tag; 4] {
        [
            &self.exposures.tag,
            &self.impact_funcs.tag,
            &self.measures.tag,
            &self.discounts.tag,
        ]
    }

    fn read_with<E, I, M, D>(
        &mut self,
        (mut exposures, mut impact_funcs, mut measures, mut discounts): (E, I, M, D),
        file_name: &Path,
        description: Option<&str>,
    ) -> EntityResult<()>
    where
        E: Loader + Into<Exposures>,
        I: Loader + Into<ImpactFuncs>,
        M: Loader + Into<Measures>,
        D: Loader + Into<Discounts>,
    {
        exposures.read(file_name, description)?;
        impact_funcs.read(file_name, description)?;
        measures.read(file_name, description)?;
        discounts.read(file_name, description)?;
        self.exposures = exposures.into();
        self.impact_funcs = impact_funcs.into();
        self.measures = measures.into();
        self.discounts = discounts.into();
        Ok(())
    }
}

impl Loader for Entity {
    fn read(&mut self, file_name: &Path, description: Option<&str>) -> EntityResult<()> {
        match SourceFormat::from_path(file_name)? {
            SourceFormat::Spreadsheet => self.read_with(
                (ExposuresExcel::new(), ImpactFuncsExcel::new(), MeasuresExcel::new(), DiscountsExcel::new()),
                file_name,
                description,
            ),
            SourceFormat::MatTable => self.read_with(
                (ExposuresMat::new(), ImpactFuncsMat::new(), MeasuresMat::new(), DiscountsMat::new()),
                file_name,
                description,
            ),
        }
    }

    /// Discounts, exposures, impact functions, measures. Stops at the first
    /// hard error.
    fn check(&self) -> EntityResult<Vec<Diagnostic>> {
        let mut diagnostics = self.discounts.check()?;
        diagnostics.extend(self.exposures.check()?);
        diagnostics.extend(self.impact_funcs.check()?);
        diagnostics.extend(self.measures.check()?);
        Ok(diagnostics)
    }
}

/// `value` as `T`, or converted from reader `A` or `B`.
fn downcast<T, A, B>(value: Box<dyn Any>) -> Result<T, Box<dyn Any>>
where
    T: 'static,
    A: Into<T> + 'static,
    B: Into<T> + 'static,
{
    let value = match value.downcast::<T>() {
        Ok(v) => return Ok(*v),
        Err(value) => value,
    };
    let value = match value.downcast::<A>() {
        Ok(v) => return Ok((*v).into()),
        Err(value) => value,
    };
    value.downcast::<B>().map(|v| (*v).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_order_and_concatenation() {
        let entity = Entity::default();
        let fields: Vec<String> = entity.check().unwrap().into_iter().map(|d| d.field).collect();
        assert_eq!(
            fields,
            vec![
                "Discounts.years",
                "Exposures.category_id",
                "Exposures.region_id",
                "Exposures.assigned",
                "ImpactFuncs.data",
                "Measures.data",
            ]
        );
    }

    #[test]
    fn discounts_error_wins_over_later_errors() {
        let mut entity = Entity::default();
        entity.set_discounts(Discounts::new(vec![2000], vec![]));
        entity.exposures_mut().value.push(1.0);
        assert!(matches!(
            entity.check(),
            Err(EntityError::LengthMismatch { ref field, .. }) if field == "Discounts.rates"
        ));
    }

    #[test]
    fn assign_accepts_readers() {
        let mut entity = Entity::default();
        let measures = Measures::default();
        entity.assign(SubEntity::Measures, Box::new(MeasuresExcel::new())).unwrap();
        assert_eq!(entity.measures(), &measures);
        entity.assign(SubEntity::Discounts, Box::new(Discounts::new(vec![2020], vec![0.1]))).unwrap();
        assert_eq!(entity.discounts().years, vec![2020]);
    }

    #[test]
    fn assign_wrong_kind_is_type_mismatch() {
        let mut entity = Entity::default();
        let err = entity.assign(SubEntity::Exposures, Box::new(Measures::default())).unwrap_err();
        assert!(matches!(err, EntityError::TypeMismatch { expected: "Exposures" }));
        assert_eq!(err.to_string(), "Input value is not (sub)class of Exposures");
        let err = entity.assign(SubEntity::ImpactFuncs, Box::new(3_u8)).unwrap_err();
        assert!(matches!(err, EntityError::TypeMismatch { expected: "ImpactFuncs" }));
    }

    #[test]
    fn csv_is_rejected_before_any_read() {
        let mut entity = Entity::default();
        match entity.read(Path::new("entity.csv"), None) {
            Err(EntityError::UnsupportedFormat { extension }) => assert_eq!(extension, ".csv"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
