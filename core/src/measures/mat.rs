use super::{parse_measures, Measures, MeasuresColumns};
use crate::{
    error::EntityResult,
    loader::{Diagnostic, Loader},
    source::{MatFile, MatTable},
    tag::Tag,
};
use std::path::Path;

pub const MEASURES_PATH: [&str; 2] = ["entity", "measures"];

#[derive(Debug, Clone, PartialEq)]
pub struct MeasuresMat {
    measures: Measures,
    columns:  MeasuresColumns,
}

impl Default for MeasuresMat {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasuresMat {
    pub fn new() -> Self {
        Self::with_columns(MeasuresColumns::mat())
    }

    pub fn with_columns(columns: MeasuresColumns) -> Self {
        Self { measures: Measures::default(), columns }
    }

    pub fn as_inner(&self) -> &Measures {
        &self.measures
    }

    pub fn into_inner(self) -> Measures {
        self.measures
    }

    pub fn parse_table(&self, table: &MatTable<'_>) -> EntityResult<Measures> {
        parse_measures(table, &self.columns)
    }
}

impl Loader for MeasuresMat {
    fn read(&mut self, file_name: &Path, description: Option<&str>) -> EntityResult<()> {
        let mat = MatFile::open(file_name)?;
        let mut measures = self.parse_table(&mat.table(&MEASURES_PATH)?)?;
        measures.tag = Tag::new(file_name, description);
        self.measures = measures;
        Ok(())
    }

    fn check(&self) -> EntityResult<Vec<Diagnostic>> {
        self.measures.check()
    }
}

impl From<MeasuresMat> for Measures {
    fn from(reader: MeasuresMat) -> Self {
        reader.measures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EntityError;
    use crate::source::mat::tests::{cell, double, file, structure};

    fn entity(fields: Vec<(&str, Vec<u8>)>) -> MatFile {
        let measures = structure("measures", &fields);
        MatFile::parse(&file(&[structure("entity", &[("measures", measures)])], true)).unwrap()
    }

    fn fields(names: &[&str], colors: &[&str], cost: &[f64]) -> Vec<(&'static str, Vec<u8>)> {
        let ones = vec![1.0; names.len()];
        let zeros = vec![0.0; names.len()];
        vec![
            ("name", cell("name", names)),
            ("color", cell("color", colors)),
            ("cost", double("cost", cost)),
            ("hazard_intensity_impact_a", double("a", &ones)),
            ("hazard_intensity_impact_b", double("b", &zeros)),
            ("MDD_impact_a", double("a", &ones)),
            ("MDD_impact_b", double("b", &zeros)),
            ("PAA_impact_a", double("a", &ones)),
            ("PAA_impact_b", double("b", &zeros)),
        ]
    }

    #[test]
    fn reads_records_with_defaults() {
        let mat = entity(fields(&["Seawall", "Mangroves"], &["0.1 0.2 0.3", "1 1 1"], &[5.0, 7.0]));
        let measures = MeasuresMat::new().parse_table(&mat.table(&MEASURES_PATH).unwrap()).unwrap();
        assert_eq!(measures.names(), vec!["Seawall", "Mangroves"]);
        let mangroves = measures.get_measure("Mangroves").unwrap();
        assert_eq!(mangroves.color_rgb, [1.0, 1.0, 1.0]);
        assert_eq!(mangroves.cost, 7.0);
        assert_eq!(mangroves.hazard_event_set, "NA");
        assert_eq!(mangroves.risk_transf_cover, 0.0);
    }

    #[test]
    fn short_color_array_is_malformed() {
        let mat = entity(fields(&["Seawall", "Mangroves"], &["0.1 0.2 0.3"], &[5.0, 7.0]));
        match MeasuresMat::new().parse_table(&mat.table(&MEASURES_PATH).unwrap()) {
            Err(EntityError::MalformedMat { reason }) => {
                assert_eq!(reason, "entity.measures.color: 1 values for 2 measures");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn long_cost_array_is_malformed() {
        let mat = entity(fields(&["Seawall"], &["0.1 0.2 0.3"], &[5.0, 7.0]));
        assert!(matches!(
            MeasuresMat::new().parse_table(&mat.table(&MEASURES_PATH).unwrap()),
            Err(EntityError::MalformedMat { ref reason }) if reason.starts_with("entity.measures.cost")
        ));
    }

    #[test]
    fn short_event_set_is_malformed() {
        let mut fields = fields(&["Seawall", "Mangroves"], &["0 0 0", "1 1 1"], &[5.0, 7.0]);
        fields.push(("hazard_event_set", cell("hazard_event_set", &["TC"])));
        let mat = entity(fields);
        assert!(matches!(
            MeasuresMat::new().parse_table(&mat.table(&MEASURES_PATH).unwrap()),
            Err(EntityError::MalformedMat { ref reason }) if reason.starts_with("entity.measures.hazard_event_set")
        ));
    }
}
