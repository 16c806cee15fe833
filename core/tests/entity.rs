//! Entity aggregate: format dispatch, assignment and the check pass.

use entity_core::{
    config,
    exposures::{Exposures, ExposuresExcel},
    impact_funcs::ImpactFuncs,
    measures::Measures,
    Entity, EntityError, Loader, SubEntity,
};
use std::path::Path;

#[test]
fn default_source_equals_explicit_template() {
    let default = Entity::new().unwrap();
    let explicit = Entity::from_file(&config::global().paths.entity_default, None).unwrap();
    assert_eq!(default, explicit);
    assert_eq!(default.exposures().len(), 24);
    assert_eq!(default.exposures().ref_year, 2017);
}

#[test]
fn workbook_fills_every_sub_entity() {
    let _ = env_logger::builder().is_test(true).try_init();
    let demo = &config::global().paths.entity_demo;
    let mut entity = Entity::default();
    let warnings = entity.load(demo, Some("demo entity")).unwrap();

    assert_eq!(entity.exposures().len(), 50);
    assert_eq!(entity.impact_funcs().len(), 2);
    assert_eq!(entity.measures().len(), 4);
    assert_eq!(entity.discounts().years.len(), 101);
    for tag in entity.tags() {
        assert_eq!(tag.file_name, vec![demo.display().to_string()]);
        assert_eq!(tag.description, vec!["demo entity"]);
    }
    assert_eq!(warnings.len(), 3);
}

#[test]
fn mat_file_fills_every_sub_entity() {
    let entity = Entity::from_file(&config::global().paths.entity_demo_mat, None).unwrap();
    assert_eq!(entity.exposures().len(), 50);
    assert_eq!(entity.impact_funcs().ids("TC"), vec![1, 3]);
    assert_eq!(entity.measures().len(), 4);
    assert_eq!(entity.discounts().rate(2050), Some(0.02));
}

#[test]
fn unsupported_extension() {
    match Entity::from_file(Path::new("demo_today.csv"), None) {
        Err(EntityError::UnsupportedFormat { extension }) => assert_eq!(extension, ".csv"),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn setters_accept_readers() {
    let paths = &config::global().paths;
    let mut reader = ExposuresExcel::new();
    reader.read(&paths.entity_demo, None).unwrap();

    let mut entity = Entity::from_file(&paths.entity_template, None).unwrap();
    entity.set_exposures(reader);
    assert_eq!(entity.exposures().len(), 50);
    let [exposures_tag, funcs_tag, ..] = entity.tags();
    assert_ne!(exposures_tag, funcs_tag);

    entity.set_measures(Measures::new());
    assert!(entity.measures().is_empty());
}

#[test]
fn dynamic_assignment_checks_the_kind() {
    let mut entity = Entity::default();
    let err = entity.assign(SubEntity::Measures, Box::new(ImpactFuncs::new())).unwrap_err();
    assert!(matches!(err, EntityError::TypeMismatch { expected: "Measures" }));

    let mut exposures = Exposures::default();
    exposures.ref_year = 1990;
    entity.assign(SubEntity::Exposures, Box::new(exposures)).unwrap();
    assert_eq!(entity.exposures().ref_year, 1990);
}

#[test]
fn check_runs_discounts_first() {
    let mut entity = Entity::from_file(&config::global().paths.entity_demo, None).unwrap();
    entity.discounts_mut().rates.pop();
    entity.exposures_mut().cover.pop();
    match entity.check() {
        Err(EntityError::LengthMismatch { field, .. }) => assert_eq!(field, "Discounts.rates"),
        other => panic!("unexpected: {other:?}"),
    }
}
