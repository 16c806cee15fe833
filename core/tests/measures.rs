//! Measure readers against the bundled sources.

use entity_core::{
    config,
    error::EntityError,
    measures::{excel::MeasuresExcel, mat::MeasuresMat, Measures},
    Loader,
};

#[test]
fn demo_workbook_measures_in_source_order() {
    let mut reader = MeasuresExcel::new();
    let warnings = reader.load(&config::global().paths.entity_demo, None).unwrap();
    let measures = reader.as_inner();
    assert!(warnings.is_empty());
    assert_eq!(measures.names(), vec!["Mangroves", "Beach nourishment", "Seawall", "Building code"]);

    let mangroves = measures.get_measure("Mangroves").unwrap();
    assert_eq!(mangroves.color_rgb, [0.8, 0.8, 0.8]);
    assert_eq!(mangroves.cost, 1311768360.8515418);
    assert_eq!(mangroves.hazard_inten_imp, (1.0, -4.0));
    assert_eq!(mangroves.hazard_event_set, "NA");
    assert_eq!(mangroves.mdd_impact, (1.0, 0.0));
    assert_eq!(mangroves.paa_impact, (1.0, 0.0));
    assert_eq!(mangroves.risk_transf_attach, 0.0);

    let code = measures.get_measure("Building code").unwrap();
    assert_eq!(code.color_rgb, [0.2, 0.2, 0.2]);
    assert_eq!(code.cost, 9200000000.0);
    assert_eq!(code.hazard_inten_imp, (1.0, 0.0));
    assert_eq!(code.mdd_impact, (0.75, 0.0));
}

#[test]
fn mat_and_workbook_demo_agree() {
    let paths = &config::global().paths;
    let mut from_mat = Measures::new();
    from_mat.read(&paths.entity_demo_mat, None).unwrap();
    let mut from_xlsx = Measures::new();
    from_xlsx.read(&paths.entity_demo, None).unwrap();

    assert_eq!(from_mat.names(), from_xlsx.names());
    for (a, b) in from_mat.iter().zip(from_xlsx.iter()) {
        assert_eq!(a, b);
    }
}

#[test]
fn mat_reader_reads_the_demo() {
    let mut reader = MeasuresMat::new();
    reader.read(&config::global().paths.entity_demo_mat, Some("mat")).unwrap();
    let measures = reader.as_inner();
    assert_eq!(measures.len(), 4);
    assert_eq!(measures.get_measure("Seawall").unwrap().hazard_inten_imp, (1.0, -10.0));
    assert_eq!(measures.tag.description, vec!["mat"]);
}

#[test]
fn mat_bytes_under_xlsx_name_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut measures = MeasuresExcel::new();
    let fake = dir.path().join("fake.xlsx");
    std::fs::copy(&config::global().paths.entity_demo_mat, &fake).unwrap();
    assert!(matches!(measures.read(&fake, None), Err(EntityError::Spreadsheet(_))));
}
