//! Impact function readers against the bundled sources.

use entity_core::{
    config,
    error::EntityError,
    impact_funcs::{excel::ImpactFuncsExcel, mat::ImpactFuncsMat, ImpactFuncs, ImpactFuncsColumns},
    Loader,
};

const INTENSITY: [f64; 9] = [0.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 100.0];

#[test]
fn demo_workbook_has_two_tc_functions() {
    let mut reader = ImpactFuncsExcel::new();
    let warnings = reader.load(&config::global().paths.entity_demo, None).unwrap();
    let funcs = reader.as_inner();
    assert!(warnings.is_empty());

    assert_eq!(funcs.len(), 2);
    assert_eq!(funcs.haz_types(), vec!["TC"]);
    assert_eq!(funcs.ids("TC"), vec![1, 3]);

    let default = funcs.get_func("TC", 1).unwrap();
    assert_eq!(default.name, "Tropical cyclone default");
    assert_eq!(default.intensity_unit, "m/s");
    assert_eq!(default.intensity, INTENSITY);
    assert_eq!(default.paa, vec![1.0; 9]);
    assert_eq!(default.mdd[2], 0.000675);
    assert_eq!(default.mdd[8], 0.777105);

    let code = funcs.get_func("TC", 3).unwrap();
    assert_eq!(code.name, "TC Building code");
    assert_eq!(code.mdd[8], 0.606746);
}

#[test]
fn mdr_between_points() {
    let mut funcs = ImpactFuncs::new();
    funcs.read(&config::global().paths.entity_demo, None).unwrap();
    let func = funcs.get_func("TC", 1).unwrap();
    assert_eq!(func.calc_mdr(10.0), 0.0);
    assert!((func.calc_mdr(90.0) - (0.576424 + 0.777105) / 2.0).abs() < 1e-12);
    assert_eq!(func.calc_mdr(150.0), 0.777105);
}

#[test]
fn mat_and_workbook_demo_agree() {
    let paths = &config::global().paths;
    let mut mat_reader = ImpactFuncsMat::new();
    mat_reader.load(&paths.entity_demo_mat, None).unwrap();
    let from_mat = mat_reader.into_inner();
    let mut xlsx_reader = ImpactFuncsExcel::new();
    xlsx_reader.read(&paths.entity_demo, None).unwrap();
    let from_xlsx = xlsx_reader.into_inner();

    assert_eq!(from_mat.ids("TC"), from_xlsx.ids("TC"));
    for id in from_xlsx.ids("TC") {
        let (a, b) = (from_mat.get_func("TC", id).unwrap(), from_xlsx.get_func("TC", id).unwrap());
        assert_eq!(a.name, b.name);
        assert_eq!(a.intensity_unit, b.intensity_unit);
        assert_eq!(a.intensity, b.intensity);
        assert_eq!(a.mdd, b.mdd);
        assert_eq!(a.paa, b.paa);
    }
}

#[test]
fn missing_intensity_column() {
    let columns = ImpactFuncsColumns { intensity: "wind".into(), ..ImpactFuncsColumns::default() };
    let mut funcs = ImpactFuncsExcel::with_columns(columns);
    match funcs.read(&config::global().paths.entity_demo, None) {
        Err(EntityError::MissingColumn { sheet, column }) => {
            assert_eq!(sheet, "damagefunctions");
            assert_eq!(column, "wind");
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn tag_names_the_source() {
    let demo = &config::global().paths.entity_demo;
    let mut funcs = ImpactFuncs::new();
    funcs.read(demo, Some("curves")).unwrap();
    assert_eq!(funcs.tag.file_name, vec![demo.display().to_string()]);
    assert_eq!(funcs.tag.description, vec!["curves"]);
}
