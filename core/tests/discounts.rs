//! Discount readers against the bundled sources.

use entity_core::{
    config,
    discounts::{excel::DiscountsExcel, mat::DiscountsMat, Discounts},
    Loader,
};

#[test]
fn demo_workbook_years_and_rates() {
    let mut reader = DiscountsExcel::new();
    let warnings = reader.load(&config::global().paths.entity_demo, None).unwrap();
    let discounts = reader.as_inner();
    assert!(warnings.is_empty());
    assert_eq!(discounts.years.len(), 101);
    assert_eq!(discounts.years[0], 2000);
    assert_eq!(discounts.years[100], 2100);
    assert_eq!(discounts.rates, vec![0.02; 101]);
}

#[test]
fn mat_and_workbook_demo_agree() {
    let paths = &config::global().paths;
    let mut reader = DiscountsMat::new();
    reader.load(&paths.entity_demo_mat, None).unwrap();
    let from_mat = reader.into_inner();
    let mut from_xlsx = Discounts::default();
    from_xlsx.read(&paths.entity_demo, None).unwrap();
    assert_eq!(from_mat.years, from_xlsx.years);
    assert_eq!(from_mat.rates, from_xlsx.rates);
}

#[test]
fn npv_over_demo_rates() {
    let mut discounts = Discounts::default();
    discounts.read(&config::global().paths.entity_demo, None).unwrap();
    let npv = discounts.net_present_value(2018, 2020, &[100.0, 100.0, 100.0]).unwrap();
    let expected = 100.0 + 100.0 / 1.02 + 100.0 / (1.02 * 1.02);
    assert!((npv - expected).abs() < 1e-9);
}
