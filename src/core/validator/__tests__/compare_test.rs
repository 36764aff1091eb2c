//! 비교기 테스트

use crate::core::validator::*;
use approx::assert_relative_eq;
use ndarray::{arr1, arr2, Array1, Array2};

#[test]
fn 허용오차_내_통과_테스트() {
    let golden = arr1(&[1.0f64, 2.0]);
    let candidate = arr1(&[1.0f64, 2.0000001]);
    let report = compare("near", &golden, &candidate, &CompareOptions::golden());
    assert!(report.passed);
    let m = report.metrics.unwrap();
    assert!(m.max_abs_err < 1e-6);
    assert!(m.max_abs_err > 0.0);
}

#[test]
fn 허용오차_초과_실패_테스트() {
    let report = compare("far", &arr1(&[1.0f32]), &arr1(&[1.1f32]), &CompareOptions::golden());
    assert!(!report.passed);
    let m = report.metrics.unwrap();
    assert_relative_eq!(m.max_abs_err, 0.1, epsilon = 1e-6);
    assert_relative_eq!(m.max_rel_err, 0.1, epsilon = 1e-6);
}

#[test]
fn shape_불일치_보고_테스트() {
    let golden = Array2::<f32>::zeros((1, 195));
    let candidate = Array1::<f32>::zeros(195);
    let report = compare("pose3d", &golden, &candidate, &CompareOptions::default());
    assert!(!report.passed);
    assert!(!report.shape_matches());
    assert!(report.metrics.is_none());
    assert_eq!(report.golden_shape, vec![1, 195]);
    assert!(report.to_string().contains("SHAPE MISMATCH"));
}

#[test]
fn 지표_계산_테스트() {
    let golden = arr2(&[[1.0f64, -2.0], [0.0, 4.0]]);
    let candidate = arr2(&[[1.5f64, -2.0], [0.0, 3.0]]);
    let m = compare("m", &golden, &candidate, &CompareOptions::golden()).metrics.unwrap();
    assert_relative_eq!(m.max_abs_err, 1.0);
    assert_relative_eq!(m.mean_abs_err, 1.5 / 4.0);
    assert_relative_eq!(m.rms_err, ((0.25 + 1.0) / 4.0f64).sqrt());
    assert_relative_eq!(m.max_rel_err, 0.5);
}

#[test]
fn 상대오차_분모_하한_테스트() {
    // golden 0 → 분모 rel_floor
    let golden = arr1(&[0.0f64]);
    let candidate = arr1(&[1e-9f64]);
    let golden_opts = CompareOptions::golden();
    let weight_opts = CompareOptions::weights();
    let a = compare("g", &golden, &candidate, &golden_opts).metrics.unwrap();
    let b = compare("w", &golden, &candidate, &weight_opts).metrics.unwrap();
    assert_relative_eq!(a.max_rel_err, 0.1, epsilon = 1e-9);
    assert_relative_eq!(b.max_rel_err, 1000.0, epsilon = 1e-6);
    // atol 1e-7 이내라 둘 다 통과
    assert!(compare("g", &golden, &candidate, &golden_opts).passed);
}

#[test]
fn nan_실패_테스트() {
    let golden = arr1(&[1.0f32, f32::NAN, 3.0]);
    let candidate = arr1(&[1.0f32, f32::NAN, 5.0]);
    let report = compare("nan", &golden, &candidate, &CompareOptions::golden());
    assert!(!report.passed);
    assert!(report.metrics.unwrap().max_abs_err.is_nan());
}

#[test]
fn 빈_배열_통과_테스트() {
    let empty = Array1::<f32>::zeros(0);
    let report = compare("empty", &empty, &empty, &CompareOptions::golden());
    assert!(report.passed);
    assert_eq!(report.metrics.unwrap(), ErrorMetrics::default());
}

#[test]
fn 정수_배열_비교_테스트() {
    let golden = arr1(&[100i16, -200]);
    let candidate = arr1(&[100i16, -200]);
    assert!(compare("q15", &golden, &candidate, &CompareOptions::golden()).passed);
}

#[test]
fn 요약_테스트() {
    let mut summary = ValidationSummary::new();
    assert!(summary.is_empty());
    assert!(summary.record(compare("POSE3D", &arr1(&[1.0f32]), &arr1(&[1.0f32]), &CompareOptions::golden())));
    assert!(summary.all_passed());
    assert!(!summary.record(compare("FLAG", &arr1(&[1.0f32]), &arr1(&[2.0f32]), &CompareOptions::golden())));

    assert!(!summary.all_passed());
    assert_eq!(summary.failures().count(), 1);
    assert_eq!(summary.overall(), "FAIL");
    let text = summary.render();
    assert!(text.contains("POSE3D : OK"));
    assert!(text.contains("FLAG   : MISMATCH"));
    assert!(text.ends_with("OVERALL: FAIL"));
    assert!(summary.get("FLAG").is_some());
}
