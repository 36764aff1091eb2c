//! 골든 입출력 테스트

use super::fixture::SyntheticModel;
use crate::core::errors::PoseHeadError;
use crate::core::systems::ArtifactPaths;
use crate::core::transform::read_npy_f32;
use crate::pipeline::*;
use ndarray::{ArrayD, IxDyn};

#[test]
fn 입력_squeeze_테스트() {
    let five = ArrayD::from_elem(IxDyn(&[1, 1, 4, 4, 3]), 1.0f32);
    assert_eq!(squeeze_input(five).shape(), &[1, 4, 4, 3]);

    let four = ArrayD::from_elem(IxDyn(&[1, 4, 4, 3]), 1.0f32);
    assert_eq!(squeeze_input(four).shape(), &[1, 4, 4, 3]);

    // 두 번째 축이 1이 아니면 그대로
    let other = ArrayD::from_elem(IxDyn(&[1, 2, 4, 4, 3]), 1.0f32);
    assert_eq!(squeeze_input(other).shape(), &[1, 2, 4, 4, 3]);
}

#[test]
fn 골든_기록_테스트() {
    let model = SyntheticModel::new(31);
    let mut runner = model.runner().with_backbone(ArrayD::zeros(IxDyn(&[1, 2, 2, 2])));
    let input = ArrayD::from_elem(IxDyn(&[1, 1, 4, 4, 3]), 0.25f32);

    let written = capture_golden(&model.config, &mut runner, input).unwrap();
    // 출력 3개 + 백본 특징 + 입력
    assert_eq!(written.len(), 5);
    assert_eq!(runner.calls, 1);

    let artifacts = ArtifactPaths::new(&model.config.paths);
    let saved_input = read_npy_f32(&artifacts.golden_input()).unwrap();
    assert_eq!(saved_input.shape(), &[1, 4, 4, 3]);
    let alpha = read_npy_f32(&artifacts.golden_output("alpha")).unwrap();
    assert_eq!(alpha, model.outputs[0]);
    assert!(artifacts.golden_backbone_feature().exists());

    println!("✅ 골든 기록 테스트 통과");
}

#[test]
fn 백본_특징_없으면_출력만_기록_테스트() {
    let model = SyntheticModel::new(32);
    model.capture();
    let artifacts = ArtifactPaths::new(&model.config.paths);
    assert!(!artifacts.golden_backbone_feature().exists());
    assert!(artifacts.golden_output("gamma").exists());
}

#[test]
fn 골든_입력_shape_불일치_테스트() {
    let model = SyntheticModel::new(33);
    let input = ArrayD::zeros(IxDyn(&[1, 8, 8, 3]));
    let result = capture_golden(&model.config, &mut model.runner(), input);
    assert!(matches!(result, Err(PoseHeadError::ShapeMismatch { .. })));
}

#[test]
fn 추론_출력_개수_불일치_테스트() {
    let model = SyntheticModel::new(34);
    let mut runner = RecordedRunner::new(model.outputs[..2].to_vec());
    let input = ArrayD::zeros(IxDyn(&[1, 4, 4, 3]));
    match capture_golden(&model.config, &mut runner, input) {
        Err(PoseHeadError::ShapeMismatch { expected, actual, .. }) => {
            assert_eq!(expected, vec![3]);
            assert_eq!(actual, vec![2]);
        }
        other => panic!("ShapeMismatch 기대, 실제 {:?}", other.map(|_| ())),
    }
}

#[test]
fn 골든_재검증_테스트() {
    let model = SyntheticModel::new(35);
    model.capture();

    let summary = validate_golden(&model.config, &mut model.runner()).unwrap();
    assert_eq!(summary.reports.len(), 3);
    assert!(summary.all_passed());
    assert_eq!(summary.overall(), "PASS");

    // 출력 하나를 흔들면 그 항목만 MISMATCH
    let mut drifted = model.outputs.clone();
    drifted[1][[0, 2]] += 1e-3;
    let summary = validate_golden(&model.config, &mut RecordedRunner::new(drifted)).unwrap();
    assert!(!summary.get("beta").unwrap().passed);
    assert!(summary.get("alpha").unwrap().passed);
    let rendered = summary.render();
    assert!(rendered.contains("MISMATCH"));
    assert!(rendered.ends_with("OVERALL: FAIL"));

    // shape 이 바뀐 출력은 지표 없이 실패
    let mut reshaped = model.outputs.clone();
    reshaped[2] = ArrayD::zeros(IxDyn(&[1, 1, 1]));
    let summary = validate_golden(&model.config, &mut RecordedRunner::new(reshaped)).unwrap();
    let gamma = summary.get("gamma").unwrap();
    assert!(gamma.metrics.is_none());
    assert!(!gamma.passed);

    println!("✅ 골든 재검증 테스트 통과");
}

#[test]
fn 기록된_출력_디렉터리_읽기_테스트() {
    let model = SyntheticModel::new(36);
    model.capture();
    let runner = RecordedRunner::from_dir(&model.config, &model.config.paths.golden_dir).unwrap();
    assert_eq!(runner.outputs, model.outputs);
    assert!(runner.backbone.is_none());
}

#[test]
fn 골든_백본_특징은_참고용_테스트() {
    let model = SyntheticModel::new(37);
    let mut runner = model
        .runner()
        .with_backbone(ArrayD::from_elem(IxDyn(&[2, 2, 2]), 9.0f32));
    capture_golden(&model.config, &mut runner, ArrayD::zeros(IxDyn(&[1, 4, 4, 3]))).unwrap();
    export_head_weights(&model.config, &model.provider).unwrap();

    // 기록된 백본 특징이 복원값과 달라도 요약에는 재구성 검사만 남는다
    let result = recover_backbone_feature(&model.config).unwrap();
    assert_eq!(result.summary.reports.len(), 3);
    assert!(result.summary.all_passed());
}
