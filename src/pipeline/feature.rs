//! 5단계: 백본 특징 복원과 입력 스트림 생성

use super::{flatten_weights, load_manifest, quantizer};
use crate::core::errors::{PoseHeadError, Result};
use crate::core::packer::write_flat_stream;
use crate::core::recovery::{HeadObservation, RecoveredFeature, RecoveryDiagnostics, RecoveryEngine};
use crate::core::registry::Manifest;
use crate::core::systems::{ArtifactPaths, PipelineConfig};
use crate::core::transform::{read_npy_f32, write_npy_f32, write_npy_i16};
use crate::core::validator::{compare, ComparisonReport, ErrorMetrics, ValidationSummary};
use ndarray::{Array1, ArrayD};

/// 특징 복원 단계 결과
#[derive(Debug, Clone)]
pub struct FeatureRecovery {
    pub recovered: RecoveredFeature,
    /// 특징 맵 shape 의 Q15 값
    pub feature_q15: ArrayD<i16>,
    /// 헤드별 재구성 검사
    pub summary: ValidationSummary,
}

/// 매니페스트 순서대로 (W (out × in), b, 골든 y) 관측을 읽는다
pub fn load_head_observations(artifacts: &ArtifactPaths, manifest: &Manifest) -> Result<Vec<HeadObservation>> {
    let mut heads = Vec::new();
    for (name, info) in manifest.heads_in_order()? {
        let (out_ch, in_ch) = (info.output_channels, info.input_channels);

        let w = read_npy_f32(&artifacts.weight_file(&info.w_fp32))?;
        if w.shape() != info.weight_shape().as_slice() {
            return Err(PoseHeadError::shape_mismatch(
                format!("{}: fp32 가중치", name),
                &info.weight_shape(),
                w.shape(),
            ));
        }
        let b = read_npy_f32(&artifacts.weight_file(&info.b_fp32))?;
        if b.shape() != info.bias_shape().as_slice() {
            return Err(PoseHeadError::shape_mismatch(
                format!("{}: fp32 바이어스", name),
                &info.bias_shape(),
                b.shape(),
            ));
        }
        let y = read_npy_f32(&artifacts.golden_output(name))?;

        let w_flat = flatten_weights(&format!("{}: 가중치 평탄화", name), w, out_ch, in_ch)?;
        let b_flat: Array1<f32> = b.iter().copied().collect();
        let y_flat: Array1<f32> = y.iter().copied().collect();
        log::info!(
            "  {}: W {:?}, b {:?}, y {:?}",
            name,
            w_flat.dim(),
            b_flat.len(),
            y_flat.len()
        );
        heads.push(HeadObservation::from_arrays(name, w_flat.view(), b_flat.view(), y_flat.view()));
    }
    Ok(heads)
}

/// 헤드별 재구성 오차를 검증 보고서로 변환 (max_abs_err < tolerance 이면 통과)
pub fn reconstruction_reports(diagnostics: &RecoveryDiagnostics, tolerance: f64) -> Vec<ComparisonReport> {
    diagnostics
        .heads
        .iter()
        .map(|h| {
            ComparisonReport::from_metrics(
                &format!("{}_reconstruction", h.name),
                &[h.rows],
                ErrorMetrics {
                    max_abs_err: h.max_abs_err,
                    mean_abs_err: h.mean_abs_err,
                    rms_err: h.rms_err,
                    max_rel_err: h.max_rel_err,
                },
                h.max_abs_err < tolerance,
            )
        })
        .collect()
}

pub fn recover_backbone_feature(config: &PipelineConfig) -> Result<FeatureRecovery> {
    let (artifacts, manifest) = load_manifest(config)?;
    let heads = load_head_observations(&artifacts, &manifest)?;

    let engine = RecoveryEngine::new(config.feature.recovery.clone());
    let recovered = engine.recover(&heads)?;

    let feature_map = recovered.to_feature_map(&config.feature.shape)?;
    let q15 = quantizer(config);
    let (feature_q15, stats) = q15.quantize_with_stats(&feature_map);
    if stats.saturated > 0 {
        log::warn!("특징 Q15 포화 {}개 / {}", stats.saturated, stats.num_elements);
    }

    write_npy_f32(&artifacts.backbone_feature_fp32(), &feature_map)?;
    write_npy_i16(&artifacts.backbone_feature_q15(), &feature_q15)?;
    let stream: Vec<i16> = feature_q15.iter().copied().collect();
    write_flat_stream(&artifacts.input_stream(), &stream)?;
    log::info!("입력 스트림 기록: {} (len={})", artifacts.input_stream().display(), stream.len());

    let mut summary = ValidationSummary::new();
    for report in reconstruction_reports(&recovered.diagnostics, config.feature.reconstruction_tolerance) {
        summary.record(report);
    }

    // 추론기가 백본 특징을 내준 경우에만 존재. 랭크 부족이면 최소 노름 해와 다를 수 있어 참고용으로만 기록.
    let golden_feature = artifacts.golden_backbone_feature();
    if golden_feature.exists() {
        let golden = read_npy_f32(&golden_feature)?;
        let golden_flat: Array1<f32> = golden.iter().copied().collect();
        let recovered_flat: Array1<f32> = feature_map.iter().copied().collect();
        let report = compare(
            "backbone_feature",
            &golden_flat,
            &recovered_flat,
            &config.validation.golden,
        );
        log::info!("골든 백본 특징 대비\n{}", report);
    }

    Ok(FeatureRecovery {
        recovered,
        feature_q15,
        summary,
    })
}
