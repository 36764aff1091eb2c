//! 파이프라인 단계
//!
//! 순서: 가중치 내보내기 → 스트림 → 골든 Q15 → 특징 복원 → 메모리 블롭 → 커널 에뮬레이션.
//! 각 단계는 디스크 산출물을 읽고 쓰며, 앞 단계 산출물이 없으면 I/O 오류로 멈춘다.

pub mod blobs;
pub mod emulate;
pub mod export;
pub mod feature;
pub mod golden;
pub mod streams;
pub mod weights_check;

#[cfg(test)]
mod __tests__;

pub use blobs::prepare_memory_blobs;
pub use emulate::{emulate_heads, HeadEmulation};
pub use export::{export_head_weights, ExportedHead};
pub use feature::{load_head_observations, reconstruction_reports, recover_backbone_feature, FeatureRecovery};
pub use golden::{capture_golden, squeeze_input, validate_golden, InferenceRunner, RecordedRunner};
pub use streams::{make_golden_q15_streams, make_head_streams};
pub use weights_check::check_exported_weights;

use crate::core::errors::{PoseHeadError, Result};
use crate::core::quantizer::Q15Quantizer;
use crate::core::registry::Manifest;
use crate::core::systems::{ArtifactPaths, PipelineConfig};
use crate::core::transform::TensorProvider;
use crate::core::validator::ValidationSummary;
use ndarray::{Array2, ArrayD};

pub(crate) fn quantizer(config: &PipelineConfig) -> Q15Quantizer {
    Q15Quantizer::new(config.quantization.rounding)
}

pub(crate) fn load_manifest(config: &PipelineConfig) -> Result<(ArtifactPaths, Manifest)> {
    let artifacts = ArtifactPaths::new(&config.paths);
    let manifest = Manifest::load(&artifacts.manifest())?;
    Ok((artifacts, manifest))
}

/// (out, kh, kw, c) 가중치를 행 우선 (out, kh·kw·c) 로 평탄화
pub(crate) fn flatten_weights<T: Clone>(
    context: &str,
    weights: ArrayD<T>,
    out_ch: usize,
    in_ch: usize,
) -> Result<Array2<T>> {
    let actual = weights.shape().to_vec();
    if weights.len() != out_ch * in_ch || actual.first() != Some(&out_ch) {
        return Err(PoseHeadError::shape_mismatch(context, &[out_ch, in_ch], &actual));
    }
    weights
        .as_standard_layout()
        .into_owned()
        .into_shape((out_ch, in_ch))
        .map_err(|e| PoseHeadError::Numeric(e.to_string()))
}

/// 내보내기부터 커널 에뮬레이션까지 순서대로 실행
///
/// 골든 fp32 출력은 미리 `capture_golden` 으로 만들어 두어야 한다.
pub fn run_all(config: &PipelineConfig, provider: &dyn TensorProvider) -> Result<ValidationSummary> {
    config.validate()?;

    log::info!("[1] 헤드 가중치 내보내기");
    export_head_weights(config, provider)?;

    log::info!("[2] 헤드 가중치/바이어스 스트림");
    make_head_streams(config)?;

    log::info!("[3] 골든 출력 Q15 스트림");
    make_golden_q15_streams(config)?;

    log::info!("[4] 백본 특징 복원");
    let feature = recover_backbone_feature(config)?;

    log::info!("[5] 메모리 블롭과 PLIO 스트림");
    prepare_memory_blobs(config)?;

    log::info!("[6] FC 커널 에뮬레이션");
    let (_, emulation) = emulate_heads(config)?;

    let mut summary = feature.summary;
    summary.extend(emulation);
    summary.log_summary();
    Ok(summary)
}
