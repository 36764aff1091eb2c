//! 1단계: 헤드 가중치 내보내기 (fp32 + Q15 .npy, 매니페스트)

use super::quantizer;
use crate::core::errors::{PoseHeadError, Result};
use crate::core::quantizer::QuantizationStats;
use crate::core::registry::{HeadSpec, Manifest, ManifestHead};
use crate::core::systems::{ArtifactPaths, PipelineConfig};
use crate::core::transform::{write_npy_f32, write_npy_i16, TensorProvider};
use crate::core::types::TensorDescriptor;
use ndarray::ArrayD;

/// 헤드 하나의 내보내기 결과
#[derive(Debug, Clone)]
pub struct ExportedHead {
    pub name: String,
    pub weight: TensorDescriptor,
    pub bias: TensorDescriptor,
    pub weight_stats: QuantizationStats,
    pub bias_stats: QuantizationStats,
}

/// 선택기로 찾은 텐서를 읽고 shape 확인
fn read_checked(
    provider: &dyn TensorProvider,
    descriptor: &TensorDescriptor,
    expected: &[usize],
    context: &str,
) -> Result<ArrayD<f32>> {
    if !descriptor.dtype.is_float() {
        return Err(PoseHeadError::Provider(format!(
            "{}: 부동소수점 텐서가 아님 ({} {})",
            context, descriptor.name, descriptor.dtype
        )));
    }
    let array = provider.read_tensor(descriptor.index)?;
    if array.shape() != expected {
        return Err(PoseHeadError::shape_mismatch(context, expected, array.shape()));
    }
    Ok(array)
}

pub(crate) fn locate_head_tensors(
    head: &HeadSpec,
    listing: &[TensorDescriptor],
) -> Result<(TensorDescriptor, TensorDescriptor)> {
    let weight = head.weight_selector.build()?.select(listing)?.clone();
    let bias = head.bias_selector.build()?.select(listing)?.clone();
    Ok((weight, bias))
}

/// 헤드마다 가중치/바이어스를 찾아 fp32 와 Q15 로 저장하고 매니페스트를 기록
pub fn export_head_weights(
    config: &PipelineConfig,
    provider: &dyn TensorProvider,
) -> Result<(Manifest, Vec<ExportedHead>)> {
    let artifacts = ArtifactPaths::new(&config.paths);
    let q15 = quantizer(config);
    let listing = provider.tensor_listing()?;
    log::info!("텐서 {}개 중 헤드 가중치 탐색", listing.len());

    let mut exported = Vec::with_capacity(config.heads.heads.len());
    for head in &config.heads.heads {
        let (weight, bias) = locate_head_tensors(head, &listing)?;
        log::info!("  {} weights: {}", head.name, weight);
        log::info!("  {} bias   : {}", head.name, bias);

        let w = read_checked(provider, &weight, &head.weight_shape(), &format!("{}: 가중치", head.name))?;
        let b = read_checked(provider, &bias, &head.bias_shape(), &format!("{}: 바이어스", head.name))?;

        let (w_q15, weight_stats) = q15.quantize_with_stats(&w);
        let (b_q15, bias_stats) = q15.quantize_with_stats(&b);
        if weight_stats.saturated + bias_stats.saturated > 0 {
            log::warn!(
                "{}: Q15 포화 가중치 {}개, 바이어스 {}개",
                head.name,
                weight_stats.saturated,
                bias_stats.saturated
            );
        }

        let files = ManifestHead::for_head(head);
        write_npy_f32(&artifacts.weight_file(&files.w_fp32), &w)?;
        write_npy_i16(&artifacts.weight_file(&files.w_q15), &w_q15)?;
        write_npy_f32(&artifacts.weight_file(&files.b_fp32), &b)?;
        write_npy_i16(&artifacts.weight_file(&files.b_q15), &b_q15)?;
        log::info!(
            "  {} 저장: {:?} (Q15 min={}, max={})",
            head.name,
            w.shape(),
            weight_stats.min,
            weight_stats.max
        );

        exported.push(ExportedHead {
            name: head.name.clone(),
            weight,
            bias,
            weight_stats,
            bias_stats,
        });
    }

    let model_name = config
        .paths
        .model_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| config.paths.model_path.display().to_string());
    let manifest = Manifest::from_registry(
        &config.heads,
        &model_name,
        &config.paths.weights_dir.display().to_string(),
    );
    manifest.save(&artifacts.manifest())?;
    log::info!("매니페스트 기록: {} (헤드 {}개)", artifacts.manifest().display(), exported.len());

    Ok((manifest, exported))
}
