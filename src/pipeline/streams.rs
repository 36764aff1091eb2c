//! 3~4단계: 헤드 가중치/바이어스 텍스트 스트림, 골든 출력 Q15 스트림

use super::{flatten_weights, load_manifest, quantizer};
use crate::core::errors::{PoseHeadError, Result};
use crate::core::packer::write_flat_stream;
use crate::core::quantizer::QuantizationStats;
use crate::core::systems::{ArtifactPaths, PipelineConfig};
use crate::core::transform::{read_npy_f32, read_npy_i16, write_npy_i16};
use ndarray::Array1;

/// Q15 가중치를 (out, in) 행 우선으로 펼쳐 한 줄에 하나씩 기록
pub fn make_head_streams(config: &PipelineConfig) -> Result<()> {
    let (artifacts, manifest) = load_manifest(config)?;

    for (name, info) in manifest.heads_in_order()? {
        let (out_ch, in_ch) = (info.output_channels, info.input_channels);
        log::info!("=== {} === out_ch={}, in_ch={}, kernel={:?}", name, out_ch, in_ch, info.kernel);

        let w_q15 = read_npy_i16(&artifacts.weight_file(&info.w_q15))?;
        let b_q15 = read_npy_i16(&artifacts.weight_file(&info.b_q15))?;
        if w_q15.shape() != info.weight_shape().as_slice() {
            return Err(PoseHeadError::shape_mismatch(
                format!("{}: Q15 가중치", name),
                &info.weight_shape(),
                w_q15.shape(),
            ));
        }
        if b_q15.len() != out_ch {
            return Err(PoseHeadError::shape_mismatch(
                format!("{}: Q15 바이어스", name),
                &info.bias_shape(),
                b_q15.shape(),
            ));
        }

        let w_flat = flatten_weights(&format!("{}: 가중치 평탄화", name), w_q15, out_ch, in_ch)?;
        let w_stream: Vec<i16> = w_flat.iter().copied().collect();
        let b_stream: Vec<i16> = b_q15.iter().copied().collect();

        write_flat_stream(&artifacts.head_weight_stream(name), &w_stream)?;
        write_flat_stream(&artifacts.head_bias_stream(name), &b_stream)?;
        log::info!("  -> 가중치 스트림 {}개, 바이어스 스트림 {}개", w_stream.len(), b_stream.len());
    }
    Ok(())
}

/// 골든 fp32 헤드 출력을 평탄화 후 Q15 로 양자화해 .npy 와 텍스트로 저장
pub fn make_golden_q15_streams(config: &PipelineConfig) -> Result<Vec<(String, QuantizationStats)>> {
    let artifacts = ArtifactPaths::new(&config.paths);
    let q15 = quantizer(config);
    let mut stats = Vec::with_capacity(config.heads.heads.len());

    for head in &config.heads.heads {
        let golden = read_npy_f32(&artifacts.golden_output(&head.name))?;
        if golden.len() != head.output_channels {
            return Err(PoseHeadError::shape_mismatch(
                format!("{}: 골든 출력", head.name),
                &[head.output_channels],
                golden.shape(),
            ));
        }
        let flat: Array1<f32> = golden.iter().copied().collect();
        let (y_q15, head_stats) = q15.quantize_with_stats(&flat);

        write_npy_i16(&artifacts.golden_q15(&head.name), &y_q15)?;
        write_flat_stream(&artifacts.golden_out_stream(&head.name), &y_q15.to_vec())?;
        log::info!(
            "  {}: 골든 Q15 {}개, min={}, max={}",
            head.name,
            head_stats.num_elements,
            head_stats.min,
            head_stats.max
        );
        stats.push((head.name.clone(), head_stats));
    }
    Ok(stats)
}
