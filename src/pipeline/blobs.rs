//! 6단계: 커널 메모리 블롭과 PLIO 스트림

use super::load_manifest;
use crate::core::errors::Result;
use crate::core::packer::{read_i16_stream, write_i16_bin, write_plio_stream, HeadBlob};
use crate::core::systems::{with_extension, PipelineConfig};
use crate::core::transform::write_npy_i16;
use ndarray::Array1;

/// 입력 스트림과 헤드 스트림에서 .npy/.bin 블롭, PLIO 텍스트를 만든다
pub fn prepare_memory_blobs(config: &PipelineConfig) -> Result<Vec<HeadBlob>> {
    let (artifacts, manifest) = load_manifest(config)?;
    let block = config.packing.block_size;

    let input = read_i16_stream(&artifacts.input_stream())?;
    let input_base = artifacts.input_blob_base();
    write_npy_i16(&with_extension(&input_base, "npy"), &Array1::from(input.clone()))?;
    write_i16_bin(&with_extension(&input_base, "bin"), &input)?;
    log::info!("입력 블롭: {}개 값", input.len());

    let mut blobs = Vec::new();
    for (name, info) in manifest.heads_in_order()? {
        // 헤드마다 같은 특징을 별도 PLIO 포트로 공급
        let feat_lines = write_plio_stream(&artifacts.feature_plio(name), &input, block)?;
        log::debug!("{}: 특징 PLIO {}줄", name, feat_lines);

        let w_stream = read_i16_stream(&artifacts.head_weight_stream(name))?;
        let b_stream = read_i16_stream(&artifacts.head_bias_stream(name))?;
        let blob = HeadBlob::from_streams(
            name,
            &w_stream,
            &b_stream,
            info.input_channels,
            Some(info.output_channels),
        )?;

        let w_base = artifacts.head_weights_blob_base(name);
        let b_base = artifacts.head_bias_blob_base(name);
        write_npy_i16(&with_extension(&w_base, "npy"), &blob.weights)?;
        write_i16_bin(&with_extension(&w_base, "bin"), &w_stream)?;
        write_npy_i16(&with_extension(&b_base, "npy"), &blob.bias)?;
        write_i16_bin(&with_extension(&b_base, "bin"), &b_stream)?;

        blob.write_fc(&artifacts.fc_blob(name), &artifacts.fc_plio(name), block)?;
        blobs.push(blob);
    }
    Ok(blobs)
}
