//! 7단계: FC 커널 참조 모델로 헤드 출력 예측

use super::load_manifest;
use crate::core::errors::Result;
use crate::core::kernel::run_fc_reference;
use crate::core::packer::{read_i16_bin, read_i16_stream, write_flat_stream};
use crate::core::systems::PipelineConfig;
use crate::core::validator::{compare, ValidationSummary};
use ndarray::ArrayView1;

/// 헤드 하나의 에뮬레이션 출력 (패딩 포함)
#[derive(Debug, Clone, PartialEq)]
pub struct HeadEmulation {
    pub name: String,
    pub output: Vec<i16>,
}

impl HeadEmulation {
    /// 패딩을 뺀 앞쪽 out_ch 개
    pub fn channels(&self, out_ch: usize) -> &[i16] {
        &self.output[..out_ch.min(self.output.len())]
    }
}

/// 골든 Q15 스트림과의 차이는 실패로 멈추지 않고 요약에 기록한다
pub fn emulate_heads(config: &PipelineConfig) -> Result<(Vec<HeadEmulation>, ValidationSummary)> {
    let (artifacts, manifest) = load_manifest(config)?;
    let feature = read_i16_stream(&artifacts.input_stream())?;

    let mut outputs = Vec::new();
    let mut summary = ValidationSummary::new();
    for (name, info) in manifest.heads_in_order()? {
        let params = config.kernel_params(info.output_channels, info.input_channels);
        let fc_stream = read_i16_bin(&artifacts.fc_blob(name))?;
        let output = run_fc_reference(&params, &feature, &fc_stream)?;
        write_flat_stream(&artifacts.expected_out_stream(name), &output)?;
        log::info!(
            "{}: 커널 출력 {}개 (패딩 {}), shift={}",
            name,
            info.output_channels,
            output.len(),
            params.shift
        );

        let golden = read_i16_stream(&artifacts.golden_out_stream(name))?;
        let emulated = &output[..info.output_channels];
        summary.record(compare(
            &format!("{}_emulated", name),
            &ArrayView1::from(golden.as_slice()),
            &ArrayView1::from(emulated),
            &config.validation.emulation,
        ));

        outputs.push(HeadEmulation {
            name: name.to_string(),
            output,
        });
    }
    Ok((outputs, summary))
}
