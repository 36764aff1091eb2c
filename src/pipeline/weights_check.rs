//! 2단계: 내보낸 fp32 가중치를 모델 텐서와 다시 대조

use super::export::locate_head_tensors;
use super::{load_manifest, quantizer};
use crate::core::errors::Result;
use crate::core::transform::{read_npy_f32, read_npy_i16, TensorProvider};
use crate::core::validator::{compare, ComparisonReport, ValidationSummary};
use crate::core::systems::PipelineConfig;

/// 모델 텐서(golden)와 저장된 fp32 파일(candidate) 비교.
/// Q15 파일은 저장된 fp32 를 다시 양자화한 결과와 정확히 같아야 한다.
pub fn check_exported_weights(config: &PipelineConfig, provider: &dyn TensorProvider) -> Result<ValidationSummary> {
    let (artifacts, manifest) = load_manifest(config)?;
    let listing = provider.tensor_listing()?;
    let q15 = quantizer(config);
    let options = &config.validation.weights;
    let mut summary = ValidationSummary::new();

    for (name, files) in manifest.heads_in_order()? {
        let head = config.heads.get(name)?;
        let (weight, bias) = locate_head_tensors(head, &listing)?;

        let checks = [
            ("weights", weight.index, &files.w_fp32, &files.w_q15),
            ("bias", bias.index, &files.b_fp32, &files.b_q15),
        ];
        for (kind, index, fp32_file, q15_file) in checks {
            let model = provider.read_tensor(index)?;
            let saved = read_npy_f32(&artifacts.weight_file(fp32_file))?;
            summary.record(compare(&format!("{}_{}", name, kind), &model, &saved, options));

            let saved_q15 = read_npy_i16(&artifacts.weight_file(q15_file))?;
            let requantized = q15.quantize(&saved);
            let exact = saved_q15 == requantized;
            let report = compare(&format!("{}_{}_q15", name, kind), &requantized, &saved_q15, options);
            summary.record(ComparisonReport {
                passed: report.passed && exact,
                ..report
            });
        }
    }

    Ok(summary)
}
