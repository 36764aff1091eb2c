//! 골든 입출력 기록과 재검증
//!
//! 모델 실행 자체는 `InferenceRunner` 구현에 맡긴다.

use crate::core::errors::{PoseHeadError, Result};
use crate::core::systems::{ArtifactPaths, PipelineConfig};
use crate::core::transform::{read_npy_f32, write_npy_f32};
use crate::core::validator::{compare, ValidationSummary};
use ndarray::{ArrayD, Axis};
use std::path::{Path, PathBuf};

/// 전체 모델 추론기
pub trait InferenceRunner {
    /// 입력 하나에 대해 설정된 순서의 출력 전부
    fn run(&mut self, input: &ArrayD<f32>) -> Result<Vec<ArrayD<f32>>>;

    /// 마지막 실행의 백본 특징 (위임 실행기가 중간 텐서를 숨기면 None)
    fn backbone_feature(&mut self) -> Option<ArrayD<f32>> {
        None
    }
}

/// 미리 기록된 출력을 돌려주는 추론기
#[derive(Debug, Clone, Default)]
pub struct RecordedRunner {
    pub outputs: Vec<ArrayD<f32>>,
    pub backbone: Option<ArrayD<f32>>,
    /// 지금까지 받은 입력 수
    pub calls: usize,
}

impl RecordedRunner {
    pub fn new(outputs: Vec<ArrayD<f32>>) -> Self {
        Self {
            outputs,
            backbone: None,
            calls: 0,
        }
    }

    pub fn with_backbone(mut self, feature: ArrayD<f32>) -> Self {
        self.backbone = Some(feature);
        self
    }

    /// 디렉터리의 `golden_{name}_fp32.npy` 들을 설정 순서대로 읽는다
    pub fn from_dir(config: &PipelineConfig, dir: &Path) -> Result<Self> {
        let artifacts = ArtifactPaths {
            golden_dir: dir.to_path_buf(),
            ..ArtifactPaths::new(&config.paths)
        };
        let outputs = config
            .golden
            .outputs
            .iter()
            .map(|spec| read_npy_f32(&artifacts.golden_output(&spec.name)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(outputs))
    }
}

impl InferenceRunner for RecordedRunner {
    fn run(&mut self, _input: &ArrayD<f32>) -> Result<Vec<ArrayD<f32>>> {
        self.calls += 1;
        Ok(self.outputs.clone())
    }

    fn backbone_feature(&mut self) -> Option<ArrayD<f32>> {
        self.backbone.clone()
    }
}

/// (1, 1, H, W, C) → (1, H, W, C). 그 외 shape 는 그대로.
pub fn squeeze_input(input: ArrayD<f32>) -> ArrayD<f32> {
    if input.ndim() == 5 && input.shape()[1] == 1 {
        input.index_axis_move(Axis(1), 0)
    } else {
        input
    }
}

fn run_checked(
    config: &PipelineConfig,
    runner: &mut dyn InferenceRunner,
    input: &ArrayD<f32>,
) -> Result<Vec<ArrayD<f32>>> {
    let outputs = runner.run(input)?;
    let expected = config.golden.outputs.len();
    if outputs.len() != expected {
        return Err(PoseHeadError::shape_mismatch("추론 출력 개수", &[expected], &[outputs.len()]));
    }
    Ok(outputs)
}

/// 입력을 한 번 실행해 출력 전부와 입력을 golden_dir 에 저장
pub fn capture_golden(
    config: &PipelineConfig,
    runner: &mut dyn InferenceRunner,
    input: ArrayD<f32>,
) -> Result<Vec<PathBuf>> {
    let artifacts = ArtifactPaths::new(&config.paths);
    let input = squeeze_input(input);
    if input.shape() != config.golden.input_shape.as_slice() {
        return Err(PoseHeadError::shape_mismatch(
            "골든 입력",
            &config.golden.input_shape,
            input.shape(),
        ));
    }
    log::info!("골든 입력 shape: {:?}", input.shape());

    let outputs = run_checked(config, runner, &input)?;
    let mut written = Vec::with_capacity(outputs.len() + 2);
    for (spec, output) in config.golden.outputs.iter().zip(&outputs) {
        if output.shape() != spec.shape.as_slice() {
            return Err(PoseHeadError::shape_mismatch(
                format!("골든 출력 {}", spec.name),
                &spec.shape,
                output.shape(),
            ));
        }
        let path = artifacts.golden_output(&spec.name);
        write_npy_f32(&path, output)?;
        log::info!("  {:<8} {:?} → {}", spec.name, output.shape(), path.display());
        written.push(path);
    }

    match runner.backbone_feature() {
        Some(feature) => {
            let path = artifacts.golden_backbone_feature();
            write_npy_f32(&path, &feature)?;
            log::info!("백본 특징 저장: {:?}", feature.shape());
            written.push(path);
        }
        None => log::warn!("백본 특징 텐서를 읽을 수 없음. 최종 출력만 저장."),
    }

    let input_path = artifacts.golden_input();
    write_npy_f32(&input_path, &input)?;
    written.push(input_path);
    Ok(written)
}

/// 저장된 골든 입력으로 다시 실행해 저장된 출력과 비교
pub fn validate_golden(config: &PipelineConfig, runner: &mut dyn InferenceRunner) -> Result<ValidationSummary> {
    let artifacts = ArtifactPaths::new(&config.paths);
    let input = read_npy_f32(&artifacts.golden_input())?;
    log::info!("골든 입력 shape: {:?}", input.shape());

    let current = run_checked(config, runner, &input)?;
    let mut summary = ValidationSummary::new();
    for (spec, output) in config.golden.outputs.iter().zip(&current) {
        let golden = read_npy_f32(&artifacts.golden_output(&spec.name))?;
        summary.record(compare(&spec.name, &golden, output, &config.validation.golden));
    }
    Ok(summary)
}
