//! # 파이프라인 구성 설정
//!
//! 모든 단계는 이 설정 하나를 인자로 받는다. 모듈 수준 경로 상수는 없다.
//! JSON 파일에서 읽을 수 있고, 빠진 항목은 기본값(포즈 랜드마크 모델)으로 채운다.

use crate::core::errors::{PoseHeadError, Result};
use crate::core::kernel::{BiasAlignment, FcKernelParams, DEFAULT_SHIFT};
use crate::core::packer::PLIO_BLOCK_SIZE;
use crate::core::quantizer::RoundingMode;
use crate::core::recovery::RecoveryConfig;
use crate::core::registry::{HeadRegistry, FLAG, POSE3D, WORLD};
use crate::core::validator::CompareOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 파이프라인 전체 설정
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// 입출력 경로
    pub paths: PathConfiguration,
    /// 헤드 정의 (순서 = 선형 시스템 행 블록 순서)
    pub heads: HeadRegistry,
    /// 백본 특징 복원
    pub feature: FeatureConfiguration,
    /// 양자화
    pub quantization: QuantizationConfiguration,
    /// 스트림 패킹
    pub packing: PackingConfiguration,
    /// FC 참조 커널
    pub kernel: KernelConfiguration,
    /// 비교 허용 오차
    pub validation: ValidationConfiguration,
    /// 골든 입출력 정의
    pub golden: GoldenConfiguration,
}

/// 1. 경로 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfiguration {
    /// safetensors 모델 파일
    pub model_path: PathBuf,
    /// fp32 / q15 가중치와 매니페스트
    pub weights_dir: PathBuf,
    /// 텍스트/바이너리 스트림
    pub stream_dir: PathBuf,
    /// 골든 입출력 .npy
    pub golden_dir: PathBuf,
}

/// 2. 특징 복원 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfiguration {
    /// 특징 맵 shape [h, w, c]. 원소 수 = recovery.feature_dim
    pub shape: Vec<usize>,
    pub recovery: RecoveryConfig,
    /// 헤드별 재구성 최대 절대 오차 허용치
    pub reconstruction_tolerance: f64,
}

/// 3. 양자화 설정
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuantizationConfiguration {
    pub rounding: RoundingMode,
}

/// 4. 패킹 설정
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackingConfiguration {
    /// PLIO 한 줄 샘플 수
    pub block_size: usize,
}

/// 5. 커널 설정
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfiguration {
    pub shift: u32,
    pub bias_alignment: BiasAlignment,
    /// 출력 패딩 단위
    pub output_block: usize,
}

/// 6. 검증 설정
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfiguration {
    /// 모델 재실행 출력 비교
    pub golden: CompareOptions,
    /// 내보낸 가중치 재검증
    pub weights: CompareOptions,
    /// 커널 에뮬레이션 출력과 골든 Q15 비교
    pub emulation: CompareOptions,
}

/// 골든 출력 하나: 파일 이름 키와 shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldenOutputSpec {
    pub name: String,
    pub shape: Vec<usize>,
}

impl GoldenOutputSpec {
    pub fn new(name: &str, shape: &[usize]) -> Self {
        Self {
            name: name.to_string(),
            shape: shape.to_vec(),
        }
    }
}

/// 7. 골든 입출력 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoldenConfiguration {
    pub input_shape: Vec<usize>,
    /// 추론기 출력 순서 그대로
    pub outputs: Vec<GoldenOutputSpec>,
}

impl Default for PathConfiguration {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("pose_landmark_full.safetensors"),
            weights_dir: PathBuf::from("weights"),
            stream_dir: PathBuf::from("weights").join("streams"),
            golden_dir: PathBuf::from("golden_outputs"),
        }
    }
}

impl Default for FeatureConfiguration {
    fn default() -> Self {
        Self {
            shape: vec![2, 2, 288],
            recovery: RecoveryConfig::default(),
            reconstruction_tolerance: 1e-3,
        }
    }
}

impl Default for PackingConfiguration {
    fn default() -> Self {
        Self {
            block_size: PLIO_BLOCK_SIZE,
        }
    }
}

impl Default for KernelConfiguration {
    fn default() -> Self {
        Self {
            shift: DEFAULT_SHIFT,
            bias_alignment: BiasAlignment::Raw,
            output_block: 8,
        }
    }
}

impl Default for ValidationConfiguration {
    fn default() -> Self {
        Self {
            golden: CompareOptions::golden(),
            weights: CompareOptions::weights(),
            // Q15 정수 비교: 양자화 누적 오차와 시프트 내림으로 몇 LSB 차이가 난다
            emulation: CompareOptions {
                rtol: 0.0,
                atol: 4.0,
                rel_floor: 1.0,
            },
        }
    }
}

impl Default for GoldenConfiguration {
    fn default() -> Self {
        Self {
            input_shape: vec![1, 256, 256, 3],
            outputs: vec![
                GoldenOutputSpec::new(POSE3D, &[1, 195]),
                GoldenOutputSpec::new(FLAG, &[1, 1]),
                GoldenOutputSpec::new("seg", &[1, 256, 256, 1]),
                GoldenOutputSpec::new("heatmap", &[1, 64, 64, 39]),
                GoldenOutputSpec::new(WORLD, &[1, 117]),
            ],
        }
    }
}

impl PipelineConfig {
    /// JSON 파일에서 읽고 검증
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: PipelineConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// 작은 합성 모델 등 다른 헤드 구성으로 교체
    pub fn with_heads(mut self, heads: HeadRegistry) -> Self {
        self.heads = heads;
        self
    }

    /// 경로를 한 루트 아래로 모음 (weights/, weights/streams/, golden_outputs/)
    pub fn rooted_at(mut self, root: &Path) -> Self {
        let defaults = PathConfiguration::default();
        self.paths.weights_dir = root.join(defaults.weights_dir);
        self.paths.stream_dir = root.join(defaults.stream_dir);
        self.paths.golden_dir = root.join(defaults.golden_dir);
        self
    }

    /// 설정 간 일관성 검사
    pub fn validate(&self) -> Result<()> {
        self.heads.validate()?;

        let feature_len: usize = self.feature.shape.iter().product();
        if feature_len != self.feature.recovery.feature_dim {
            return Err(PoseHeadError::shape_mismatch(
                "특징 맵 shape",
                &[self.feature.recovery.feature_dim],
                &[feature_len],
            ));
        }
        for head in &self.heads.heads {
            if head.input_channels != self.feature.recovery.feature_dim {
                return Err(PoseHeadError::shape_mismatch(
                    format!("{}: 입력 채널", head.name),
                    &[self.feature.recovery.feature_dim],
                    &[head.input_channels],
                ));
            }
        }
        if self.packing.block_size == 0 || self.kernel.output_block == 0 {
            return Err(PoseHeadError::InvalidConfig("블록 크기는 0보다 커야 함".to_string()));
        }
        if self.kernel.shift >= 32 {
            return Err(PoseHeadError::InvalidConfig(format!(
                "커널 시프트 {} 는 32 미만이어야 함",
                self.kernel.shift
            )));
        }
        Ok(())
    }

    /// 헤드 하나의 커널 파라미터
    pub fn kernel_params(&self, out_ch: usize, in_ch: usize) -> FcKernelParams {
        FcKernelParams {
            out_ch,
            in_ch,
            shift: self.kernel.shift,
            bias_alignment: self.kernel.bias_alignment,
            output_block: self.kernel.output_block,
        }
    }
}
