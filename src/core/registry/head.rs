//! 헤드 정의
//!
//! 헤드 = 공통 백본 특징을 입력으로 받는 출력 분기 하나.
//! 가중치 (out, kh, kw, in/(kh·kw)), 바이어스 (out,) 를 가진다.

use crate::core::errors::{PoseHeadError, Result};
use crate::core::locator::SelectorSpec;
use serde::{Deserialize, Serialize};

pub const POSE3D: &str = "pose3d";
pub const WORLD: &str = "world";
pub const FLAG: &str = "flag";

/// 포즈 랜드마크 모델의 공통 입력 채널 (2×2×288)
pub const POSE_LANDMARK_INPUT_CHANNELS: usize = 1152;

/// 헤드 하나의 정적 정보
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadSpec {
    pub name: String,
    pub output_channels: usize,
    pub input_channels: usize,
    /// (kh, kw)
    pub kernel: (usize, usize),
    pub weight_selector: SelectorSpec,
    pub bias_selector: SelectorSpec,
}

impl HeadSpec {
    /// 부분 문자열 선택기로 헤드 생성. 선택기 shape는 헤드 shape에서 유도.
    pub fn conv_head(
        name: &str,
        output_channels: usize,
        input_channels: usize,
        kernel: (usize, usize),
        weight_substring: &str,
        bias_substring: &str,
    ) -> Self {
        let kernel_area = (kernel.0 * kernel.1).max(1);
        let weight_shape = [output_channels, kernel.0, kernel.1, input_channels / kernel_area];
        Self {
            name: name.to_string(),
            output_channels,
            input_channels,
            kernel,
            weight_selector: SelectorSpec::substring(weight_substring, &weight_shape),
            bias_selector: SelectorSpec::substring(bias_substring, &[output_channels]),
        }
    }

    /// 커널 공간 위치 하나당 채널 수 (in / (kh·kw))
    pub fn channels_per_tap(&self) -> usize {
        self.input_channels / (self.kernel.0 * self.kernel.1)
    }

    /// (out, kh, kw, in/(kh·kw))
    pub fn weight_shape(&self) -> Vec<usize> {
        vec![self.output_channels, self.kernel.0, self.kernel.1, self.channels_per_tap()]
    }

    pub fn bias_shape(&self) -> Vec<usize> {
        vec![self.output_channels]
    }

    /// FC 패킹 행 너비 (bias 1 + in)
    pub fn fc_row_stride(&self) -> usize {
        1 + self.input_channels
    }

    /// 정적 일관성 검사
    pub fn validate(&self) -> Result<()> {
        let (kh, kw) = self.kernel;
        if self.output_channels == 0 || self.input_channels == 0 || kh == 0 || kw == 0 {
            return Err(PoseHeadError::InvalidConfig(format!(
                "{}: 채널 수와 커널 크기는 0보다 커야 함",
                self.name
            )));
        }
        if self.input_channels % (kh * kw) != 0 {
            return Err(PoseHeadError::LengthMismatch {
                context: format!("{}: 입력 채널", self.name),
                length: self.input_channels,
                width: kh * kw,
            });
        }
        if let Some(shape) = self.weight_selector.expected_shape() {
            if shape != self.weight_shape().as_slice() {
                return Err(PoseHeadError::shape_mismatch(
                    format!("{}: 가중치 선택기", self.name),
                    &self.weight_shape(),
                    shape,
                ));
            }
        }
        if let Some(shape) = self.bias_selector.expected_shape() {
            if shape != self.bias_shape().as_slice() {
                return Err(PoseHeadError::shape_mismatch(
                    format!("{}: 바이어스 선택기", self.name),
                    &self.bias_shape(),
                    shape,
                ));
            }
        }
        Ok(())
    }
}

/// 헤드 목록. 순서가 곧 선형 시스템의 행 블록 순서.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadRegistry {
    pub heads: Vec<HeadSpec>,
}

impl HeadRegistry {
    pub fn new(heads: Vec<HeadSpec>) -> Result<Self> {
        let registry = Self { heads };
        registry.validate()?;
        Ok(registry)
    }

    /// BlazePose 포즈 랜드마크(full) 모델의 세 헤드
    pub fn pose_landmark() -> Self {
        let input = POSE_LANDMARK_INPUT_CHANNELS;
        Self {
            heads: vec![
                HeadSpec::conv_head(
                    POSE3D,
                    195,
                    input,
                    (2, 2),
                    "model_1/model/convld_3d/Conv2D",
                    "model_1/model/convld_3d/BiasAdd",
                ),
                HeadSpec::conv_head(
                    WORLD,
                    117,
                    input,
                    (2, 2),
                    "model_1/model/convworld_3d/Conv2D",
                    "model_1/model/convworld_3d/BiasAdd",
                ),
                HeadSpec::conv_head(
                    FLAG,
                    1,
                    input,
                    (2, 2),
                    "model_1/model/conv_poseflag/Conv2D",
                    "model_1/model/conv_poseflag/BiasAdd",
                ),
            ],
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.heads.is_empty() {
            return Err(PoseHeadError::InvalidConfig("헤드가 하나도 없음".to_string()));
        }
        for (i, head) in self.heads.iter().enumerate() {
            head.validate()?;
            if self.heads[..i].iter().any(|h| h.name == head.name) {
                return Err(PoseHeadError::InvalidConfig(format!("중복 헤드 이름: {}", head.name)));
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&HeadSpec> {
        self.heads
            .iter()
            .find(|h| h.name == name)
            .ok_or_else(|| PoseHeadError::UnknownHead(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.heads.iter().map(|h| h.name.as_str()).collect()
    }

    /// 모든 헤드 출력 채널 합 (스택된 시스템의 행 수)
    pub fn total_output_channels(&self) -> usize {
        self.heads.iter().map(|h| h.output_channels).sum()
    }
}

impl Default for HeadRegistry {
    fn default() -> Self {
        Self::pose_landmark()
    }
}
