//! 비트 단위로 일치하는 FC 커널 참조 모델
//!
//! 출력 채널마다 FC 스트림에서 bias 1개, 가중치 in_ch 개를 읽는다.
//! 32비트 누산기(2의 보수 랩어라운드)에 f·w 를 더하고
//! shift 만큼 산술 시프트한 뒤 Q15로 포화한다.
//! 출력은 8의 배수가 되도록 0으로 채운다.

use crate::core::errors::{PoseHeadError, Result};
use crate::core::packer::padded_len;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SHIFT: u32 = 15;

/// 누산기 초기값에서 bias 를 놓는 위치
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiasAlignment {
    /// 배포된 커널과 동일: acc = bias
    #[default]
    Raw,
    /// Q30 정렬: acc = bias << shift
    Q30,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FcKernelParams {
    pub out_ch: usize,
    pub in_ch: usize,
    pub shift: u32,
    pub bias_alignment: BiasAlignment,
    /// 출력 패딩 단위
    pub output_block: usize,
}

impl FcKernelParams {
    pub fn new(out_ch: usize, in_ch: usize) -> Self {
        Self {
            out_ch,
            in_ch,
            shift: DEFAULT_SHIFT,
            bias_alignment: BiasAlignment::Raw,
            output_block: 8,
        }
    }

    pub fn row_stride(&self) -> usize {
        1 + self.in_ch
    }

    /// 195 → 200, 117 → 120, 1 → 8
    pub fn padded_out_ch(&self) -> usize {
        padded_len(self.out_ch, self.output_block)
    }
}

#[inline]
pub fn sat_q15(x: i32) -> i16 {
    x.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

pub fn run_fc_reference(params: &FcKernelParams, feature: &[i16], fc_stream: &[i16]) -> Result<Vec<i16>> {
    if params.shift >= 32 {
        return Err(PoseHeadError::InvalidConfig(format!("시프트 {} 는 32 미만이어야 함", params.shift)));
    }
    if feature.len() != params.in_ch {
        return Err(PoseHeadError::shape_mismatch("FC 커널 특징 입력", &[params.in_ch], &[feature.len()]));
    }
    let stride = params.row_stride();
    let needed = params.out_ch * stride;
    if fc_stream.len() < needed {
        return Err(PoseHeadError::LengthMismatch {
            context: format!("FC 스트림 (필요 {})", needed),
            length: fc_stream.len(),
            width: stride,
        });
    }

    let mut out = Vec::with_capacity(params.padded_out_ch());
    for row in fc_stream[..needed].chunks_exact(stride) {
        let bias = row[0] as i32;
        let mut acc = match params.bias_alignment {
            BiasAlignment::Raw => bias,
            BiasAlignment::Q30 => bias.wrapping_shl(params.shift),
        };
        for (&f, &w) in feature.iter().zip(&row[1..]) {
            acc = acc.wrapping_add(f as i32 * w as i32);
        }
        out.push(sat_q15(acc >> params.shift));
    }
    out.resize(params.padded_out_ch(), 0);
    Ok(out)
}
