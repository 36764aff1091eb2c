//! FC 패킹 레이아웃
//!
//! 출력 채널 i 의 행 = [b_i, w_i0, w_i1, ..., w_i,in-1]
//! 행 우선으로 평탄화하면 커널이 읽는 순서가 된다.

use super::binary::write_i16_bin;
use super::plio::write_plio_stream;
use crate::core::errors::{PoseHeadError, Result};
use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2};
use std::path::Path;

/// (out × in) 가중치와 (out,) 바이어스를 (out × (1 + in)) 로 패킹
pub fn pack_fc(weights: ArrayView2<'_, i16>, bias: ArrayView1<'_, i16>) -> Result<Array2<i16>> {
    let (out_ch, in_ch) = weights.dim();
    if bias.len() != out_ch {
        return Err(PoseHeadError::shape_mismatch("FC 패킹 바이어스", &[out_ch], &[bias.len()]));
    }

    let mut fc = Array2::<i16>::zeros((out_ch, 1 + in_ch));
    fc.column_mut(0).assign(&bias);
    fc.slice_mut(s![.., 1..]).assign(&weights);
    Ok(fc)
}

/// 평탄 가중치 스트림을 (len / in_ch, in_ch) 로 복원
pub fn reshape_weight_stream(flat: &[i16], in_ch: usize) -> Result<Array2<i16>> {
    if in_ch == 0 || flat.is_empty() || flat.len() % in_ch != 0 {
        return Err(PoseHeadError::LengthMismatch {
            context: "가중치 스트림".to_string(),
            length: flat.len(),
            width: in_ch,
        });
    }
    let out_ch = flat.len() / in_ch;
    Array2::from_shape_vec((out_ch, in_ch), flat.to_vec())
        .map_err(|e| PoseHeadError::Numeric(e.to_string()))
}

/// 헤드 하나의 메모리 블롭 묶음
#[derive(Debug, Clone, PartialEq)]
pub struct HeadBlob {
    pub name: String,
    pub weights: Array2<i16>,
    pub bias: Array1<i16>,
    pub fc: Array2<i16>,
}

impl HeadBlob {
    /// 텍스트 스트림에서 읽은 가중치/바이어스로 블롭 구성.
    /// out_ch 는 스트림 길이에서 추론하고 expected_out_ch 가 있으면 대조한다.
    pub fn from_streams(
        name: &str,
        weight_stream: &[i16],
        bias_stream: &[i16],
        in_ch: usize,
        expected_out_ch: Option<usize>,
    ) -> Result<Self> {
        let weights = reshape_weight_stream(weight_stream, in_ch).map_err(|e| match e {
            PoseHeadError::LengthMismatch { length, width, .. } => PoseHeadError::LengthMismatch {
                context: format!("{}: 가중치 스트림", name),
                length,
                width,
            },
            other => other,
        })?;
        let out_ch = weights.nrows();
        log::info!("{}: IN_CH={}, OUT_CH={} (스트림 길이에서 추론)", name, in_ch, out_ch);

        if let Some(expected) = expected_out_ch {
            if expected != out_ch {
                return Err(PoseHeadError::shape_mismatch(
                    format!("{}: 출력 채널", name),
                    &[expected, in_ch],
                    &[out_ch, in_ch],
                ));
            }
        }
        if bias_stream.len() != out_ch {
            return Err(PoseHeadError::shape_mismatch(
                format!("{}: 바이어스 스트림", name),
                &[out_ch],
                &[bias_stream.len()],
            ));
        }

        let bias = Array1::from(bias_stream.to_vec());
        let fc = pack_fc(weights.view(), bias.view())?;
        Ok(Self {
            name: name.to_string(),
            weights,
            bias,
            fc,
        })
    }

    pub fn out_ch(&self) -> usize {
        self.weights.nrows()
    }

    pub fn in_ch(&self) -> usize {
        self.weights.ncols()
    }

    /// 행 우선 평탄화한 FC 스트림
    pub fn fc_stream(&self) -> Vec<i16> {
        self.fc.iter().copied().collect()
    }

    /// `{name}_fc_q15.bin` 과 `{name}_w.txt` (FC 패킹 PLIO) 기록
    pub fn write_fc(&self, fc_bin: &Path, plio_txt: &Path, block_size: usize) -> Result<()> {
        let stream = self.fc_stream();
        write_i16_bin(fc_bin, &stream)?;
        let lines = write_plio_stream(plio_txt, &stream, block_size)?;
        log::info!(
            "{}: FC 패킹 {:?} → {}개 값, PLIO {}줄",
            self.name,
            self.fc.dim(),
            stream.len(),
            lines
        );
        Ok(())
    }
}
