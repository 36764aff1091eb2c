//! Q15 고정소수점 양자화
//!
//! q = round(x · 2^15), [-32768, 32767]로 포화. 원소별 변환이므로 shape 보존.
//! 기본 반올림은 NumPy `np.round`와 같은 round-half-to-even.

use ndarray::{Array, ArrayBase, Data, Dimension};
use serde::{Deserialize, Serialize};

/// Q15 스케일 (2^15)
pub const Q15_SCALE: f64 = 32768.0;
pub const Q15_MIN: i16 = i16::MIN;
pub const Q15_MAX: i16 = i16::MAX;

/// 역양자화 시 반올림 오차 상한 (1/65536)
pub const Q15_HALF_LSB: f64 = 1.0 / 65536.0;

/// 반올림 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// 0.5 → 0, 1.5 → 2 (NumPy 기본)
    #[default]
    HalfEven,
    /// 0.5 → 1, -0.5 → -1
    HalfAwayFromZero,
}

/// 양자화 통계
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantizationStats {
    pub num_elements: usize,
    /// 범위를 벗어나 포화된 원소 수
    pub saturated: usize,
    pub min: i16,
    pub max: i16,
}

/// Q15 양자화기
#[derive(Debug, Clone, Copy, Default)]
pub struct Q15Quantizer {
    pub rounding: RoundingMode,
}

impl Q15Quantizer {
    pub fn new(rounding: RoundingMode) -> Self {
        Self { rounding }
    }

    fn round_scaled(&self, value: f64) -> f64 {
        let scaled = value * Q15_SCALE;
        match self.rounding {
            RoundingMode::HalfEven => scaled.round_ties_even(),
            RoundingMode::HalfAwayFromZero => scaled.round(),
        }
    }

    /// 스칼라 하나 양자화. NaN은 0.
    pub fn quantize_scalar(&self, value: f64) -> i16 {
        let rounded = self.round_scaled(value);
        if rounded.is_nan() {
            return 0;
        }
        rounded.clamp(Q15_MIN as f64, Q15_MAX as f64) as i16
    }

    /// 배열 양자화 (shape 보존)
    pub fn quantize<A, S, D>(&self, values: &ArrayBase<S, D>) -> Array<i16, D>
    where
        A: Copy + Into<f64>,
        S: Data<Elem = A>,
        D: Dimension,
    {
        values.mapv(|v| self.quantize_scalar(v.into()))
    }

    /// 슬라이스 양자화
    pub fn quantize_slice<A>(&self, values: &[A]) -> Vec<i16>
    where
        A: Copy + Into<f64>,
    {
        values.iter().map(|&v| self.quantize_scalar(v.into())).collect()
    }

    /// 양자화 + 포화/범위 통계
    pub fn quantize_with_stats<A, S, D>(&self, values: &ArrayBase<S, D>) -> (Array<i16, D>, QuantizationStats)
    where
        A: Copy + Into<f64>,
        S: Data<Elem = A>,
        D: Dimension,
    {
        let saturated = values
            .iter()
            .filter(|&&v| {
                let rounded = self.round_scaled(v.into());
                rounded > Q15_MAX as f64 || rounded < Q15_MIN as f64
            })
            .count();

        let quantized = self.quantize(values);
        let (min, max) = quantized
            .iter()
            .fold((Q15_MAX, Q15_MIN), |(lo, hi), &q| (lo.min(q), hi.max(q)));
        let stats = QuantizationStats {
            num_elements: quantized.len(),
            saturated,
            min: if quantized.is_empty() { 0 } else { min },
            max: if quantized.is_empty() { 0 } else { max },
        };
        (quantized, stats)
    }
}

/// 기본(half-even) 규칙으로 Q15 양자화
pub fn quantize_q15<A, S, D>(values: &ArrayBase<S, D>) -> Array<i16, D>
where
    A: Copy + Into<f64>,
    S: Data<Elem = A>,
    D: Dimension,
{
    Q15Quantizer::default().quantize(values)
}

/// 스칼라 Q15 양자화
pub fn quantize_q15_scalar(value: f64) -> i16 {
    Q15Quantizer::default().quantize_scalar(value)
}

/// 역양자화: q / 32768
pub fn dequantize_q15<S, D>(values: &ArrayBase<S, D>) -> Array<f32, D>
where
    S: Data<Elem = i16>,
    D: Dimension,
{
    values.mapv(|q| (q as f64 / Q15_SCALE) as f32)
}
