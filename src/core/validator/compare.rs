//! 골든 대비 후보 배열 비교

use ndarray::{ArrayBase, Data, Dimension};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 허용 오차
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareOptions {
    pub rtol: f64,
    pub atol: f64,
    /// 상대 오차 분모 하한: max(|golden|, rel_floor)
    pub rel_floor: f64,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self::golden()
    }
}

impl CompareOptions {
    /// 모델 재실행 출력 비교용
    pub fn golden() -> Self {
        Self {
            rtol: 1e-5,
            atol: 1e-7,
            rel_floor: 1e-8,
        }
    }

    /// 내보낸 가중치 재검증용
    pub fn weights() -> Self {
        Self {
            rel_floor: 1e-12,
            ..Self::golden()
        }
    }

    /// |c − g| ≤ atol + rtol·|g|. NaN은 항상 실패.
    pub fn is_close(&self, golden: f64, candidate: f64) -> bool {
        if golden == candidate {
            return true;
        }
        (candidate - golden).abs() <= self.atol + self.rtol * golden.abs()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ErrorMetrics {
    pub max_abs_err: f64,
    pub mean_abs_err: f64,
    pub rms_err: f64,
    pub max_rel_err: f64,
}

/// 비교 결과 하나
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub name: String,
    pub golden_shape: Vec<usize>,
    pub candidate_shape: Vec<usize>,
    /// shape 불일치면 None
    pub metrics: Option<ErrorMetrics>,
    pub passed: bool,
}

impl ComparisonReport {
    /// 외부에서 계산한 지표로 보고서 구성 (예: 특징 복원 재구성 오차)
    pub fn from_metrics(name: &str, shape: &[usize], metrics: ErrorMetrics, passed: bool) -> Self {
        Self {
            name: name.to_string(),
            golden_shape: shape.to_vec(),
            candidate_shape: shape.to_vec(),
            metrics: Some(metrics),
            passed,
        }
    }

    pub fn shape_matches(&self) -> bool {
        self.golden_shape == self.candidate_shape
    }
}

impl fmt::Display for ComparisonReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== {} ===", self.name)?;
        match &self.metrics {
            None => {
                writeln!(f, "  SHAPE MISMATCH!")?;
                writeln!(f, "    golden   : {:?}", self.golden_shape)?;
                write!(f, "    candidate: {:?}", self.candidate_shape)
            }
            Some(m) => {
                writeln!(f, "  shape        : {:?}", self.golden_shape)?;
                writeln!(f, "  max_abs_err  : {:.6e}", m.max_abs_err)?;
                writeln!(f, "  mean_abs_err : {:.6e}", m.mean_abs_err)?;
                writeln!(f, "  rms_err      : {:.6e}", m.rms_err)?;
                writeln!(f, "  max_rel_err  : {:.6e}", m.max_rel_err)?;
                write!(f, "  allclose     : {}", self.passed)
            }
        }
    }
}

/// NaN이 한 번이라도 나오면 NaN 유지
fn nan_max(acc: f64, value: f64) -> f64 {
    if acc.is_nan() || value.is_nan() {
        f64::NAN
    } else {
        acc.max(value)
    }
}

/// 두 배열을 f64로 비교. shape 불일치는 실패 보고서로 돌려준다.
pub fn compare<A, B, S1, S2, D1, D2>(
    name: &str,
    golden: &ArrayBase<S1, D1>,
    candidate: &ArrayBase<S2, D2>,
    options: &CompareOptions,
) -> ComparisonReport
where
    A: Copy + Into<f64>,
    B: Copy + Into<f64>,
    S1: Data<Elem = A>,
    S2: Data<Elem = B>,
    D1: Dimension,
    D2: Dimension,
{
    let golden_shape = golden.shape().to_vec();
    let candidate_shape = candidate.shape().to_vec();

    if golden_shape != candidate_shape {
        log::warn!("{}: shape 불일치 golden={:?}, candidate={:?}", name, golden_shape, candidate_shape);
        return ComparisonReport {
            name: name.to_string(),
            golden_shape,
            candidate_shape,
            metrics: None,
            passed: false,
        };
    }

    let mut metrics = ErrorMetrics::default();
    let mut sum_abs = 0.0f64;
    let mut sum_sq = 0.0f64;
    let mut passed = true;
    let count = golden.len();

    for (&g, &c) in golden.iter().zip(candidate.iter()) {
        let (g, c): (f64, f64) = (g.into(), c.into());
        let abs = (c - g).abs();
        let rel = abs / g.abs().max(options.rel_floor);

        metrics.max_abs_err = nan_max(metrics.max_abs_err, abs);
        metrics.max_rel_err = nan_max(metrics.max_rel_err, rel);
        sum_abs += abs;
        sum_sq += abs * abs;
        passed &= options.is_close(g, c);
    }

    if count > 0 {
        metrics.mean_abs_err = sum_abs / count as f64;
        metrics.rms_err = (sum_sq / count as f64).sqrt();
    }

    ComparisonReport {
        name: name.to_string(),
        golden_shape,
        candidate_shape,
        metrics: Some(metrics),
        passed,
    }
}
