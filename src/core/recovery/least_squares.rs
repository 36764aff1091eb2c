//! 백본 특징 복원 - 스택된 최소제곱
//!
//! 모든 헤드가 같은 입력 x를 공유하므로 y_h = W_h·x + b_h 를 세로로 쌓아
//! A = [W_1; W_2; ...], rhs = [y_1 - b_1; y_2 - b_2; ...] 로 만들고
//! argmin ||A x - rhs||₂ 의 최소 노름 해를 SVD로 구한다.
//! 계산은 전부 f64.

use crate::core::errors::{PoseHeadError, Result};
use nalgebra::{DMatrix, DVector};
use ndarray::{ArrayD, ArrayView1, ArrayView2, IxDyn};
use serde::{Deserialize, Serialize};

/// 랭크 부족(과소결정) 시스템 처리 방침
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankPolicy {
    /// 최소 노름 해를 받아들이고 경고만 남김
    #[default]
    AcceptMinimumNorm,
    /// rank < 미지수 이면 `RankDeficient`
    Reject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// 공유 특징 차원 (W의 열 수)
    pub feature_dim: usize,
    pub rank_policy: RankPolicy,
    /// 특이값 컷오프 비율. None이면 eps · max(m, n) (NumPy lstsq 기본)
    pub rcond: Option<f64>,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            feature_dim: 1152,
            rank_policy: RankPolicy::AcceptMinimumNorm,
            rcond: None,
        }
    }
}

/// 헤드 하나의 관측: 가중치, 바이어스, 골든 출력
#[derive(Debug, Clone)]
pub struct HeadObservation {
    pub name: String,
    /// (out_ch × feature_dim)
    pub weights: DMatrix<f64>,
    pub bias: DVector<f64>,
    pub output: DVector<f64>,
}

impl HeadObservation {
    pub fn new(name: &str, weights: DMatrix<f64>, bias: DVector<f64>, output: DVector<f64>) -> Self {
        Self {
            name: name.to_string(),
            weights,
            bias,
            output,
        }
    }

    /// ndarray 뷰에서 생성 (f64로 확장)
    pub fn from_arrays(
        name: &str,
        weights: ArrayView2<'_, f32>,
        bias: ArrayView1<'_, f32>,
        output: ArrayView1<'_, f32>,
    ) -> Self {
        let (rows, cols) = weights.dim();
        Self {
            name: name.to_string(),
            weights: DMatrix::from_row_iterator(rows, cols, weights.iter().map(|&v| v as f64)),
            bias: DVector::from_iterator(bias.len(), bias.iter().map(|&v| v as f64)),
            output: DVector::from_iterator(output.len(), output.iter().map(|&v| v as f64)),
        }
    }

    fn check(&self, feature_dim: usize) -> Result<()> {
        let (rows, cols) = self.weights.shape();
        if cols != feature_dim {
            return Err(PoseHeadError::shape_mismatch(
                format!("{}: 가중치 열 수", self.name),
                &[rows, feature_dim],
                &[rows, cols],
            ));
        }
        if self.bias.len() != rows {
            return Err(PoseHeadError::shape_mismatch(
                format!("{}: 바이어스", self.name),
                &[rows],
                &[self.bias.len()],
            ));
        }
        if self.output.len() != rows {
            return Err(PoseHeadError::shape_mismatch(
                format!("{}: 골든 출력", self.name),
                &[rows],
                &[self.output.len()],
            ));
        }
        Ok(())
    }

    /// NaN/Inf 가 섞이면 SVD 가 수렴하지 않음
    fn check_finite(&self) -> Result<()> {
        let parts = [
            ("가중치", self.weights.as_slice()),
            ("바이어스", self.bias.as_slice()),
            ("골든 출력", self.output.as_slice()),
        ];
        for (label, values) in parts {
            if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
                return Err(PoseHeadError::Numeric(format!(
                    "{}: {}에 유한하지 않은 값 {} (위치 {})",
                    self.name, label, values[pos], pos
                )));
            }
        }
        Ok(())
    }
}

/// A 안에서 헤드 하나가 차지하는 행 구간
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowBlock {
    pub name: String,
    pub offset: usize,
    pub rows: usize,
}

/// 스택된 선형 시스템 A x = rhs
#[derive(Debug, Clone)]
pub struct LinearSystem {
    pub a: DMatrix<f64>,
    pub rhs: DVector<f64>,
    /// 스택된 골든 출력 y (상대 오차 분모)
    pub targets: DVector<f64>,
    pub blocks: Vec<RowBlock>,
}

impl LinearSystem {
    /// 헤드 순서대로 W를 세로로 쌓고 rhs = y - b 를 이어붙임
    pub fn assemble(heads: &[HeadObservation], feature_dim: usize) -> Result<Self> {
        if heads.is_empty() {
            return Err(PoseHeadError::InvalidConfig("복원할 헤드가 없음".to_string()));
        }
        for head in heads {
            head.check(feature_dim)?;
            head.check_finite()?;
        }

        let total_rows: usize = heads.iter().map(|h| h.weights.nrows()).sum();
        if total_rows == 0 || feature_dim == 0 {
            return Err(PoseHeadError::InvalidConfig(format!(
                "빈 선형 시스템: {}×{}",
                total_rows, feature_dim
            )));
        }
        let mut a = DMatrix::<f64>::zeros(total_rows, feature_dim);
        let mut rhs = DVector::<f64>::zeros(total_rows);
        let mut targets = DVector::<f64>::zeros(total_rows);
        let mut blocks = Vec::with_capacity(heads.len());

        let mut offset = 0;
        for head in heads {
            let rows = head.weights.nrows();
            a.rows_mut(offset, rows).copy_from(&head.weights);
            rhs.rows_mut(offset, rows).copy_from(&(&head.output - &head.bias));
            targets.rows_mut(offset, rows).copy_from(&head.output);
            blocks.push(RowBlock {
                name: head.name.clone(),
                offset,
                rows,
            });
            offset += rows;
        }

        Ok(Self {
            a,
            rhs,
            targets,
            blocks,
        })
    }

    pub fn shape(&self) -> (usize, usize) {
        self.a.shape()
    }
}

/// 헤드별 재구성 오차 (W·x + b − y)
#[derive(Debug, Clone, PartialEq)]
pub struct HeadReconstruction {
    pub name: String,
    pub rows: usize,
    pub max_abs_err: f64,
    pub mean_abs_err: f64,
    pub rms_err: f64,
    /// |diff| / max(|y|, REL_FLOOR) 의 최댓값
    pub max_rel_err: f64,
}

/// 상대 오차 분모 하한
pub const REL_FLOOR: f64 = 1e-8;

/// 복원 진단. 복원된 x는 헤드별 오차를 확인한 뒤에 사용한다.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryDiagnostics {
    pub rows: usize,
    pub cols: usize,
    /// ||A x - rhs||²
    pub residual_sum_squares: f64,
    /// 수치 랭크
    pub rank: usize,
    pub singular_max: f64,
    /// 컷오프 이상 특이값 중 최소
    pub singular_min_retained: f64,
    pub heads: Vec<HeadReconstruction>,
}

impl RecoveryDiagnostics {
    pub fn is_rank_deficient(&self) -> bool {
        self.rank < self.cols
    }

    /// 모든 헤드의 최대 절대 오차가 tolerance 미만인지
    pub fn all_within(&self, tolerance: f64) -> bool {
        self.heads.iter().all(|h| h.max_abs_err < tolerance)
    }

    pub fn head(&self, name: &str) -> Option<&HeadReconstruction> {
        self.heads.iter().find(|h| h.name == name)
    }
}

/// 복원 결과
#[derive(Debug, Clone)]
pub struct RecoveredFeature {
    pub feature: DVector<f64>,
    pub diagnostics: RecoveryDiagnostics,
}

impl RecoveredFeature {
    pub fn to_f32_vec(&self) -> Vec<f32> {
        self.feature.iter().map(|&v| v as f32).collect()
    }

    /// 특징 맵 shape (예: 2×2×288, 행 우선 [h, w, c])으로 변환
    pub fn to_feature_map(&self, shape: &[usize]) -> Result<ArrayD<f32>> {
        let expected: usize = shape.iter().product();
        if expected != self.feature.len() {
            return Err(PoseHeadError::shape_mismatch(
                "특징 맵",
                shape,
                &[self.feature.len()],
            ));
        }
        ArrayD::from_shape_vec(IxDyn(shape), self.to_f32_vec())
            .map_err(|e| PoseHeadError::Numeric(e.to_string()))
    }
}

/// 백본 특징 복원 엔진
#[derive(Debug, Clone, Default)]
pub struct RecoveryEngine {
    pub config: RecoveryConfig,
}

impl RecoveryEngine {
    pub fn new(config: RecoveryConfig) -> Self {
        Self { config }
    }

    pub fn recover(&self, heads: &[HeadObservation]) -> Result<RecoveredFeature> {
        let system = LinearSystem::assemble(heads, self.config.feature_dim)?;
        self.solve(&system)
    }

    /// 최소 노름 최소제곱 해
    pub fn solve(&self, system: &LinearSystem) -> Result<RecoveredFeature> {
        let (rows, cols) = system.shape();
        log::info!("선형 시스템 A {}×{}, rhs {}", rows, cols, system.rhs.len());

        let svd = system.a.clone().svd(true, true);
        let singular_max = svd.singular_values.iter().cloned().fold(0.0f64, f64::max);
        let rcond = self
            .config
            .rcond
            .unwrap_or(f64::EPSILON * rows.max(cols) as f64);
        let cutoff = rcond * singular_max;

        let rank = svd.singular_values.iter().filter(|&&s| s > cutoff).count();
        let singular_min_retained = svd
            .singular_values
            .iter()
            .cloned()
            .filter(|&s| s > cutoff)
            .fold(f64::INFINITY, f64::min);

        if rank < cols {
            match self.config.rank_policy {
                RankPolicy::Reject => {
                    return Err(PoseHeadError::RankDeficient { rank, unknowns: cols });
                }
                RankPolicy::AcceptMinimumNorm => {
                    log::warn!("랭크 부족 시스템 (rank {} < {}), 최소 노름 해 사용", rank, cols);
                }
            }
        }

        let feature = svd
            .solve(&system.rhs, cutoff)
            .map_err(|e| PoseHeadError::Numeric(e.to_string()))?;

        let residual = &system.a * &feature - &system.rhs;
        let residual_sum_squares = residual.norm_squared();

        let heads = system
            .blocks
            .iter()
            .map(|block| {
                let diff = residual.rows(block.offset, block.rows);
                let max_abs_err = diff.iter().fold(0.0f64, |m, v| m.max(v.abs()));
                let max_rel_err = diff
                    .iter()
                    .zip(system.targets.rows(block.offset, block.rows).iter())
                    .fold(0.0f64, |m, (d, y)| m.max(d.abs() / y.abs().max(REL_FLOOR)));
                let (mean_abs_err, rms_err) = if block.rows == 0 {
                    (0.0, 0.0)
                } else {
                    let n = block.rows as f64;
                    (diff.iter().map(|v| v.abs()).sum::<f64>() / n, (diff.norm_squared() / n).sqrt())
                };
                HeadReconstruction {
                    name: block.name.clone(),
                    rows: block.rows,
                    max_abs_err,
                    mean_abs_err,
                    rms_err,
                    max_rel_err,
                }
            })
            .collect::<Vec<_>>();

        log::info!("rank(A) = {}, 잔차 제곱합 = {:.6e}", rank, residual_sum_squares);
        for h in &heads {
            log::info!("  {}: max_abs_err={:.6e}, rms_err={:.6e}", h.name, h.max_abs_err, h.rms_err);
        }

        Ok(RecoveredFeature {
            feature,
            diagnostics: RecoveryDiagnostics {
                rows,
                cols,
                residual_sum_squares,
                rank,
                singular_max,
                singular_min_retained: if rank == 0 { 0.0 } else { singular_min_retained },
                heads,
            },
        })
    }
}

/// 기본 설정(1152 차원, 최소 노름 허용)으로 복원
pub fn recover_feature(heads: &[HeadObservation]) -> Result<RecoveredFeature> {
    RecoveryEngine::default().recover(heads)
}
