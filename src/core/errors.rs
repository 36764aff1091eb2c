//! 파이프라인 오류 분류
//!
//! 구조적 오류(NotFound / Ambiguous / ShapeMismatch / LengthMismatch)는
//! 해당 단계를 즉시 중단시킨다. 수치 비교 실패는 오류가 아니며
//! `validator::ValidationSummary`에 모인다.

use crate::core::types::TensorDescriptor;
use std::path::PathBuf;
use thiserror::Error;

/// 크레이트 공통 Result
pub type Result<T> = std::result::Result<T, PoseHeadError>;

#[derive(Debug, Error)]
pub enum PoseHeadError {
    /// 조건에 맞는 텐서가 하나도 없음
    #[error("텐서를 찾을 수 없음: {criteria}")]
    NotFound { criteria: String },

    /// 비양자화 우선 규칙 이후에도 후보가 여러 개 남음
    #[error("모호한 텐서 매칭: {criteria}{}", render_candidates(.candidates))]
    Ambiguous {
        criteria: String,
        candidates: Vec<TensorDescriptor>,
    },

    #[error("{context}: shape 불일치 (기대 {expected:?}, 실제 {actual:?})")]
    ShapeMismatch {
        context: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// 평탄화된 스트림 길이가 행 너비로 나누어 떨어지지 않음
    #[error("{context}: 길이 {length}이(가) 너비 {width}의 배수가 아님")]
    LengthMismatch {
        context: String,
        length: usize,
        width: usize,
    },

    #[error("랭크 부족 시스템: rank {rank} < 미지수 {unknowns}")]
    RankDeficient { rank: usize, unknowns: usize },

    #[error("수치 계산 실패: {0}")]
    Numeric(String),

    #[error("알 수 없는 헤드: {0}")]
    UnknownHead(String),

    #[error("NumPy 파일 오류 {path:?}: {reason}")]
    Npy { path: PathBuf, reason: String },

    #[error("스트림 파싱 오류 {path:?}:{line}: '{token}'")]
    StreamParse {
        path: PathBuf,
        line: usize,
        token: String,
    },

    #[error("잘못된 설정: {0}")]
    InvalidConfig(String),

    #[error("텐서 제공자 오류: {0}")]
    Provider(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Regex(#[from] regex::Error),
}

impl PoseHeadError {
    pub fn shape_mismatch(context: impl Into<String>, expected: &[usize], actual: &[usize]) -> Self {
        Self::ShapeMismatch {
            context: context.into(),
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }

    pub fn npy(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Npy {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

fn render_candidates(candidates: &[TensorDescriptor]) -> String {
    candidates
        .iter()
        .map(|d| {
            format!(
                "\n  idx={}, name={}, shape={:?}, dtype={}",
                d.index, d.name, d.shape, d.dtype
            )
        })
        .collect()
}
