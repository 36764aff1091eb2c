//! 수치 비교와 실행 요약
//!
//! 비교 실패는 오류가 아니다. 보고서로 남기고 다음 산출물로 진행한다.

pub mod compare;
pub mod summary;

#[cfg(test)]
mod __tests__;

pub use compare::{compare, CompareOptions, ComparisonReport, ErrorMetrics};
pub use summary::ValidationSummary;
