//! 포즈 헤드 Q15 라이브러리
//!
//! 포즈 랜드마크 모델의 출력 헤드(pose3d / world / flag) 가중치를 Q15로 내보내고,
//! 골든 헤드 출력에서 공통 백본 특징을 최소제곱으로 복원해
//! FC 커널용 스트림과 메모리 블롭을 만든다.

pub mod core;
pub mod pipeline;

// 핵심 모듈들 재수출
pub use crate::core::{
    // 오류
    PoseHeadError, Result,
    // 텐서 탐색과 양자화
    HeadRegistry, HeadSpec, Manifest, Q15Quantizer, TensorDescriptor, TensorSelector,
    // 복원과 검증
    RecoveryEngine, ValidationSummary,
    // 설정
    PipelineConfig,
};
pub use crate::pipeline::run_all;
