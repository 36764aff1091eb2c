//! # 파이프라인 시스템 설정
//!
//! 구성 설정과 산출물 경로 규칙

pub mod artifacts;
pub mod config;

pub use artifacts::{with_extension, ArtifactPaths};
pub use config::{
    FeatureConfiguration, GoldenConfiguration, GoldenOutputSpec, KernelConfiguration,
    PackingConfiguration, PathConfiguration, PipelineConfig, QuantizationConfiguration,
    ValidationConfiguration,
};

// 테스트 모듈들
#[cfg(test)]
pub mod __tests__;
