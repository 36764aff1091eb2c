//! # 시스템 설정 테스트

pub mod artifacts_test;
pub mod config_test;
