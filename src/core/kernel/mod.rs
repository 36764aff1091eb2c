//! FC 헤드 커널의 소프트웨어 참조 모델

pub mod fc_reference;

#[cfg(test)]
mod __tests__;

pub use fc_reference::{run_fc_reference, sat_q15, BiasAlignment, FcKernelParams, DEFAULT_SHIFT};
