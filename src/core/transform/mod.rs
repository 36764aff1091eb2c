//! 외부 데이터 변환 - 모델 텐서 제공자와 .npy 입출력

pub mod loader;
pub mod npy;

#[cfg(test)]
mod __tests__;

pub use loader::{MemoryTensorProvider, SafetensorsModel, TensorProvider};
pub use npy::{
    parse_header, read_npy_f32, read_npy_header, read_npy_i16, write_npy_f32, write_npy_i16,
    NpyDtype, NpyHeader,
};
