//! 텐서 메타데이터 타입

use serde::{Deserialize, Serialize};
use std::fmt;

/// 텐서 원소 타입
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TensorDtype {
    F16,
    BF16,
    F32,
    F64,
    I8,
    I16,
    I32,
    U8,
    Other(String),
}

impl TensorDtype {
    /// 부동소수점 텐서인지 (가중치로 읽을 수 있는지)
    pub fn is_float(&self) -> bool {
        matches!(self, TensorDtype::F16 | TensorDtype::BF16 | TensorDtype::F32 | TensorDtype::F64)
    }
}

impl fmt::Display for TensorDtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TensorDtype::F16 => write!(f, "float16"),
            TensorDtype::BF16 => write!(f, "bfloat16"),
            TensorDtype::F32 => write!(f, "float32"),
            TensorDtype::F64 => write!(f, "float64"),
            TensorDtype::I8 => write!(f, "int8"),
            TensorDtype::I16 => write!(f, "int16"),
            TensorDtype::I32 => write!(f, "int32"),
            TensorDtype::U8 => write!(f, "uint8"),
            TensorDtype::Other(name) => write!(f, "{}", name),
        }
    }
}

/// 모델 그래프 내 텐서 하나의 식별 정보. 모델에서 읽은 뒤 변경하지 않음.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TensorDescriptor {
    pub name: String,
    pub shape: Vec<usize>,
    pub dtype: TensorDtype,
    /// 제공자 내부 핸들 (그래프 인덱스)
    pub index: usize,
}

impl TensorDescriptor {
    pub fn new(index: usize, name: impl Into<String>, shape: &[usize], dtype: TensorDtype) -> Self {
        Self {
            name: name.into(),
            shape: shape.to_vec(),
            dtype,
            index,
        }
    }

    pub fn num_elements(&self) -> usize {
        self.shape.iter().product()
    }

    /// 역양자화 shim 텐서 여부 (대소문자 무시)
    pub fn is_dequantize_shim(&self) -> bool {
        self.name.to_lowercase().contains("dequantize")
    }
}

impl fmt::Display for TensorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "idx={}, name={}, shape={:?}, dtype={}",
            self.index, self.name, self.shape, self.dtype
        )
    }
}
