//! 모델 텐서 제공자
//!
//! 텐서 목록(이름, shape, dtype, 인덱스)과 인덱스로 읽기만 노출한다.
//! f16 텐서는 f32로 넓혀서 돌려준다.

use crate::core::errors::{PoseHeadError, Result};
use crate::core::types::{TensorDescriptor, TensorDtype};
use memmap2::Mmap;
use ndarray::{ArrayD, IxDyn};
use safetensors::{Dtype, SafeTensors};
use std::fs::File;
use std::path::{Path, PathBuf};

pub trait TensorProvider {
    /// 모든 텐서의 서술자. index 는 read_tensor 에 쓰는 핸들.
    fn tensor_listing(&self) -> Result<Vec<TensorDescriptor>>;

    fn read_tensor(&self, index: usize) -> Result<ArrayD<f32>>;
}

fn to_tensor_dtype(dtype: Dtype) -> TensorDtype {
    match dtype {
        Dtype::F16 => TensorDtype::F16,
        Dtype::BF16 => TensorDtype::BF16,
        Dtype::F32 => TensorDtype::F32,
        Dtype::F64 => TensorDtype::F64,
        Dtype::I8 => TensorDtype::I8,
        Dtype::I16 => TensorDtype::I16,
        Dtype::I32 => TensorDtype::I32,
        Dtype::U8 => TensorDtype::U8,
        other => TensorDtype::Other(format!("{:?}", other)),
    }
}

/// 원시 little-endian 바이트를 f32로 변환
fn decode_f32(dtype: Dtype, data: &[u8], name: &str) -> Result<Vec<f32>> {
    let values = match dtype {
        Dtype::F32 => data
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect(),
        Dtype::F16 => data
            .chunks_exact(2)
            .map(|c| half::f16::from_bits(u16::from_le_bytes([c[0], c[1]])).to_f32())
            .collect(),
        Dtype::BF16 => data
            .chunks_exact(2)
            .map(|c| half::bf16::from_bits(u16::from_le_bytes([c[0], c[1]])).to_f32())
            .collect(),
        Dtype::F64 => data
            .chunks_exact(8)
            .map(|c| f64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]) as f32)
            .collect(),
        other => {
            return Err(PoseHeadError::Provider(format!(
                "{}: 지원하지 않는 데이터 타입 {:?}",
                name, other
            )))
        }
    };
    Ok(values)
}

/// safetensors 파일 기반 제공자 (mmap)
///
/// 인덱스는 텐서 이름을 정렬한 순서.
pub struct SafetensorsModel {
    path: PathBuf,
    mmap: Mmap,
    names: Vec<String>,
}

impl SafetensorsModel {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        // 읽기 전용 매핑, 파일은 실행 중 바뀌지 않는다고 가정
        let mmap = unsafe { Mmap::map(&file)? };
        let mut names: Vec<String> = Self::parse(&mmap, path)?
            .names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();
        names.sort();
        log::info!("모델 로딩: {} (텐서 {}개)", path.display(), names.len());
        Ok(Self {
            path: path.to_path_buf(),
            mmap,
            names,
        })
    }

    fn parse<'a>(bytes: &'a [u8], path: &Path) -> Result<SafeTensors<'a>> {
        SafeTensors::deserialize(bytes)
            .map_err(|e| PoseHeadError::Provider(format!("{}: {:?}", path.display(), e)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl TensorProvider for SafetensorsModel {
    fn tensor_listing(&self) -> Result<Vec<TensorDescriptor>> {
        let tensors = Self::parse(&self.mmap, &self.path)?;
        let mut listing = Vec::with_capacity(self.names.len());
        for (index, name) in self.names.iter().enumerate() {
            let view = tensors
                .tensor(name)
                .map_err(|e| PoseHeadError::Provider(format!("{}: {:?}", name, e)))?;
            listing.push(TensorDescriptor::new(index, name, view.shape(), to_tensor_dtype(view.dtype())));
        }
        Ok(listing)
    }

    fn read_tensor(&self, index: usize) -> Result<ArrayD<f32>> {
        let name = self
            .names
            .get(index)
            .ok_or_else(|| PoseHeadError::Provider(format!("텐서 인덱스 {} 범위 밖", index)))?;
        let tensors = Self::parse(&self.mmap, &self.path)?;
        let view = tensors
            .tensor(name)
            .map_err(|e| PoseHeadError::Provider(format!("{}: {:?}", name, e)))?;
        let data = decode_f32(view.dtype(), view.data(), name)?;
        ArrayD::from_shape_vec(IxDyn(view.shape()), data)
            .map_err(|e| PoseHeadError::Provider(format!("{}: {}", name, e)))
    }
}

/// 메모리 내 제공자. 인덱스 = 추가 순서.
#[derive(Debug, Clone, Default)]
pub struct MemoryTensorProvider {
    tensors: Vec<(TensorDescriptor, ArrayD<f32>)>,
}

impl MemoryTensorProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, array: ArrayD<f32>) -> usize {
        self.insert_with_dtype(name, array, TensorDtype::F32)
    }

    /// 목록에 보이는 dtype 지정 (값은 f32로 보관)
    pub fn insert_with_dtype(&mut self, name: &str, array: ArrayD<f32>, dtype: TensorDtype) -> usize {
        let index = self.tensors.len();
        let descriptor = TensorDescriptor::new(index, name, array.shape(), dtype);
        self.tensors.push((descriptor, array));
        index
    }

    pub fn with(mut self, name: &str, array: ArrayD<f32>) -> Self {
        self.insert(name, array);
        self
    }
}

impl TensorProvider for MemoryTensorProvider {
    fn tensor_listing(&self) -> Result<Vec<TensorDescriptor>> {
        Ok(self.tensors.iter().map(|(d, _)| d.clone()).collect())
    }

    fn read_tensor(&self, index: usize) -> Result<ArrayD<f32>> {
        self.tensors
            .get(index)
            .map(|(_, a)| a.clone())
            .ok_or_else(|| PoseHeadError::Provider(format!("텐서 인덱스 {} 범위 밖", index)))
    }
}
