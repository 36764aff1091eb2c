//! NumPy .npy 읽기/쓰기 (v1.0, little-endian, C 순서)

use crate::core::errors::{PoseHeadError, Result};
use byteorder::{LittleEndian, WriteBytesExt};
use ndarray::{ArrayBase, ArrayD, Data, Dimension, IxDyn};
use regex::Regex;
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::Path;

const MAGIC: &[u8; 6] = b"\x93NUMPY";
const HEADER_ALIGN: usize = 64;

/// 지원하는 요소 타입
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NpyDtype {
    F2,
    F4,
    F8,
    I2,
    I4,
}

impl NpyDtype {
    pub fn from_descr(descr: &str) -> Option<Self> {
        match descr {
            "<f2" => Some(Self::F2),
            "<f4" => Some(Self::F4),
            "<f8" => Some(Self::F8),
            "<i2" => Some(Self::I2),
            "<i4" => Some(Self::I4),
            _ => None,
        }
    }

    pub fn descr(&self) -> &'static str {
        match self {
            Self::F2 => "<f2",
            Self::F4 => "<f4",
            Self::F8 => "<f8",
            Self::I2 => "<i2",
            Self::I4 => "<i4",
        }
    }

    pub fn item_size(&self) -> usize {
        match self {
            Self::F2 | Self::I2 => 2,
            Self::F4 | Self::I4 => 4,
            Self::F8 => 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NpyHeader {
    pub dtype: NpyDtype,
    pub shape: Vec<usize>,
}

impl NpyHeader {
    pub fn num_elements(&self) -> usize {
        self.shape.iter().product()
    }
}

/// 헤더 딕셔너리 문자열 파싱
pub fn parse_header(text: &str, path: &Path) -> Result<NpyHeader> {
    let descr_re = Regex::new(r"'descr'\s*:\s*'([^']*)'")?;
    let fortran_re = Regex::new(r"'fortran_order'\s*:\s*(True|False)")?;
    let shape_re = Regex::new(r"'shape'\s*:\s*\(([^)]*)\)")?;

    let descr = descr_re
        .captures(text)
        .map(|c| c[1].to_string())
        .ok_or_else(|| PoseHeadError::npy(path, "descr 없음"))?;
    let dtype = NpyDtype::from_descr(&descr)
        .ok_or_else(|| PoseHeadError::npy(path, format!("지원하지 않는 dtype {}", descr)))?;

    if let Some(c) = fortran_re.captures(text) {
        if &c[1] == "True" {
            return Err(PoseHeadError::npy(path, "fortran_order 배열은 지원하지 않음"));
        }
    }

    let shape_text = shape_re
        .captures(text)
        .map(|c| c[1].to_string())
        .ok_or_else(|| PoseHeadError::npy(path, "shape 없음"))?;
    let mut shape = Vec::new();
    for token in shape_text.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let dim = token
            .parse::<usize>()
            .map_err(|_| PoseHeadError::npy(path, format!("잘못된 shape 항목 '{}'", token)))?;
        shape.push(dim);
    }

    Ok(NpyHeader { dtype, shape })
}

/// 매직, 버전, 헤더 길이, 헤더 딕셔너리 읽기
pub fn read_npy_header<R: Read>(reader: &mut R, path: &Path) -> Result<NpyHeader> {
    let mut magic = [0u8; 6];
    reader.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(PoseHeadError::npy(path, "NumPy 매직 넘버가 아님"));
    }

    let mut version = [0u8; 2];
    reader.read_exact(&mut version)?;
    let header_len = if version[0] == 1 {
        let mut len_bytes = [0u8; 2];
        reader.read_exact(&mut len_bytes)?;
        u16::from_le_bytes(len_bytes) as usize
    } else {
        let mut len_bytes = [0u8; 4];
        reader.read_exact(&mut len_bytes)?;
        u32::from_le_bytes(len_bytes) as usize
    };

    let mut header = vec![0u8; header_len];
    reader.read_exact(&mut header)?;
    parse_header(&String::from_utf8_lossy(&header), path)
}

fn read_payload(path: &Path) -> Result<(NpyHeader, Vec<u8>)> {
    let mut file = File::open(path)?;
    let header = read_npy_header(&mut file, path)?;
    let needed = header.num_elements() * header.dtype.item_size();

    let mut payload = Vec::with_capacity(needed);
    file.read_to_end(&mut payload)?;
    if payload.len() < needed {
        return Err(PoseHeadError::npy(
            path,
            format!("데이터 부족: 필요 {} 바이트, 실제 {}", needed, payload.len()),
        ));
    }
    payload.truncate(needed);
    Ok((header, payload))
}

fn into_array<T>(path: &Path, shape: &[usize], data: Vec<T>) -> Result<ArrayD<T>> {
    ArrayD::from_shape_vec(IxDyn(shape), data).map_err(|e| PoseHeadError::npy(path, e.to_string()))
}

/// 부동소수/정수 배열을 f32로 읽음 (f16, f64, i16, i32 변환)
pub fn read_npy_f32(path: &Path) -> Result<ArrayD<f32>> {
    let (header, bytes) = read_payload(path)?;
    let data: Vec<f32> = match header.dtype {
        NpyDtype::F2 => bytes
            .chunks_exact(2)
            .map(|c| half::f16::from_bits(u16::from_le_bytes([c[0], c[1]])).to_f32())
            .collect(),
        NpyDtype::F4 => bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect(),
        NpyDtype::F8 => bytes
            .chunks_exact(8)
            .map(|c| f64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]) as f32)
            .collect(),
        NpyDtype::I2 => bytes
            .chunks_exact(2)
            .map(|c| i16::from_le_bytes([c[0], c[1]]) as f32)
            .collect(),
        NpyDtype::I4 => bytes
            .chunks_exact(4)
            .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]) as f32)
            .collect(),
    };
    into_array(path, &header.shape, data)
}

/// Q15 정수 배열 읽기. i32 파일은 범위를 확인한다.
pub fn read_npy_i16(path: &Path) -> Result<ArrayD<i16>> {
    let (header, bytes) = read_payload(path)?;
    let data: Vec<i16> = match header.dtype {
        NpyDtype::I2 => bytes
            .chunks_exact(2)
            .map(|c| i16::from_le_bytes([c[0], c[1]]))
            .collect(),
        NpyDtype::I4 => {
            let mut values = Vec::with_capacity(header.num_elements());
            for c in bytes.chunks_exact(4) {
                let v = i32::from_le_bytes([c[0], c[1], c[2], c[3]]);
                let q = i16::try_from(v)
                    .map_err(|_| PoseHeadError::npy(path, format!("i16 범위 밖 값 {}", v)))?;
                values.push(q);
            }
            values
        }
        other => {
            return Err(PoseHeadError::npy(
                path,
                format!("정수 배열이 아님 ({})", other.descr()),
            ))
        }
    };
    into_array(path, &header.shape, data)
}

/// 헤더 딕셔너리를 64바이트 경계에 맞춰 직렬화
fn encode_header(dtype: NpyDtype, shape: &[usize]) -> Vec<u8> {
    let shape_text = match shape.len() {
        0 => "()".to_string(),
        1 => format!("({},)", shape[0]),
        _ => format!(
            "({})",
            shape.iter().map(|d| d.to_string()).collect::<Vec<_>>().join(", ")
        ),
    };
    let mut dict = format!(
        "{{'descr': '{}', 'fortran_order': False, 'shape': {}, }}",
        dtype.descr(),
        shape_text
    )
    .into_bytes();

    // 매직 6 + 버전 2 + 길이 2 + 딕셔너리 + '\n'
    let unpadded = MAGIC.len() + 4 + dict.len() + 1;
    let pad = (HEADER_ALIGN - unpadded % HEADER_ALIGN) % HEADER_ALIGN;
    dict.extend(std::iter::repeat(b' ').take(pad));
    dict.push(b'\n');

    let mut out = Vec::with_capacity(MAGIC.len() + 4 + dict.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&[1, 0]);
    out.extend_from_slice(&(dict.len() as u16).to_le_bytes());
    out.extend_from_slice(&dict);
    out
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(BufWriter::new(File::create(path)?))
}

/// `<f4` 배열 저장
pub fn write_npy_f32<S, D>(path: &Path, array: &ArrayBase<S, D>) -> Result<()>
where
    S: Data<Elem = f32>,
    D: Dimension,
{
    let mut writer = create(path)?;
    writer.write_all(&encode_header(NpyDtype::F4, array.shape()))?;
    for &v in array.iter() {
        writer.write_f32::<LittleEndian>(v)?;
    }
    writer.flush()?;
    Ok(())
}

/// `<i2` 배열 저장
pub fn write_npy_i16<S, D>(path: &Path, array: &ArrayBase<S, D>) -> Result<()>
where
    S: Data<Elem = i16>,
    D: Dimension,
{
    let mut writer = create(path)?;
    writer.write_all(&encode_header(NpyDtype::I2, array.shape()))?;
    for &v in array.iter() {
        writer.write_i16::<LittleEndian>(v)?;
    }
    writer.flush()?;
    Ok(())
}
