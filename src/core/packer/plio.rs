//! PLIO 블록 텍스트 스트림

use crate::core::errors::{PoseHeadError, Result};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

/// PLIO 한 줄당 샘플 수
pub const PLIO_BLOCK_SIZE: usize = 8;

fn check_block(block_size: usize) -> Result<()> {
    if block_size == 0 {
        return Err(PoseHeadError::InvalidConfig("블록 크기는 0보다 커야 함".to_string()));
    }
    Ok(())
}

/// block_size 배수로 올림한 길이
pub fn padded_len(len: usize, block_size: usize) -> usize {
    if block_size == 0 {
        return len;
    }
    len.div_ceil(block_size) * block_size
}

/// 뒤쪽을 0으로 채워 block_size 배수로 맞춤
pub fn pad_to_block(values: &[i16], block_size: usize) -> Result<Vec<i16>> {
    check_block(block_size)?;
    let mut padded = values.to_vec();
    padded.resize(padded_len(values.len(), block_size), 0);
    Ok(padded)
}

/// 패딩 제거. 원래 길이보다 짧으면 LengthMismatch.
pub fn unpad(values: &[i16], original_len: usize) -> Result<&[i16]> {
    if values.len() < original_len {
        return Err(PoseHeadError::LengthMismatch {
            context: "패딩 제거".to_string(),
            length: values.len(),
            width: original_len,
        });
    }
    Ok(&values[..original_len])
}

/// 한 줄에 block_size 개씩 공백 구분
pub fn pack_plio(values: &[i16], block_size: usize) -> Result<Vec<String>> {
    let padded = pad_to_block(values, block_size)?;
    Ok(padded
        .chunks(block_size)
        .map(|chunk| {
            chunk
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect())
}

/// PLIO 텍스트 파일 기록. 기록한 줄 수 반환.
pub fn write_plio_stream(path: &Path, values: &[i16], block_size: usize) -> Result<usize> {
    let lines = pack_plio(values, block_size)?;
    let pad = padded_len(values.len(), block_size) - values.len();
    if pad > 0 {
        log::debug!("[PLIO] {}개 0 패딩 → {}샘플 ({})", pad, values.len() + pad, path.display());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(fs::File::create(path)?);
    for line in &lines {
        writeln!(writer, "{}", line)?;
    }
    writer.flush()?;
    Ok(lines.len())
}
