//! 평탄 텍스트 스트림 (ASCII 10진수)

use crate::core::errors::{PoseHeadError, Result};
use std::fmt::Display;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

/// 한 줄에 값 하나
pub fn write_flat_stream<T: Display>(path: &Path, values: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(fs::File::create(path)?);
    for v in values {
        writeln!(writer, "{}", v)?;
    }
    writer.flush()?;
    Ok(())
}

/// 공백/줄바꿈 배치와 무관하게 정수 토큰을 읽음. i16 범위 밖이면 오류.
pub fn parse_i16_stream(text: &str, path: &Path) -> Result<Vec<i16>> {
    let mut values = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        for token in line.split_whitespace() {
            let value = token.parse::<i16>().map_err(|_| PoseHeadError::StreamParse {
                path: path.to_path_buf(),
                line: line_no + 1,
                token: token.to_string(),
            })?;
            values.push(value);
        }
    }
    Ok(values)
}

pub fn read_i16_stream(path: &Path) -> Result<Vec<i16>> {
    let text = fs::read_to_string(path)?;
    parse_i16_stream(&text, path)
}
