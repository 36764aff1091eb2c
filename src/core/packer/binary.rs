//! 헤더 없는 little-endian i16 바이너리

use crate::core::errors::{PoseHeadError, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fs;
use std::io::{BufWriter, Cursor, Read, Write};
use std::path::Path;

pub fn write_i16_le<W: Write>(writer: &mut W, values: &[i16]) -> Result<()> {
    for &v in values {
        writer.write_i16::<LittleEndian>(v)?;
    }
    Ok(())
}

/// 바이트 수가 홀수면 LengthMismatch
pub fn read_i16_le<R: Read>(reader: &mut R) -> Result<Vec<i16>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    if bytes.len() % 2 != 0 {
        return Err(PoseHeadError::LengthMismatch {
            context: "i16 바이너리".to_string(),
            length: bytes.len(),
            width: 2,
        });
    }
    let mut cursor = Cursor::new(bytes);
    let count = cursor.get_ref().len() / 2;
    let mut values = Vec::with_capacity(count);
    for _ in 0..count {
        values.push(cursor.read_i16::<LittleEndian>()?);
    }
    Ok(values)
}

pub fn write_i16_bin(path: &Path, values: &[i16]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(fs::File::create(path)?);
    write_i16_le(&mut writer, values)?;
    writer.flush()?;
    Ok(())
}

pub fn read_i16_bin(path: &Path) -> Result<Vec<i16>> {
    let mut file = fs::File::open(path)?;
    read_i16_le(&mut file)
}
