//! .npy 입출력 테스트

use crate::core::errors::PoseHeadError;
use crate::core::transform::*;
use ndarray::{arr1, Array3, ArrayD, IxDyn};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;

/// 손으로 만든 v1.0 헤더 (16바이트 정렬, 구버전 NumPy 형식)
fn 수동_npy_생성(path: &Path, descr: &str, shape: &str, payload: &[u8]) {
    let mut dict = format!("{{'descr': '{}', 'fortran_order': False, 'shape': {}, }}", descr, shape).into_bytes();
    while (dict.len() + 11) % 16 != 0 {
        dict.push(b' ');
    }
    dict.push(b'\n');
    let mut file = File::create(path).unwrap();
    file.write_all(b"\x93NUMPY").unwrap();
    file.write_all(&[1, 0]).unwrap();
    file.write_all(&(dict.len() as u16).to_le_bytes()).unwrap();
    file.write_all(&dict).unwrap();
    file.write_all(payload).unwrap();
}

#[test]
fn f32_저장_읽기_테스트() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("feat.npy");
    let feat = Array3::<f32>::from_shape_fn((2, 2, 288), |(h, w, c)| (h * 1000 + w * 300 + c) as f32 * 1e-4);
    write_npy_f32(&path, &feat).unwrap();

    let bytes = fs::read(&path).unwrap();
    let header_len = u16::from_le_bytes([bytes[8], bytes[9]]) as usize;
    assert_eq!((10 + header_len) % 64, 0);
    assert_eq!(bytes.len(), 10 + header_len + 1152 * 4);
    let header_text = String::from_utf8_lossy(&bytes[10..10 + header_len]);
    assert!(header_text.contains("'descr': '<f4'"));
    assert!(header_text.contains("'shape': (2, 2, 288)"));
    assert!(header_text.ends_with('\n'));

    let back = read_npy_f32(&path).unwrap();
    assert_eq!(back.shape(), &[2, 2, 288]);
    assert_eq!(back, feat.into_dyn());
}

#[test]
fn i16_저장_읽기_테스트() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sub").join("bias_q15.npy");
    let q = arr1(&[-32768i16, 0, 12, 32767]);
    write_npy_i16(&path, &q).unwrap();

    let text = fs::read(&path).unwrap();
    assert!(String::from_utf8_lossy(&text[..128]).contains("'shape': (4,)"));
    assert_eq!(read_npy_i16(&path).unwrap(), q.into_dyn());
    // f32로도 읽힘
    assert_eq!(read_npy_f32(&path).unwrap()[[3]], 32767.0);
}

#[test]
fn 스칼라_shape_테스트() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scalar.npy");
    let scalar = ArrayD::<f32>::from_elem(IxDyn(&[]), 0.5);
    write_npy_f32(&path, &scalar).unwrap();
    let back = read_npy_f32(&path).unwrap();
    assert_eq!(back.ndim(), 0);
    assert_eq!(back[IxDyn(&[])], 0.5);
}

#[test]
fn 다른_dtype_읽기_테스트() {
    let dir = tempdir().unwrap();

    let f8 = dir.path().join("f8.npy");
    let payload: Vec<u8> = [1.5f64, -2.25].iter().flat_map(|v| v.to_le_bytes()).collect();
    수동_npy_생성(&f8, "<f8", "(2,)", &payload);
    assert_eq!(read_npy_f32(&f8).unwrap().into_raw_vec(), vec![1.5, -2.25]);

    let f2 = dir.path().join("f2.npy");
    let payload: Vec<u8> = [half::f16::from_f32(0.5), half::f16::from_f32(-1.0)]
        .iter()
        .flat_map(|v| v.to_bits().to_le_bytes())
        .collect();
    수동_npy_생성(&f2, "<f2", "(1, 2)", &payload);
    let back = read_npy_f32(&f2).unwrap();
    assert_eq!(back.shape(), &[1, 2]);
    assert_eq!(back.into_raw_vec(), vec![0.5, -1.0]);

    let i4 = dir.path().join("i4.npy");
    let payload: Vec<u8> = [100i32, -32768, 32767].iter().flat_map(|v| v.to_le_bytes()).collect();
    수동_npy_생성(&i4, "<i4", "(3,)", &payload);
    assert_eq!(read_npy_i16(&i4).unwrap().into_raw_vec(), vec![100, -32768, 32767]);
}

#[test]
fn i32_범위_초과_테스트() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("big.npy");
    let payload: Vec<u8> = [40000i32].iter().flat_map(|v| v.to_le_bytes()).collect();
    수동_npy_생성(&path, "<i4", "(1,)", &payload);
    assert!(matches!(read_npy_i16(&path), Err(PoseHeadError::Npy { .. })));
}

#[test]
fn 잘못된_파일_테스트() {
    let dir = tempdir().unwrap();

    let not_npy = dir.path().join("x.npy");
    fs::write(&not_npy, b"hello world, not numpy").unwrap();
    assert!(matches!(read_npy_f32(&not_npy), Err(PoseHeadError::Npy { .. })));

    let big_endian = dir.path().join("be.npy");
    수동_npy_생성(&big_endian, ">f4", "(1,)", &[0, 0, 0, 0]);
    assert!(read_npy_f32(&big_endian).is_err());

    let short = dir.path().join("short.npy");
    수동_npy_생성(&short, "<f4", "(4,)", &[0; 8]);
    assert!(matches!(read_npy_f32(&short), Err(PoseHeadError::Npy { .. })));

    let float_as_int = dir.path().join("float.npy");
    수동_npy_생성(&float_as_int, "<f4", "(1,)", &[0; 4]);
    assert!(read_npy_i16(&float_as_int).is_err());
}

#[test]
fn 헤더_파싱_테스트() {
    let path = Path::new("t.npy");
    let h = parse_header("{'descr': '<f4', 'fortran_order': False, 'shape': (1, 195), }", path).unwrap();
    assert_eq!(h.dtype, NpyDtype::F4);
    assert_eq!(h.shape, vec![1, 195]);
    assert_eq!(h.num_elements(), 195);

    let fortran = parse_header("{'descr': '<f4', 'fortran_order': True, 'shape': (2, 2), }", path);
    assert!(fortran.is_err());
}
