//! FC 참조 커널 테스트

use crate::core::errors::PoseHeadError;
use crate::core::kernel::*;

#[test]
fn 손계산_예제_테스트() {
    // f = (0.5, 0.25) in Q15, 두 출력 채널
    let feature = [16384i16, 8192];
    // 행0: bias 0, w = (0.5, 0.5)   → 0.25 + 0.125 = 0.375 → 12288
    // 행1: bias 100, w = (-1.0, 0) → (100 - 2^29) >> 15 = -16384 (산술 시프트 내림)
    let fc = [0i16, 16384, 16384, 100, -32768, 0];
    let params = FcKernelParams::new(2, 2);
    let out = run_fc_reference(&params, &feature, &fc).unwrap();
    assert_eq!(out.len(), 8);
    assert_eq!(out[0], 12288);
    assert_eq!(out[1], -16384);
    assert!(out[2..].iter().all(|&v| v == 0));
}

#[test]
fn q30_바이어스_정렬_테스트() {
    // bias 8192 (0.25) 를 Q30 으로 올리면 시프트 후 그대로 8192
    let feature = [0i16; 4];
    let fc = [8192i16, 1, 2, 3, 4];
    let mut params = FcKernelParams::new(1, 4);
    assert_eq!(run_fc_reference(&params, &feature, &fc).unwrap()[0], 0);
    params.bias_alignment = BiasAlignment::Q30;
    assert_eq!(run_fc_reference(&params, &feature, &fc).unwrap()[0], 8192);
}

#[test]
fn 포화_테스트() {
    // 2·32767² >> 15 = 65530 → 32767
    let feature = [32767i16; 2];
    let fc = [0i16, 32767, 32767, 0, -32768, -32768];
    let out = run_fc_reference(&FcKernelParams::new(2, 2), &feature, &fc).unwrap();
    assert_eq!(out[0], 32767);
    assert_eq!(out[1], -32768);
    assert_eq!(sat_q15(40000), 32767);
    assert_eq!(sat_q15(-40000), -32768);
    assert_eq!(sat_q15(-5), -5);
}

#[test]
fn 출력_패딩_길이_테스트() {
    assert_eq!(FcKernelParams::new(195, 1152).padded_out_ch(), 200);
    assert_eq!(FcKernelParams::new(117, 1152).padded_out_ch(), 120);
    assert_eq!(FcKernelParams::new(1, 1152).padded_out_ch(), 8);
    assert_eq!(FcKernelParams::new(1, 1152).row_stride(), 1153);
}

#[test]
fn 입력_검사_테스트() {
    let params = FcKernelParams::new(2, 3);
    assert!(matches!(
        run_fc_reference(&params, &[1, 2], &[0; 8]),
        Err(PoseHeadError::ShapeMismatch { .. })
    ));
    assert!(matches!(
        run_fc_reference(&params, &[1, 2, 3], &[0; 7]),
        Err(PoseHeadError::LengthMismatch { length: 7, width: 4, .. })
    ));
    // 여분의 PLIO 패딩은 무시
    assert_eq!(run_fc_reference(&params, &[1, 2, 3], &[0; 16]).unwrap().len(), 8);
}
