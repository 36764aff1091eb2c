//! 고정소수점 양자화

pub mod q15;


pub use q15::{
    dequantize_q15, quantize_q15, quantize_q15_scalar, Q15Quantizer, QuantizationStats,
    RoundingMode, Q15_HALF_LSB, Q15_MAX, Q15_MIN, Q15_SCALE,
};
