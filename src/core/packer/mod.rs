//! 하드웨어 스트림 패킹
//!
//! 세 가지 직렬화 형태:
//! - 평탄 텍스트 (한 줄에 값 하나)
//! - PLIO 블록 텍스트 (한 줄에 8개, 뒤쪽 0 패딩)
//! - FC 패킹 행 `[b_i, w_i0 .. w_i,in-1]`
//!
//! 그리고 헤더 없는 little-endian i16 바이너리.

pub mod binary;
pub mod fc_pack;
pub mod plio;
pub mod text;


pub use binary::{read_i16_bin, read_i16_le, write_i16_bin, write_i16_le};
pub use fc_pack::{pack_fc, reshape_weight_stream, HeadBlob};
pub use plio::{pack_plio, pad_to_block, padded_len, unpad, write_plio_stream, PLIO_BLOCK_SIZE};
pub use text::{parse_i16_stream, read_i16_stream, write_flat_stream};
