//! # 포즈 헤드 핵심 모듈
//!
//! 텐서 탐색, Q15 양자화, 특징 복원, 스트림 패킹, 검증, 참조 커널

pub mod errors;
pub mod kernel;
pub mod locator;
pub mod packer;
pub mod quantizer;
pub mod recovery;
pub mod registry;
pub mod systems;
pub mod transform;
pub mod types;
pub mod validator;

// 주요 타입들 재수출
pub use errors::{PoseHeadError, Result};
pub use locator::{locate, SelectorSpec, TensorSelector};
pub use quantizer::{Q15Quantizer, RoundingMode};
pub use recovery::{RecoveryEngine, RankPolicy};
pub use registry::{HeadRegistry, HeadSpec, Manifest};
pub use systems::PipelineConfig;
pub use types::{TensorDescriptor, TensorDtype};
pub use validator::{CompareOptions, ValidationSummary};
