//! 헤드 레지스트리와 매니페스트

pub mod head;
pub mod manifest;


pub use head::{HeadRegistry, HeadSpec, FLAG, POSE3D, POSE_LANDMARK_INPUT_CHANNELS, WORLD};
pub use manifest::{Manifest, ManifestHead, MANIFEST_FILE_NAME};
