//! 산출물 파일 이름 규칙

use super::config::PathConfiguration;
use crate::core::registry::MANIFEST_FILE_NAME;
use std::path::PathBuf;

/// 모든 산출물 경로를 한곳에서 만든다
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPaths {
    pub weights_dir: PathBuf,
    pub stream_dir: PathBuf,
    pub golden_dir: PathBuf,
}

impl ArtifactPaths {
    pub fn new(paths: &PathConfiguration) -> Self {
        Self {
            weights_dir: paths.weights_dir.clone(),
            stream_dir: paths.stream_dir.clone(),
            golden_dir: paths.golden_dir.clone(),
        }
    }

    // weights_dir

    pub fn manifest(&self) -> PathBuf {
        self.weights_dir.join(MANIFEST_FILE_NAME)
    }

    /// 매니페스트에 기록된 상대 파일명
    pub fn weight_file(&self, file_name: &str) -> PathBuf {
        self.weights_dir.join(file_name)
    }

    pub fn backbone_feature_fp32(&self) -> PathBuf {
        self.weights_dir.join("posehead_backbone_feat_fp32.npy")
    }

    pub fn backbone_feature_q15(&self) -> PathBuf {
        self.weights_dir.join("posehead_backbone_feat_q15.npy")
    }

    // stream_dir

    pub fn head_weight_stream(&self, head: &str) -> PathBuf {
        self.stream_dir.join(format!("{}_head_weights_stream.txt", head))
    }

    pub fn head_bias_stream(&self, head: &str) -> PathBuf {
        self.stream_dir.join(format!("{}_head_bias_stream.txt", head))
    }

    pub fn golden_out_stream(&self, head: &str) -> PathBuf {
        self.stream_dir.join(format!("{}_golden_out_q15.txt", head))
    }

    pub fn input_stream(&self) -> PathBuf {
        self.stream_dir.join("posehead_input_stream.txt")
    }

    /// posehead_input_q15 (.npy / .bin 확장자는 호출 측에서)
    pub fn input_blob_base(&self) -> PathBuf {
        self.stream_dir.join("posehead_input_q15")
    }

    pub fn feature_plio(&self, head: &str) -> PathBuf {
        self.stream_dir.join(format!("{}_feat.txt", head))
    }

    pub fn head_weights_blob_base(&self, head: &str) -> PathBuf {
        self.stream_dir.join(format!("{}_weights_q15", head))
    }

    pub fn head_bias_blob_base(&self, head: &str) -> PathBuf {
        self.stream_dir.join(format!("{}_bias_q15", head))
    }

    pub fn fc_blob(&self, head: &str) -> PathBuf {
        self.stream_dir.join(format!("{}_fc_q15.bin", head))
    }

    pub fn fc_plio(&self, head: &str) -> PathBuf {
        self.stream_dir.join(format!("{}_w.txt", head))
    }

    pub fn expected_out_stream(&self, head: &str) -> PathBuf {
        self.stream_dir.join(format!("{}_expected_out_q15.txt", head))
    }

    // golden_dir

    pub fn golden_input(&self) -> PathBuf {
        self.golden_dir.join("golden_input_fp32.npy")
    }

    pub fn golden_output(&self, name: &str) -> PathBuf {
        self.golden_dir.join(format!("golden_{}_fp32.npy", name))
    }

    /// 추론기가 중간 텐서를 내줄 때만 생성
    pub fn golden_backbone_feature(&self) -> PathBuf {
        self.golden_dir.join("golden_backbone_feat_fp32.npy")
    }

    pub fn golden_q15(&self, head: &str) -> PathBuf {
        self.golden_dir.join(format!("golden_{}_q15.npy", head))
    }
}

/// base 경로에 확장자 붙이기 (posehead_input_q15 → posehead_input_q15.npy)
pub fn with_extension(base: &std::path::Path, ext: &str) -> PathBuf {
    let mut os = base.as_os_str().to_owned();
    os.push(".");
    os.push(ext);
    PathBuf::from(os)
}
