//! # 구성 설정 단위테스트
//!
//! PipelineConfig 기본값, JSON 부분 설정, 일관성 검사

use crate::core::errors::PoseHeadError;
use crate::core::kernel::BiasAlignment;
use crate::core::recovery::RankPolicy;
use crate::core::registry::{HeadRegistry, HeadSpec};
use crate::core::systems::config::*;
use std::path::PathBuf;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn 파이프라인_기본값_테스트() {
        let config = PipelineConfig::default();

        assert_eq!(config.heads.names(), vec!["pose3d", "world", "flag"]);
        assert_eq!(config.feature.shape, vec![2, 2, 288]);
        assert_eq!(config.feature.recovery.feature_dim, 1152);
        assert_eq!(config.feature.recovery.rank_policy, RankPolicy::AcceptMinimumNorm);
        assert_eq!(config.packing.block_size, 8);
        assert_eq!(config.kernel.shift, 15);
        assert_eq!(config.kernel.bias_alignment, BiasAlignment::Raw);
        assert_eq!(config.validation.golden.rtol, 1e-5);
        assert_eq!(config.validation.golden.atol, 1e-7);
        assert_eq!(config.validation.weights.rel_floor, 1e-12);
        assert_eq!(config.golden.input_shape, vec![1, 256, 256, 3]);
        assert_eq!(config.golden.outputs.len(), 5);
        assert_eq!(config.golden.outputs[3].shape, vec![1, 64, 64, 39]);
        assert_eq!(config.paths.stream_dir, PathBuf::from("weights").join("streams"));
        assert!(config.validate().is_ok());

        println!("✅ 파이프라인 기본값 테스트 통과");
    }

    #[test]
    fn 부분_json_설정_테스트() {
        let json = r#"{
            "paths": { "model_path": "model.safetensors" },
            "feature": { "recovery": { "rank_policy": "reject" } },
            "kernel": { "bias_alignment": "q30" }
        }"#;
        let config: PipelineConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.paths.model_path, PathBuf::from("model.safetensors"));
        assert_eq!(config.paths.weights_dir, PathBuf::from("weights"));
        assert_eq!(config.feature.recovery.rank_policy, RankPolicy::Reject);
        assert_eq!(config.feature.recovery.feature_dim, 1152);
        assert_eq!(config.kernel.bias_alignment, BiasAlignment::Q30);
        assert_eq!(config.kernel.shift, 15);
        assert_eq!(config.heads.total_output_channels(), 313);

        println!("✅ 부분 JSON 설정 테스트 통과");
    }

    #[test]
    fn json_파일_왕복_테스트() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg").join("pipeline.json");
        let config = PipelineConfig::default().rooted_at(dir.path());
        config.save_json(&path).unwrap();

        let loaded = PipelineConfig::from_json_file(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.paths.golden_dir, dir.path().join("golden_outputs"));
    }

    #[test]
    fn 특징_차원_불일치_테스트() {
        let mut config = PipelineConfig::default();
        config.feature.shape = vec![2, 2, 100];
        assert!(matches!(config.validate(), Err(PoseHeadError::ShapeMismatch { .. })));
    }

    #[test]
    fn 헤드_입력_채널_불일치_테스트() {
        let heads = HeadRegistry::new(vec![HeadSpec::conv_head("small", 3, 8, (2, 2), "w", "b")]).unwrap();
        let config = PipelineConfig::default().with_heads(heads);
        assert!(config.validate().is_err());

        let mut config = config;
        config.feature.shape = vec![2, 2, 2];
        config.feature.recovery.feature_dim = 8;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn 잘못된_커널_설정_테스트() {
        let mut config = PipelineConfig::default();
        config.kernel.shift = 40;
        assert!(matches!(config.validate(), Err(PoseHeadError::InvalidConfig(_))));

        let mut config = PipelineConfig::default();
        config.packing.block_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn 커널_파라미터_테스트() {
        let config = PipelineConfig::default();
        let params = config.kernel_params(195, 1152);
        assert_eq!(params.padded_out_ch(), 200);
        assert_eq!(params.shift, 15);
    }
}
