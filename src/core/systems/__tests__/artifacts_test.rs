//! # 산출물 경로 테스트

use crate::core::systems::{with_extension, ArtifactPaths, PathConfiguration};
use std::path::PathBuf;

#[test]
fn 산출물_파일명_테스트() {
    let paths = ArtifactPaths::new(&PathConfiguration::default());
    let streams = PathBuf::from("weights").join("streams");

    assert_eq!(paths.manifest(), PathBuf::from("weights/posehead_manifest.json"));
    assert_eq!(paths.head_weight_stream("pose3d"), streams.join("pose3d_head_weights_stream.txt"));
    assert_eq!(paths.head_bias_stream("flag"), streams.join("flag_head_bias_stream.txt"));
    assert_eq!(paths.golden_out_stream("world"), streams.join("world_golden_out_q15.txt"));
    assert_eq!(paths.input_stream(), streams.join("posehead_input_stream.txt"));
    assert_eq!(paths.feature_plio("flag"), streams.join("flag_feat.txt"));
    assert_eq!(paths.fc_blob("pose3d"), streams.join("pose3d_fc_q15.bin"));
    assert_eq!(paths.fc_plio("pose3d"), streams.join("pose3d_w.txt"));
    assert_eq!(paths.expected_out_stream("world"), streams.join("world_expected_out_q15.txt"));
    assert_eq!(paths.golden_output("heatmap"), PathBuf::from("golden_outputs/golden_heatmap_fp32.npy"));
    assert_eq!(paths.golden_q15("pose3d"), PathBuf::from("golden_outputs/golden_pose3d_q15.npy"));
    assert_eq!(
        paths.backbone_feature_q15(),
        PathBuf::from("weights/posehead_backbone_feat_q15.npy")
    );
}

#[test]
fn 확장자_붙이기_테스트() {
    let paths = ArtifactPaths::new(&PathConfiguration::default());
    let base = paths.input_blob_base();
    assert_eq!(
        with_extension(&base, "npy"),
        PathBuf::from("weights/streams/posehead_input_q15.npy")
    );
    assert_eq!(
        with_extension(&paths.head_weights_blob_base("world"), "bin"),
        PathBuf::from("weights/streams/world_weights_q15.bin")
    );
}
