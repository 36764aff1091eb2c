//! 작은 합성 포즈 헤드 모델
//!
//! 특징 2×2×2 (8차원), 헤드 5 + 4 + 1 행. 행이 열보다 많아 특징이 정확히 복원된다.

use crate::core::kernel::BiasAlignment;
use crate::core::registry::{HeadRegistry, HeadSpec};
use crate::core::systems::{GoldenOutputSpec, PipelineConfig};
use crate::core::transform::MemoryTensorProvider;
use crate::pipeline::{capture_golden, RecordedRunner};
use ndarray::{Array1, ArrayD, IxDyn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;
use tempfile::TempDir;

pub const HEADS: [(&str, usize); 3] = [("alpha", 5), ("beta", 4), ("gamma", 1)];
pub const FEATURE_DIM: usize = 8;

pub fn weight_name(head: &str) -> String {
    format!("model/{}/Conv2D", head)
}

pub fn bias_name(head: &str) -> String {
    format!("model/{}/BiasAdd", head)
}

pub fn synthetic_config(root: &Path) -> PipelineConfig {
    let heads = HEADS
        .iter()
        .map(|&(name, out)| HeadSpec::conv_head(name, out, FEATURE_DIM, (2, 2), &weight_name(name), &bias_name(name)))
        .collect();
    let mut config = PipelineConfig::default()
        .with_heads(HeadRegistry::new(heads).unwrap())
        .rooted_at(root);
    config.feature.shape = vec![2, 2, 2];
    config.feature.recovery.feature_dim = FEATURE_DIM;
    config.kernel.bias_alignment = BiasAlignment::Q30;
    config.golden.input_shape = vec![1, 4, 4, 3];
    config.golden.outputs = HEADS
        .iter()
        .map(|&(name, out)| GoldenOutputSpec::new(name, &[1, out]))
        .collect();
    config
}

pub struct SyntheticModel {
    pub dir: TempDir,
    pub config: PipelineConfig,
    pub provider: MemoryTensorProvider,
    /// (h, w, c) 행 우선
    pub feature: Vec<f32>,
    /// 헤드 순서의 (1, out) 출력
    pub outputs: Vec<ArrayD<f32>>,
    /// 헤드 순서의 (out × in) 평탄 가중치
    pub weights: Vec<Vec<f32>>,
}

impl SyntheticModel {
    pub fn new(seed: u64) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = synthetic_config(dir.path());
        let mut rng = StdRng::seed_from_u64(seed);

        let feature: Vec<f32> = (0..FEATURE_DIM).map(|_| rng.gen_range(-0.25f32..0.25)).collect();
        let mut provider = MemoryTensorProvider::new();
        let mut outputs = Vec::new();
        let mut weights = Vec::new();

        for &(name, out) in &HEADS {
            let w: Vec<f32> = (0..out * FEATURE_DIM).map(|_| rng.gen_range(-0.01f32..0.01)).collect();
            let b: Vec<f32> = (0..out).map(|_| rng.gen_range(-0.1f32..0.1)).collect();
            let y: Vec<f32> = (0..out)
                .map(|o| {
                    let dot: f64 = (0..FEATURE_DIM)
                        .map(|i| w[o * FEATURE_DIM + i] as f64 * feature[i] as f64)
                        .sum();
                    (dot + b[o] as f64) as f32
                })
                .collect();

            provider.insert(
                &weight_name(name),
                ArrayD::from_shape_vec(IxDyn(&[out, 2, 2, 2]), w.clone()).unwrap(),
            );
            provider.insert(&bias_name(name), Array1::from(b).into_dyn());
            outputs.push(ArrayD::from_shape_vec(IxDyn(&[1, out]), y).unwrap());
            weights.push(w);
        }
        // 같은 이름/shape 의 역양자화 텐서는 선택에서 밀려나야 한다
        provider.insert(
            &format!("{}_dequantize", weight_name("alpha")),
            ArrayD::zeros(IxDyn(&[5, 2, 2, 2])),
        );

        Self {
            dir,
            config,
            provider,
            feature,
            outputs,
            weights,
        }
    }

    pub fn runner(&self) -> RecordedRunner {
        RecordedRunner::new(self.outputs.clone())
    }

    /// 골든 출력과 입력 기록 (입력은 (1,1,4,4,3) 로 넘겨 squeeze 확인)
    pub fn capture(&self) {
        let input = ArrayD::from_elem(IxDyn(&[1, 1, 4, 4, 3]), 0.5f32);
        capture_golden(&self.config, &mut self.runner(), input).unwrap();
    }
}
