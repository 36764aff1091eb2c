//! 가중치 매니페스트 (posehead_manifest.json)
//!
//! 한 번 기록하고 여러 번 읽는다. 이후 모든 단계의 채널 수는 여기서 온다.

use super::head::{HeadRegistry, HeadSpec};
use crate::core::errors::{PoseHeadError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const MANIFEST_FILE_NAME: &str = "posehead_manifest.json";

/// 헤드별 산출물 파일명과 채널 정보
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestHead {
    pub w_fp32: String,
    pub w_q15: String,
    pub b_fp32: String,
    pub b_q15: String,
    #[serde(rename = "out_ch")]
    pub output_channels: usize,
    #[serde(rename = "in_ch")]
    pub input_channels: usize,
    /// [kh, kw]
    pub kernel: [usize; 2],
}

impl ManifestHead {
    pub fn for_head(head: &HeadSpec) -> Self {
        Self {
            w_fp32: format!("{}_w_fp32.npy", head.name),
            w_q15: format!("{}_w_q15.npy", head.name),
            b_fp32: format!("{}_b_fp32.npy", head.name),
            b_q15: format!("{}_b_q15.npy", head.name),
            output_channels: head.output_channels,
            input_channels: head.input_channels,
            kernel: [head.kernel.0, head.kernel.1],
        }
    }

    /// (out, kh, kw, in/(kh·kw))
    pub fn weight_shape(&self) -> Vec<usize> {
        let [kh, kw] = self.kernel;
        vec![self.output_channels, kh, kw, self.input_channels / (kh * kw).max(1)]
    }

    pub fn bias_shape(&self) -> Vec<usize> {
        vec![self.output_channels]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub model: String,
    pub weights_dir: String,
    pub heads: BTreeMap<String, ManifestHead>,
    /// 헤드 기록 순서. 비어 있으면 키 순서.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub head_order: Vec<String>,
}

impl Manifest {
    pub fn from_registry(registry: &HeadRegistry, model: &str, weights_dir: &str) -> Self {
        let heads = registry
            .heads
            .iter()
            .map(|h| (h.name.clone(), ManifestHead::for_head(h)))
            .collect();
        Self {
            model: model.to_string(),
            weights_dir: weights_dir.to_string(),
            heads,
            head_order: registry.heads.iter().map(|h| h.name.clone()).collect(),
        }
    }

    pub fn head(&self, name: &str) -> Result<&ManifestHead> {
        self.heads
            .get(name)
            .ok_or_else(|| PoseHeadError::UnknownHead(name.to_string()))
    }

    /// 기록 순서대로 (이름, 정보)
    pub fn heads_in_order(&self) -> Result<Vec<(&str, &ManifestHead)>> {
        if self.head_order.is_empty() {
            return Ok(self.heads.iter().map(|(k, v)| (k.as_str(), v)).collect());
        }
        let mut ordered = Vec::with_capacity(self.head_order.len());
        for name in &self.head_order {
            ordered.push((name.as_str(), self.head(name)?));
        }
        Ok(ordered)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let manifest: Manifest = serde_json::from_str(&text)?;
        Ok(manifest)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
