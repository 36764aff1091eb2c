//! 텐서 선택 전략
//!
//! 텐서 이름은 익스포터 명명 규칙에 의존하므로 선택 방식을
//! `TensorSelector` 뒤로 숨긴다. 호출 측은 전략을 몰라도 된다.

use crate::core::errors::{PoseHeadError, Result};
use crate::core::types::TensorDescriptor;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// 텐서 목록에서 정확히 하나를 골라내는 전략
pub trait TensorSelector {
    fn select<'a>(&self, listing: &'a [TensorDescriptor]) -> Result<&'a TensorDescriptor>;

    /// 오류 메시지용 검색 조건 설명
    fn describe(&self) -> String;
}

/// 이름 부분 문자열 + 정확한 shape 일치
#[derive(Debug, Clone)]
pub struct SubstringShapeSelector {
    pub name_substring: String,
    pub expected_shape: Vec<usize>,
}

impl SubstringShapeSelector {
    pub fn new(name_substring: impl Into<String>, expected_shape: &[usize]) -> Self {
        Self {
            name_substring: name_substring.into(),
            expected_shape: expected_shape.to_vec(),
        }
    }
}

impl TensorSelector for SubstringShapeSelector {
    fn select<'a>(&self, listing: &'a [TensorDescriptor]) -> Result<&'a TensorDescriptor> {
        let matches: Vec<&TensorDescriptor> = listing
            .iter()
            .filter(|d| d.name.contains(&self.name_substring) && d.shape == self.expected_shape)
            .collect();
        disambiguate(matches, || self.describe())
    }

    fn describe(&self) -> String {
        format!(
            "substring='{}', expected shape={:?}",
            self.name_substring, self.expected_shape
        )
    }
}

/// 정규식 이름 매칭 + 정확한 shape 일치. 중복 해소 규칙은 부분 문자열과 동일.
#[derive(Debug, Clone)]
pub struct RegexSelector {
    pub pattern: Regex,
    pub expected_shape: Vec<usize>,
}

impl RegexSelector {
    pub fn new(pattern: &str, expected_shape: &[usize]) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            expected_shape: expected_shape.to_vec(),
        })
    }
}

impl TensorSelector for RegexSelector {
    fn select<'a>(&self, listing: &'a [TensorDescriptor]) -> Result<&'a TensorDescriptor> {
        let matches: Vec<&TensorDescriptor> = listing
            .iter()
            .filter(|d| self.pattern.is_match(&d.name) && d.shape == self.expected_shape)
            .collect();
        disambiguate(matches, || self.describe())
    }

    fn describe(&self) -> String {
        format!(
            "regex='{}', expected shape={:?}",
            self.pattern.as_str(),
            self.expected_shape
        )
    }
}

/// 이름 완전 일치. shape가 주어지면 함께 검사.
#[derive(Debug, Clone)]
pub struct ExactNameSelector {
    pub name: String,
    pub expected_shape: Option<Vec<usize>>,
}

impl TensorSelector for ExactNameSelector {
    fn select<'a>(&self, listing: &'a [TensorDescriptor]) -> Result<&'a TensorDescriptor> {
        let matches: Vec<&TensorDescriptor> = listing
            .iter()
            .filter(|d| d.name == self.name)
            .filter(|d| self.expected_shape.as_ref().map_or(true, |s| &d.shape == s))
            .collect();
        match matches.len() {
            0 => Err(PoseHeadError::NotFound {
                criteria: self.describe(),
            }),
            1 => Ok(matches[0]),
            _ => Err(PoseHeadError::Ambiguous {
                criteria: self.describe(),
                candidates: matches.into_iter().cloned().collect(),
            }),
        }
    }

    fn describe(&self) -> String {
        match &self.expected_shape {
            Some(shape) => format!("name='{}', expected shape={:?}", self.name, shape),
            None => format!("name='{}'", self.name),
        }
    }
}

/// 그래프 인덱스 핸들로 직접 선택
#[derive(Debug, Clone)]
pub struct IndexSelector {
    pub index: usize,
    pub expected_shape: Option<Vec<usize>>,
}

impl TensorSelector for IndexSelector {
    fn select<'a>(&self, listing: &'a [TensorDescriptor]) -> Result<&'a TensorDescriptor> {
        let found = listing
            .iter()
            .find(|d| d.index == self.index)
            .ok_or_else(|| PoseHeadError::NotFound {
                criteria: self.describe(),
            })?;

        if let Some(shape) = &self.expected_shape {
            if &found.shape != shape {
                return Err(PoseHeadError::shape_mismatch(
                    format!("텐서 idx={}", self.index),
                    shape,
                    &found.shape,
                ));
            }
        }
        Ok(found)
    }

    fn describe(&self) -> String {
        format!("index={}", self.index)
    }
}

/// 후보 중복 해소: `*dequantize*` 이름이 아닌 후보를 우선한다.
///
/// - 후보 0개 → `NotFound`
/// - 비양자화 후보가 정확히 1개 → 그것
/// - 비양자화 후보가 여러 개 → 그것들만 남김
/// - 남은 후보가 1개 초과 → 모든 후보를 나열한 `Ambiguous`
pub fn disambiguate<'a, F>(matches: Vec<&'a TensorDescriptor>, criteria: F) -> Result<&'a TensorDescriptor>
where
    F: Fn() -> String,
{
    if matches.is_empty() {
        return Err(PoseHeadError::NotFound { criteria: criteria() });
    }

    let non_dequantize: Vec<&TensorDescriptor> = matches
        .iter()
        .copied()
        .filter(|d| !d.is_dequantize_shim())
        .collect();

    let candidates = match non_dequantize.len() {
        1 => return Ok(non_dequantize[0]),
        0 => matches,
        _ => non_dequantize,
    };

    if candidates.len() == 1 {
        return Ok(candidates[0]);
    }

    Err(PoseHeadError::Ambiguous {
        criteria: criteria(),
        candidates: candidates.into_iter().cloned().collect(),
    })
}

/// 설정 파일에 기록되는 선택 전략 서술
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum SelectorSpec {
    Substring { name: String, shape: Vec<usize> },
    Regex { pattern: String, shape: Vec<usize> },
    Exact {
        name: String,
        #[serde(default)]
        shape: Option<Vec<usize>>,
    },
    Index {
        index: usize,
        #[serde(default)]
        shape: Option<Vec<usize>>,
    },
}

impl SelectorSpec {
    pub fn substring(name: impl Into<String>, shape: &[usize]) -> Self {
        SelectorSpec::Substring {
            name: name.into(),
            shape: shape.to_vec(),
        }
    }

    pub fn build(&self) -> Result<Box<dyn TensorSelector>> {
        let selector: Box<dyn TensorSelector> = match self {
            SelectorSpec::Substring { name, shape } => {
                Box::new(SubstringShapeSelector::new(name.clone(), shape))
            }
            SelectorSpec::Regex { pattern, shape } => Box::new(RegexSelector::new(pattern, shape)?),
            SelectorSpec::Exact { name, shape } => Box::new(ExactNameSelector {
                name: name.clone(),
                expected_shape: shape.clone(),
            }),
            SelectorSpec::Index { index, shape } => Box::new(IndexSelector {
                index: *index,
                expected_shape: shape.clone(),
            }),
        };
        Ok(selector)
    }

    /// 선택 결과가 가져야 할 shape (서술에 있는 경우)
    pub fn expected_shape(&self) -> Option<&[usize]> {
        match self {
            SelectorSpec::Substring { shape, .. } | SelectorSpec::Regex { shape, .. } => Some(shape.as_slice()),
            SelectorSpec::Exact { shape, .. } | SelectorSpec::Index { shape, .. } => shape.as_deref(),
        }
    }
}
