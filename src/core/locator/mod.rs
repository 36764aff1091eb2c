//! 텐서 위치 탐색 - (이름, shape) → TensorDescriptor

pub mod selector;


pub use selector::{
    disambiguate, ExactNameSelector, IndexSelector, RegexSelector, SelectorSpec,
    SubstringShapeSelector, TensorSelector,
};

use crate::core::errors::Result;
use crate::core::types::TensorDescriptor;

/// 이름 부분 문자열과 정확한 shape로 텐서 하나를 찾는다.
pub fn locate<'a>(
    listing: &'a [TensorDescriptor],
    name_substring: &str,
    expected_shape: &[usize],
) -> Result<&'a TensorDescriptor> {
    SubstringShapeSelector::new(name_substring, expected_shape).select(listing)
}
