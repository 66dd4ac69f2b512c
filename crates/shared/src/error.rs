use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error string the instance endpoint returns once an index is past the end.
pub const INDEX_OUT_OF_RANGE: &str = "Index out of range";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
}

impl ApiErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    pub fn index_out_of_range() -> Self {
        Self::new(INDEX_OUT_OF_RANGE)
    }

    pub fn is_index_out_of_range(&self) -> bool {
        self.error == INDEX_OUT_OF_RANGE
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} value '{value}'; expected one of: {expected}")]
pub struct ParseValueError {
    pub kind: &'static str,
    pub value: String,
    pub expected: String,
}

impl ParseValueError {
    pub fn new<'a>(
        kind: &'static str,
        value: &str,
        expected: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self {
            kind,
            value: value.to_string(),
            expected: expected.into_iter().collect::<Vec<_>>().join(", "),
        }
    }
}
