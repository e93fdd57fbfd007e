//! Structured results for cached aggregate views.
//!
//! Aggregation failures are reported as data, not raised: callers receive
//! `{"error": true, "msg": "..."}` and nothing is cached.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Failure payload for aggregate views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResult {
    pub error: bool,
    pub msg: String,
}

impl ErrorResult {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            error: true,
            msg: msg.into(),
        }
    }

    /// Builds `"<context>: <detail>"`.
    pub fn with_context(context: &str, detail: impl Display) -> Self {
        Self::new(format!("{context}: {detail}"))
    }
}

impl Display for ErrorResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.msg)
    }
}

pub type ViewResult<T> = Result<T, ErrorResult>;

/// Wire shape of a view result: the view itself or the error payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ViewPayload<T> {
    Data(T),
    Error(ErrorResult),
}

impl<T> From<ViewResult<T>> for ViewPayload<T> {
    fn from(value: ViewResult<T>) -> Self {
        match value {
            Ok(data) => Self::Data(data),
            Err(err) => Self::Error(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorResult, ViewPayload, ViewResult};
    use serde_json::json;

    #[test]
    fn error_payload_serializes_flat() {
        let result: ViewResult<Vec<i32>> =
            Err(ErrorResult::with_context("Error getting storefront", "db down"));
        let payload = ViewPayload::from(result);
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({"error": true, "msg": "Error getting storefront: db down"})
        );
    }

    #[test]
    fn data_payload_serializes_as_view() {
        let payload = ViewPayload::from(Ok::<_, ErrorResult>(vec![1, 2]));
        assert_eq!(serde_json::to_value(&payload).unwrap(), json!([1, 2]));
    }
}
