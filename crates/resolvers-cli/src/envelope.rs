//! Response envelope written back to the caller, one JSON object per invocation.

use resolvers_core::ResolveError;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize, PartialEq)]
pub struct ErrorBody {
    pub kind: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Envelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl Envelope {
    pub fn from_result(result: Result<Value, ResolveError>) -> Self {
        match result {
            Ok(data) => Self {
                data: Some(data),
                error: None,
            },
            Err(err) => Self {
                data: err.partial().cloned(),
                error: Some(ErrorBody {
                    kind: err.kind().as_str(),
                    message: err.to_string(),
                }),
            },
        }
    }

    /// The input line was not an invocation at all.
    pub fn invalid_invocation(err: &serde_json::Error) -> Self {
        Self {
            data: None,
            error: Some(ErrorBody {
                kind: "INVALID_INVOCATION",
                message: err.to_string(),
            }),
        }
    }
}
