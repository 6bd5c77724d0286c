//! Invocation - resolver 呼び出し 1 回分の入力
//!
//! transport 層が組み立てて `Registry::handle` に渡す、不変の値です。
//!
//! # ワイヤ形式
//! ```json
//! { "resolve": "user.name", "context": { "arguments": {}, "source": null, "identity": null } }
//! ```
//!
//! # root / nested
//! - `source` が無い、または `null` → root invocation（payload は `arguments`）
//! - それ以外 → nested invocation（payload は `source`、`arguments` は無視）

use std::fmt;

use serde::de::Deserializer;
use serde::ser::{Error as _, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

/// Undecoded JSON bytes.
///
/// Holds whatever the caller handed over, including malformed JSON; validity is
/// only checked when the registry decodes it.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct RawPayload(Vec<u8>);

impl RawPayload {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// True when the payload is the JSON literal `null`.
    pub fn is_null(&self) -> bool {
        self.0.trim_ascii() == b"null"
    }
}

impl fmt::Debug for RawPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawPayload({})", String::from_utf8_lossy(&self.0))
    }
}

impl From<&str> for RawPayload {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl From<String> for RawPayload {
    fn from(s: String) -> Self {
        Self(s.into_bytes())
    }
}

impl From<Vec<u8>> for RawPayload {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<serde_json::Value> for RawPayload {
    fn from(value: serde_json::Value) -> Self {
        Self(value.to_string().into_bytes())
    }
}

impl Serialize for RawPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let raw: &RawValue = serde_json::from_slice(&self.0).map_err(S::Error::custom)?;
        raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RawPayload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        Ok(Self(raw.get().as_bytes().to_vec()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    arguments: Option<RawPayload>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<RawPayload>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    identity: Option<RawPayload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    resolve: String,
    #[serde(default)]
    context: Context,
}

impl Invocation {
    pub fn new(resolve: impl Into<String>) -> Self {
        Self {
            resolve: resolve.into(),
            context: Context::default(),
        }
    }

    pub fn with_arguments(mut self, arguments: impl Into<RawPayload>) -> Self {
        self.context.arguments = Some(arguments.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<RawPayload>) -> Self {
        self.context.source = Some(source.into());
        self
    }

    pub fn with_identity(mut self, identity: impl Into<RawPayload>) -> Self {
        self.context.identity = Some(identity.into());
        self
    }

    pub fn resolve(&self) -> &str {
        &self.resolve
    }

    pub fn arguments(&self) -> Option<&RawPayload> {
        self.context.arguments.as_ref()
    }

    pub fn source(&self) -> Option<&RawPayload> {
        self.context.source.as_ref()
    }

    pub fn is_root(&self) -> bool {
        self.context.source.as_ref().is_none_or(RawPayload::is_null)
    }

    /// The payload decoded into the handler's first parameter.
    pub fn payload(&self) -> Option<&RawPayload> {
        if self.is_root() {
            self.arguments()
        } else {
            self.source()
        }
    }

    pub fn identity(&self) -> Option<&RawPayload> {
        self.context.identity.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::no_source(None, true)]
    #[case::null_source(Some("null"), true)]
    #[case::padded_null_source(Some(" null\n"), true)]
    #[case::object_source(Some(r#"{"id":1}"#), false)]
    #[case::malformed_source(Some("{not json"), false)]
    fn is_root_follows_source(#[case] source: Option<&str>, #[case] expected: bool) {
        let mut inv = Invocation::new("r").with_arguments(r#"{"bar":"x"}"#);
        if let Some(source) = source {
            inv = inv.with_source(source);
        }
        assert_eq!(inv.is_root(), expected);
    }

    #[test]
    fn root_payload_is_arguments() {
        let inv = Invocation::new("r")
            .with_arguments(r#"{"bar":"x"}"#)
            .with_source("null");
        assert_eq!(inv.payload().unwrap().as_bytes(), br#"{"bar":"x"}"#);
    }

    #[test]
    fn nested_payload_is_source_and_ignores_arguments() {
        let inv = Invocation::new("r")
            .with_arguments(r#"{"bar":"x"}"#)
            .with_source(r#"{"bar":"parent"}"#);
        assert!(!inv.is_root());
        assert_eq!(inv.payload().unwrap().as_bytes(), br#"{"bar":"parent"}"#);
    }

    #[test]
    fn root_payload_may_be_absent() {
        let inv = Invocation::new("r");
        assert!(inv.is_root());
        assert!(inv.payload().is_none());
        assert!(inv.identity().is_none());
    }

    #[test]
    fn deserializes_wire_shape() {
        let wire = r#"{
            "resolve": "echoIdentity",
            "context": { "arguments": {"bar": "x"}, "source": null, "identity": {"bar": "y"} }
        }"#;
        let inv: Invocation = serde_json::from_str(wire).unwrap();

        assert_eq!(inv.resolve(), "echoIdentity");
        assert!(inv.is_root());
        assert_eq!(inv.payload().unwrap().as_bytes(), br#"{"bar": "x"}"#);
        assert_eq!(inv.identity().unwrap().as_bytes(), br#"{"bar": "y"}"#);
    }

    #[test]
    fn null_identity_on_the_wire_is_absent() {
        let wire = r#"{"resolve":"r","context":{"arguments":{},"identity":null}}"#;
        let inv: Invocation = serde_json::from_str(wire).unwrap();
        assert!(inv.identity().is_none());
    }

    #[test]
    fn serializes_back_to_wire_shape() {
        let inv = Invocation::new("r")
            .with_arguments(serde_json::json!({ "bar": "x" }))
            .with_identity(r#"{"bar":"y"}"#);
        let wire = serde_json::to_value(&inv).unwrap();
        assert_eq!(
            wire,
            serde_json::json!({
                "resolve": "r",
                "context": { "arguments": { "bar": "x" }, "identity": { "bar": "y" } }
            })
        );
    }

    #[test]
    fn malformed_payload_cannot_be_serialized() {
        let inv = Invocation::new("r").with_arguments("not valid json");
        assert!(serde_json::to_string(&inv).is_err());
    }
}
