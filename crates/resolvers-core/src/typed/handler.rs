//! Handler - 型付き resolver 関数と型消去
//!
//! # 二層構造
//! - **表層（Typed）**: `Fn(A) -> O` / `Fn(A, I) -> O` をそのまま登録
//! - **内部（Dyn）**: `DynResolver` trait - object-safe, decode + invoke
//!
//! # 学習ポイント
//! - Marker 型パラメータ (`IntoResolver<fn(A) -> O>`) で arity ごとに impl を分ける
//! - PhantomData で引数型を保持したまま関数を Box に格納
//! - decode 先の型は登録時に静的に決まるので、dispatch 時の型検査は不要

use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use super::output::HandlerOutput;
use crate::domain::errors::ResolveError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Receives the decoded payload only.
    Unary,
    /// Receives the decoded payload and the decoded identity.
    Binary,
}

/// Object-safe, type-erased resolver.
///
/// `payload` is the active payload of the invocation (`null` when absent) and
/// `identity` the raw identity, if the invocation carried one.
pub trait DynResolver: Send + Sync {
    fn resolve(
        &self,
        name: &str,
        payload: &[u8],
        identity: Option<&[u8]>,
    ) -> Result<Value, ResolveError>;
}

pub struct UnaryResolver<F, A, O> {
    handler: F,
    _marker: PhantomData<fn(A) -> O>,
}

impl<F, A, O> UnaryResolver<F, A, O>
where
    F: Fn(A) -> O,
{
    pub fn new(handler: F) -> Self {
        Self {
            handler,
            _marker: PhantomData,
        }
    }
}

impl<F, A, O> DynResolver for UnaryResolver<F, A, O>
where
    F: Fn(A) -> O + Send + Sync,
    A: DeserializeOwned,
    O: HandlerOutput,
{
    fn resolve(
        &self,
        name: &str,
        payload: &[u8],
        _identity: Option<&[u8]>,
    ) -> Result<Value, ResolveError> {
        let args: A = decode_payload(name, payload)?;
        settle(name, (self.handler)(args))
    }
}

pub struct BinaryResolver<F, A, I, O> {
    handler: F,
    _marker: PhantomData<fn(A, I) -> O>,
}

impl<F, A, I, O> BinaryResolver<F, A, I, O>
where
    F: Fn(A, I) -> O,
{
    pub fn new(handler: F) -> Self {
        Self {
            handler,
            _marker: PhantomData,
        }
    }
}

impl<F, A, I, O> DynResolver for BinaryResolver<F, A, I, O>
where
    F: Fn(A, I) -> O + Send + Sync,
    A: DeserializeOwned,
    I: DeserializeOwned + Default,
    O: HandlerOutput,
{
    fn resolve(
        &self,
        name: &str,
        payload: &[u8],
        identity: Option<&[u8]>,
    ) -> Result<Value, ResolveError> {
        let args: A = decode_payload(name, payload)?;
        let ident: I = decode_identity(name, identity)?;
        settle(name, (self.handler)(args, ident))
    }
}

// A `null` payload decodes as itself first (unit, `Option<T>`), then as `{}` so
// structs whose fields all have defaults get their zero value.
fn decode_payload<A: DeserializeOwned>(name: &str, payload: &[u8]) -> Result<A, ResolveError> {
    match serde_json::from_slice(payload) {
        Ok(args) => Ok(args),
        Err(source) => {
            if payload.trim_ascii() == b"null"
                && let Ok(args) = serde_json::from_slice(b"{}")
            {
                return Ok(args);
            }
            Err(ResolveError::ArgumentDecode {
                name: name.to_string(),
                source,
            })
        }
    }
}

// Absent and `null` identities both leave the identity at its default value.
fn decode_identity<I: DeserializeOwned + Default>(
    name: &str,
    identity: Option<&[u8]>,
) -> Result<I, ResolveError> {
    match identity {
        Some(raw) if raw.trim_ascii() != b"null" => {
            serde_json::from_slice(raw).map_err(|source| ResolveError::IdentityDecode {
                name: name.to_string(),
                source,
            })
        }
        _ => Ok(I::default()),
    }
}

fn settle<O: HandlerOutput>(name: &str, output: O) -> Result<Value, ResolveError> {
    let (value, error) = output.into_parts();
    match error {
        Some(source) => {
            let partial = match value.map(serde_json::to_value).transpose() {
                Ok(partial) => partial,
                Err(e) => {
                    warn!(resolver = name, error = %e, "dropping partial result that cannot be encoded");
                    None
                }
            };
            Err(ResolveError::Handler {
                name: name.to_string(),
                source,
                partial,
            })
        }
        None => match value {
            Some(value) => {
                serde_json::to_value(value).map_err(|source| ResolveError::ResultEncode {
                    name: name.to_string(),
                    source,
                })
            }
            None => Ok(Value::Null),
        },
    }
}

/// Registry entry: the handler's recorded signature plus its erased callable.
pub struct Descriptor {
    name: String,
    arity: Arity,
    argument_type: &'static str,
    identity_type: Option<&'static str>,
    resolver: Box<dyn DynResolver>,
}

impl Descriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn argument_type(&self) -> &'static str {
        self.argument_type
    }

    pub fn identity_type(&self) -> Option<&'static str> {
        self.identity_type
    }

    pub(crate) fn resolve(
        &self,
        payload: &[u8],
        identity: Option<&[u8]>,
    ) -> Result<Value, ResolveError> {
        self.resolver.resolve(&self.name, payload, identity)
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .field("argument_type", &self.argument_type)
            .field("identity_type", &self.identity_type)
            .finish_non_exhaustive()
    }
}

/// Functions that can be registered as resolvers.
///
/// Implemented for `Fn(A) -> O` and `Fn(A, I) -> O`; the `Marker` parameter
/// only keeps the two impls apart. Any other signature fails to compile at the
/// `Registry::add` call site.
pub trait IntoResolver<Marker>: Sized {
    fn into_descriptor(self, name: String) -> Descriptor;
}

impl<F, A, O> IntoResolver<fn(A) -> O> for F
where
    F: Fn(A) -> O + Send + Sync + 'static,
    A: DeserializeOwned + 'static,
    O: HandlerOutput + 'static,
{
    fn into_descriptor(self, name: String) -> Descriptor {
        Descriptor {
            name,
            arity: Arity::Unary,
            argument_type: type_name::<A>(),
            identity_type: None,
            resolver: Box::new(UnaryResolver::new(self)),
        }
    }
}

impl<F, A, I, O> IntoResolver<fn(A, I) -> O> for F
where
    F: Fn(A, I) -> O + Send + Sync + 'static,
    A: DeserializeOwned + 'static,
    I: DeserializeOwned + Default + 'static,
    O: HandlerOutput + 'static,
{
    fn into_descriptor(self, name: String) -> Descriptor {
        Descriptor {
            name,
            arity: Arity::Binary,
            argument_type: type_name::<A>(),
            identity_type: Some(type_name::<I>()),
            resolver: Box::new(BinaryResolver::new(self)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::{BoxError, ErrorKind};
    use crate::typed::output::Partial;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Deserialize)]
    struct Args {
        bar: String,
    }

    #[derive(Debug, Default, Deserialize)]
    struct Ident {
        bar: String,
    }

    #[derive(Debug, Serialize)]
    struct Resp {
        #[serde(rename = "Foo")]
        foo: String,
    }

    fn echo(args: Args) -> Result<Resp, BoxError> {
        Ok(Resp { foo: args.bar })
    }

    fn echo_identity(_args: Args, ident: Ident) -> Result<Resp, BoxError> {
        Ok(Resp { foo: ident.bar })
    }

    #[test]
    fn unary_descriptor_records_signature() {
        let d = echo.into_descriptor("echo".to_string());
        assert_eq!(d.arity(), Arity::Unary);
        assert!(d.argument_type().ends_with("Args"));
        assert!(d.identity_type().is_none());
    }

    #[test]
    fn binary_descriptor_records_signature() {
        let d = echo_identity.into_descriptor("echoIdentity".to_string());
        assert_eq!(d.arity(), Arity::Binary);
        assert!(d.identity_type().unwrap().ends_with("Ident"));
    }

    #[test]
    fn unary_ignores_identity() {
        let d = echo.into_descriptor("echo".to_string());
        let value = d.resolve(br#"{"bar":"x"}"#, Some(b"{broken")).unwrap();
        assert_eq!(value, serde_json::json!({ "Foo": "x" }));
    }

    #[test]
    fn binary_defaults_identity_when_absent_or_null() {
        let d = echo_identity.into_descriptor("echoIdentity".to_string());
        let value = d.resolve(br#"{"bar":"x"}"#, None).unwrap();
        assert_eq!(value, serde_json::json!({ "Foo": "" }));

        let value = d.resolve(br#"{"bar":"x"}"#, Some(b"null")).unwrap();
        assert_eq!(value, serde_json::json!({ "Foo": "" }));
    }

    #[test]
    fn argument_decode_is_checked_before_identity() {
        let d = echo_identity.into_descriptor("echoIdentity".to_string());
        let err = d.resolve(b"{broken", Some(b"{broken")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentDecode);
    }

    #[test]
    fn partial_result_travels_with_handler_error() {
        let d = (|args: Args| Partial::with_error(Resp { foo: args.bar }, "Has Error"))
            .into_descriptor("partial".to_string());
        let err = d.resolve(br#"{"bar":"x"}"#, None).unwrap_err();
        assert_eq!(err.to_string(), "Has Error");
        assert_eq!(err.partial(), Some(&serde_json::json!({ "Foo": "x" })));
    }

    #[test]
    fn unencodable_result_is_reported() {
        use std::collections::HashMap;

        let d = (|_: Args| {
            let mut m = HashMap::new();
            m.insert(vec![1u8], "value");
            Ok::<_, BoxError>(m)
        })
        .into_descriptor("bad".to_string());
        let err = d.resolve(br#"{"bar":"x"}"#, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResultEncode);
    }
}
