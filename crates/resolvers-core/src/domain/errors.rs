//! Errors - 登録エラーとディスパッチエラー
//!
//! # 分類
//! - `RegistryError`: `Registry::add` 時のエラー（初期化時に検出）
//! - `ResolveError`: `Registry::handle` 時のエラー（invocation ごとに発生、リトライなし）
//!
//! Handler のシグネチャ不一致（引数が 0 個や 3 個など）はコンパイルエラーになるため、
//! 実行時の variant はありません。

use serde_json::Value;
use thiserror::Error;

/// Handler が返すエラーを型消去したもの
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("resolver name must not be empty")]
    EmptyName,

    #[error("resolver '{0}' is already registered")]
    AlreadyRegistered(String),
}

/// ErrorKind は `ResolveError` のフラットな分類
///
/// transport 層がエラーをワイヤ上のコードに変換するために使います。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ResolverNotFound,
    ArgumentDecode,
    IdentityDecode,
    Handler,
    ResultEncode,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ResolverNotFound => "RESOLVER_NOT_FOUND",
            ErrorKind::ArgumentDecode => "ARGUMENT_DECODE",
            ErrorKind::IdentityDecode => "IDENTITY_DECODE",
            ErrorKind::Handler => "HANDLER",
            ErrorKind::ResultEncode => "RESULT_ENCODE",
        }
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("resolver not found: {0}")]
    ResolverNotFound(String),

    #[error("failed to decode payload for resolver '{name}': {source}")]
    ArgumentDecode {
        name: String,
        source: serde_json::Error,
    },

    #[error("failed to decode identity for resolver '{name}': {source}")]
    IdentityDecode {
        name: String,
        source: serde_json::Error,
    },

    /// The handler ran and reported an error. Display is the handler's own message.
    #[error("{source}")]
    Handler {
        name: String,
        source: BoxError,
        partial: Option<Value>,
    },

    #[error("failed to encode result of resolver '{name}': {source}")]
    ResultEncode {
        name: String,
        source: serde_json::Error,
    },
}

impl ResolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolveError::ResolverNotFound(_) => ErrorKind::ResolverNotFound,
            ResolveError::ArgumentDecode { .. } => ErrorKind::ArgumentDecode,
            ResolveError::IdentityDecode { .. } => ErrorKind::IdentityDecode,
            ResolveError::Handler { .. } => ErrorKind::Handler,
            ResolveError::ResultEncode { .. } => ErrorKind::ResultEncode,
        }
    }

    /// Name of the resolver the invocation targeted.
    pub fn resolver(&self) -> &str {
        match self {
            ResolveError::ResolverNotFound(name)
            | ResolveError::ArgumentDecode { name, .. }
            | ResolveError::IdentityDecode { name, .. }
            | ResolveError::Handler { name, .. }
            | ResolveError::ResultEncode { name, .. } => name,
        }
    }

    /// Result value a handler produced alongside its error, if any.
    pub fn partial(&self) -> Option<&Value> {
        match self {
            ResolveError::Handler { partial, .. } => partial.as_ref(),
            _ => None,
        }
    }
}
