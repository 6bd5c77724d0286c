//! resolvers-core
//!
//! Direct resolver dispatch: route a named invocation to a registered handler,
//! decode its JSON payload (and optional identity) into the handler's typed
//! arguments, and normalize the outcome.
//!
//! # モジュール構成
//! - **domain**: Invocation（ワイヤ形式）とエラー型
//! - **typed**: 型付き handler の登録（Registry, IntoResolver, HandlerOutput）
//! - **config**: RegistryConfig（重複登録ポリシー）

pub mod config;
pub mod domain;
pub mod typed;

pub use self::config::{DuplicatePolicy, RegistryConfig};
pub use self::domain::{BoxError, ErrorKind, Invocation, RawPayload, RegistryError, ResolveError};
pub use self::typed::{Arity, Descriptor, Partial, Registry};
