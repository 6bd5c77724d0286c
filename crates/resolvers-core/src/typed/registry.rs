//! Registry - resolver の登録とディスパッチ
//!
//! # ライフサイクル
//! - 初期化時に `&mut self` で `add` を繰り返す（mutable）
//! - その後は `Arc<Registry>` で共有して `handle` だけを呼ぶ（immutable）
//!
//! 読み取りフェーズでは変更しないのでロックは不要です。
//! トラフィック開始後にも登録したい場合は `RwLock<Registry>` で包んでください。

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::handler::{Descriptor, IntoResolver};
use crate::config::{DuplicatePolicy, RegistryConfig};
use crate::domain::errors::{RegistryError, ResolveError};
use crate::domain::invocation::Invocation;

const NULL_PAYLOAD: &[u8] = b"null";

/// Registry maps resolver names to their descriptors.
///
/// # 使用例
/// ```ignore
/// let mut registry = Registry::new();
/// registry.add("echo", |args: Args| Ok::<_, BoxError>(Resp { foo: args.bar }))?;
/// registry.add("echoIdentity", |_: Args, ident: Ident| Ok::<_, BoxError>(Resp { foo: ident.bar }))?;
///
/// let value = registry.handle(&Invocation::new("echo").with_arguments(r#"{"bar":"x"}"#))?;
/// ```
#[derive(Debug, Default)]
pub struct Registry {
    handlers: HashMap<String, Descriptor>,
    config: RegistryConfig,
}

impl Registry {
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            handlers: HashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Register `handler` under `name`.
    ///
    /// The handler must take one parameter (the decoded payload) or two (the
    /// decoded payload and the decoded identity) and return `Result<R, E>` or
    /// `Partial<R, E>`. Anything else is rejected by the compiler:
    ///
    /// ```compile_fail
    /// use resolvers_core::Registry;
    ///
    /// let mut registry = Registry::new();
    /// registry
    ///     .add("sum3", |a: u32, b: u32, c: u32| Ok::<_, String>(a + b + c))
    ///     .unwrap();
    /// ```
    pub fn add<M, H>(&mut self, name: impl Into<String>, handler: H) -> Result<(), RegistryError>
    where
        H: IntoResolver<M>,
    {
        let name = name.into();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.handlers.contains_key(&name) {
            match self.config.on_duplicate {
                DuplicatePolicy::Reject => return Err(RegistryError::AlreadyRegistered(name)),
                DuplicatePolicy::Replace => {
                    warn!(resolver = %name, "replacing previously registered resolver");
                }
            }
        }

        let descriptor = handler.into_descriptor(name.clone());
        debug!(
            resolver = %name,
            arity = ?descriptor.arity(),
            argument_type = descriptor.argument_type(),
            "registered resolver"
        );
        self.handlers.insert(name, descriptor);
        Ok(())
    }

    /// Dispatch one invocation to its resolver.
    #[instrument(level = "debug", skip_all, fields(resolver = %invocation.resolve(), root = invocation.is_root()))]
    pub fn handle(&self, invocation: &Invocation) -> Result<Value, ResolveError> {
        let descriptor = self
            .handlers
            .get(invocation.resolve())
            .ok_or_else(|| ResolveError::ResolverNotFound(invocation.resolve().to_string()))?;

        let payload = invocation
            .payload()
            .map_or(NULL_PAYLOAD, |raw| raw.as_bytes());
        let identity = invocation.identity().map(|raw| raw.as_bytes());

        let result = descriptor.resolve(payload, identity);
        match &result {
            Ok(_) => debug!("resolved"),
            Err(e) => debug!(kind = e.kind().as_str(), error = %e, "resolve failed"),
        }
        result
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn descriptor(&self, name: &str) -> Option<&Descriptor> {
        self.handlers.get(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
