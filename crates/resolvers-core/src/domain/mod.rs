//! Domain model (invocation, errors).

pub mod errors;
pub mod invocation;

pub use self::errors::{BoxError, ErrorKind, RegistryError, ResolveError};
pub use self::invocation::{Context, Invocation, RawPayload};
