//! HandlerOutput - handler の戻り値を (result, error) の 2 チャンネルに正規化
//!
//! # 対応する戻り値
//! - `Result<R, E>`: 成功なら result、失敗なら error のみ
//! - `Partial<R, E>`: result を常に返し、error を併せて報告できる

use serde::Serialize;

use crate::domain::errors::BoxError;

/// Two-channel output of a resolver handler.
pub trait HandlerOutput {
    type Value: Serialize;

    fn into_parts(self) -> (Option<Self::Value>, Option<BoxError>);
}

impl<R, E> HandlerOutput for Result<R, E>
where
    R: Serialize,
    E: Into<BoxError>,
{
    type Value = R;

    fn into_parts(self) -> (Option<R>, Option<BoxError>) {
        match self {
            Ok(value) => (Some(value), None),
            Err(err) => (None, Some(err.into())),
        }
    }
}

/// A result value that is returned even when the handler also reports an error.
///
/// ```ignore
/// fn search(args: Query) -> Partial<Vec<Hit>, String> {
///     let (hits, failed_shards) = run(args);
///     if failed_shards > 0 {
///         return Partial::with_error(hits, format!("{failed_shards} shards failed"));
///     }
///     Partial::ok(hits)
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Partial<R, E> {
    pub value: R,
    pub error: Option<E>,
}

impl<R, E> Partial<R, E> {
    pub fn ok(value: R) -> Self {
        Self { value, error: None }
    }

    pub fn with_error(value: R, error: E) -> Self {
        Self {
            value,
            error: Some(error),
        }
    }
}

impl<R, E> HandlerOutput for Partial<R, E>
where
    R: Serialize,
    E: Into<BoxError>,
{
    type Value = R;

    fn into_parts(self) -> (Option<R>, Option<BoxError>) {
        (Some(self.value), self.error.map(Into::into))
    }
}
