//! Demo resolvers served by the CLI.

use resolvers_core::{BoxError, Partial, Registry, RegistryError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct EchoArgs {
    pub bar: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Identity {
    #[serde(default)]
    pub bar: String,
}

#[derive(Debug, Serialize)]
pub struct EchoResponse {
    #[serde(rename = "Foo")]
    pub foo: String,
}

/// Parent object handed to nested `user.*` resolvers.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Deserialize)]
pub struct DivideArgs {
    pub a: f64,
    pub b: f64,
}

#[derive(Debug, Deserialize)]
pub struct SearchArgs {
    pub query: String,
    pub limit: usize,
}

pub fn echo(args: EchoArgs) -> Result<EchoResponse, BoxError> {
    Ok(EchoResponse { foo: args.bar })
}

pub fn echo_identity(_args: EchoArgs, ident: Identity) -> Result<EchoResponse, BoxError> {
    Ok(EchoResponse { foo: ident.bar })
}

pub fn full_name(user: User) -> Result<String, BoxError> {
    Ok(format!("{} {}", user.first_name, user.last_name))
}

pub fn divide(args: DivideArgs) -> Result<f64, BoxError> {
    if args.b == 0.0 {
        return Err("division by zero".into());
    }
    let quotient = args.a / args.b;
    if !quotient.is_finite() {
        return Err(format!("{} / {} overflows", args.a, args.b).into());
    }
    Ok(quotient)
}

/// Returns at most `limit` hits and reports truncation as an error next to them.
pub fn search(args: SearchArgs) -> Partial<Vec<String>, String> {
    let hits: Vec<String> = (1..=5).map(|i| format!("{}-{i}", args.query)).collect();
    if hits.len() > args.limit {
        let total = hits.len();
        let kept = hits.into_iter().take(args.limit).collect();
        return Partial::with_error(kept, format!("truncated to {} of {total} hits", args.limit));
    }
    Partial::ok(hits)
}

pub fn register_all(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.add("echo", echo)?;
    registry.add("echoIdentity", echo_identity)?;
    registry.add("user.fullName", full_name)?;
    registry.add("math.divide", divide)?;
    registry.add("search", search)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use resolvers_core::{ErrorKind, Invocation};
    use serde_json::json;

    fn registry() -> Registry {
        let mut r = Registry::new();
        register_all(&mut r).unwrap();
        r
    }

    #[test]
    fn registers_every_demo_resolver() {
        assert_eq!(
            registry().names(),
            vec!["echo", "echoIdentity", "math.divide", "search", "user.fullName"]
        );
    }

    #[test]
    fn full_name_resolves_from_parent_source() {
        let inv = Invocation::new("user.fullName")
            .with_arguments("{}")
            .with_source(r#"{"firstName":"Ada","lastName":"Lovelace"}"#);
        assert_eq!(registry().handle(&inv).unwrap(), json!("Ada Lovelace"));
    }

    #[test]
    fn divide_by_zero_is_handler_error() {
        let inv = Invocation::new("math.divide").with_arguments(r#"{"a":1,"b":0}"#);
        let err = registry().handle(&inv).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Handler);
        assert_eq!(err.to_string(), "division by zero");
    }

    #[test]
    fn divide_overflow_is_handler_error_not_null() {
        let inv = Invocation::new("math.divide").with_arguments(r#"{"a":1e308,"b":1e-308}"#);
        let err = registry().handle(&inv).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Handler);
        assert!(err.to_string().contains("overflows"));

        let inv = Invocation::new("math.divide").with_arguments(r#"{"a":3,"b":2}"#);
        assert_eq!(registry().handle(&inv).unwrap(), json!(1.5));
    }

    #[test]
    fn search_truncation_keeps_partial_hits() {
        let inv = Invocation::new("search").with_arguments(r#"{"query":"q","limit":2}"#);
        let err = registry().handle(&inv).unwrap_err();
        assert_eq!(err.partial(), Some(&json!(["q-1", "q-2"])));

        let inv = Invocation::new("search").with_arguments(r#"{"query":"q","limit":10}"#);
        assert_eq!(registry().handle(&inv).unwrap().as_array().unwrap().len(), 5);
    }
}
