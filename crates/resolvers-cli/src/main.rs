mod envelope;
mod resolvers;

use resolvers_core::config::UnknownPolicy;
use resolvers_core::{DuplicatePolicy, Invocation, Registry, RegistryConfig, RegistryError};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};

use crate::envelope::Envelope;

const DUPLICATE_POLICY_ENV: &str = "RESOLVERS_ON_DUPLICATE";

#[derive(Debug, Error)]
enum CliError {
    #[error("RESOLVERS_ON_DUPLICATE: {0}")]
    Config(#[from] UnknownPolicy),

    #[error("registration failed: {0}")]
    Registry(#[from] RegistryError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

fn setup_tracing() {
    use tracing_subscriber::EnvFilter;

    // stdout carries responses, so logs go to stderr.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("resolvers_cli=info,resolvers_core=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn load_config() -> Result<RegistryConfig, CliError> {
    let policy = match std::env::var(DUPLICATE_POLICY_ENV) {
        Ok(raw) => raw.parse::<DuplicatePolicy>()?,
        Err(_) => DuplicatePolicy::default(),
    };
    Ok(RegistryConfig::default().with_duplicate_policy(policy))
}

/// Decode one input line and dispatch it.
fn process_line(registry: &Registry, line: &str) -> Envelope {
    match serde_json::from_str::<Invocation>(line) {
        Ok(invocation) => Envelope::from_result(registry.handle(&invocation)),
        Err(e) => {
            warn!(error = %e, "skipping malformed invocation");
            Envelope::invalid_invocation(&e)
        }
    }
}

/// stdin から invocation を 1 行ずつ読み、レスポンスを stdout に 1 行ずつ書く
async fn serve(registry: &Registry) -> Result<(), CliError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut served = 0usize;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let envelope = process_line(registry, &line);
        let mut out = serde_json::to_vec(&envelope)?;
        out.push(b'\n');
        stdout.write_all(&out).await?;
        stdout.flush().await?;
        served += 1;
    }

    info!(served, "stdin closed");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    setup_tracing();

    // (A) 設定を読み、Registry を構築（初期化フェーズ）
    let config = load_config()?;
    let mut registry = Registry::with_config(config);
    resolvers::register_all(&mut registry)?;
    info!(resolvers = ?registry.names(), "registry ready");

    // (B) 以降は読み取り専用。レスポンスは入力順に書く
    serve(&registry).await
}
