use std::sync::Arc;

use anyhow::Context;
use nyher_cli::logging::{LogConfig, init_logging};
use nyher_rules::RuleConfig;
use nyher_service::{AppState, ServiceConfig, router};
use nyher_validate::Validator;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::from_env()?;
    init_logging(&LogConfig::service().with_log_file(config.log_file.clone()))
        .context("failed to open the log file")?;

    let rules = RuleConfig::load_or_embedded(config.rules_path.as_deref())?;
    match &config.spec_path {
        Some(path) => info!(spec = %path.display(), "using spec"),
        None => warn!("SPEC_PATH is not set, validation requests will be rejected"),
    }
    let state = AppState::new(
        Arc::new(Validator::new(Arc::new(rules))),
        config.spec_path.clone(),
    );

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!("listening on http://{}", config.bind_addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    info!("shutdown requested");
}
