use std::sync::Arc;

use anyhow::Context;
use healthguard_advisor::RecommendationEngine;
use healthguard_advisor::config::AdvisorConfig;
use healthguard_server::{Dispatcher, HealthStore, MemoryStore, ServerConfig, seed_demo_data};
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Configure logging from env var `HEALTHGUARD_LOG_LEVEL` (or fallback to `RUST_LOG`, default `info`).
    let log_env = std::env::var("HEALTHGUARD_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());

    // Keep HTTP client internals quiet by default
    let combined_filter = format!("{},hyper_util=warn,reqwest=warn", log_env);
    let env_filter = tracing_subscriber::EnvFilter::try_new(combined_filter)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,hyper_util=warn,reqwest=warn"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
    tracing::info!("healthguard: log filter: {}", log_env);

    let server_config = ServerConfig::from_env().context("invalid server configuration")?;
    let advisor_config = AdvisorConfig::from_env().context("invalid advisor configuration")?;

    let metrics = PrometheusBuilder::new()
        .install_recorder()
        .context("failed to install metrics recorder")?;

    let engine = RecommendationEngine::from_config(&advisor_config)
        .context("failed to build recommendation engine")?;
    let store: Arc<dyn HealthStore> = Arc::new(MemoryStore::new());

    if server_config.seed_demo {
        let user_id = seed_demo_data(store.as_ref())
            .await
            .context("failed to seed demo data")?;
        tracing::info!("healthguard: demo account ready (user id {})", user_id);
    }

    let dispatcher = Arc::new(Dispatcher::new(store, Arc::new(engine)).with_metrics(metrics));

    let listener = TcpListener::bind(server_config.address)
        .await
        .with_context(|| format!("failed to bind {}", server_config.address))?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("healthguard: failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    healthguard_server::serve(listener, dispatcher, server_config.max_line_bytes, shutdown).await?;
    tracing::info!("healthguard: server stopped");
    Ok(())
}
