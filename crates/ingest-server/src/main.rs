use anyhow::Result;
use clap::Parser;
use infrastructure::config::ServiceConfig;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use ingest_server::{AppState, InMemoryStores, api};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding default.toml and the RUN_MODE override
    #[arg(long, default_value = "config")]
    config_dir: String,

    /// API port (overrides http.port)
    #[arg(long)]
    port: Option<u16>,

    /// Keep everything in process memory instead of PostgreSQL
    #[arg(long)]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,ingest_server=debug,application=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    info!("📡 Ingest Server Starting...");

    let mut config = ServiceConfig::load(&args.config_dir)?;
    if let Some(port) = args.port {
        config.http.port = port;
    }
    info!(
        workers = config.alerting.workers,
        queue_capacity = config.alerting.queue_capacity,
        max_batch_size = config.ingestion.max_batch_size,
        "Configuration loaded"
    );

    let state = if args.in_memory {
        warn!("In-memory mode: catalog and assets start empty and nothing is persisted");
        AppState::in_memory(&config, &InMemoryStores::new())
    } else {
        AppState::postgres(&config).await?
    };
    let state = Arc::new(state);

    let app = api::create_router(state.clone());
    let addr = format!("{}:{}", config.http.host, config.http.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 API Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state.shutdown.clone()))
        .await?;

    info!("Draining alert queue...");
    if state.engine.shutdown().await {
        info!("✅ Shutdown complete");
    } else {
        warn!("Alert queue not fully drained before the grace period ended");
    }
    Ok(())
}

async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("🛑 Shutdown signal received");
    // Ends SSE streams and cancels in-flight writes
    token.cancel();
}
