//! Pipeline worker process.
//!
//! Connects to Postgres, runs migrations, starts the task orchestrator
//! and serves until interrupted. Configuration comes from the
//! environment (`.env` honored):
//!
//! - `DATABASE_URL` — Postgres connection string (required)
//! - `REELFORGE_CREDENTIAL_KEY` — passphrase the credential key is
//!   derived from (required)
//! - `REELFORGE_CONCURRENCY` — parallel stage bodies (default 4)

use std::sync::Arc;

use reelforge_adapters::{AdapterRegistry, PollConfig};
use reelforge_core::credentials::CredentialKey;
use reelforge_pipeline::{FfmpegMerger, Orchestrator, PgStore, StageContext, DEFAULT_CONCURRENCY};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reelforge_worker=debug,reelforge_pipeline=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::error!("DATABASE_URL is not set");
            std::process::exit(1);
        }
    };
    let passphrase = match std::env::var("REELFORGE_CREDENTIAL_KEY") {
        Ok(passphrase) => passphrase,
        Err(_) => {
            tracing::error!("REELFORGE_CREDENTIAL_KEY is not set");
            std::process::exit(1);
        }
    };
    let concurrency = std::env::var("REELFORGE_CONCURRENCY")
        .ok()
        .and_then(|raw| raw.parse::<usize>().ok())
        .unwrap_or(DEFAULT_CONCURRENCY);

    let pool = match reelforge_db::create_pool(&database_url, reelforge_db::DEFAULT_MAX_CONNECTIONS)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "failed to connect to the database");
            std::process::exit(1);
        }
    };

    let ctx = StageContext {
        store: Arc::new(PgStore::new(pool)),
        adapters: Arc::new(AdapterRegistry::new()),
        key: CredentialKey::from_passphrase(&passphrase),
        poll: PollConfig::default(),
        merger: Arc::new(FfmpegMerger),
    };
    let orchestrator = Orchestrator::start(ctx, concurrency);
    tracing::info!(concurrency, "worker started");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutdown signal received");
    orchestrator.shutdown().await;
}
