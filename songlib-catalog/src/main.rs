//! songlib-catalog - song catalog HTTP service
//!
//! Stores songs keyed by (title, group) in SQLite and serves them over a
//! JSON API with filtered listings and verse-paginated lyrics.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use songlib_common::config::{resolve_config_path, CatalogConfig, LogEnv};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use songlib_catalog::db::SongRepository;
use songlib_catalog::services::{CatalogService, LookupClient};
use songlib_catalog::AppState;

/// Command-line arguments for songlib-catalog
///
/// Every flag overrides the matching config file value.
#[derive(Parser, Debug)]
#[command(name = "songlib-catalog")]
#[command(about = "Song catalog service")]
#[command(version)]
struct Args {
    /// Config file (TOML)
    #[arg(short, long)]
    config: Option<String>,

    /// Log environment: local, dev or prod
    #[arg(long, env = "SONGLIB_ENV")]
    env: Option<LogEnv>,

    /// Host to bind
    #[arg(long, env = "SONGLIB_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "SONGLIB_PORT")]
    port: Option<u16>,

    /// SQLite database file
    #[arg(long, env = "SONGLIB_DB")]
    db: Option<PathBuf>,

    /// Base URL of the song metadata lookup service
    #[arg(long, env = "SONGLIB_LOOKUP_URL")]
    lookup_url: Option<String>,

    /// Default songs per listing page
    #[arg(long, env = "SONGLIB_PAGE_SIZE")]
    page_size: Option<u32>,

    /// Default verses per lyrics page
    #[arg(long, env = "SONGLIB_VERSES_PER_PAGE")]
    verses_per_page: Option<u32>,
}

impl Args {
    fn apply(self, config: &mut CatalogConfig) {
        if let Some(env) = self.env {
            config.env = env;
        }
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(db) = self.db {
            config.database.path = db;
        }
        if let Some(url) = self.lookup_url {
            config.lookup.base_url = Some(url);
        }
        if let Some(size) = self.page_size {
            config.catalog.page_size = size;
        }
        if let Some(verses) = self.verses_per_page {
            config.catalog.verses_per_page = verses;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref());
    let mut config = CatalogConfig::load(config_path.as_deref())?;
    args.apply(&mut config);
    config.validate()?;

    init_logging(config.env);

    info!(
        "Starting songlib-catalog v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!(env = ?config.env, "Log environment");
    info!("Database: {}", config.database.path.display());

    let pool = songlib_common::db::init_database(&config.database.path)
        .await
        .context("Failed to initialize database")?;

    let mut catalog = CatalogService::new(SongRepository::new(pool.clone()), config.catalog);
    match &config.lookup.base_url {
        Some(url) => {
            let client =
                LookupClient::new(url, Duration::from_secs(config.lookup.timeout_secs))?;
            catalog = catalog.with_lookup(Arc::new(client));
            info!("Song lookup enabled: {}", url);
        }
        None => info!("Song lookup disabled"),
    }

    let app = songlib_catalog::build_router(AppState::new(catalog));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(addr.as_str())
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// `local` is human-readable, `dev` and `prod` emit JSON; `RUST_LOG` wins
fn init_logging(env: LogEnv) {
    let level = match env {
        LogEnv::Prod => "info",
        LogEnv::Local | LogEnv::Dev => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "songlib_catalog={level},songlib_common={level},tower_http={level}",
            level = level
        )
        .into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    match env {
        LogEnv::Local => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogEnv::Dev | LogEnv::Prod => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
