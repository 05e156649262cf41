//! Marker-management daemon entry point: CLI parsing, first-boot wizard,
//! adapter wiring, and the HTTP server itself. The actual modules live in
//! `marker-server`'s library target so the dispatch layer can be exercised
//! directly from integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use marker_contracts::{ActionLogStore, LibraryAdapter};
use marker_core::db::{PostgresLibraryAdapter, SqliteActionLogStore};
use marker_core::Service;
use marker_model::SectionId;
use marker_server::cli::Args;
use marker_server::config::Config;
use marker_server::{cli, dispatch};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.init {
        cli::run_init_wizard(&args.env_file)?;
        return Ok(());
    }

    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("marker_server={0},marker_core={0}", config.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("marker-server starting up");

    let library: Arc<dyn LibraryAdapter> = Arc::new(
        PostgresLibraryAdapter::connect(&config.database_path)
            .await
            .context("connecting to library database")?,
    );

    let action_log: Option<Arc<dyn ActionLogStore>> = if config.backup_actions {
        let path = config.metadata_path.to_string_lossy();
        let store = SqliteActionLogStore::connect(&format!("sqlite://{path}?mode=rwc"))
            .await
            .context("connecting to action log database")?;
        Some(Arc::new(store))
    } else {
        warn!("action log / purge reconciler disabled (MARKER_BACKUP_ACTIONS=false)");
        None
    };

    let service = Arc::new(Service::new(library.clone(), action_log, config.backup_actions, config.extended_marker_stats));

    let sections = library.list_sections().await.context("listing sections at startup")?;
    let section_ids: Vec<SectionId> = sections.iter().map(|s| s.id).collect();
    service.bootstrap(&section_ids).await.context("bootstrapping cache and purge index")?;
    info!(sections = section_ids.len(), "bootstrap complete");

    let app = dispatch::router(service.clone());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("parsing bind address")?;
    let listener = tokio::net::TcpListener::bind(addr).await.context("binding listener")?;
    info!("listening on {addr}");

    let shutdown_service = service.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
            shutdown_service.begin_shutdown().await;
        })
        .await
        .context("server error")?;

    Ok(())
}
