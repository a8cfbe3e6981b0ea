//! tbx-export - Playlist export microservice
//!
//! Converts a playlist's track listing into matching records from an external
//! music catalog and serves the result over HTTP.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tbx_common::config::ConfigFileResolver;
use tracing::info;

use tbx_export::config::ExportSettings;
use tbx_export::services::{
    BoundedResolver, HttpCatalogClient, PlaylistExporter, RefreshTokenProvider,
    SpotifyPlaylistSource,
};
use tbx_export::{build_router, AppState};

#[derive(Debug, Parser)]
#[command(name = "tbx-export", version, about = "Export playlists as catalog matches")]
struct Args {
    /// Path to the TOML config file
    #[arg(long, env = "TBX_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on (overrides [server].bind)
    #[arg(long, env = "TBX_BIND")]
    bind: Option<String>,

    /// Maximum simultaneous catalog lookups (overrides [resolver].concurrency_limit)
    #[arg(long)]
    concurrency_limit: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is loaded before tracing so the file can set the log level
    let mut config = ConfigFileResolver::new("tbx-export").resolve(args.config.as_deref())?;
    config.apply_env_overrides()?;
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(limit) = args.concurrency_limit {
        config.resolver.concurrency_limit = limit;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!("Starting tbx-export v{}", env!("CARGO_PKG_VERSION"));

    let settings = ExportSettings::from_config(&config)?;
    info!(
        concurrency_limit = settings.resolver.concurrency_limit,
        request_timeout_secs = settings.request_timeout.as_secs(),
        batch_deadline_secs = settings.resolver.batch_deadline.map(|d| d.as_secs()),
        catalog = %settings.catalog_base_url,
        "Resolver configured"
    );

    // One pooled client shared by every outbound call
    let http_client = reqwest::Client::builder()
        .user_agent(concat!("tbx-export/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let credentials = Arc::new(RefreshTokenProvider::new(
        http_client.clone(),
        &settings.spotify_accounts_base,
        settings.credentials.clone(),
        settings.request_timeout,
    ));
    let playlists = Arc::new(SpotifyPlaylistSource::new(
        http_client.clone(),
        &settings.spotify_api_base,
        credentials,
        settings.request_timeout,
    ));
    let catalog = Arc::new(HttpCatalogClient::with_http_client(
        http_client,
        &settings.catalog_base_url,
        settings.request_timeout,
    )?);
    let resolver = BoundedResolver::new(catalog, settings.resolver)?;

    let state = AppState::new(PlaylistExporter::new(playlists, resolver));
    let app = build_router(state, &settings.allowed_origins);

    let listener = tokio::net::TcpListener::bind(&settings.bind).await?;
    info!("Listening on http://{}", settings.bind);

    axum::serve(listener, app).await?;

    Ok(())
}
