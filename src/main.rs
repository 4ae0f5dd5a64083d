mod config;
mod models;
mod services;

use anyhow::Context;
use sha1::{Digest, Sha1};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::services::{
    aggregator::aggregate,
    fetcher::HttpFetcher,
    publisher::{save_local, GistPublisher},
};

/// SHA1 hex digest, logged so identical runs can be compared
fn digest(content: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "playlist_aggregator=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    tracing::info!("Starting playlist aggregator v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration; a missing token aborts before any fetch
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    let gist_mode = if config.gist_id.is_some() { "update" } else { "create" };
    tracing::info!(
        github_token = "present",
        gist_id = config.gist_id.is_some(),
        gist_mode,
        sources = config.sources.len(),
        "Configuration loaded"
    );

    let fetcher = HttpFetcher::new(
        &config.user_agent,
        config.fetch_timeout_ms,
        config.max_playlist_size_mb,
    )
    .context("Failed to create HTTP client")?;

    let report = aggregate(&config.sources, &fetcher).await;
    for (label, reason) in &report.failed {
        tracing::warn!(source = %label, reason = %reason, "Playlist not included");
    }

    tracing::info!(sources = ?report.succeeded, "Playlists included");

    let output = report.output;
    let channels_json = output
        .channels_json()
        .context("Failed to serialize channel index")?;

    tracing::info!(
        playlist_bytes = output.playlist.len(),
        playlist_sha1 = %digest(&output.playlist),
        channels = output.channels.len(),
        channels_sha1 = %digest(&channels_json),
        "Generated artifacts"
    );

    if config.save_local {
        let written = save_local(&config.output_dir, &output.playlist, &channels_json)
            .await
            .context("Failed to save files locally")?;
        tracing::info!(files = ?written, "Files saved locally");
    }

    let publisher = GistPublisher::new(
        &config.github_api_url,
        &config.github_token,
        config.gist_id.clone(),
        &config.user_agent,
        config.fetch_timeout_ms,
    )
    .context("Failed to create HTTP client")?;

    publisher
        .publish(&output)
        .await
        .context("Failed to upload gist")?;

    Ok(())
}
