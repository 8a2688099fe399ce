//! `poolquote relay`: host the shared document for other collaborators.

use anyhow::{Context, Result};
use tracing::info;

use poolquote_sync::config::RelaySettings;
use poolquote_sync::RelayServer;

/// Serves until Ctrl-C.
pub async fn run(mut settings: RelaySettings, port: Option<u16>, bind: Option<String>) -> Result<()> {
    if let Some(port) = port {
        settings.port = port;
    }
    if let Some(bind) = bind {
        settings.bind_addr = bind;
    }

    let relay = RelayServer::new(settings)
        .start()
        .await
        .context("starting relay")?;
    println!("Relay listening on {}", relay.ws_url());

    tokio::signal::ctrl_c()
        .await
        .context("waiting for Ctrl-C")?;
    info!(
        subscribers = relay.subscriber_count().await,
        "Stopping relay"
    );
    relay.shutdown().await?;
    Ok(())
}
