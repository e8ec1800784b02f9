mod announce;
mod config;
mod error;
mod handlers;
mod models;
mod notifier;
mod router;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use coordinator::MatchCoordinator;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use config::GatewayConfig;
use notifier::ChannelNotifier;
use router::create_router;
use state::AppState;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt::init();

    let config = GatewayConfig::from_env();
    tracing::info!(
        bind = %config.bind,
        data_dir = %config.data_dir.display(),
        "starting clubscore gateway"
    );

    let (updates, _) = broadcast::channel(64);
    let notifier = Arc::new(ChannelNotifier::new(updates.clone()));
    let coordinator = Arc::new(MatchCoordinator::open(config.journal_path(), notifier)?);

    let state = AppState {
        coordinator,
        updates,
    };
    let app = create_router(state);

    // Keep the daemon alive for the lifetime of the server; dropping it
    // withdraws the announcement.
    let _mdns = if config.announce {
        Some(announce::announce(&config.instance_name, config.bind.port())?)
    } else {
        None
    };

    let addr: SocketAddr = config.bind;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
