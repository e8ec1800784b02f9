use std::sync::Arc;

use coordinator::MatchCoordinator;
use tokio::sync::broadcast;

use crate::notifier::WsFrame;

#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<MatchCoordinator>,
    /// Fan-out channel feeding every WebSocket subscriber.
    pub updates: broadcast::Sender<WsFrame>,
}
