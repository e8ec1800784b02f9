//! WebSocket fan-out
//!
//! Flow: connect → full scoreboard refresh → incremental pushes. A receiver
//! that lags behind the broadcast buffer gets a fresh full refresh instead of
//! the frames it missed; clients also poll as an independent resync path.

use crate::error::AppError;
use crate::notifier::WsFrame;
use crate::state::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::stream::{SplitSink, StreamExt};
use futures::SinkExt;
use tokio::sync::broadcast::error::RecvError;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state)))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let mut updates = state.updates.subscribe();

    // Every new subscriber starts from a full current scoreboard.
    if send_full_refresh(&mut sender, &state).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Ok(frame) => {
                    if send_frame(&mut sender, &frame).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "subscriber lagged, resyncing");
                    if send_full_refresh(&mut sender, &state).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Closed) => break,
            },
            msg = receiver.next() => match msg {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {} // viewers only listen
                Some(Err(_)) => break,
            },
        }
    }
}

async fn send_full_refresh(
    sender: &mut SplitSink<WebSocket, Message>,
    state: &AppState,
) -> Result<(), ()> {
    let scoreboard = state.coordinator.scoreboard_view(None).map_err(|e| {
        tracing::error!(error = %e, "scoreboard read failed for subscriber");
    })?;
    send_frame(sender, &WsFrame::ScoreboardRefresh { scoreboard }).await
}

async fn send_frame(
    sender: &mut SplitSink<WebSocket, Message>,
    frame: &WsFrame,
) -> Result<(), ()> {
    let json = serde_json::to_string(frame).map_err(|_| ())?;
    sender.send(Message::Text(json)).await.map_err(|_| ())
}
