//! Change notifier backed by the broadcast channel
//!
//! The coordinator calls this after every committed mutation; each WebSocket
//! task holds a receiver. Delivery is best-effort: a send with no receivers
//! or a lagging receiver is not an error, clients resync by polling.

use coordinator::ChangeNotifier;
use serde::Serialize;
use tokio::sync::broadcast;
use types::view::{MatchView, ScoreboardView};

/// Frames pushed to WebSocket subscribers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsFrame {
    MatchUpdated { match_view: MatchView },
    ScoreboardRefresh { scoreboard: ScoreboardView },
}

pub struct ChannelNotifier {
    tx: broadcast::Sender<WsFrame>,
}

impl ChannelNotifier {
    pub fn new(tx: broadcast::Sender<WsFrame>) -> Self {
        Self { tx }
    }
}

impl ChangeNotifier for ChannelNotifier {
    fn match_updated(&self, view: &MatchView) {
        let _ = self.tx.send(WsFrame::MatchUpdated {
            match_view: view.clone(),
        });
    }

    fn scoreboard_refresh(&self, scoreboard: &ScoreboardView) {
        let _ = self.tx.send(WsFrame::ScoreboardRefresh {
            scoreboard: scoreboard.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::view::Viewport;

    #[test]
    fn test_frames_serialize_with_type_tag() {
        let frame = WsFrame::ScoreboardRefresh {
            scoreboard: ScoreboardView {
                viewport: Viewport::default(),
                matches: vec![],
            },
        };
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["type"], "scoreboard_refresh");
        assert_eq!(json["scoreboard"]["viewport"]["width"], 384);
    }

    #[test]
    fn test_send_without_subscribers_is_fine() {
        let (tx, _) = broadcast::channel(8);
        let notifier = ChannelNotifier::new(tx);
        notifier.scoreboard_refresh(&ScoreboardView {
            viewport: Viewport::default(),
            matches: vec![],
        });
    }
}
