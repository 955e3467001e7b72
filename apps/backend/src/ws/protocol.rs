//! Websocket wire format.

use serde::{Deserialize, Serialize};

use crate::domain::snapshot::DraftSnapshot;
use crate::domain::state::Side;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Ask for the full current snapshot.
    Resync,
    Ping,
}

/// Session-level messages. Draft events are sent as `DraftEvent` and share
/// the `event` tag.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ServerMsg {
    #[serde(rename_all = "camelCase")]
    Connected {
        draft_id: String,
        identity: String,
        side: Option<Side>,
        snapshot: DraftSnapshot,
    },
    Pong,
    Error { code: WsErrorCode, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WsErrorCode {
    BadRequest,
    Unsupported,
    Unavailable,
}
