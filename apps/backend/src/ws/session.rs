use std::sync::Arc;
use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::snapshot::DraftSnapshot;
use crate::errors::domain::DomainError;
use crate::extractors::{CurrentPlayer, DraftId};
use crate::services::draft_flow::DraftRegistry;
use crate::services::notifier::DraftEvent;
use crate::state::app_state::AppState;
use crate::ws::hub::{DraftBroadcast, WsHub};
use crate::ws::protocol::{ClientMsg, ServerMsg, WsErrorCode};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(40);

/// `GET /ws/drafts/{draft_id}`. Authenticated by `JwtExtract` (the token may
/// ride in `?token=`). Any authenticated identity may watch; participants
/// are told their side in the `connected` ack.
pub async fn upgrade(
    req: HttpRequest,
    stream: web::Payload,
    player: CurrentPlayer,
    draft_id: DraftId,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let session = WsSession::new(
        player,
        draft_id.as_str().to_string(),
        Arc::clone(&app_state.drafts),
        app_state.ws_hub.clone(),
    );
    ws::start(session, &req, stream)
}

pub struct WsSession {
    conn_id: Uuid,
    player: CurrentPlayer,
    draft_id: String,
    drafts: Arc<DraftRegistry>,
    hub: Arc<WsHub>,
    last_heartbeat: Instant,
    /// Highest snapshot version delivered on this connection.
    last_version: Option<u64>,
}

impl WsSession {
    fn new(player: CurrentPlayer, draft_id: String, drafts: Arc<DraftRegistry>, hub: Arc<WsHub>) -> Self {
        Self {
            conn_id: Uuid::new_v4(),
            player,
            draft_id,
            drafts,
            hub,
            last_heartbeat: Instant::now(),
            last_version: None,
        }
    }

    fn send_json<T: Serialize>(ctx: &mut ws::WebsocketContext<Self>, msg: &T) {
        match serde_json::to_string(msg) {
            Ok(payload) => ctx.text(payload),
            Err(err) => warn!(error = %err, "ws outbound serialization failed"),
        }
    }

    fn send_error(ctx: &mut ws::WebsocketContext<Self>, code: WsErrorCode, message: &str) {
        Self::send_json(
            ctx,
            &ServerMsg::Error {
                code,
                message: message.to_string(),
            },
        );
    }

    /// Whether an event is still news to this client.
    fn accepts(&self, event: &DraftEvent) -> bool {
        match (event, event.version(), self.last_version) {
            (DraftEvent::DraftStateChanged { .. }, Some(v), Some(last)) => v > last,
            (DraftEvent::TurnAutoResolved { .. }, Some(v), Some(last)) => v > last,
            (DraftEvent::TurnTimerTick { .. }, Some(v), Some(last)) => v >= last,
            _ => true,
        }
    }

    fn note_version(&mut self, version: Option<u64>) {
        if let Some(v) = version {
            self.last_version = Some(self.last_version.map_or(v, |last| last.max(v)));
        }
    }

    fn start_heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |actor, ctx| {
            if Instant::now().duration_since(actor.last_heartbeat) > CLIENT_TIMEOUT {
                warn!(conn_id = %actor.conn_id, identity = %actor.player.identity, "ws heartbeat timed out");
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                ctx.stop();
                return;
            }
            ctx.ping(b"keepalive");
        });
    }

    /// Push the current snapshot, blocking mailbox processing until sent so
    /// queued broadcasts are filtered against it.
    fn push_snapshot(&self, ctx: &mut ws::WebsocketContext<Self>, as_ack: bool) {
        let drafts = Arc::clone(&self.drafts);
        let draft_id = self.draft_id.clone();
        ctx.wait(
            async move { drafts.snapshot(&draft_id).await }
                .into_actor(self)
                .map(move |loaded: Result<DraftSnapshot, DomainError>, actor, ctx| {
                    let snapshot = match loaded {
                        Ok(snapshot) => snapshot,
                        Err(err) => {
                            warn!(conn_id = %actor.conn_id, error = %err, "ws snapshot load failed");
                            Self::send_error(ctx, WsErrorCode::Unavailable, "draft snapshot unavailable");
                            return;
                        }
                    };
                    actor.note_version(Some(snapshot.version));
                    if as_ack {
                        let side = snapshot
                            .participants
                            .iter()
                            .find(|p| p.identity == actor.player.identity)
                            .map(|p| p.side);
                        Self::send_json(
                            ctx,
                            &ServerMsg::Connected {
                                draft_id: snapshot.draft_id.clone(),
                                identity: actor.player.identity.clone(),
                                side,
                                snapshot,
                            },
                        );
                    } else {
                        Self::send_json(ctx, &DraftEvent::DraftStateChanged { snapshot });
                    }
                }),
        );
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(
            conn_id = %self.conn_id,
            draft_id = %self.draft_id,
            identity = %self.player.identity,
            "ws session started"
        );
        self.hub
            .register(&self.draft_id, self.conn_id, ctx.address().recipient());
        self.push_snapshot(ctx, true);
        self.start_heartbeat(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.hub.unregister(&self.draft_id, self.conn_id);
        info!(conn_id = %self.conn_id, draft_id = %self.draft_id, "ws session stopped");
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(payload)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&payload);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.last_heartbeat = Instant::now();
                match serde_json::from_str::<ClientMsg>(&text) {
                    Ok(ClientMsg::Resync) => {
                        debug!(conn_id = %self.conn_id, "ws resync requested");
                        self.push_snapshot(ctx, false);
                    }
                    Ok(ClientMsg::Ping) => Self::send_json(ctx, &ServerMsg::Pong),
                    Err(_) => Self::send_error(ctx, WsErrorCode::BadRequest, "unrecognized message"),
                }
            }
            Ok(ws::Message::Binary(_)) => {
                self.last_heartbeat = Instant::now();
                Self::send_error(ctx, WsErrorCode::Unsupported, "binary frames are not supported");
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => {
                self.last_heartbeat = Instant::now();
            }
            Err(err) => {
                warn!(conn_id = %self.conn_id, error = %err, "ws protocol error");
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                ctx.stop();
            }
        }
    }
}

impl Handler<DraftBroadcast> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: DraftBroadcast, ctx: &mut Self::Context) -> Self::Result {
        let event = msg.0.as_ref();
        if !self.accepts(event) {
            debug!(conn_id = %self.conn_id, event = event.name(), version = ?event.version(), "stale event dropped");
            return;
        }
        // The auto-resolve notice shares its version with the state change
        // that follows it, so only the latter advances the watermark.
        if matches!(event, DraftEvent::DraftStateChanged { .. }) {
            self.note_version(event.version());
        }
        Self::send_json(ctx, event);
    }
}
