//! In-process fan-out of draft events to websocket sessions.

use std::sync::Arc;

use actix::prelude::*;
use dashmap::DashMap;
use tracing::trace;
use uuid::Uuid;

use crate::services::notifier::{DraftEvent, Notifier};

#[derive(Message, Clone, Debug)]
#[rtype(result = "()")]
pub struct DraftBroadcast(pub Arc<DraftEvent>);

/// Subscribers per draft id, keyed by connection id.
#[derive(Default)]
pub struct WsHub {
    drafts: DashMap<String, DashMap<Uuid, Recipient<DraftBroadcast>>>,
}

impl WsHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, draft_id: &str, conn_id: Uuid, recipient: Recipient<DraftBroadcast>) {
        self.drafts
            .entry(draft_id.to_string())
            .or_default()
            .insert(conn_id, recipient);
    }

    pub fn unregister(&self, draft_id: &str, conn_id: Uuid) {
        let emptied = match self.drafts.get(draft_id) {
            Some(conns) => {
                conns.remove(&conn_id);
                conns.is_empty()
            }
            None => false,
        };
        if emptied {
            self.drafts.remove_if(draft_id, |_, conns| conns.is_empty());
        }
    }

    pub fn subscriber_count(&self, draft_id: &str) -> usize {
        self.drafts.get(draft_id).map(|c| c.len()).unwrap_or(0)
    }
}

impl Notifier for WsHub {
    fn publish(&self, draft_id: &str, event: DraftEvent) {
        let Some(conns) = self.drafts.get(draft_id) else {
            return;
        };
        let event = Arc::new(event);
        trace!(draft_id, event = event.name(), subscribers = conns.len(), "broadcast");
        for conn in conns.iter() {
            conn.value().do_send(DraftBroadcast(Arc::clone(&event)));
        }
    }
}
