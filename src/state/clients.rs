use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

use crate::dto::ws::ServerMessage;

/// Handle used to push frames to one connected client.
#[derive(Clone)]
pub struct ClientConnection {
    /// Connection identifier assigned at upgrade time.
    pub id: Uuid,
    /// Channel into the connection's dedicated writer task.
    pub tx: mpsc::UnboundedSender<Message>,
}

/// Registry of live WebSocket connections keyed by connection id.
///
/// Delivery is best effort: a send to a closed writer is silently dropped and
/// the connection is reaped by its own socket task. There is no buffering for
/// absent clients; they recover from durable state after reconnecting.
#[derive(Default)]
pub struct ClientHub {
    clients: DashMap<Uuid, ClientConnection>,
}

impl ClientHub {
    /// Create an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly upgraded connection.
    pub fn insert(&self, connection: ClientConnection) {
        self.clients.insert(connection.id, connection);
    }

    /// Drop a connection after its socket task winds down.
    pub fn remove(&self, id: &Uuid) {
        self.clients.remove(id);
    }

    /// Number of currently connected clients.
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Whether nobody is connected.
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Fan a message out to every connected client, the sender included.
    pub fn broadcast_all(&self, message: &ServerMessage) {
        let Some(frame) = encode(message) else {
            return;
        };
        for entry in self.clients.iter() {
            let _ = entry.tx.send(frame.clone());
        }
    }

    /// Fan a message out to every client except `sender`, which has already
    /// applied the change locally.
    pub fn broadcast_except(&self, sender: Uuid, message: &ServerMessage) {
        let Some(frame) = encode(message) else {
            return;
        };
        for entry in self.clients.iter() {
            if *entry.key() != sender {
                let _ = entry.tx.send(frame.clone());
            }
        }
    }

    /// Push a message to a single client, dropping it if the client is gone.
    pub fn send_to(&self, id: Uuid, message: &ServerMessage) {
        let Some(frame) = encode(message) else {
            return;
        };
        if let Some(connection) = self.clients.get(&id) {
            let _ = connection.tx.send(frame);
        }
    }
}

/// Serialize once per fan-out. A serialization failure is a bug in the
/// message types; it is logged and the fan-out skipped rather than unwound.
fn encode(message: &ServerMessage) -> Option<Message> {
    match serde_json::to_string(message) {
        Ok(payload) => Some(Message::Text(payload.into())),
        Err(err) => {
            warn!(error = %err, "failed to serialize outbound frame");
            None
        }
    }
}
