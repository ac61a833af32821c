/// Registry of live WebSocket connections.
pub mod clients;
/// The shared "now playing" record.
pub mod live;

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{
    config::AppConfig,
    dao::sheet_store::SheetStore,
    dto::ws::{LiveStateSnapshot, ServerMessage},
    error::ServiceError,
    state::{clients::ClientHub, live::LiveSession},
};

pub use self::clients::ClientConnection;

/// Cheaply clonable handle on the process-wide application state.
pub type SharedState = Arc<AppState>;

/// Central application state: the live session record, connected clients,
/// and the storage handle.
///
/// The process starts degraded (no storage); the supervisor installs a store
/// once SQLite is reachable.
pub struct AppState {
    config: Arc<AppConfig>,
    store: RwLock<Option<Arc<dyn SheetStore>>>,
    live: RwLock<LiveSession>,
    clients: ClientHub,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct the shared state wrapped in an [`Arc`].
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            config: Arc::new(config),
            store: RwLock::new(None),
            live: RwLock::new(LiveSession::new()),
            clients: ClientHub::new(),
            degraded: degraded_tx,
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Registry of connected WebSocket clients.
    pub fn clients(&self) -> &ClientHub {
        &self.clients
    }

    /// Obtain a handle to the current store, if one is installed.
    pub async fn store(&self) -> Option<Arc<dyn SheetStore>> {
        self.store.read().await.as_ref().cloned()
    }

    /// Storage handle, or the degraded-mode error services surface to callers.
    pub async fn require_store(&self) -> Result<Arc<dyn SheetStore>, ServiceError> {
        self.store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a storage backend and leave degraded mode.
    pub async fn install_store(&self, store: Arc<dyn SheetStore>) {
        {
            let mut guard = self.store.write().await;
            *guard = Some(store);
        }
        let _ = self.degraded.send(false);
    }

    /// Drop the storage backend and enter degraded mode.
    pub async fn clear_store(&self) {
        {
            let mut guard = self.store.write().await;
            guard.take();
        }
        let _ = self.degraded.send(true);
    }

    /// Whether the application currently has no storage backend.
    pub async fn is_degraded(&self) -> bool {
        self.store.read().await.is_none()
    }

    /// Subscribe to degraded-mode flips.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Seed snapshot for a newly connected client.
    pub async fn live_snapshot(&self) -> LiveStateSnapshot {
        self.live.read().await.snapshot()
    }

    /// Apply one leader mutation and fan the refreshed snapshot out to every
    /// connected client.
    ///
    /// The write guard is held across the broadcast, so two concurrent leader
    /// commands cannot interleave between mutate and fan-out; every client
    /// observes full snapshots in a single authoritative order.
    pub async fn update_live<F>(&self, mutate: F) -> LiveStateSnapshot
    where
        F: FnOnce(&mut LiveSession),
    {
        let mut live = self.live.write().await;
        mutate(&mut live);
        let snapshot = live.snapshot();
        self.clients
            .broadcast_all(&ServerMessage::LiveState(snapshot.clone()));
        snapshot
    }
}
