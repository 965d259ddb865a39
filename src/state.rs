//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the server configuration and the set of connected status clients,
//! each reached through a bounded per-connection sender. Broadcasting never
//! waits on a slow client: a full queue drops that client's copy.

#[cfg(test)]
#[path = "state_test.rs"]
mod state_test;

use std::collections::HashMap;
use std::sync::Arc;

use frames::StatusEvent;
use tokio::sync::{RwLock, mpsc};
use tracing::warn;
use uuid::Uuid;

use crate::config::ServerConfig;

/// Outbound queue depth per connected client.
pub const CLIENT_BUFFER: usize = 256;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Connected clients: `client_id` -> sender for outgoing events.
    pub clients: Arc<RwLock<HashMap<Uuid, mpsc::Sender<StatusEvent>>>>,
}

impl AppState {
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        Self { config: Arc::new(config), clients: Arc::new(RwLock::new(HashMap::new())) }
    }

    /// Register a new client and return its id and receiving end.
    pub async fn register(&self) -> (Uuid, mpsc::Receiver<StatusEvent>) {
        let client_id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(CLIENT_BUFFER);
        self.clients.write().await.insert(client_id, tx);
        (client_id, rx)
    }

    pub async fn unregister(&self, client_id: Uuid) {
        self.clients.write().await.remove(&client_id);
    }

    /// Queue `event` for every connected client. Returns how many accepted it.
    pub async fn broadcast(&self, event: &StatusEvent) -> usize {
        let clients = self.clients.read().await;
        let mut delivered = 0;
        for (client_id, tx) in clients.iter() {
            match tx.try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(%client_id, "status: client queue full, event dropped");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {}
            }
        }
        delivered
    }

    pub async fn client_count(&self) -> usize {
        self.clients.read().await.len()
    }
}
