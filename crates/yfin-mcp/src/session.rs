//! Streaming sessions
//!
//! A session is a pair of bounded channels bound to one client connection:
//! inbound messages posted by the client and outbound responses streamed back.
//! One task per session drains the inbound channel strictly in order, so a
//! response is always emitted before any later request is looked at.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;
use yfin_stock::MarketDataSource;

use crate::error::MCPError;
use crate::protocol::JsonRpcResponse;
use crate::server::McpServer;

/// Open sessions keyed by id
#[derive(Debug)]
pub struct SessionManager {
    sessions: RwLock<HashMap<Uuid, mpsc::Sender<Value>>>,
    capacity: usize,
}

impl SessionManager {
    /// Create a manager whose sessions queue up to `capacity` messages per direction
    pub fn new(capacity: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Open a session and start its processing task
    pub fn open<S>(self: &Arc<Self>, server: Arc<McpServer<S>>) -> Session
    where
        S: MarketDataSource + 'static,
    {
        let id = Uuid::new_v4();
        let (inbound_tx, mut inbound_rx) = mpsc::channel::<Value>(self.capacity);
        let (outbound_tx, outbound_rx) = mpsc::channel::<JsonRpcResponse>(self.capacity);

        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, inbound_tx);

        tokio::spawn(async move {
            while let Some(message) = inbound_rx.recv().await {
                let Some(response) = server.handle_value(message).await else {
                    continue;
                };
                if outbound_tx.send(response).await.is_err() {
                    break;
                }
            }
            debug!(session = %id, "Session task finished");
        });

        info!(session = %id, "Session opened");
        Session {
            id,
            outbound: outbound_rx,
            _guard: SessionGuard {
                id,
                manager: Arc::clone(self),
            },
        }
    }

    /// Queue a message for a session
    ///
    /// Waits while the session's inbound queue is full.
    pub async fn deliver(&self, id: Uuid, message: Value) -> Result<(), MCPError> {
        let sender = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
            .ok_or_else(|| MCPError::SessionNotFound(id.to_string()))?;

        sender
            .send(message)
            .await
            .map_err(|_| MCPError::SessionNotFound(id.to_string()))
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every session; their streams end once queued responses are sent
    pub fn close_all(&self) {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        if !sessions.is_empty() {
            info!(count = sessions.len(), "Closing open sessions");
        }
        sessions.clear();
    }

    fn remove(&self, id: Uuid) {
        let removed = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        if removed.is_some() {
            info!(session = %id, "Session closed");
        }
    }
}

/// The client-facing half of an open session
///
/// Dropping it closes the session.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    outbound: mpsc::Receiver<JsonRpcResponse>,
    _guard: SessionGuard,
}

impl Session {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Next response, or `None` once the session has been closed
    pub async fn next_response(&mut self) -> Option<JsonRpcResponse> {
        self.outbound.recv().await
    }
}

#[derive(Debug)]
struct SessionGuard {
    id: Uuid,
    manager: Arc<SessionManager>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.manager.remove(self.id);
    }
}
