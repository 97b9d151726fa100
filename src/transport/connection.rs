//! Lazy, shared transport connection management.
//!
//! The protocol functions never own a global client. A `ConnectionManager`
//! is constructed once by the application and injected wherever the
//! protocol needs the transport; internally it memoizes the connected
//! transport behind an async guard. Concurrent first callers coalesce onto
//! a single connect attempt: the guard is held across the connect future,
//! so later callers wait for it and then reuse the cached transport. A
//! failed attempt leaves the slot empty and the next caller retries.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use super::Transport;
use crate::error::Result;

/// Factory for establishing a transport connection.
///
/// Implementations typically wrap a client library's session bootstrap
/// (load stored credentials, dial, authenticate) and hand back the
/// connected client.
#[async_trait]
pub trait Connect: Send + Sync {
    /// The transport type this connector produces.
    type Transport: Transport + 'static;

    /// Establishes a fresh connection.
    async fn connect(&self) -> Result<Self::Transport>;
}

/// Memoizing holder for the process's transport connection.
pub struct ConnectionManager<C: Connect> {
    connector: C,
    slot: Mutex<Option<Arc<C::Transport>>>,
}

impl<C: Connect> ConnectionManager<C> {
    /// Creates a manager around the given connector. No connection is
    /// attempted until the first [`get`](Self::get).
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            slot: Mutex::new(None),
        }
    }

    /// Returns the shared transport, connecting lazily on first use.
    ///
    /// The internal guard stays locked for the duration of a connect
    /// attempt, so at most one attempt is in flight at a time and every
    /// concurrent caller observes its outcome.
    pub async fn get(&self) -> Result<Arc<C::Transport>> {
        let mut slot = self.slot.lock().await;
        if let Some(transport) = slot.as_ref() {
            return Ok(Arc::clone(transport));
        }
        debug!("establishing transport connection");
        let transport = Arc::new(self.connector.connect().await?);
        *slot = Some(Arc::clone(&transport));
        Ok(transport)
    }

    /// Returns true if a connection is currently cached.
    pub async fn is_connected(&self) -> bool {
        self.slot.lock().await.is_some()
    }

    /// Drops the cached connection; the next [`get`](Self::get) reconnects.
    pub async fn reset(&self) {
        debug!("dropping cached transport connection");
        *self.slot.lock().await = None;
    }
}
