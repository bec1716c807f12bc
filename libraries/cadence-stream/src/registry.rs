//! Live streams reachable from backend callbacks
//!
//! The backend only carries a [`StreamId`]. Callbacks resolve it here and
//! work on a cloned `Arc`, so a stream torn down on the owner thread stays
//! alive until any callback already running on it returns.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tracing::debug;

use crate::error::{Result, StreamError};
use crate::stream::MediaStream;
use crate::types::StreamId;

/// Map of streams currently bound to a backend
#[derive(Debug, Default)]
pub struct StreamRegistry {
    streams: RwLock<HashMap<StreamId, Arc<MediaStream>>>,
}

impl StreamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `stream` reachable under its own identifier
    pub fn register(&self, stream: Arc<MediaStream>) -> StreamId {
        let id = stream.id();
        self.streams.write().insert(id, stream);
        debug!(id = %id, "stream registered");
        id
    }

    /// Stop resolving `id`; in-flight callbacks keep their own reference
    pub fn unregister(&self, id: StreamId) -> Option<Arc<MediaStream>> {
        let removed = self.streams.write().remove(&id);
        if removed.is_some() {
            debug!(id = %id, "stream unregistered");
        }
        removed
    }

    pub fn get(&self, id: StreamId) -> Option<Arc<MediaStream>> {
        self.streams.read().get(&id).cloned()
    }

    /// Like [`StreamRegistry::get`], failing with [`StreamError::NotRegistered`]
    pub fn resolve(&self, id: StreamId) -> Result<Arc<MediaStream>> {
        self.get(id).ok_or(StreamError::NotRegistered(id))
    }

    pub fn contains(&self, id: StreamId) -> bool {
        self.streams.read().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.streams.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.read().is_empty()
    }
}

/// Process-wide registry the pull callbacks resolve against
pub fn global() -> &'static StreamRegistry {
    static REGISTRY: OnceLock<StreamRegistry> = OnceLock::new();
    REGISTRY.get_or_init(StreamRegistry::new)
}
