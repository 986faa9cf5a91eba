//! Session storage.
//!
//! Sessions are keyed by opaque uuid and handed out behind a per-session
//! mutex, which gives the required concurrency discipline for free: at most
//! one in-flight turn per session, while distinct sessions proceed in
//! parallel. The store itself is an injected abstraction; the in-memory
//! implementation here covers process-lifetime usage, and nothing in the
//! engine assumes any particular backing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::model::SessionState;

/// A session behind its own lock. Hold the guard for the whole turn.
pub type SharedSession = Arc<Mutex<SessionState>>;

/// Key-value session storage.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store a new session under its own id.
    async fn insert(&self, state: SessionState) -> Uuid;

    /// Look up a session by id.
    async fn get(&self, id: Uuid) -> Option<SharedSession>;

    /// Drop a session. Returns whether it existed.
    async fn remove(&self, id: Uuid) -> bool;
}

/// Process-local session store.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<Uuid, SharedSession>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn insert(&self, state: SessionState) -> Uuid {
        let id = state.id;
        self.sessions
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(state)));
        id
    }

    async fn get(&self, id: Uuid) -> Option<SharedSession> {
        self.sessions.read().await.get(&id).cloned()
    }

    async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }
}
