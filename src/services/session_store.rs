//! Server-side session storage
//!
//! Sessions live in an in-process moka cache keyed by session id. The value
//! is the JSON serialization of [`SessionData`], so what is stored is exactly
//! what a persistent session backend would hold:
//!
//! ```json
//! {"user_id": 7, "cart": [{"product_id": 3, "quantity": 2, "price": "10.00"}]}
//! ```
//!
//! Handlers mutate a loaded [`Session`] and call [`SessionStore::save`] at the
//! end of the request; nothing is written unless the session was marked
//! modified.

use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{AppError, AppResult};
use crate::services::cart::CartEntry;

/// Everything a session carries between requests
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default)]
    pub user_id: Option<i32>,
    /// Cart lines in insertion order
    #[serde(default)]
    pub cart: Vec<CartEntry>,
}

/// A session loaded for the duration of one request
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    data: SessionData,
    modified: bool,
}

impl Session {
    pub fn new(id: impl Into<String>, data: SessionData) -> Self {
        Self {
            id: id.into(),
            data,
            modified: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user_id(&self) -> Option<i32> {
        self.data.user_id
    }

    pub fn data(&self) -> &SessionData {
        &self.data
    }

    /// Mutable access; the session is flagged for persistence
    pub fn data_mut(&mut self) -> &mut SessionData {
        self.modified = true;
        &mut self.data
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn login(&mut self, user_id: i32) {
        self.data_mut().user_id = Some(user_id);
    }
}

#[derive(Clone)]
pub struct SessionStore {
    cache: Arc<Cache<String, String>>,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration, max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_idle(idle_timeout)
            .build();

        Self {
            cache: Arc::new(cache),
        }
    }

    /// Start an anonymous session and persist it immediately
    pub async fn create(&self) -> AppResult<Session> {
        let session = Session::new(uuid::Uuid::new_v4().to_string(), SessionData::default());
        self.write(&session).await?;
        tracing::debug!(session_id = %session.id, "Session created");
        Ok(session)
    }

    pub async fn load(&self, session_id: &str) -> AppResult<Option<Session>> {
        let Some(raw) = self.cache.get(session_id).await else {
            return Ok(None);
        };

        let data: SessionData = serde_json::from_str(&raw).map_err(|e| {
            AppError::Internal(format!("Corrupt session {}: {}", session_id, e))
        })?;

        Ok(Some(Session::new(session_id, data)))
    }

    /// Persist the session if anything marked it modified
    pub async fn save(&self, session: &mut Session) -> AppResult<()> {
        if !session.modified {
            return Ok(());
        }
        self.write(session).await?;
        session.modified = false;
        Ok(())
    }

    pub async fn delete(&self, session_id: &str) {
        self.cache.invalidate(session_id).await;
    }

    /// Discard the session and everything in it, handing back a fresh
    /// anonymous session under a new id. The old id no longer resolves.
    pub async fn flush(&self, session: &Session) -> AppResult<Session> {
        self.delete(session.id()).await;
        let fresh = self.create().await?;
        tracing::debug!(old = %session.id, new = %fresh.id, "Session flushed");
        Ok(fresh)
    }

    async fn write(&self, session: &Session) -> AppResult<()> {
        let raw = serde_json::to_string(&session.data)
            .map_err(|e| AppError::Internal(format!("Failed to serialize session: {}", e)))?;
        self.cache.insert(session.id.clone(), raw).await;
        Ok(())
    }
}
