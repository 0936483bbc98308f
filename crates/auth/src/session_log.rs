//! Append-only record of login/logout events.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use bayu_core::{SessionLogId, StoreResult, UserId};

/// One login event and, once closed, its logout time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionLogEntry {
    pub id: SessionLogId,
    pub user_id: UserId,
    pub login_at: DateTime<Utc>,
    pub logout_at: Option<DateTime<Utc>>,
}

impl SessionLogEntry {
    pub fn is_open(&self) -> bool {
        self.logout_at.is_none()
    }
}

/// Result of closing a session entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutOutcome {
    /// `logout_at` was unset and is now recorded.
    Closed,
    /// The entry was already closed; the first logout time is kept.
    AlreadyClosed,
}

#[async_trait]
pub trait SessionLog: Send + Sync {
    /// Append a new open entry and return its id. Ids increase monotonically.
    async fn record_login(&self, user_id: UserId, at: DateTime<Utc>) -> StoreResult<SessionLogId>;

    /// Set `logout_at` on an open entry. Unknown ids yield `StoreError::NotFound`.
    async fn record_logout(&self, id: SessionLogId, at: DateTime<Utc>) -> StoreResult<LogoutOutcome>;

    async fn find(&self, id: SessionLogId) -> StoreResult<Option<SessionLogEntry>>;
}
