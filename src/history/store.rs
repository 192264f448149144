use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::History;

/// Per-session conversation storage keyed by session id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the stored history, or `None` for unknown or expired sessions.
    async fn get(&self, key: &str) -> Option<History>;

    /// Replaces the stored history and refreshes the session's expiry.
    async fn set(&self, key: &str, history: History);

    /// Drops the session. Returns whether anything was stored.
    async fn remove(&self, key: &str) -> bool;

    /// Drops every expired session and returns how many were removed.
    async fn purge_expired(&self) -> usize;
}

struct SessionEntry {
    history: History,
    last_seen: DateTime<Utc>,
}

/// Ephemeral in-process store. Sessions idle for longer than `idle_ttl`
/// read as absent and are reclaimed by [`SessionStore::purge_expired`].
pub struct InMemorySessionStore {
    entries: RwLock<HashMap<String, SessionEntry>>,
    idle_ttl: chrono::Duration,
}

impl InMemorySessionStore {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            idle_ttl: chrono::Duration::from_std(idle_ttl)
                .unwrap_or_else(|_| chrono::Duration::days(36_500)),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn is_expired(&self, entry: &SessionEntry, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(entry.last_seen) > self.idle_ttl
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, key: &str) -> Option<History> {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let entry = entries.get_mut(key)?;
        if self.is_expired(entry, now) {
            entries.remove(key);
            return None;
        }
        entry.last_seen = now;
        Some(entry.history.clone())
    }

    async fn set(&self, key: &str, history: History) {
        let entry = SessionEntry {
            history,
            last_seen: Utc::now(),
        };
        self.entries.write().await.insert(key.to_string(), entry);
    }

    async fn remove(&self, key: &str) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !self.is_expired(entry, now));
        before - entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::Turn;

    #[tokio::test]
    async fn unknown_session_has_no_history() {
        let store = InMemorySessionStore::new(Duration::from_secs(60));
        assert!(store.get("missing").await.is_none());
    }

    #[tokio::test]
    async fn set_then_get_returns_the_same_turns() {
        let store = InMemorySessionStore::new(Duration::from_secs(60));
        let history = vec![Turn::user("q"), Turn::assistant("a")];

        store.set("s1", history.clone()).await;

        assert_eq!(store.get("s1").await, Some(history));
        assert!(store.get("s2").await.is_none());
    }

    #[tokio::test]
    async fn set_replaces_previous_history() {
        let store = InMemorySessionStore::new(Duration::from_secs(60));
        store.set("s1", vec![Turn::user("old")]).await;
        store.set("s1", vec![Turn::user("new")]).await;

        assert_eq!(store.get("s1").await, Some(vec![Turn::user("new")]));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn remove_reports_whether_session_existed() {
        let store = InMemorySessionStore::new(Duration::from_secs(60));
        store.set("s1", vec![]).await;

        assert!(store.remove("s1").await);
        assert!(!store.remove("s1").await);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn expired_sessions_read_as_absent_and_are_purged() {
        let store = InMemorySessionStore::new(Duration::ZERO);
        store.set("s1", vec![Turn::user("q")]).await;
        store.set("s2", vec![Turn::user("q")]).await;
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert!(store.get("s1").await.is_none());
        assert_eq!(store.purge_expired().await, 1);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn purge_keeps_live_sessions() {
        let store = InMemorySessionStore::new(Duration::from_secs(3600));
        store.set("s1", vec![]).await;
        assert_eq!(store.purge_expired().await, 0);
        assert_eq!(store.len().await, 1);
    }
}
