//! In-memory cache of upstream portal sessions.
//!
//! Each entry maps a session token to the cookie value replayed on subsequent
//! portal requests, with TTL-based expiry. The store is the only shared
//! mutable state in the bridge; everything else is a stateless
//! request-response cycle.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

#[derive(Debug, Clone)]
struct SessionEntry {
    replay_cookie: String,
    expires_at: DateTime<Utc>,
}

/// Injectable session cache.
///
/// The in-memory implementation below is valid only for a single-instance
/// deployment; a horizontally scaled bridge would swap in a shared cache
/// behind the same interface.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert or overwrite an entry; resets the expiry window.
    async fn put(&self, token: &str, replay_cookie: &str);

    /// Return the replay cookie while the entry is live. An expired entry
    /// that sweep has not reclaimed yet behaves identically to a missing one.
    async fn get(&self, token: &str) -> Option<String>;

    /// Remove all strictly-expired entries.
    async fn sweep(&self);
}

pub struct InMemorySessionStore {
    entries: DashMap<String, SessionEntry>,
    ttl: Duration,
}

impl InMemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn put(&self, token: &str, replay_cookie: &str) {
        self.entries.insert(
            token.to_owned(),
            SessionEntry {
                replay_cookie: replay_cookie.to_owned(),
                expires_at: Utc::now() + self.ttl,
            },
        );
    }

    async fn get(&self, token: &str) -> Option<String> {
        let entry = self.entries.get(token)?;
        if entry.expires_at > Utc::now() {
            Some(entry.replay_cookie.clone())
        } else {
            None
        }
    }

    async fn sweep(&self) {
        let now = Utc::now();
        self.entries.retain(|_, entry| entry.expires_at > now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_returns_cookie() {
        let store = InMemorySessionStore::new(Duration::minutes(30));
        store.put("ABC123", "JSESSIONID=ABC123").await;

        assert_eq!(
            store.get("ABC123").await.as_deref(),
            Some("JSESSIONID=ABC123")
        );
        assert_eq!(store.get("UNKNOWN").await, None);
    }

    #[tokio::test]
    async fn put_overwrites_existing_entry() {
        let store = InMemorySessionStore::new(Duration::minutes(30));
        store.put("ABC123", "JSESSIONID=ABC123").await;
        store.put("ABC123", "JSESSIONID=ROTATED").await;

        assert_eq!(
            store.get("ABC123").await.as_deref(),
            Some("JSESSIONID=ROTATED")
        );
    }

    #[tokio::test]
    async fn expired_entry_behaves_like_missing_without_sweep() {
        let store = InMemorySessionStore::new(Duration::zero());
        store.put("ABC123", "JSESSIONID=ABC123").await;

        assert_eq!(store.get("ABC123").await, None);
        // Entry is still physically present until sweep runs.
        assert_eq!(store.entries.len(), 1);
    }

    #[tokio::test]
    async fn sweep_removes_only_expired_entries() {
        let store = InMemorySessionStore::new(Duration::minutes(30));
        store.put("LIVE", "JSESSIONID=LIVE").await;
        store.entries.insert(
            "STALE".to_owned(),
            SessionEntry {
                replay_cookie: "JSESSIONID=STALE".to_owned(),
                expires_at: Utc::now() - Duration::minutes(1),
            },
        );

        store.sweep().await;

        assert_eq!(store.entries.len(), 1);
        assert!(store.get("LIVE").await.is_some());
    }
}
