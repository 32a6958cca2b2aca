use std::{collections::HashMap, sync::Arc, time::Duration};

use teloxide::types::{ChatId, MessageId};
use tokio::{sync::Mutex, task::JoinHandle, time::Instant};

pub(crate) const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PendingAction {
    /// The next plain text from the admin is broadcast.
    Broadcast,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Session {
    pub hub_message_id: Option<MessageId>,
    pub pending: Option<PendingAction>,
}

#[derive(Debug)]
struct Entry {
    session: Session,
    touched: Instant,
}

/// Per-chat bot state that expires after `ttl` without activity.
///
/// Expired entries read as an empty session; `purge_expired` drops them so
/// the map only holds chats seen within the last `ttl`.
#[derive(Clone)]
pub(crate) struct SessionStore {
    inner: Arc<Mutex<HashMap<ChatId, Entry>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}

impl SessionStore {
    pub(crate) fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    pub(crate) async fn get(&self, chat_id: ChatId) -> Session {
        self.get_at(chat_id, Instant::now()).await
    }

    pub(crate) async fn update<F>(&self, chat_id: ChatId, f: F) -> Session
    where
        F: FnOnce(&mut Session),
    {
        self.update_at(chat_id, Instant::now(), f).await
    }

    pub(crate) async fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now()).await
    }

    async fn get_at(&self, chat_id: ChatId, now: Instant) -> Session {
        let mut guard = self.inner.lock().await;
        match guard.get(&chat_id) {
            Some(entry) if !self.is_expired(entry, now) => entry.session.clone(),
            Some(_) => {
                guard.remove(&chat_id);
                Session::default()
            }
            None => Session::default(),
        }
    }

    async fn update_at<F>(&self, chat_id: ChatId, now: Instant, f: F) -> Session
    where
        F: FnOnce(&mut Session),
    {
        let mut guard = self.inner.lock().await;
        let entry = guard.entry(chat_id).or_insert_with(|| Entry {
            session: Session::default(),
            touched: now,
        });
        if self.is_expired(entry, now) {
            entry.session = Session::default();
        }
        f(&mut entry.session);
        entry.touched = now;
        entry.session.clone()
    }

    async fn purge_expired_at(&self, now: Instant) -> usize {
        let mut guard = self.inner.lock().await;
        let before = guard.len();
        guard.retain(|_, entry| now.saturating_duration_since(entry.touched) < self.ttl);
        before - guard.len()
    }

    fn is_expired(&self, entry: &Entry, now: Instant) -> bool {
        now.saturating_duration_since(entry.touched) >= self.ttl
    }

    /// Periodically drops expired sessions until the returned task is aborted.
    pub(crate) fn spawn_janitor(&self, every: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let purged = store.purge_expired().await;
                if purged > 0 {
                    tracing::debug!(purged, "expired bot sessions purged");
                }
            }
        })
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAT: ChatId = ChatId(42);

    #[tokio::test]
    async fn session_survives_within_ttl() {
        let store = SessionStore::new(Duration::from_secs(60));
        let start = Instant::now();
        store
            .update_at(CHAT, start, |s| s.pending = Some(PendingAction::Broadcast))
            .await;

        let later = start + Duration::from_secs(59);
        assert_eq!(
            store.get_at(CHAT, later).await.pending,
            Some(PendingAction::Broadcast)
        );
    }

    #[tokio::test]
    async fn expired_session_reads_empty() {
        let store = SessionStore::new(Duration::from_secs(60));
        let start = Instant::now();
        store
            .update_at(CHAT, start, |s| {
                s.pending = Some(PendingAction::Broadcast);
                s.hub_message_id = Some(MessageId(7));
            })
            .await;

        let session = store.get_at(CHAT, start + Duration::from_secs(60)).await;
        assert!(session.pending.is_none());
        assert!(session.hub_message_id.is_none());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn update_after_expiry_starts_fresh() {
        let store = SessionStore::new(Duration::from_secs(60));
        let start = Instant::now();
        store
            .update_at(CHAT, start, |s| s.pending = Some(PendingAction::Broadcast))
            .await;

        let session = store
            .update_at(CHAT, start + Duration::from_secs(120), |s| {
                s.hub_message_id = Some(MessageId(1))
            })
            .await;
        assert!(session.pending.is_none());
        assert_eq!(session.hub_message_id, Some(MessageId(1)));
    }

    #[tokio::test]
    async fn purge_drops_only_expired() {
        let store = SessionStore::new(Duration::from_secs(60));
        let start = Instant::now();
        store.update_at(ChatId(1), start, |_| {}).await;
        store
            .update_at(ChatId(2), start + Duration::from_secs(30), |_| {})
            .await;

        let purged = store.purge_expired_at(start + Duration::from_secs(61)).await;
        assert_eq!(purged, 1);
        assert_eq!(store.len().await, 1);
    }
}
