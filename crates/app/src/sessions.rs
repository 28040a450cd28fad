use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use services::{QuizSession, SharedSession};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use trivia_core::model::SessionId;

/// Default idle time after which a session is dropped.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug)]
struct Entry {
    session: SharedSession,
    last_seen: Instant,
}

/// Live quiz sessions, keyed by id.
///
/// Sessions only live as long as the process. Clients that walk away without
/// discarding their session are covered by `evict_idle`, which drops any
/// session not looked up within the TTL.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, Entry>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, session: QuizSession) -> SharedSession {
        let id = session.id();
        let shared = Arc::new(tokio::sync::Mutex::new(session));
        let entry = Entry {
            session: Arc::clone(&shared),
            last_seen: Instant::now(),
        };
        self.sessions.write().await.insert(id, entry);
        shared
    }

    /// Look up a session and mark it as recently used.
    pub async fn get(&self, id: SessionId) -> Option<SharedSession> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id)?;
        entry.last_seen = Instant::now();
        Some(Arc::clone(&entry.session))
    }

    pub async fn remove(&self, id: SessionId) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop sessions idle for longer than `ttl`. Returns how many were dropped.
    pub async fn evict_idle(&self, ttl: Duration) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) <= ttl);
        before - sessions.len()
    }

    /// Run `evict_idle` periodically until the returned task is aborted.
    pub fn spawn_sweeper(self: Arc<Self>, ttl: Duration) -> JoinHandle<()> {
        let period = ttl.min(Duration::from_secs(60)).max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let evicted = self.evict_idle(ttl).await;
                if evicted > 0 {
                    tracing::debug!(evicted, "dropped idle quiz sessions");
                }
            }
        })
    }
}
