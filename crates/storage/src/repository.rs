use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use trivia_core::model::{BookId, ProfileStats, ProgressRecord, QuestionId, UserId};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for per-question answer events.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Append one answer event and return its row id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn append_progress(&self, record: &ProgressRecord) -> Result<i64, StorageError>;

    /// Question ids the user has answered correctly at least once for `book`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn answered_correctly(
        &self,
        user_id: &UserId,
        book: &BookId,
    ) -> Result<HashSet<QuestionId>, StorageError>;
}

/// Repository contract for the denormalised per-user counters.
#[async_trait]
pub trait ProfileStatsRepository: Send + Sync {
    /// Atomically add one to the user's answered-question counter, creating the
    /// row on first use. Returns the new total.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the update fails.
    async fn increment_answered(
        &self,
        user_id: &UserId,
        username: &str,
        at: DateTime<Utc>,
    ) -> Result<u64, StorageError>;

    /// Fetch the stats row for a user.
    ///
    /// Returns `Ok(None)` when the user has never answered a question.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn get_stats(&self, user_id: &UserId) -> Result<Option<ProfileStats>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    progress: Arc<Mutex<Vec<ProgressRecord>>>,
    stats: Arc<Mutex<HashMap<UserId, ProfileStats>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored answer event, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn progress_records(&self) -> Result<Vec<ProgressRecord>, StorageError> {
        let guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn append_progress(&self, record: &ProgressRecord) -> Result<i64, StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.push(record.clone());
        i64::try_from(guard.len())
            .map_err(|_| StorageError::Serialization("progress id overflow".into()))
    }

    async fn answered_correctly(
        &self,
        user_id: &UserId,
        book: &BookId,
    ) -> Result<HashSet<QuestionId>, StorageError> {
        let guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .iter()
            .filter(|r| r.is_correct && &r.user_id == user_id && &r.book == book)
            .map(|r| r.question_id.clone())
            .collect())
    }
}

#[async_trait]
impl ProfileStatsRepository for InMemoryRepository {
    async fn increment_answered(
        &self,
        user_id: &UserId,
        username: &str,
        at: DateTime<Utc>,
    ) -> Result<u64, StorageError> {
        let mut guard = self
            .stats
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let entry = guard
            .entry(user_id.clone())
            .or_insert_with(|| ProfileStats {
                user_id: user_id.clone(),
                username: username.to_owned(),
                questions_answered: 0,
                updated_at: at,
            });
        entry.questions_answered = entry.questions_answered.saturating_add(1);
        entry.username = username.to_owned();
        entry.updated_at = at;
        Ok(entry.questions_answered)
    }

    async fn get_stats(&self, user_id: &UserId) -> Result<Option<ProfileStats>, StorageError> {
        let guard = self
            .stats
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(user_id).cloned())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
    pub stats: Arc<dyn ProfileStatsRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo.clone());
        let stats: Arc<dyn ProfileStatsRepository> = Arc::new(repo);
        Self { progress, stats }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trivia_core::time::fixed_now;

    fn record(user: &str, book: &str, question: &str, is_correct: bool) -> ProgressRecord {
        ProgressRecord {
            user_id: UserId::new(user).unwrap(),
            book: BookId::new(book).unwrap(),
            question_id: QuestionId::new(question).unwrap(),
            is_correct,
            answered_at: fixed_now(),
        }
    }

    #[tokio::test]
    async fn answered_correctly_filters_by_user_book_and_outcome() {
        let repo = InMemoryRepository::new();
        repo.append_progress(&record("u1", "ruth", "r1", true))
            .await
            .unwrap();
        repo.append_progress(&record("u1", "ruth", "r2", false))
            .await
            .unwrap();
        repo.append_progress(&record("u1", "genesis", "g1", true))
            .await
            .unwrap();
        repo.append_progress(&record("u2", "ruth", "r3", true))
            .await
            .unwrap();

        let mastered = repo
            .answered_correctly(&UserId::new("u1").unwrap(), &BookId::new("ruth").unwrap())
            .await
            .unwrap();
        assert_eq!(mastered, HashSet::from([QuestionId::new("r1").unwrap()]));
        assert_eq!(repo.progress_records().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn increment_creates_then_counts_up() {
        let repo = InMemoryRepository::new();
        let user = UserId::new("u1").unwrap();
        assert!(repo.get_stats(&user).await.unwrap().is_none());

        assert_eq!(
            repo.increment_answered(&user, "ruth_fan", fixed_now())
                .await
                .unwrap(),
            1
        );
        assert_eq!(
            repo.increment_answered(&user, "ruth_fan", fixed_now())
                .await
                .unwrap(),
            2
        );
        let stats = repo.get_stats(&user).await.unwrap().unwrap();
        assert_eq!(stats.questions_answered, 2);
        assert_eq!(stats.username, "ruth_fan");
    }
}
