use std::collections::HashSet;
use std::sync::Arc;

use serde::Deserialize;
use storage::repository::{ProfileStatsRepository, ProgressRepository};
use trivia_core::model::{BookId, ProfileStats, ProgressRecord, QuestionId, UserId};

use crate::Clock;
use crate::error::ProgressError;

/// One answer to persist, in the shape the progress endpoint accepts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordAnswer {
    pub user_id: UserId,
    pub question_id: QuestionId,
    pub username: String,
    pub is_correct: bool,
    pub book: BookId,
}

/// Persists per-question outcomes and answers "what has this user mastered".
#[derive(Clone)]
pub struct ProgressSync {
    clock: Clock,
    progress: Arc<dyn ProgressRepository>,
    stats: Arc<dyn ProfileStatsRepository>,
}

impl ProgressSync {
    #[must_use]
    pub fn new(
        clock: Clock,
        progress: Arc<dyn ProgressRepository>,
        stats: Arc<dyn ProfileStatsRepository>,
    ) -> Self {
        Self {
            clock,
            progress,
            stats,
        }
    }

    /// Question ids the user already answered correctly for `book`.
    ///
    /// Storage failures are logged and treated as "nothing mastered" so the
    /// session can still start with the full bank.
    pub async fn fetch_answered_correctly(
        &self,
        user_id: &UserId,
        book: &BookId,
    ) -> HashSet<QuestionId> {
        match self.progress.answered_correctly(user_id, book).await {
            Ok(ids) => ids,
            Err(err) => {
                tracing::warn!(%user_id, %book, error = %err, "failed to load mastered questions");
                HashSet::new()
            }
        }
    }

    /// Append the answer event and bump the user's answered-question counter.
    ///
    /// Returns the user's new answered-question total.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if either write fails. The progress
    /// row is not rolled back when only the counter update fails.
    pub async fn record_answer(&self, answer: &RecordAnswer) -> Result<u64, ProgressError> {
        let now = self.clock.now();
        let record = ProgressRecord {
            user_id: answer.user_id.clone(),
            book: answer.book.clone(),
            question_id: answer.question_id.clone(),
            is_correct: answer.is_correct,
            answered_at: now,
        };
        let row_id = self.progress.append_progress(&record).await?;
        let total = self
            .stats
            .increment_answered(&answer.user_id, &answer.username, now)
            .await?;
        tracing::debug!(
            user_id = %answer.user_id,
            book = %answer.book,
            question_id = %answer.question_id,
            is_correct = answer.is_correct,
            row_id,
            total,
            "recorded answer"
        );
        Ok(total)
    }

    /// Profile stats for a user, if any answers were recorded.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the query fails.
    pub async fn stats(&self, user_id: &UserId) -> Result<Option<ProfileStats>, ProgressError> {
        Ok(self.stats.get_stats(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use storage::repository::{InMemoryRepository, StorageError};
    use trivia_core::time::fixed_now;

    struct FailingProgress;

    #[async_trait]
    impl ProgressRepository for FailingProgress {
        async fn append_progress(&self, _record: &ProgressRecord) -> Result<i64, StorageError> {
            Err(StorageError::Connection("offline".into()))
        }

        async fn answered_correctly(
            &self,
            _user_id: &UserId,
            _book: &BookId,
        ) -> Result<HashSet<QuestionId>, StorageError> {
            Err(StorageError::Connection("offline".into()))
        }
    }

    fn answer(question: &str, is_correct: bool) -> RecordAnswer {
        RecordAnswer {
            user_id: UserId::new("u1").unwrap(),
            question_id: QuestionId::new(question).unwrap(),
            username: "berean".into(),
            is_correct,
            book: BookId::new("acts").unwrap(),
        }
    }

    #[tokio::test]
    async fn record_answer_appends_and_counts() {
        let repo = InMemoryRepository::new();
        let sync = ProgressSync::new(
            Clock::fixed(fixed_now()),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
        );

        assert_eq!(sync.record_answer(&answer("a1", true)).await.unwrap(), 1);
        assert_eq!(sync.record_answer(&answer("a2", false)).await.unwrap(), 2);

        let records = repo.progress_records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].answered_at, fixed_now());

        let mastered = sync
            .fetch_answered_correctly(
                &UserId::new("u1").unwrap(),
                &BookId::new("acts").unwrap(),
            )
            .await;
        assert_eq!(mastered, HashSet::from([QuestionId::new("a1").unwrap()]));

        let stats = sync
            .stats(&UserId::new("u1").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stats.questions_answered, 2);
    }

    #[tokio::test]
    async fn read_failures_yield_empty_set() {
        let repo = InMemoryRepository::new();
        let sync = ProgressSync::new(
            Clock::fixed(fixed_now()),
            Arc::new(FailingProgress),
            Arc::new(repo),
        );
        let mastered = sync
            .fetch_answered_correctly(
                &UserId::new("u1").unwrap(),
                &BookId::new("acts").unwrap(),
            )
            .await;
        assert!(mastered.is_empty());
        assert!(matches!(
            sync.record_answer(&answer("a1", true)).await,
            Err(ProgressError::Storage(_))
        ));
    }

    #[test]
    fn record_answer_reads_endpoint_json() {
        let raw = r#"{"userId":"u1","questionId":"a1","username":"berean","isCorrect":true,"book":"acts"}"#;
        let parsed: RecordAnswer = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed, answer("a1", true));
    }
}
