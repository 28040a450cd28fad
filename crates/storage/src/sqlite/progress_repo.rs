use std::collections::HashSet;

use trivia_core::model::{BookId, ProgressRecord, QuestionId, UserId};

use super::{
    SqliteRepository,
    mapping::{conn, question_id_from_str},
};
use crate::repository::{ProgressRepository, StorageError};

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn append_progress(&self, record: &ProgressRecord) -> Result<i64, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO progress (user_id, book, question_id, is_correct, answered_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(record.user_id.as_str())
        .bind(record.book.as_str())
        .bind(record.question_id.as_str())
        .bind(record.is_correct)
        .bind(record.answered_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(res.last_insert_rowid())
    }

    async fn answered_correctly(
        &self,
        user_id: &UserId,
        book: &BookId,
    ) -> Result<HashSet<QuestionId>, StorageError> {
        let ids: Vec<String> = sqlx::query_scalar(
            r"
                SELECT DISTINCT question_id
                FROM progress
                WHERE user_id = ?1 AND book = ?2 AND is_correct = 1
            ",
        )
        .bind(user_id.as_str())
        .bind(book.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        ids.into_iter().map(question_id_from_str).collect()
    }
}
