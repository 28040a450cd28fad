use chrono::{DateTime, Utc};
use trivia_core::model::{ProfileStats, UserId};

use super::{
    SqliteRepository,
    mapping::{conn, count_from_i64, map_stats_row},
};
use crate::repository::{ProfileStatsRepository, StorageError};

#[async_trait::async_trait]
impl ProfileStatsRepository for SqliteRepository {
    async fn increment_answered(
        &self,
        user_id: &UserId,
        username: &str,
        at: DateTime<Utc>,
    ) -> Result<u64, StorageError> {
        // Single statement so concurrent sessions cannot lose increments.
        let total: i64 = sqlx::query_scalar(
            r"
                INSERT INTO profile_stats (user_id, username, questions_answered, updated_at)
                VALUES (?1, ?2, 1, ?3)
                ON CONFLICT(user_id) DO UPDATE SET
                    questions_answered = questions_answered + 1,
                    username = excluded.username,
                    updated_at = excluded.updated_at
                RETURNING questions_answered
            ",
        )
        .bind(user_id.as_str())
        .bind(username)
        .bind(at)
        .fetch_one(&self.pool)
        .await
        .map_err(conn)?;

        count_from_i64("questions_answered", total)
    }

    async fn get_stats(&self, user_id: &UserId) -> Result<Option<ProfileStats>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT user_id, username, questions_answered, updated_at
                FROM profile_stats
                WHERE user_id = ?1
            ",
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_stats_row).transpose()
    }
}
