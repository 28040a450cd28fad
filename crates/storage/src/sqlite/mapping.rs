use sqlx::Row;
use trivia_core::model::{ProfileStats, QuestionId, UserId};

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn count_from_i64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn question_id_from_str(raw: String) -> Result<QuestionId, StorageError> {
    QuestionId::new(raw).map_err(ser)
}

pub(crate) fn map_stats_row(row: &sqlx::sqlite::SqliteRow) -> Result<ProfileStats, StorageError> {
    let user_id: String = row.try_get("user_id").map_err(ser)?;
    let answered: i64 = row.try_get("questions_answered").map_err(ser)?;
    Ok(ProfileStats {
        user_id: UserId::new(user_id).map_err(ser)?,
        username: row.try_get("username").map_err(ser)?,
        questions_answered: count_from_i64("questions_answered", answered)?,
        updated_at: row.try_get("updated_at").map_err(ser)?,
    })
}
