use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{BookId, QuestionId, UserId};

/// Authenticated quiz taker.
///
/// The username is only carried along so the profile stats row can show it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub user_id: UserId,
    pub username: String,
}

impl Player {
    #[must_use]
    pub fn new(user_id: UserId, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
        }
    }
}

/// One answer event for a (user, book, question).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressRecord {
    pub user_id: UserId,
    pub book: BookId,
    pub question_id: QuestionId,
    pub is_correct: bool,
    pub answered_at: DateTime<Utc>,
}

/// Denormalised per-user counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStats {
    pub user_id: UserId,
    pub username: String,
    pub questions_answered: u64,
    pub updated_at: DateTime<Utc>,
}
