//! JSON request and response bodies of the HTTP API.

use serde::{Deserialize, Serialize};
use services::{Face, QuizSession, SessionProgress};
use trivia_core::model::{
    AnswerOption, BookId, OptionLabel, QuestionBank, QuestionId, SessionId, UserId,
};
use trivia_core::scoring::ScoreBand;

//
// ─── REQUESTS ──────────────────────────────────────────────────────────────────
//

/// Body of `POST /api/books/{book}/sessions`. Both fields absent means anonymous.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    pub user_id: Option<String>,
    pub username: Option<String>,
}

/// Body of `POST /api/sessions/{id}/answer`.
#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub label: String,
}

//
// ─── RESPONSES ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSummary {
    pub book: BookId,
    pub title: String,
    pub question_count: usize,
}

impl From<&QuestionBank> for BookSummary {
    fn from(bank: &QuestionBank) -> Self {
        Self {
            book: bank.book().clone(),
            title: bank.title().to_string(),
            question_count: bank.len(),
        }
    }
}

/// The question on screen. Answer fields are only filled once it is answered.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub id: QuestionId,
    pub prompt: String,
    pub options: Vec<AnswerOption>,
    pub source_reference: String,
    pub verse_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_label: Option<OptionLabel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_label: Option<OptionLabel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreView {
    pub correct: usize,
    pub total: usize,
    pub percent: usize,
    pub band: ScoreBand,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: SessionId,
    pub book: BookId,
    pub authenticated: bool,
    pub face: Face,
    pub progress: SessionProgress,
    pub question: Option<QuestionView>,
    pub score: Option<ScoreView>,
}

impl From<&QuizSession> for SessionView {
    fn from(session: &QuizSession) -> Self {
        let selected = session.selected_label();
        let question = session.current_question().map(|q| {
            let answered = selected.is_some();
            QuestionView {
                id: q.id().clone(),
                prompt: q.prompt().to_string(),
                options: q.options().to_vec(),
                source_reference: q.source_reference().to_string(),
                verse_text: q.cached_verse_text().map(str::to_string),
                selected_label: selected,
                correct_label: answered.then(|| q.correct_label()),
                correct_text: answered
                    .then(|| q.option_text(q.correct_label()))
                    .flatten()
                    .map(str::to_string),
                is_correct: selected.map(|label| q.is_correct(label)),
                explanation: answered
                    .then(|| q.explanation().to_string())
                    .filter(|text| !text.is_empty()),
            }
        });
        let score = session.is_complete().then(|| {
            let score = session.score();
            let band = score.band();
            ScoreView {
                correct: score.correct(),
                total: score.total(),
                percent: score.percent(),
                band,
                message: band.message(),
            }
        });

        Self {
            session_id: session.id(),
            book: session.book().clone(),
            authenticated: session.player().is_some(),
            face: session.face(),
            progress: session.progress(),
            question,
            score,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResponse {
    /// `false` when the question had already been answered.
    pub recorded: bool,
    pub session: SessionView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteredResponse {
    pub user_id: UserId,
    pub book: BookId,
    pub question_ids: Vec<QuestionId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub questions_answered: u64,
}
