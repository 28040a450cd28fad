use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use trivia_core::model::{BookId, OptionLabel, Player, Question, QuestionId, SessionId};
use trivia_core::scoring::Score;

use super::progress::SessionProgress;
use crate::error::SessionError;

//
// ─── ANSWER TYPES ──────────────────────────────────────────────────────────────
//

/// Which side of the flip card is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Face {
    Question,
    Answer,
}

/// One answered question within a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnsweredQuestion {
    pub question_id: QuestionId,
    pub selected: OptionLabel,
    pub is_correct: bool,
}

/// Details of a freshly recorded answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerReceipt {
    pub question_id: QuestionId,
    pub selected: OptionLabel,
    pub correct_label: OptionLabel,
    pub is_correct: bool,
    pub source_reference: String,
    /// Set when the question has no verse text cached yet.
    pub needs_verse: bool,
}

/// Result of `QuizSession::select_answer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    Recorded(AnswerReceipt),
    /// The current question was already answered; nothing changed.
    AlreadyAnswered,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Per-visit quiz over a working set of questions.
///
/// Walks the questions one at a time. Each question takes exactly one answer;
/// further selections are ignored until the session advances.
pub struct QuizSession {
    id: SessionId,
    book: BookId,
    player: Option<Player>,
    questions: Vec<Question>,
    cursor: usize,
    selected: Option<OptionLabel>,
    correct_count: usize,
    answers: Vec<AnsweredQuestion>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    /// Create a session over an already chosen working set.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if no questions are provided.
    pub fn new(
        id: SessionId,
        book: BookId,
        player: Option<Player>,
        questions: Vec<Question>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }
        Ok(Self {
            id,
            book,
            player,
            questions,
            cursor: 0,
            selected: None,
            correct_count: 0,
            answers: Vec::new(),
            started_at,
            completed_at: None,
        })
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn book(&self) -> &BookId {
        &self.book
    }

    #[must_use]
    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn selected_label(&self) -> Option<OptionLabel> {
        self.selected
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    #[must_use]
    pub fn answers(&self) -> &[AnsweredQuestion] {
        &self.answers
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.cursor + 1 >= self.questions.len()
    }

    /// The question being shown, or `None` once the session is complete.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.is_complete() {
            return None;
        }
        self.questions.get(self.cursor)
    }

    #[must_use]
    pub fn face(&self) -> Face {
        if self.selected.is_some() {
            Face::Answer
        } else {
            Face::Question
        }
    }

    #[must_use]
    pub fn score(&self) -> Score {
        Score::new(self.correct_count, self.questions.len())
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let answered = self.answers.len();
        SessionProgress {
            total: self.questions.len(),
            position: (self.cursor + 1).min(self.questions.len()),
            answered,
            correct: self.correct_count,
            remaining: self.questions.len().saturating_sub(answered),
            is_complete: self.is_complete(),
        }
    }

    /// Record an answer for the current question.
    ///
    /// Returns `SelectOutcome::AlreadyAnswered` without touching any state if
    /// the current question already has an answer.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` if the session is finished.
    pub fn select_answer(&mut self, label: OptionLabel) -> Result<SelectOutcome, SessionError> {
        if self.is_complete() {
            return Err(SessionError::Completed);
        }
        if self.selected.is_some() {
            return Ok(SelectOutcome::AlreadyAnswered);
        }
        let question = self
            .questions
            .get(self.cursor)
            .ok_or(SessionError::Completed)?;

        let is_correct = question.is_correct(label);
        let receipt = AnswerReceipt {
            question_id: question.id().clone(),
            selected: label,
            correct_label: question.correct_label(),
            is_correct,
            source_reference: question.source_reference().to_owned(),
            needs_verse: question.cached_verse_text().is_none(),
        };

        self.selected = Some(label);
        if is_correct {
            self.correct_count += 1;
        }
        self.answers.push(AnsweredQuestion {
            question_id: receipt.question_id.clone(),
            selected: label,
            is_correct,
        });

        Ok(SelectOutcome::Recorded(receipt))
    }

    /// Move to the next question, or complete the session after the last one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` if the session is already finished and
    /// `SessionError::Unanswered` if the current question has no answer.
    pub fn advance(&mut self, at: DateTime<Utc>) -> Result<(), SessionError> {
        if self.is_complete() {
            return Err(SessionError::Completed);
        }
        if self.selected.is_none() {
            return Err(SessionError::Unanswered);
        }
        if self.is_last() {
            self.completed_at = Some(at);
        } else {
            self.cursor += 1;
            self.selected = None;
        }
        Ok(())
    }

    /// Store fetched verse text on the session's copy of a question.
    ///
    /// Returns `false` if the question is not part of this session or the text is blank.
    pub fn cache_verse_text(&mut self, question_id: &QuestionId, text: &str) -> bool {
        let Some(question) = self.questions.iter_mut().find(|q| q.id() == question_id) else {
            return false;
        };
        question.cache_verse_text(text);
        question.cached_verse_text().is_some()
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("id", &self.id)
            .field("book", &self.book)
            .field("questions_len", &self.questions.len())
            .field("cursor", &self.cursor)
            .field("selected", &self.selected)
            .field("correct_count", &self.correct_count)
            .field("completed_at", &self.completed_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
