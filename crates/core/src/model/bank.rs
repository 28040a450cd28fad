use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::{BookId, QuestionId};
use crate::model::question::{Question, QuestionDraft, QuestionError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BankError {
    #[error("bank {book} has no questions")]
    Empty { book: BookId },
    #[error("bank {book} defines question {id} more than once")]
    DuplicateQuestion { book: BookId, id: QuestionId },
    #[error("bank title must not be blank")]
    MissingTitle,
    #[error(transparent)]
    Question(#[from] QuestionError),
}

/// On-disk shape of a book's bank asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankDraft {
    pub book: BookId,
    pub title: String,
    pub questions: Vec<QuestionDraft>,
}

impl BankDraft {
    /// Validate every question and the bank as a whole.
    ///
    /// # Errors
    ///
    /// Returns `BankError` for blank titles, empty banks, duplicate ids, or
    /// any invalid question.
    pub fn validate(self) -> Result<QuestionBank, BankError> {
        let title = self.title.trim().to_owned();
        if title.is_empty() {
            return Err(BankError::MissingTitle);
        }
        let questions = self
            .questions
            .into_iter()
            .map(QuestionDraft::validate)
            .collect::<Result<Vec<_>, _>>()?;
        QuestionBank::new(self.book, title, questions)
    }
}

/// Ordered, immutable question bank for one book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBank {
    book: BookId,
    title: String,
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Build a bank from already-validated questions.
    ///
    /// # Errors
    ///
    /// Returns `BankError::Empty` for an empty list and
    /// `BankError::DuplicateQuestion` if two questions share an id.
    pub fn new(
        book: BookId,
        title: impl Into<String>,
        questions: Vec<Question>,
    ) -> Result<Self, BankError> {
        if questions.is_empty() {
            return Err(BankError::Empty { book });
        }
        let mut seen = HashSet::with_capacity(questions.len());
        for question in &questions {
            if !seen.insert(question.id()) {
                return Err(BankError::DuplicateQuestion {
                    book: book.clone(),
                    id: question.id().clone(),
                });
            }
        }
        Ok(Self {
            book,
            title: title.into(),
            questions,
        })
    }

    #[must_use]
    pub fn book(&self) -> &BookId {
        &self.book
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id() == id)
    }

    #[must_use]
    pub fn contains(&self, id: &QuestionId) -> bool {
        self.get(id).is_some()
    }
}
