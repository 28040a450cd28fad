use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;

use trivia_core::model::{Question, QuestionBank, QuestionId};

/// Number of questions in a full session.
pub const WORKING_SET_SIZE: usize = 10;

/// Questions chosen for one session.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkingSet {
    pub questions: Vec<Question>,
    /// How many bank questions were skipped as already mastered.
    pub excluded: usize,
    /// True when everything was mastered and the full bank was used instead.
    pub replaying: bool,
}

/// Returns a uniformly shuffled copy of `questions` (Fisher–Yates).
pub fn shuffled<R: Rng + ?Sized>(questions: &[Question], rng: &mut R) -> Vec<Question> {
    let mut out = questions.to_vec();
    out.as_mut_slice().shuffle(rng);
    out
}

/// Picks the working set for a session from a book's bank.
pub struct WorkingSetBuilder<'a> {
    bank: &'a QuestionBank,
    size: usize,
}

impl<'a> WorkingSetBuilder<'a> {
    #[must_use]
    pub fn new(bank: &'a QuestionBank) -> Self {
        Self {
            bank,
            size: WORKING_SET_SIZE,
        }
    }

    #[must_use]
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    /// Build the working set.
    ///
    /// - Questions in `mastered` are left out.
    /// - If that leaves nothing, the whole bank is used so a mastered book can be replayed.
    /// - The pool is shuffled and cut to the configured size; smaller pools give shorter sessions.
    pub fn build<R: Rng + ?Sized>(self, mastered: &HashSet<QuestionId>, rng: &mut R) -> WorkingSet {
        let available: Vec<Question> = self
            .bank
            .questions()
            .iter()
            .filter(|q| !mastered.contains(q.id()))
            .cloned()
            .collect();
        let excluded = self.bank.len() - available.len();

        let (pool, replaying) = if available.is_empty() {
            (self.bank.questions().to_vec(), true)
        } else {
            (available, false)
        };

        let mut questions = shuffled(&pool, rng);
        questions.truncate(self.size);

        WorkingSet {
            questions,
            excluded,
            replaying,
        }
    }
}
