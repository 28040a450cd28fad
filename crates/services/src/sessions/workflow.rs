use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use rand::SeedableRng;
use rand::rngs::StdRng;
use storage::assets::BankCatalog;
use tokio_util::task::TaskTracker;
use trivia_core::model::{BookId, OptionLabel, Player, SessionId};

use super::plan::WorkingSetBuilder;
use super::service::{QuizSession, SelectOutcome};
use crate::Clock;
use crate::error::SessionError;
use crate::progress_sync::{ProgressSync, RecordAnswer};
use crate::verse::{VerseSource, fetch_verse_text_or_empty};

/// A session shared between request handlers and background verse lookups.
pub type SharedSession = Arc<tokio::sync::Mutex<QuizSession>>;

/// Orchestrates session start, answering, and the background side channels.
///
/// Progress writes and verse lookups run as detached tasks: the caller never
/// waits for them and their failures are only logged.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    catalog: Arc<BankCatalog>,
    progress: Arc<ProgressSync>,
    verses: Arc<dyn VerseSource>,
    tasks: TaskTracker,
    drain: Arc<tokio::sync::Mutex<()>>,
    seeded_rng: Option<Arc<Mutex<StdRng>>>,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        catalog: Arc<BankCatalog>,
        progress: Arc<ProgressSync>,
        verses: Arc<dyn VerseSource>,
    ) -> Self {
        Self {
            clock,
            catalog,
            progress,
            verses,
            tasks: TaskTracker::new(),
            drain: Arc::new(tokio::sync::Mutex::new(())),
            seeded_rng: None,
        }
    }

    /// Use a seeded generator for shuffling so sessions are reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seeded_rng = Some(Arc::new(Mutex::new(StdRng::seed_from_u64(seed))));
        self
    }

    #[must_use]
    pub fn catalog(&self) -> &BankCatalog {
        &self.catalog
    }

    /// Tracker for the detached progress and verse tasks.
    #[must_use]
    pub fn background_tasks(&self) -> &TaskTracker {
        &self.tasks
    }

    /// Wait until every detached task spawned so far has finished.
    ///
    /// Concurrent callers take turns, so no caller reopens the tracker while
    /// another is still waiting on it.
    pub async fn wait_for_background(&self) {
        let _turn = self.drain.lock().await;
        self.tasks.close();
        self.tasks.wait().await;
        self.tasks.reopen();
    }

    /// Start a new session for `book`.
    ///
    /// With a player, questions they already answered correctly are skipped
    /// unless that would leave nothing to ask.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownBook` if no bank is loaded for `book`.
    pub async fn start_session(
        &self,
        book: &BookId,
        player: Option<Player>,
    ) -> Result<QuizSession, SessionError> {
        let bank = self
            .catalog
            .get(book)
            .ok_or_else(|| SessionError::UnknownBook(book.clone()))?;

        let mastered = match &player {
            Some(player) => {
                self.progress
                    .fetch_answered_correctly(&player.user_id, book)
                    .await
            }
            None => HashSet::new(),
        };

        let builder = WorkingSetBuilder::new(&bank);
        let working_set = match &self.seeded_rng {
            Some(rng) => {
                let mut rng = rng.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
                builder.build(&mastered, &mut *rng)
            }
            None => builder.build(&mastered, &mut rand::rng()),
        };

        let session = QuizSession::new(
            SessionId::generate(),
            book.clone(),
            player,
            working_set.questions,
            self.clock.now(),
        )?;
        tracing::info!(
            session_id = %session.id(),
            %book,
            questions = session.questions().len(),
            excluded = working_set.excluded,
            replaying = working_set.replaying,
            authenticated = session.player().is_some(),
            "started quiz session"
        );
        Ok(session)
    }

    /// Answer the current question of a shared session.
    ///
    /// On a newly recorded answer this spawns the progress write (when a
    /// player is attached) and a verse lookup (when the verse is not cached),
    /// then returns without waiting for either.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` if the session is finished.
    pub async fn answer(
        &self,
        session: &SharedSession,
        label: OptionLabel,
    ) -> Result<SelectOutcome, SessionError> {
        let mut guard = session.lock().await;
        let outcome = guard.select_answer(label)?;
        let SelectOutcome::Recorded(receipt) = &outcome else {
            return Ok(outcome);
        };

        let session_id = guard.id();
        let book = guard.book().clone();

        if let Some(player) = guard.player() {
            let answer = RecordAnswer {
                user_id: player.user_id.clone(),
                question_id: receipt.question_id.clone(),
                username: player.username.clone(),
                is_correct: receipt.is_correct,
                book: book.clone(),
            };
            let progress = Arc::clone(&self.progress);
            self.tasks.spawn(async move {
                if let Err(err) = progress.record_answer(&answer).await {
                    tracing::warn!(
                        %session_id,
                        user_id = %answer.user_id,
                        book = %answer.book,
                        question_id = %answer.question_id,
                        error = %err,
                        "failed to record answer"
                    );
                }
            });
        }

        if receipt.needs_verse {
            let verses = Arc::clone(&self.verses);
            let session = Arc::clone(session);
            let question_id = receipt.question_id.clone();
            let reference = receipt.source_reference.clone();
            self.tasks.spawn(async move {
                let text = fetch_verse_text_or_empty(verses.as_ref(), &reference).await;
                if text.is_empty() {
                    return;
                }
                let cached = session.lock().await.cache_verse_text(&question_id, &text);
                tracing::debug!(%session_id, %question_id, cached, "verse text fetched");
            });
        }

        tracing::debug!(
            %session_id,
            %book,
            question_id = %receipt.question_id,
            is_correct = receipt.is_correct,
            "answer recorded"
        );
        Ok(outcome)
    }

    /// Move the session to its next question, or complete it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Unanswered` or `SessionError::Completed` from the session.
    pub fn advance(&self, session: &mut QuizSession) -> Result<(), SessionError> {
        session.advance(self.clock.now())?;
        if session.is_complete() {
            let score = session.score();
            tracing::info!(
                session_id = %session.id(),
                book = %session.book(),
                correct = score.correct(),
                total = score.total(),
                "quiz session completed"
            );
        }
        Ok(())
    }
}
