#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod progress_sync;
pub mod sessions;
pub mod verse;

pub use trivia_core::Clock;
pub use sessions as session;

pub use app_services::AppServices;
pub use error::{AppServicesError, ProgressError, SessionError, VerseError};
pub use progress_sync::{ProgressSync, RecordAnswer};
pub use verse::{VerseClient, VerseConfig, VerseSource};

pub use sessions::{
    AnswerReceipt, Face, QuizLoopService, QuizSession, SelectOutcome, SessionProgress,
    SharedSession,
};
