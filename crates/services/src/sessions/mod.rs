mod plan;
mod progress;
mod service;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use plan::{WORKING_SET_SIZE, WorkingSet, WorkingSetBuilder, shuffled};
pub use progress::SessionProgress;
pub use service::{AnswerReceipt, AnsweredQuestion, Face, QuizSession, SelectOutcome};
pub use workflow::{QuizLoopService, SharedSession};
