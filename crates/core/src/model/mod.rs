mod bank;
mod ids;
mod progress;
mod question;

pub use bank::{BankDraft, BankError, QuestionBank};
pub use ids::{BookId, ParseIdError, QuestionId, SessionId, UserId};
pub use progress::{Player, ProfileStats, ProgressRecord};
pub use question::{AnswerOption, OptionLabel, Question, QuestionDraft, QuestionError};
