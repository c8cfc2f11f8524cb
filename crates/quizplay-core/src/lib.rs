//! quizplay-core — Quiz session engine, scoring, and quiz file parsing.
//!
//! This crate defines the question model, the timed `QuizSession` state
//! machine, and the collaborator traits that the store and CLI crates
//! implement.

pub mod clock;
pub mod error;
pub mod model;
pub mod parser;
pub mod score;
pub mod session;
pub mod snapshot;
pub mod traits;

pub use error::{Rejection, SessionError};
pub use model::{normalize_answer, AnswerSet, Question, QuestionKind, Quiz};
pub use score::{ScoreCard, SessionResult};
pub use session::{Outcome, Phase, QuizSession, TickOutcome};
