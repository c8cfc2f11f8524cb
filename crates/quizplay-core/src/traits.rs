//! Collaborator traits for question loading and result persistence.
//!
//! Implemented by the `quizplay-store` crate; the engine only ever sees
//! these trait objects.

use crate::model::Question;
use crate::score::SessionResult;

// ---------------------------------------------------------------------------
// Question source
// ---------------------------------------------------------------------------

/// Supplies the ordered question list at session start.
pub trait QuestionSource: Send + Sync {
    /// Human-readable source name (e.g. a file path).
    fn name(&self) -> &str;

    /// Load the questions. `Ok(None)` means no quiz is available.
    fn load_questions(&self) -> anyhow::Result<Option<Vec<Question>>>;
}

// ---------------------------------------------------------------------------
// Result store
// ---------------------------------------------------------------------------

/// Receives the final result of a completed session.
///
/// Called exactly once per session, at the `Submitting -> Completed`
/// transition. Errors are logged by the engine and otherwise ignored.
pub trait ResultStore: Send + Sync {
    fn store_result(&self, result: &SessionResult) -> anyhow::Result<()>;
}

/// A result store that discards everything.
pub struct NullResultStore;

impl ResultStore for NullResultStore {
    fn store_result(&self, _: &SessionResult) -> anyhow::Result<()> {
        Ok(())
    }
}
