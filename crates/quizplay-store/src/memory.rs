//! In-memory collaborators for tests and embedding.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use quizplay_core::model::Question;
use quizplay_core::score::SessionResult;
use quizplay_core::traits::{QuestionSource, ResultStore};

/// A question source over a fixed list.
pub struct StaticQuestionSource {
    questions: Option<Vec<Question>>,
}

impl StaticQuestionSource {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions: Some(questions),
        }
    }

    /// A source with no quiz available at all.
    pub fn unavailable() -> Self {
        Self { questions: None }
    }
}

impl QuestionSource for StaticQuestionSource {
    fn name(&self) -> &str {
        "static"
    }

    fn load_questions(&self) -> anyhow::Result<Option<Vec<Question>>> {
        Ok(self.questions.clone())
    }
}

/// A result store that keeps every result in memory.
///
/// Can be told to fail, to check that sessions complete regardless.
#[derive(Default)]
pub struct MemoryResultStore {
    results: Mutex<Vec<SessionResult>>,
    call_count: AtomicU32,
    fail: bool,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every write fails after being counted.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Number of `store_result` calls made.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// The most recent result, if any write succeeded.
    pub fn last(&self) -> Option<SessionResult> {
        self.results
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .copied()
    }

    pub fn all(&self) -> Vec<SessionResult> {
        self.results
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl ResultStore for MemoryResultStore {
    fn store_result(&self, result: &SessionResult) -> anyhow::Result<()> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if self.fail {
            anyhow::bail!("memory store configured to fail");
        }
        self.results
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(*result);
        Ok(())
    }
}
