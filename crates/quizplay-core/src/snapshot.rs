//! Serialized session state for a single save and resume.
//!
//! The snapshot is opaque to callers: they move it around as JSON and hand
//! it back to [`QuizSession::restore`](crate::session::QuizSession::restore).

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SessionError;
use crate::model::{normalize_answer, AnswerSet, Question};
use crate::session::{time_budget, Notice, Phase};

/// Format version written into every snapshot.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub(crate) version: u32,
    pub(crate) session_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) quiz_id: Option<String>,
    pub(crate) taken_at: DateTime<Utc>,
    pub(crate) questions: Vec<Question>,
    pub(crate) current_index: usize,
    pub(crate) answers: AnswerSet,
    pub(crate) remaining_seconds: u32,
    pub(crate) phase: Phase,
    #[serde(default)]
    pub(crate) notice: Option<Notice>,
}

impl SessionSnapshot {
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// The quiz the session was started from, if it was tagged with one.
    pub fn quiz_id(&self) -> Option<&str> {
        self.quiz_id.as_deref()
    }

    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize session snapshot")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("failed to parse session snapshot")
    }

    /// Check that the snapshot describes a state a session could be in.
    pub(crate) fn validate(&self) -> Result<(), SessionError> {
        if self.questions.is_empty() {
            return Err(SessionError::EmptySession);
        }
        if self.version != SNAPSHOT_VERSION {
            return Err(SessionError::InvalidSnapshot(format!(
                "unsupported version {}",
                self.version
            )));
        }

        let total = self.questions.len();
        if self.current_index >= total {
            return Err(SessionError::InvalidSnapshot(format!(
                "current index {} out of range for {} questions",
                self.current_index, total
            )));
        }
        if let Some(max) = self.answers.max_index() {
            if max >= total {
                return Err(SessionError::InvalidSnapshot(format!(
                    "answer for question {max} out of range for {total} questions"
                )));
            }
        }
        for (index, answer) in self.answers.iter() {
            if answer.is_empty() || normalize_answer(answer) != answer {
                return Err(SessionError::InvalidSnapshot(format!(
                    "answer for question {index} is not normalized"
                )));
            }
        }
        if self.remaining_seconds > time_budget(total) {
            return Err(SessionError::InvalidSnapshot(format!(
                "{}s remaining exceeds the {}s budget",
                self.remaining_seconds,
                time_budget(total)
            )));
        }
        if self.phase == Phase::Active && self.remaining_seconds == 0 {
            return Err(SessionError::InvalidSnapshot(
                "active session with no time left".into(),
            ));
        }
        if self.phase == Phase::Submitting {
            return Err(SessionError::InvalidSnapshot(
                "snapshot taken while submitting".into(),
            ));
        }

        Ok(())
    }
}
