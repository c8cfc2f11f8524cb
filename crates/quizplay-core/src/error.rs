//! Session error and rejection types.
//!
//! `SessionError` is for conditions the caller must handle (no questions,
//! a bad snapshot). `Rejection` is the expected user-flow outcome of a
//! validation check and is returned inside an `Outcome`, never as `Err`.

use thiserror::Error;

use crate::session::Phase;

/// Errors that stop a session from starting or being restored.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// No questions were available; the caller must redirect elsewhere.
    #[error("cannot start a quiz session without questions")]
    EmptySession,

    /// `abort` was called after the user had already made progress.
    #[error("cannot abort a session that already has progress")]
    AbortAfterProgress,

    /// `abort` was called on a session that is no longer active.
    #[error("cannot abort a session in phase {0}")]
    NotActive(Phase),

    /// A snapshot failed validation on restore.
    #[error("invalid session snapshot: {0}")]
    InvalidSnapshot(String),
}

/// A validation failure surfaced to the user as a transient notice.
///
/// The `Display` text is the exact notice message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Rejection {
    /// `next` was called while the current question had no answer.
    #[error("Please select an option or enter an answer.")]
    CurrentUnanswered,

    /// `submit` was called while some questions had no answer.
    #[error("Please answer all questions before submitting.")]
    Incomplete { missing: Vec<usize> },
}
