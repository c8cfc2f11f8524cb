//! File-backed question source, result store, and snapshot file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quizplay_core::model::{Question, Quiz};
use quizplay_core::parser::parse_quiz;
use quizplay_core::score::SessionResult;
use quizplay_core::snapshot::SessionSnapshot;
use quizplay_core::traits::{QuestionSource, ResultStore};

use crate::error::StoreError;

fn write_file(path: &Path, contents: &str) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }
    std::fs::write(path, contents).map_err(|e| StoreError::io(path, e))
}

// ---------------------------------------------------------------------------
// Question source
// ---------------------------------------------------------------------------

/// Loads questions from a single `.toml` or `.json` quiz file.
#[derive(Debug, Clone)]
pub struct FileQuestionSource {
    path: PathBuf,
    name: String,
}

impl FileQuestionSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the whole quiz, header included.
    ///
    /// A missing file means "no quiz available"; a file that exists but
    /// does not parse is an error.
    pub fn load_quiz(&self) -> Result<Option<Quiz>> {
        if !self.path.exists() {
            tracing::warn!("quiz file not found: {}", self.path.display());
            return Ok(None);
        }
        let quiz = parse_quiz(&self.path)?;
        tracing::debug!(
            quiz = %quiz.id,
            questions = quiz.questions.len(),
            "loaded quiz from {}",
            self.path.display()
        );
        Ok(Some(quiz))
    }
}

impl QuestionSource for FileQuestionSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load_questions(&self) -> Result<Option<Vec<Question>>> {
        Ok(self.load_quiz()?.map(|quiz| quiz.questions))
    }
}

// ---------------------------------------------------------------------------
// Result store
// ---------------------------------------------------------------------------

/// The record written by [`JsonResultStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResult {
    pub score: u32,
    pub total: u32,
    /// The quiz the result belongs to, if known.
    #[serde(default)]
    pub quiz_id: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl StoredResult {
    pub fn result(&self) -> SessionResult {
        SessionResult {
            score: self.score,
            total: self.total,
        }
    }
}

/// Writes the latest session result to a JSON file. Last write wins.
#[derive(Debug, Clone)]
pub struct JsonResultStore {
    path: PathBuf,
    quiz_id: Option<String>,
}

impl JsonResultStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            quiz_id: None,
        }
    }

    /// Tag stored results with the quiz they came from.
    #[must_use]
    pub fn with_quiz_id(mut self, quiz_id: impl Into<String>) -> Self {
        self.quiz_id = Some(quiz_id.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read back the last stored result, if there is one.
    pub fn load_last(&self) -> Result<Option<StoredResult>, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| StoreError::json(&self.path, e))
    }
}

impl ResultStore for JsonResultStore {
    fn store_result(&self, result: &SessionResult) -> Result<()> {
        let record = StoredResult {
            score: result.score,
            total: result.total,
            quiz_id: self.quiz_id.clone(),
            recorded_at: Utc::now(),
        };
        let json = serde_json::to_string_pretty(&record).context("failed to serialize result")?;
        write_file(&self.path, &json)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Snapshot file
// ---------------------------------------------------------------------------

/// The single save slot for a paused session.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Overwrite the slot with `snapshot`.
    pub fn save(&self, snapshot: &SessionSnapshot) -> Result<()> {
        let json = snapshot.to_json()?;
        write_file(&self.path, &json)?;
        tracing::info!(
            session_id = %snapshot.session_id(),
            "session snapshot saved to {}",
            self.path.display()
        );
        Ok(())
    }

    pub fn load(&self) -> Result<SessionSnapshot> {
        let content =
            std::fs::read_to_string(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        SessionSnapshot::from_json(&content)
            .with_context(|| format!("in snapshot file {}", self.path.display()))
    }

    /// Empty the slot. Removing an already empty slot is not an error.
    pub fn remove(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(&self.path, e).into()),
        }
    }
}
