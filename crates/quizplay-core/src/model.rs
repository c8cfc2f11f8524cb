//! Core data model types for quizplay.
//!
//! Questions and quizzes as they arrive from a question source. Field
//! aliases accept the Open Trivia DB shape (`type`, `question`,
//! `incorrect_answers`) so trivia exports load without conversion.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Trim surrounding whitespace and fold case.
///
/// Every comparison and every stored answer goes through this.
pub fn normalize_answer(text: &str) -> String {
    text.trim().to_lowercase()
}

/// The two supported question kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKind {
    #[serde(alias = "multiple")]
    MultipleChoice,
    Boolean,
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::MultipleChoice => write!(f, "multiple-choice"),
            QuestionKind::Boolean => write!(f, "boolean"),
        }
    }
}

impl FromStr for QuestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "multiple-choice" | "multiple" | "mcq" => Ok(QuestionKind::MultipleChoice),
            "boolean" | "bool" | "true-false" => Ok(QuestionKind::Boolean),
            other => Err(format!("unknown question kind: {other}")),
        }
    }
}

/// A single quiz item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Multiple choice or true/false.
    #[serde(alias = "type")]
    pub kind: QuestionKind,
    /// The text shown to the user.
    #[serde(alias = "question")]
    pub prompt: String,
    /// The answer that earns the point.
    pub correct_answer: String,
    /// Wrong options offered next to the correct one (multiple choice only).
    #[serde(default, alias = "incorrect_answers")]
    pub distractors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
}

impl Question {
    pub fn multiple_choice(prompt: &str, correct: &str, distractors: &[&str]) -> Self {
        Self {
            kind: QuestionKind::MultipleChoice,
            prompt: prompt.to_string(),
            correct_answer: correct.to_string(),
            distractors: distractors.iter().map(|d| d.to_string()).collect(),
            category: None,
            difficulty: None,
        }
    }

    pub fn boolean(prompt: &str, correct: bool) -> Self {
        Self {
            kind: QuestionKind::Boolean,
            prompt: prompt.to_string(),
            correct_answer: if correct { "True" } else { "False" }.to_string(),
            distractors: Vec::new(),
            category: None,
            difficulty: None,
        }
    }

    /// The options a user can pick from.
    ///
    /// Multiple choice options are the correct answer plus the distractors,
    /// sorted, with entries that normalize to the same text collapsed into
    /// one (the correct answer's spelling wins). Boolean questions always
    /// offer `True` and `False`.
    pub fn options(&self) -> Vec<String> {
        match self.kind {
            QuestionKind::Boolean => vec!["True".to_string(), "False".to_string()],
            QuestionKind::MultipleChoice => {
                let mut options: Vec<String> = Vec::with_capacity(self.distractors.len() + 1);
                let mut seen = std::collections::HashSet::new();
                for option in std::iter::once(&self.correct_answer).chain(&self.distractors) {
                    let trimmed = option.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    if seen.insert(normalize_answer(trimmed)) {
                        options.push(trimmed.to_string());
                    }
                }
                options.sort();
                options
            }
        }
    }

    /// Whether `answer` earns the point for this question.
    ///
    /// Both kinds use the same rule: exact match after normalization.
    pub fn is_correct(&self, answer: &str) -> bool {
        normalize_answer(answer) == normalize_answer(&self.correct_answer)
    }
}

/// A named collection of questions, as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    /// Unique identifier for this quiz.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// The questions, in the order they are asked.
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// Answers collected during a session, keyed by 0-based question index.
///
/// Values are always normalized and never empty; a missing key means the
/// question is unanswered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet(BTreeMap<usize, String>);

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the normalized form of `text`, or clear the entry if it
    /// normalizes to nothing.
    pub fn record(&mut self, index: usize, text: &str) {
        let normalized = normalize_answer(text);
        if normalized.is_empty() {
            self.0.remove(&index);
        } else {
            self.0.insert(index, normalized);
        }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(&index).map(String::as_str)
    }

    pub fn is_answered(&self, index: usize) -> bool {
        self.0.contains_key(&index)
    }

    /// Indices in `0..total` without an answer, in ascending order.
    pub fn missing(&self, total: usize) -> Vec<usize> {
        (0..total).filter(|i| !self.is_answered(*i)).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.0.iter().map(|(i, a)| (*i, a.as_str()))
    }

    /// Largest answered index, if any.
    pub(crate) fn max_index(&self) -> Option<usize> {
        self.0.keys().next_back().copied()
    }
}
