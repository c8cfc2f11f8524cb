//! Quiz file parser.
//!
//! Loads quizzes from TOML and JSON files and directories, and validates
//! them. JSON files may hold a full quiz object, a bare question array, or
//! an Open Trivia DB response (`{ "results": [...] }`).

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{normalize_answer, Question, QuestionKind, Quiz};

/// Intermediate TOML structure for quiz files.
#[derive(Debug, Deserialize)]
struct TomlQuizFile {
    quiz: TomlQuizHeader,
    #[serde(default)]
    questions: Vec<Question>,
}

#[derive(Debug, Deserialize)]
struct TomlQuizHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

/// The JSON shapes accepted for a quiz file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonQuizFile {
    Quiz(Quiz),
    Trivia { results: Vec<Question> },
    Questions(Vec<Question>),
}

/// Parse a single quiz file, picking the format from its extension.
pub fn parse_quiz(path: &Path) -> Result<Quiz> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read quiz file: {}", path.display()))?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => parse_quiz_toml(&content, path),
        Some("json") => parse_quiz_json(&content, path),
        _ => anyhow::bail!(
            "unsupported quiz file extension (expected .toml or .json): {}",
            path.display()
        ),
    }
}

/// Parse a TOML string into a `Quiz` (useful for testing).
pub fn parse_quiz_toml(content: &str, source_path: &Path) -> Result<Quiz> {
    let parsed: TomlQuizFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    Ok(Quiz {
        id: parsed.quiz.id,
        name: parsed.quiz.name,
        description: parsed.quiz.description,
        questions: parsed.questions,
    })
}

/// Parse a JSON string into a `Quiz`.
///
/// Bare arrays and trivia responses have no header; their id and name come
/// from the file stem.
pub fn parse_quiz_json(content: &str, source_path: &Path) -> Result<Quiz> {
    let parsed: JsonQuizFile = serde_json::from_str(content)
        .with_context(|| format!("failed to parse JSON: {}", source_path.display()))?;

    let stem = || {
        source_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("quiz")
            .to_string()
    };

    Ok(match parsed {
        JsonQuizFile::Quiz(quiz) => quiz,
        JsonQuizFile::Trivia { results: questions } | JsonQuizFile::Questions(questions) => {
            Quiz {
                id: stem(),
                name: stem(),
                description: String::new(),
                questions,
            }
        }
    })
}

/// Recursively load all `.toml` and `.json` quiz files from a directory.
pub fn load_quiz_directory(dir: &Path) -> Result<Vec<Quiz>> {
    let mut quizzes = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            quizzes.extend(load_quiz_directory(&path)?);
        } else if path
            .extension()
            .is_some_and(|ext| ext == "toml" || ext == "json")
        {
            match parse_quiz(&path) {
                Ok(quiz) => quizzes.push(quiz),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(quizzes)
}

/// A warning from quiz validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// 0-based question index (if applicable).
    pub question: Option<usize>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn at(index: usize, message: impl Into<String>) -> Self {
        Self {
            question: Some(index),
            message: message.into(),
        }
    }
}

/// Check a quiz for authoring mistakes.
///
/// None of these stop a session from running; they flag content that will
/// behave surprisingly.
pub fn validate_quiz(quiz: &Quiz) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if quiz.questions.is_empty() {
        warnings.push(ValidationWarning {
            question: None,
            message: "quiz has no questions and cannot be played".into(),
        });
    }

    let mut seen_prompts = HashSet::new();
    for (i, q) in quiz.questions.iter().enumerate() {
        if q.prompt.trim().is_empty() {
            warnings.push(ValidationWarning::at(i, "prompt is empty"));
        } else if !seen_prompts.insert(normalize_answer(&q.prompt)) {
            warnings.push(ValidationWarning::at(
                i,
                format!("duplicate prompt: {}", q.prompt.trim()),
            ));
        }

        let correct = normalize_answer(&q.correct_answer);
        if correct.is_empty() {
            warnings.push(ValidationWarning::at(i, "correct answer is empty"));
        }

        match q.kind {
            QuestionKind::MultipleChoice => {
                if q.distractors.is_empty() {
                    warnings.push(ValidationWarning::at(
                        i,
                        "multiple-choice question has no distractors",
                    ));
                }
                if !correct.is_empty()
                    && q.distractors.iter().any(|d| normalize_answer(d) == correct)
                {
                    warnings.push(ValidationWarning::at(
                        i,
                        "correct answer is repeated among the distractors",
                    ));
                }
            }
            QuestionKind::Boolean => {
                if correct != "true" && correct != "false" {
                    warnings.push(ValidationWarning::at(
                        i,
                        format!(
                            "boolean question expects True or False, got '{}'",
                            q.correct_answer
                        ),
                    ));
                }
                let odd_distractor = q.distractors.iter().any(|d| {
                    let d = normalize_answer(d);
                    (d != "true" && d != "false") || d == correct
                });
                if odd_distractor {
                    warnings.push(ValidationWarning::at(
                        i,
                        "boolean questions only offer True and False; other distractors are ignored",
                    ));
                }
            }
        }
    }

    warnings
}
