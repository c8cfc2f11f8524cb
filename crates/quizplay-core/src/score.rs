//! Session scoring.
//!
//! One point per question whose normalized answer equals the normalized
//! correct answer. Multiple choice and boolean questions are graded the
//! same way; there is no partial credit.

use serde::{Deserialize, Serialize};

use crate::model::{normalize_answer, AnswerSet, Question};

/// The terminal result handed back to the caller and to the result store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    /// Number of correctly answered questions.
    pub score: u32,
    /// Number of questions in the session.
    pub total: u32,
}

impl SessionResult {
    /// Fraction of questions answered correctly, in `[0.0, 1.0]`.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.score as f64 / self.total as f64
    }
}

/// How a single question was graded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    pub index: usize,
    pub prompt: String,
    /// The stored (normalized) answer, if the question was answered.
    pub given: Option<String>,
    /// The normalized correct answer.
    pub expected: String,
    pub correct: bool,
}

/// A result together with its per-question breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub result: SessionResult,
    pub outcomes: Vec<QuestionOutcome>,
}

impl ScoreCard {
    /// Grade every question against the collected answers.
    ///
    /// Unanswered questions are scored as incorrect.
    pub fn compute(questions: &[Question], answers: &AnswerSet) -> Self {
        let outcomes: Vec<QuestionOutcome> = questions
            .iter()
            .enumerate()
            .map(|(index, question)| {
                let given = answers.get(index).map(str::to_string);
                let expected = normalize_answer(&question.correct_answer);
                let correct = given.as_deref() == Some(expected.as_str());
                QuestionOutcome {
                    index,
                    prompt: question.prompt.clone(),
                    given,
                    expected,
                    correct,
                }
            })
            .collect();

        let score = outcomes.iter().filter(|o| o.correct).count() as u32;

        Self {
            result: SessionResult {
                score,
                total: questions.len() as u32,
            },
            outcomes,
        }
    }

    /// Indices of the questions that did not earn a point.
    pub fn incorrect_indices(&self) -> Vec<usize> {
        self.outcomes
            .iter()
            .filter(|o| !o.correct)
            .map(|o| o.index)
            .collect()
    }
}
