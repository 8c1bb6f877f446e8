//! Data model for one quiz run: the configuration, the generated questions,
//! and the mutable per-run state.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Number of answer choices every generated question must carry.
pub const CHOICE_COUNT: usize = 4;

/// Immutable settings for a single quiz run, supplied at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizConfig {
    /// Topic the questions are generated on (e.g. "General Knowledge").
    pub category: String,
    /// How many questions the model is asked to produce.
    pub num_questions: usize,
}

impl QuizConfig {
    pub fn new(category: impl Into<String>, num_questions: usize) -> Self {
        Self {
            category: category.into(),
            num_questions,
        }
    }
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self::new("General Knowledge", 3)
    }
}

/// A single multiple-choice question as emitted by the model.
///
/// Field names match the JSON keys the generation prompt requests, so a
/// batch deserializes directly from the model's raw reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
    /// Exactly four labeled choices ("A. ...".."D. ...").
    pub choices: Vec<String>,
    /// One of `choices`, verbatim.
    pub correct_answer: String,
}

impl Question {
    /// The line read aloud when this question is asked: the question text
    /// followed by the four choices, space-joined.
    pub fn spoken_prompt(&self) -> String {
        format!("{} {}", self.question, self.choices.join(" "))
    }

    /// Parses the model's raw generation reply into a batch of questions.
    ///
    /// The reply must be a JSON array of `{question, choices,
    /// correct_answer}` objects with exactly four choices each. A
    /// `correct_answer` that is not one of the choices is logged but
    /// accepted, since the judgment step compares against it as text.
    pub fn parse_batch(raw: &str) -> Result<Vec<Question>, QuestionFormatError> {
        let questions: Vec<Question> = serde_json::from_str(raw.trim())?;
        for (index, question) in questions.iter().enumerate() {
            if question.choices.len() != CHOICE_COUNT {
                return Err(QuestionFormatError::ChoiceCount {
                    index,
                    count: question.choices.len(),
                });
            }
            if !question.choices.contains(&question.correct_answer) {
                warn!(
                    index,
                    correct_answer = %question.correct_answer,
                    "correct answer is not one of the listed choices"
                );
            }
        }
        Ok(questions)
    }
}

/// Why a generation reply could not be turned into questions.
#[derive(Debug, thiserror::Error)]
pub enum QuestionFormatError {
    #[error("response was not a valid JSON question list: {0}")]
    Json(#[from] serde_json::Error),
    #[error("question {index} has {count} choices, expected 4")]
    ChoiceCount { index: usize, count: usize },
}

/// Mutable state of one quiz run.
///
/// Invariant: `correct_count <= current_index <= questions.len()`. Created
/// when a run starts and discarded when it ends; nothing persists across
/// runs. `terminated` is set on a user-initiated exit and is terminal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizState {
    pub questions: Vec<Question>,
    pub current_index: usize,
    pub correct_count: usize,
    pub terminated: bool,
}

impl QuizState {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            current_index: 0,
            correct_count: 0,
            terminated: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"[
            {"question": "What is the capital of France?",
             "choices": ["A. London", "B. Paris", "C. Berlin", "D. Madrid"],
             "correct_answer": "B. Paris"},
            {"question": "What is 2 + 2?",
             "choices": ["A. 3", "B. 4", "C. 5", "D. 6"],
             "correct_answer": "B. 4"}
        ]"#
    }

    #[test]
    fn parses_a_well_formed_batch() {
        let questions = Question::parse_batch(sample_json()).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].correct_answer, "B. Paris");
        assert_eq!(questions[1].choices.len(), CHOICE_COUNT);
    }

    #[test]
    fn rejects_non_json_output() {
        let err = Question::parse_batch("Sure! Here are your questions:").unwrap_err();
        assert!(matches!(err, QuestionFormatError::Json(_)));
    }

    #[test]
    fn rejects_wrong_choice_count() {
        let raw = r#"[{"question": "Pick one", "choices": ["A. yes", "B. no"], "correct_answer": "A. yes"}]"#;
        let err = Question::parse_batch(raw).unwrap_err();
        match err {
            QuestionFormatError::ChoiceCount { index, count } => {
                assert_eq!(index, 0);
                assert_eq!(count, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn spoken_prompt_joins_question_and_choices() {
        let questions = Question::parse_batch(sample_json()).unwrap();
        assert_eq!(
            questions[1].spoken_prompt(),
            "What is 2 + 2? A. 3 B. 4 C. 5 D. 6"
        );
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        let padded = format!("\n  {}  \n", sample_json());
        assert_eq!(Question::parse_batch(&padded).unwrap().len(), 2);
    }
}
