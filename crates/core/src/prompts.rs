//! Prompt templates and spoken lines for the quiz flow.
//!
//! Everything the user hears, and everything the model is asked, lives
//! here so the orchestrator reads as pure control flow.

use crate::question::QuizConfig;
use serde_json::json;

/// Spoken once when a generation attempt produced unparseable output.
pub const GENERATION_APOLOGY: &str =
    "Sorry, there was an error generating quiz questions. Retrying...";

/// Spoken when the user asks to exit or switch capabilities mid-quiz.
pub const FAREWELL: &str = "Exiting the quiz. See you next time!";

/// The introduction line naming the question count and category.
pub fn intro(config: &QuizConfig) -> String {
    format!(
        "Welcome to the Quiz App! We will ask you {} questions on {}.",
        config.num_questions, config.category
    )
}

/// The generation instruction sent to the model with empty history.
///
/// Two worked examples anchor the JSON shape; the trailing constraint asks
/// the model to emit nothing but the array.
pub fn generation(config: &QuizConfig) -> String {
    let examples = json!([
        {
            "question": "What is the capital of France?",
            "choices": ["A. London", "B. Paris", "C. Berlin", "D. Madrid"],
            "correct_answer": "B. Paris"
        },
        {
            "question": "What is 2 + 2?",
            "choices": ["A. 3", "B. 4", "C. 5", "D. 6"],
            "correct_answer": "B. 4"
        }
    ]);
    format!(
        "Generate {num_questions} multiple-choice questions on the category {category}. \
         Each question should have four answer choices, clearly labeled A, B, C, and D, \
         and specify the correct answer. Format the response as a JSON list where each \
         element has 'question', 'choices', and 'correct_answer'. \
         Here is an example of the expected format: {examples} \
         Only output JSON and nothing else.",
        num_questions = config.num_questions,
        category = config.category,
    )
}

/// The judgment instruction embedding the question, the canonical answer
/// and the user's literal utterance. The model is told to always include a
/// yes/no token so the verdict can be read off the reply text.
pub fn judgment(spoken_question: &str, correct_answer: &str, user_answer: &str) -> String {
    format!(
        "Question was: '{spoken_question}' its answer is '{correct_answer}'\n\
         Here is the user's response '{user_answer}', Is the user's response correct? \
         Consider synonyms or similar variations when evaluating user's response, \
         use your intelligence in evaluating the answer, \
         always include yes or no in your answer."
    )
}

/// Per-question feedback line.
pub fn feedback(correct: bool) -> String {
    let verdict = if correct { "correct" } else { "incorrect" };
    format!("Your answer is {verdict}.")
}

/// The end-of-quiz summary line.
pub fn final_summary(correct_count: usize, num_questions: usize) -> String {
    format!("You got {correct_count} out of {num_questions} correct! Thanks for playing the quiz!")
}
