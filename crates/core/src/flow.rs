//! The quiz session orchestrator.
//!
//! One `QuizFlow` drives one complete quiz run as a linear sequence of
//! suspend points: generate questions, then for each question speak it,
//! await the user's answer, judge it, speak feedback, and finally speak a
//! score summary before handing control back to the host.

use crate::{
    prompts,
    question::{Question, QuizConfig, QuizState},
    responder::{HostSession, Responder},
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// How many times question generation is attempted before the run is
/// abandoned with [`QuizError::GenerationFailed`].
const MAX_GENERATION_ATTEMPTS: u32 = 3;

/// Utterance fragments that abort the quiz and hand control back to the
/// host. "switch to" covers requests to invoke a different capability.
const EXIT_PHRASES: [&str; 2] = ["exit", "switch to"];

/// Terminal failures of a quiz run. Collaborator errors are passed through
/// untouched; the host framework owns recovery policy for them.
#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    #[error("question generation produced no parseable output after {attempts} attempts")]
    GenerationFailed { attempts: u32 },
    #[error(transparent)]
    Responder(#[from] anyhow::Error),
}

/// Outcome of asking a single question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct,
    Incorrect,
    /// The user asked to leave; no judgment was attempted.
    UserExited,
}

/// Drives one complete quiz session against injected collaborators.
pub struct QuizFlow {
    config: QuizConfig,
    responder: Arc<dyn Responder>,
    session: Arc<dyn HostSession>,
}

impl QuizFlow {
    pub fn new(
        config: QuizConfig,
        responder: Arc<dyn Responder>,
        session: Arc<dyn HostSession>,
    ) -> Self {
        Self {
            config,
            responder,
            session,
        }
    }

    /// Runs the quiz to completion and returns the final state.
    ///
    /// `HostSession::resume_normal_flow` is invoked exactly once on every
    /// path that reaches the end of the session, including a mid-quiz user
    /// exit. A terminal generation failure propagates without resuming;
    /// the caller decides what happens next.
    pub async fn run(&self) -> Result<QuizState, QuizError> {
        self.responder.speak(prompts::intro(&self.config)).await?;

        let questions = self.generate_questions().await?;
        let mut state = QuizState::new(questions);

        let limit = self.config.num_questions.min(state.questions.len());
        while state.current_index < limit && !state.terminated {
            let question = state.questions[state.current_index].clone();
            match self.ask_question(&question).await? {
                AnswerOutcome::UserExited => {
                    state.terminated = true;
                }
                outcome => {
                    let correct = outcome == AnswerOutcome::Correct;
                    self.responder.speak(prompts::feedback(correct)).await?;
                    if correct {
                        state.correct_count += 1;
                    }
                    state.current_index += 1;
                }
            }
        }

        if !state.terminated {
            self.responder
                .speak(prompts::final_summary(
                    state.correct_count,
                    self.config.num_questions,
                ))
                .await?;
        }

        info!(
            correct = state.correct_count,
            asked = state.current_index,
            exited = state.terminated,
            "quiz finished, resuming normal flow"
        );
        self.session.resume_normal_flow().await;
        Ok(state)
    }

    /// Asks the model for a fresh question batch, retrying on malformed
    /// output up to `MAX_GENERATION_ATTEMPTS` times.
    ///
    /// Each failed attempt speaks an apology so the user is not left
    /// waiting silently.
    async fn generate_questions(&self) -> Result<Vec<Question>, QuizError> {
        let prompt = prompts::generation(&self.config);
        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            let raw = self.responder.respond(prompt.clone(), Vec::new()).await?;
            match Question::parse_batch(&raw) {
                Ok(questions) => {
                    if questions.len() != self.config.num_questions {
                        warn!(
                            requested = self.config.num_questions,
                            received = questions.len(),
                            "model returned a different number of questions than requested"
                        );
                    }
                    return Ok(questions);
                }
                Err(err) => {
                    warn!(attempt, error = %err, "failed to parse generated questions");
                    self.responder
                        .speak(prompts::GENERATION_APOLOGY.to_string())
                        .await?;
                }
            }
        }
        Err(QuizError::GenerationFailed {
            attempts: MAX_GENERATION_ATTEMPTS,
        })
    }

    /// Speaks one question, collects the user's answer and judges it.
    ///
    /// An exit phrase in the utterance takes precedence over judgment: the
    /// farewell is spoken and `UserExited` returned without any model call.
    async fn ask_question(&self, question: &Question) -> Result<AnswerOutcome, QuizError> {
        let spoken = question.spoken_prompt();
        info!(question = %spoken, "asking question");
        self.responder.speak(spoken.clone()).await?;
        info!(expected = %question.correct_answer, "expected answer");

        let user_answer = self.responder.user_response().await?;
        if wants_exit(&user_answer) {
            info!(utterance = %user_answer, "user requested exit");
            self.responder.speak(prompts::FAREWELL.to_string()).await?;
            return Ok(AnswerOutcome::UserExited);
        }

        let check = prompts::judgment(&spoken, &question.correct_answer, &user_answer);
        info!(prompt = %check, "judging answer");
        let reply = self.responder.respond(check, Vec::new()).await?;
        info!(reply = %reply, "judgment received");

        if verdict_is_correct(&reply) {
            Ok(AnswerOutcome::Correct)
        } else {
            if !reply.to_lowercase().contains("no") {
                debug!(reply = %reply, "judgment reply had no clear yes/no, treating as incorrect");
            }
            Ok(AnswerOutcome::Incorrect)
        }
    }
}

/// True when the utterance asks to leave the quiz or switch capabilities.
fn wants_exit(utterance: &str) -> bool {
    let lowered = utterance.to_lowercase();
    EXIT_PHRASES.iter().any(|phrase| lowered.contains(phrase))
}

/// The verdict is read off the judgment reply: any case-insensitive "yes"
/// counts as correct, everything else as incorrect.
fn verdict_is_correct(reply: &str) -> bool {
    reply.to_lowercase().contains("yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responder::{Exchange, MockHostSession, MockResponder, Responder};
    use anyhow::Result;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    const THREE_QUESTIONS: &str = r#"[
        {"question": "What is the capital of France?",
         "choices": ["A. London", "B. Paris", "C. Berlin", "D. Madrid"],
         "correct_answer": "B. Paris"},
        {"question": "What is 2 + 2?",
         "choices": ["A. 3", "B. 4", "C. 5", "D. 6"],
         "correct_answer": "B. 4"},
        {"question": "Which planet is known as the Red Planet?",
         "choices": ["A. Venus", "B. Jupiter", "C. Mars", "D. Saturn"],
         "correct_answer": "C. Mars"}
    ]"#;

    /// Plays back queued model replies and user utterances while recording
    /// everything spoken and every prompt sent to the model.
    #[derive(Default)]
    struct ScriptedResponder {
        replies: Mutex<VecDeque<String>>,
        utterances: Mutex<VecDeque<String>>,
        spoken: Mutex<Vec<String>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedResponder {
        fn new(replies: &[&str], utterances: &[&str]) -> Self {
            Self {
                replies: Mutex::new(replies.iter().map(|s| s.to_string()).collect()),
                utterances: Mutex::new(utterances.iter().map(|s| s.to_string()).collect()),
                spoken: Mutex::new(Vec::new()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn spoken(&self) -> Vec<String> {
            self.spoken.lock().unwrap().clone()
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Responder for ScriptedResponder {
        async fn respond(&self, prompt: String, _history: Vec<Exchange>) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt);
            Ok(self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("scripted responder ran out of replies"))
        }

        async fn speak(&self, text: String) -> Result<()> {
            self.spoken.lock().unwrap().push(text);
            Ok(())
        }

        async fn user_response(&self) -> Result<String> {
            Ok(self
                .utterances
                .lock()
                .unwrap()
                .pop_front()
                .expect("scripted responder ran out of utterances"))
        }
    }

    /// Counts hand-backs so the exactly-once contract is checkable.
    #[derive(Default)]
    struct CountingSession {
        resumes: AtomicUsize,
    }

    impl CountingSession {
        fn resume_count(&self) -> usize {
            self.resumes.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl HostSession for CountingSession {
        async fn resume_normal_flow(&self) {
            self.resumes.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn flow_with(
        config: QuizConfig,
        responder: Arc<ScriptedResponder>,
        session: Arc<CountingSession>,
    ) -> QuizFlow {
        QuizFlow::new(config, responder, session)
    }

    #[tokio::test]
    async fn completed_run_speaks_feedback_per_question_and_one_summary() {
        let responder = Arc::new(ScriptedResponder::new(
            &[THREE_QUESTIONS, "yes", "Yes, that is right.", "YES"],
            &["Paris", "four", "Mars"],
        ));
        let session = Arc::new(CountingSession::default());
        let flow = flow_with(
            QuizConfig::new("General Knowledge", 3),
            responder.clone(),
            session.clone(),
        );

        let state = flow.run().await.unwrap();

        assert_eq!(state.correct_count, 3);
        assert_eq!(state.current_index, 3);
        assert!(!state.terminated);

        let spoken = responder.spoken();
        assert_eq!(
            spoken.first().unwrap(),
            "Welcome to the Quiz App! We will ask you 3 questions on General Knowledge."
        );
        let feedback_lines: Vec<_> = spoken
            .iter()
            .filter(|line| line.starts_with("Your answer is"))
            .collect();
        assert_eq!(feedback_lines.len(), 3);
        assert_eq!(
            spoken.last().unwrap(),
            "You got 3 out of 3 correct! Thanks for playing the quiz!"
        );
        assert_eq!(session.resume_count(), 1);
    }

    #[tokio::test]
    async fn incorrect_answers_do_not_raise_the_score() {
        let responder = Arc::new(ScriptedResponder::new(
            &[THREE_QUESTIONS, "yes", "No, that is wrong.", "The answer is C"],
            &["Paris", "five", "Venus"],
        ));
        let session = Arc::new(CountingSession::default());
        let flow = flow_with(
            QuizConfig::new("General Knowledge", 3),
            responder.clone(),
            session.clone(),
        );

        let state = flow.run().await.unwrap();

        // "The answer is C" has no "yes" token, so it judges incorrect too.
        assert_eq!(state.correct_count, 1);
        assert!(
            responder
                .spoken()
                .contains(&"You got 1 out of 3 correct! Thanks for playing the quiz!".to_string())
        );
    }

    #[tokio::test]
    async fn exit_utterance_skips_judgment_and_resumes_once() {
        let responder = Arc::new(ScriptedResponder::new(
            &[THREE_QUESTIONS, "yes"],
            &["Paris", "I want to exit"],
        ));
        let session = Arc::new(CountingSession::default());
        let flow = flow_with(
            QuizConfig::new("General Knowledge", 3),
            responder.clone(),
            session.clone(),
        );

        let state = flow.run().await.unwrap();

        assert!(state.terminated);
        assert_eq!(state.current_index, 1);
        assert_eq!(state.correct_count, 1);

        let spoken = responder.spoken();
        let feedback_lines: Vec<_> = spoken
            .iter()
            .filter(|line| line.starts_with("Your answer is"))
            .collect();
        assert_eq!(feedback_lines.len(), 1);
        assert!(spoken.contains(&prompts::FAREWELL.to_string()));
        assert!(!spoken.iter().any(|line| line.starts_with("You got")));

        // One generation prompt, one judgment prompt for question 1, and
        // nothing for the exit utterance.
        assert_eq!(responder.prompts().len(), 2);
        assert_eq!(session.resume_count(), 1);
    }

    #[tokio::test]
    async fn malformed_generation_retries_with_a_single_apology() {
        let responder = Arc::new(ScriptedResponder::new(
            &["not json", THREE_QUESTIONS, "yes", "yes", "yes"],
            &["Paris", "four", "Mars"],
        ));
        let session = Arc::new(CountingSession::default());
        let flow = flow_with(
            QuizConfig::new("General Knowledge", 3),
            responder.clone(),
            session.clone(),
        );

        let state = flow.run().await.unwrap();

        assert_eq!(state.correct_count, 3);
        let apologies = responder
            .spoken()
            .iter()
            .filter(|line| *line == prompts::GENERATION_APOLOGY)
            .count();
        assert_eq!(apologies, 1);
        assert_eq!(session.resume_count(), 1);
    }

    #[tokio::test]
    async fn generation_gives_up_after_bounded_attempts() {
        let mut responder = MockResponder::new();
        responder
            .expect_respond()
            .times(3)
            .returning(|_, _| Ok("not json".to_string()));
        // Intro plus one apology per failed attempt.
        responder.expect_speak().times(4).returning(|_| Ok(()));

        let mut session = MockHostSession::new();
        session.expect_resume_normal_flow().never();

        let flow = QuizFlow::new(
            QuizConfig::new("General Knowledge", 3),
            Arc::new(responder),
            Arc::new(session),
        );

        let err = flow.run().await.unwrap_err();
        match err {
            QuizError::GenerationFailed { attempts } => assert_eq!(attempts, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn short_batch_truncates_the_run_but_keeps_the_configured_total() {
        let two_questions = r#"[
            {"question": "What is the capital of France?",
             "choices": ["A. London", "B. Paris", "C. Berlin", "D. Madrid"],
             "correct_answer": "B. Paris"},
            {"question": "What is 2 + 2?",
             "choices": ["A. 3", "B. 4", "C. 5", "D. 6"],
             "correct_answer": "B. 4"}
        ]"#;
        let responder = Arc::new(ScriptedResponder::new(
            &[two_questions, "yes", "no"],
            &["Paris", "five"],
        ));
        let session = Arc::new(CountingSession::default());
        let flow = flow_with(
            QuizConfig::new("General Knowledge", 3),
            responder.clone(),
            session.clone(),
        );

        let state = flow.run().await.unwrap();

        assert_eq!(state.current_index, 2);
        assert_eq!(
            responder.spoken().last().unwrap(),
            "You got 1 out of 3 correct! Thanks for playing the quiz!"
        );
        assert_eq!(session.resume_count(), 1);
    }

    #[tokio::test]
    async fn oversized_batch_is_capped_at_the_configured_count() {
        let responder = Arc::new(ScriptedResponder::new(
            &[THREE_QUESTIONS, "yes", "yes"],
            &["Paris", "four"],
        ));
        let session = Arc::new(CountingSession::default());
        let flow = flow_with(
            QuizConfig::new("General Knowledge", 2),
            responder.clone(),
            session.clone(),
        );

        let state = flow.run().await.unwrap();

        assert_eq!(state.current_index, 2);
        assert_eq!(state.questions.len(), 3);
        assert_eq!(
            responder.spoken().last().unwrap(),
            "You got 2 out of 2 correct! Thanks for playing the quiz!"
        );
    }

    #[test]
    fn exit_detection_is_case_insensitive_and_substring_based() {
        assert!(wants_exit("Please EXIT now"));
        assert!(wants_exit("could you switch to the weather"));
        assert!(wants_exit("I want to exit"));
        assert!(!wants_exit("the answer is B"));
        assert!(!wants_exit("an excited guess"));
    }

    #[test]
    fn verdict_requires_a_yes_token() {
        assert!(verdict_is_correct("Yes, that is right."));
        assert!(verdict_is_correct("YES"));
        assert!(!verdict_is_correct("No."));
        assert!(!verdict_is_correct("The answer is B"));
    }
}
