//! The guided-interview state machine.
//!
//! Drives a fixed flow — greeting, demographics, timeline questions,
//! analysis, profile reveal, then open conversation — feeding every
//! answer into the pattern recognition system. The analysis stage runs as
//! a spawned task that signals completion exactly once; observers can
//! subscribe to stage changes or poll `state()`.

use crate::patterns::{PatternAnalysis, PatternRecognition, INSUFFICIENT};
use chrono::{Datelike, Utc};
use eidos_core::InterviewConfig;
use rand::Rng;
use regex::Regex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogueStage {
    Greeting,
    Demographics,
    Timeline,
    Analysis,
    Profile,
    /// Terminal stage: re-enters itself indefinitely.
    Conversation,
}

impl std::fmt::Display for DialogueStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DialogueStage::Greeting => "greeting",
            DialogueStage::Demographics => "demographics",
            DialogueStage::Timeline => "timeline",
            DialogueStage::Analysis => "analysis",
            DialogueStage::Profile => "profile",
            DialogueStage::Conversation => "conversation",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct UserInfo {
    pub age: Option<String>,
    pub location: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QuestionAnswer {
    pub question: String,
    pub response: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DialogueState {
    pub stage: DialogueStage,
    pub current_question: String,
    pub history: Vec<QuestionAnswer>,
    pub user_info: UserInfo,
    /// Monotonically increasing; starts at the configured floor, capped.
    pub prediction_accuracy: u8,
    pub analysis_complete: bool,
}

const GREETING_QUESTION: &str = "Hello! I'd like to get to know you better through a few \
     questions about your experiences. This will help me provide more personalized assistance. \
     Shall we begin?";
const DEMOGRAPHICS_QUESTION: &str = "Great! To get started, could you tell me a bit about \
     yourself? How old are you and where are you from?";
const ANALYSIS_MESSAGE: &str = "Thank you for sharing! I'm analyzing your responses to better \
     understand your perspective...";
const PROFILE_QUESTION: &str = "Based on our conversation, I've created a profile that will \
     help me provide more personalized assistance. Would you like to see what I've learned \
     about you?";
const PROFILE_YES: &str = "Great! Here's what I've learned about you. Is there anything \
     specific you'd like to know more about?";
const PROFILE_NO: &str = "No problem! Is there anything specific you'd like to talk about now?";
const PROFILE_SUMMARY_PROMPT: &str = "Based on our conversation, I've identified some key \
     aspects of your profile. Would you like to know more about a specific area?";
const FALLBACK_QUESTION: &str = "What's something that's been on your mind lately?";

struct FlowInner {
    state: DialogueState,
    patterns: PatternRecognition,
    timeline_questions: Vec<String>,
    last_analysis: Option<PatternAnalysis>,
}

impl FlowInner {
    fn new(config: InterviewConfig, current_year: i32) -> Self {
        Self {
            state: DialogueState {
                stage: DialogueStage::Greeting,
                current_question: GREETING_QUESTION.to_string(),
                history: Vec::new(),
                user_info: UserInfo::default(),
                prediction_accuracy: config.accuracy_start,
                analysis_complete: false,
            },
            patterns: PatternRecognition::new(current_year),
            timeline_questions: timeline_questions(current_year),
            last_analysis: None,
        }
    }

    fn timeline_answered(&self) -> usize {
        self.state
            .history
            .iter()
            .filter(|qa| self.timeline_questions.contains(&qa.question))
            .count()
    }
}

fn timeline_questions(year: i32) -> Vec<String> {
    vec![
        format!("What were you doing in the summer of {}?", year - 20),
        "How did you feel about the music scene in the early 2000s?".to_string(),
        "What's been the most significant challenge you've faced in your career so far?"
            .to_string(),
        "What were you doing in 1999?".to_string(),
        "How did you feel about life in 1992?".to_string(),
        "What was happening in your world in 2005?".to_string(),
    ]
}

pub struct DialogueFlow {
    inner: Arc<RwLock<FlowInner>>,
    stage_tx: watch::Sender<DialogueStage>,
    config: InterviewConfig,
    current_year: i32,
    age_re: Regex,
    name_res: Vec<Regex>,
    location_res: Vec<Regex>,
}

impl DialogueFlow {
    pub fn new(config: InterviewConfig) -> Self {
        Self::with_year(config, Utc::now().year())
    }

    /// Pin the year used for timeline-question templates. Primarily for
    /// deterministic tests.
    pub fn with_year(config: InterviewConfig, current_year: i32) -> Self {
        let (stage_tx, _) = watch::channel(DialogueStage::Greeting);
        let name_res = [
            r"(?i)\bmy name is (\w+)",
            r"(?i)\bi'm (\w+)",
            r"(?i)\bi am (\w+)",
            r"(?i)\bcall me (\w+)",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("name pattern must compile"))
        .collect();
        let location_res = ["from", "in", "live in", "living in", "based in"]
            .iter()
            .map(|kw| {
                Regex::new(&format!(r"(?i)\b{kw}\s+([A-Za-z ,]+)"))
                    .expect("location pattern must compile")
            })
            .collect();

        Self {
            inner: Arc::new(RwLock::new(FlowInner::new(config, current_year))),
            stage_tx,
            config,
            current_year,
            age_re: Regex::new(r"\b(\d{1,2})\b").expect("age pattern must compile"),
            name_res,
            location_res,
        }
    }

    /// Current state snapshot.
    pub async fn state(&self) -> DialogueState {
        self.inner.read().await.state.clone()
    }

    /// Subscribe to stage transitions, including the asynchronous
    /// analysis → profile advance.
    pub fn subscribe(&self) -> watch::Receiver<DialogueStage> {
        self.stage_tx.subscribe()
    }

    /// Latest completed pattern analysis, if the analysis stage has run.
    pub async fn analysis_snapshot(&self) -> Option<PatternAnalysis> {
        self.inner.read().await.last_analysis.clone()
    }

    /// Run a fresh analysis over everything collected so far.
    pub async fn analysis_results(&self) -> PatternAnalysis {
        self.inner.read().await.patterns.analyze()
    }

    /// Process one user response: record it, feed the pattern system
    /// (except during greeting), and run the current stage's handler.
    pub async fn process_response(&self, response: &str) -> DialogueState {
        let mut inner = self.inner.write().await;
        let question = inner.state.current_question.clone();
        inner.state.history.push(QuestionAnswer {
            question: question.clone(),
            response: response.to_string(),
        });
        if inner.state.stage != DialogueStage::Greeting {
            inner.patterns.add_response(&question, response);
        }

        match inner.state.stage {
            DialogueStage::Greeting => {
                self.advance(&mut inner, DialogueStage::Demographics, DEMOGRAPHICS_QUESTION);
            }
            DialogueStage::Demographics => {
                inner.state.user_info = self.extract_user_info(response);
                let first = inner.timeline_questions[0].clone();
                self.advance(&mut inner, DialogueStage::Timeline, &first);
            }
            DialogueStage::Timeline => {
                let answered = inner.timeline_answered();
                let accuracy = self.config.accuracy_start as u32
                    + answered as u32 * self.config.accuracy_step as u32;
                inner.state.prediction_accuracy =
                    accuracy.min(self.config.accuracy_cap as u32) as u8;

                if answered >= self.config.min_timeline_answers {
                    self.enter_analysis(&mut inner);
                } else {
                    let next = inner
                        .timeline_questions
                        .iter()
                        .find(|q| !inner.state.history.iter().any(|qa| &qa.question == *q))
                        .cloned();
                    let question = match next {
                        Some(question) => question,
                        None => inner
                            .patterns
                            .recommended_questions()
                            .into_iter()
                            .next()
                            .unwrap_or_else(|| FALLBACK_QUESTION.to_string()),
                    };
                    inner.state.current_question = question;
                }
            }
            // Input during the simulated analysis delay is recorded but
            // not acted on; the spawned task advances the stage.
            DialogueStage::Analysis => {}
            DialogueStage::Profile => {
                let lower = response.to_lowercase();
                let next = if lower.contains("yes") || lower.contains("sure") {
                    PROFILE_YES
                } else {
                    PROFILE_NO
                };
                self.advance(&mut inner, DialogueStage::Conversation, next);
            }
            DialogueStage::Conversation => {
                self.next_conversation_question(&mut inner, response);
            }
        }

        inner.state.clone()
    }

    /// Reinitialize to greeting defaults and reset the pattern system.
    pub async fn reset(&self) {
        let mut inner = self.inner.write().await;
        *inner = FlowInner::new(self.config, self.current_year);
        self.stage_tx.send_replace(DialogueStage::Greeting);
    }

    fn advance(&self, inner: &mut FlowInner, stage: DialogueStage, question: &str) {
        inner.state.stage = stage;
        inner.state.current_question = question.to_string();
        // send_replace so late subscribers still observe the latest stage.
        self.stage_tx.send_replace(stage);
    }

    /// Enter the analysis stage and spawn the completion task. The task
    /// fires exactly once; a reset that lands during the delay aborts it.
    fn enter_analysis(&self, inner: &mut FlowInner) {
        self.advance(inner, DialogueStage::Analysis, ANALYSIS_MESSAGE);

        let shared = Arc::clone(&self.inner);
        let stage_tx = self.stage_tx.clone();
        let delay = Duration::from_millis(self.config.analysis_delay_ms);
        tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let mut inner = shared.write().await;
            if inner.state.stage != DialogueStage::Analysis {
                return;
            }
            let analysis = inner.patterns.analyze();
            tracing::debug!(
                "Pattern analysis complete (overall confidence {:.2})",
                analysis.overall_confidence
            );
            inner.last_analysis = Some(analysis);
            inner.state.analysis_complete = true;
            inner.state.stage = DialogueStage::Profile;
            inner.state.current_question = PROFILE_QUESTION.to_string();
            stage_tx.send_replace(DialogueStage::Profile);
        });
    }

    fn next_conversation_question(&self, inner: &mut FlowInner, response: &str) {
        let analysis = inner.patterns.analyze();
        let lower = response.to_lowercase();

        if lower.contains("profile") || lower.contains("learn") || lower.contains("about me") {
            inner.state.current_question = PROFILE_SUMMARY_PROMPT.to_string();
            inner.last_analysis = Some(analysis);
            return;
        }

        let demographic_lead = analysis
            .demographic
            .generation
            .as_ref()
            .map(|g| format!("As someone from the {g} generation, "))
            .unwrap_or_default();
        let value_lead = analysis
            .beliefs
            .core_values
            .first()
            .filter(|v| v.as_str() != INSUFFICIENT)
            .map(|v| format!("Given your interest in {v}, "))
            .unwrap_or_default();

        let pool = [
            format!("{demographic_lead}how do you feel about the current trends in technology?"),
            format!(
                "{value_lead}what are your thoughts on balancing personal and professional life?"
            ),
            "What's something you're looking forward to in the coming months?".to_string(),
            "How has your perspective changed over the years on what matters most to you?"
                .to_string(),
        ];
        let pick = rand::thread_rng().gen_range(0..pool.len());
        inner.state.current_question = pool[pick].clone();
        inner.last_analysis = Some(analysis);
    }

    fn extract_user_info(&self, response: &str) -> UserInfo {
        let age = self
            .age_re
            .captures(response)
            .map(|cap| cap[1].to_string());
        let name = self
            .name_res
            .iter()
            .find_map(|re| re.captures(response).map(|cap| cap[1].to_string()));
        let location = self
            .location_res
            .iter()
            .find_map(|re| re.captures(response).map(|cap| cap[1].trim().to_string()));
        UserInfo {
            age,
            location,
            name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::timeout;

    const YEAR: i32 = 2026;

    fn flow() -> DialogueFlow {
        DialogueFlow::with_year(InterviewConfig::default(), YEAR)
    }

    async fn wait_for_stage(flow: &DialogueFlow, stage: DialogueStage) {
        let mut rx = flow.subscribe();
        timeout(Duration::from_secs(5), async {
            while *rx.borrow_and_update() != stage {
                rx.changed().await.expect("stage channel closed");
            }
        })
        .await
        .expect("timed out waiting for stage");
    }

    #[tokio::test]
    async fn test_greeting_advances_unconditionally() {
        let flow = flow();
        assert_eq!(flow.state().await.stage, DialogueStage::Greeting);
        let state = flow.process_response("sure, let's start").await;
        assert_eq!(state.stage, DialogueStage::Demographics);
        assert_eq!(state.current_question, DEMOGRAPHICS_QUESTION);
        // Greeting responses are not fed into pattern recognition.
        assert_eq!(flow.inner.read().await.patterns.len(), 0);
    }

    #[tokio::test]
    async fn test_demographics_extraction() {
        let flow = flow();
        flow.process_response("hello").await;
        let state = flow
            .process_response("I'm Sam, 34, from Portland")
            .await;
        assert_eq!(state.stage, DialogueStage::Timeline);
        assert_eq!(state.user_info.age.as_deref(), Some("34"));
        assert_eq!(state.user_info.name.as_deref(), Some("Sam"));
        assert_eq!(state.user_info.location.as_deref(), Some("Portland"));
        // Demographics response was recorded for analysis.
        assert_eq!(flow.inner.read().await.patterns.len(), 1);
    }

    #[tokio::test]
    async fn test_timeline_cycles_then_enters_analysis_after_three() {
        let flow = flow();
        flow.process_response("hi").await;
        flow.process_response("34, from Portland").await;

        let state = flow.process_response("I was backpacking that summer").await;
        assert_eq!(state.stage, DialogueStage::Timeline);
        assert_eq!(state.prediction_accuracy, 35);

        let state = flow.process_response("the music was great").await;
        assert_eq!(state.stage, DialogueStage::Timeline);
        assert_eq!(state.prediction_accuracy, 50);

        // Third timeline answer triggers the analysis stage.
        let state = flow.process_response("switching careers was hard").await;
        assert_eq!(state.stage, DialogueStage::Analysis);
        assert_eq!(state.prediction_accuracy, 65);

        wait_for_stage(&flow, DialogueStage::Profile).await;
        let state = flow.state().await;
        assert!(state.analysis_complete);
        assert_eq!(state.current_question, PROFILE_QUESTION);
        assert!(flow.analysis_snapshot().await.is_some());
    }

    #[tokio::test]
    async fn test_timeline_questions_come_from_templates() {
        let flow = flow();
        flow.process_response("hi").await;
        let state = flow.process_response("29, based in Austin").await;
        let templates = timeline_questions(YEAR);
        assert_eq!(state.current_question, templates[0]);

        let state = flow.process_response("first answer").await;
        assert_eq!(state.current_question, templates[1]);
        let state = flow.process_response("second answer").await;
        assert_eq!(state.current_question, templates[2]);
    }

    #[tokio::test]
    async fn test_prediction_accuracy_caps() {
        let config = InterviewConfig {
            min_timeline_answers: 6,
            ..Default::default()
        };
        let flow = DialogueFlow::with_year(config, YEAR);
        flow.process_response("hi").await;
        flow.process_response("34 from Portland").await;

        let mut last = flow.state().await;
        for i in 0..6 {
            last = flow.process_response(&format!("timeline answer {i}")).await;
        }
        // 20 + 6 * 15 = 110, capped at 95
        assert_eq!(last.prediction_accuracy, 95);
        assert_eq!(last.stage, DialogueStage::Analysis);
    }

    #[tokio::test]
    async fn test_profile_branches_on_affirmative() {
        let flow = flow();
        flow.process_response("hi").await;
        flow.process_response("34 from Portland").await;
        for i in 0..3 {
            flow.process_response(&format!("answer {i}")).await;
        }
        wait_for_stage(&flow, DialogueStage::Profile).await;

        let state = flow.process_response("yes, show me").await;
        assert_eq!(state.stage, DialogueStage::Conversation);
        assert_eq!(state.current_question, PROFILE_YES);
    }

    #[tokio::test]
    async fn test_profile_negative_branch() {
        let flow = flow();
        flow.process_response("hi").await;
        flow.process_response("34 from Portland").await;
        for i in 0..3 {
            flow.process_response(&format!("answer {i}")).await;
        }
        wait_for_stage(&flow, DialogueStage::Profile).await;

        let state = flow.process_response("not right now").await;
        assert_eq!(state.stage, DialogueStage::Conversation);
        assert_eq!(state.current_question, PROFILE_NO);
    }

    #[tokio::test]
    async fn test_conversation_is_terminal_and_profile_aware() {
        let flow = flow();
        flow.process_response("hi").await;
        flow.process_response("34 from Portland").await;
        for i in 0..3 {
            flow.process_response(&format!("answer {i}")).await;
        }
        wait_for_stage(&flow, DialogueStage::Profile).await;
        flow.process_response("yes").await;

        let state = flow.process_response("tell me about my profile").await;
        assert_eq!(state.stage, DialogueStage::Conversation);
        assert_eq!(state.current_question, PROFILE_SUMMARY_PROMPT);

        let state = flow.process_response("what a lovely day").await;
        assert_eq!(state.stage, DialogueStage::Conversation);
        assert!(!state.current_question.is_empty());
    }

    #[tokio::test]
    async fn test_reset_restores_greeting_defaults() {
        let flow = flow();
        flow.process_response("hi").await;
        flow.process_response("34 from Portland").await;
        flow.process_response("an answer").await;

        flow.reset().await;
        let state = flow.state().await;
        assert_eq!(state.stage, DialogueStage::Greeting);
        assert_eq!(state.current_question, GREETING_QUESTION);
        assert!(state.history.is_empty());
        assert_eq!(
            state.prediction_accuracy,
            InterviewConfig::default().accuracy_start
        );
        assert!(!state.analysis_complete);
        assert_eq!(flow.inner.read().await.patterns.len(), 0);
    }

    #[tokio::test]
    async fn test_reset_during_analysis_aborts_completion() {
        let config = InterviewConfig {
            analysis_delay_ms: 50,
            ..Default::default()
        };
        let flow = DialogueFlow::with_year(config, YEAR);
        flow.process_response("hi").await;
        flow.process_response("34 from Portland").await;
        for i in 0..3 {
            flow.process_response(&format!("answer {i}")).await;
        }
        assert_eq!(flow.state().await.stage, DialogueStage::Analysis);

        flow.reset().await;
        tokio::time::sleep(Duration::from_millis(120)).await;
        let state = flow.state().await;
        assert_eq!(state.stage, DialogueStage::Greeting);
        assert!(!state.analysis_complete);
    }
}
