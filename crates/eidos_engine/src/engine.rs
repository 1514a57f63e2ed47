//! The engine facade: the in-process contract the UI and route layers
//! consume.
//!
//! Composes the classifier, resource mapper, memory store, profile
//! aggregator, guided interview, and the chat-completion seam. All entry
//! points take `&self`; per-user calls are expected to arrive
//! sequentially (one session per user), while different users are fully
//! independent.

use crate::llm::{ChatCompletion, ChatMessage, CompletionParams};
use crate::respond::{infer_generation, shape_response, GenerationGuidance};
use eidos_core::{
    decision, BiasAnalysis, BiasDetector, DecisionAssessment, DecisionContext, EidosConfig,
    Emotion, EmotionClassifier, EngineError, ResourceState,
};
use eidos_dialogue::DialogueFlow;
use eidos_memory::{
    InsightSnapshot, MemoryRepository, MemoryStats, MemoryStore, ProfileAggregator,
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Importance assigned to ordinary turns; callers that know better can
/// append through the store directly.
const DEFAULT_IMPORTANCE: f32 = 0.5;

/// Result of processing one turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub emotion: Emotion,
    pub intensity: f32,
    pub confidence: f32,
    pub resource_state: ResourceState,
    pub memory_id: Uuid,
}

pub struct Engine {
    classifier: EmotionClassifier,
    bias: BiasDetector,
    store: MemoryStore,
    profiles: Arc<ProfileAggregator>,
    dialogue: DialogueFlow,
    completion: Arc<dyn ChatCompletion>,
}

impl Engine {
    pub fn new(
        repo: Arc<dyn MemoryRepository>,
        completion: Arc<dyn ChatCompletion>,
        config: &EidosConfig,
    ) -> Self {
        let profiles = Arc::new(ProfileAggregator::new(Arc::clone(&repo), config.limits));
        let store = MemoryStore::new(repo, Arc::clone(&profiles));
        Self {
            classifier: EmotionClassifier::new(),
            bias: BiasDetector,
            store,
            profiles,
            dialogue: DialogueFlow::new(config.interview),
            completion,
        }
    }

    /// Classify, snapshot the resource state, and store one turn.
    pub async fn process_turn(
        &self,
        user_id: &str,
        text: &str,
    ) -> Result<TurnOutcome, EngineError> {
        let signal = self.classifier.classify(text);
        tracing::debug!(
            "Classified turn for {} as {} (intensity {:.2})",
            user_id,
            signal.emotion,
            signal.intensity
        );
        let resource_state = ResourceState::for_emotion(signal.emotion, signal.intensity);
        let memory_id = self
            .store
            .append(
                user_id,
                text,
                signal.emotion,
                signal.intensity,
                DEFAULT_IMPORTANCE,
            )
            .await
            .map_err(EngineError::Upstream)?;

        Ok(TurnOutcome {
            emotion: signal.emotion,
            intensity: signal.intensity,
            confidence: signal.confidence,
            resource_state,
            memory_id,
        })
    }

    /// Produce a full reply: store the turn, gather memory context, call
    /// the completion collaborator, and shape the result with emotion,
    /// bias, and generation framing.
    pub async fn respond(&self, user_id: &str, text: &str) -> Result<String, EngineError> {
        let outcome = self.process_turn(user_id, text).await?;
        let bias = self.bias.analyze(text);
        let guidance = infer_generation(text);

        let relevant = self
            .store
            .retrieve_relevant(user_id, text, 5)
            .await
            .map_err(EngineError::Upstream)?;
        let snippets = self
            .profiles
            .contextual_snippets(user_id, relevant.first())
            .await
            .map_err(EngineError::Upstream)?;

        let system = system_prompt(&snippets, &guidance);
        let base = self
            .completion
            .complete(&system, &[ChatMessage::user(text)], CompletionParams::default())
            .await
            .map_err(EngineError::Upstream)?;

        let signal = eidos_core::EmotionalSignal {
            emotion: outcome.emotion,
            intensity: outcome.intensity,
            confidence: outcome.confidence,
        };
        Ok(shape_response(&base, &signal, &bias, &guidance))
    }

    pub async fn insights(&self, user_id: &str) -> Result<InsightSnapshot, EngineError> {
        self.profiles
            .insights(user_id)
            .await
            .map_err(EngineError::Upstream)
    }

    pub async fn memory_stats(&self, user_id: &str) -> Result<MemoryStats, EngineError> {
        self.store
            .stats(user_id)
            .await
            .map_err(EngineError::Upstream)
    }

    pub async fn predictive_questions(&self, user_id: &str) -> Result<Vec<String>, EngineError> {
        self.profiles
            .predictive_questions(user_id)
            .await
            .map_err(EngineError::Upstream)
    }

    pub async fn reminders(&self, user_id: &str) -> Result<Vec<String>, EngineError> {
        self.profiles
            .reminders(user_id)
            .await
            .map_err(EngineError::Upstream)
    }

    pub async fn export_profile(&self, user_id: &str) -> Result<String, EngineError> {
        self.profiles.export_profile(user_id).await
    }

    pub async fn import_profile(&self, user_id: &str, blob: &str) -> Result<(), EngineError> {
        self.profiles.import_profile(user_id, blob).await
    }

    /// Remove everything known about a user. Atomic and idempotent.
    pub async fn clear_user_memories(&self, user_id: &str) -> Result<(), EngineError> {
        self.store
            .clear_user(user_id)
            .await
            .map_err(EngineError::Upstream)
    }

    /// Record a topic the agent failed to help with.
    pub async fn note_disconnection(
        &self,
        user_id: &str,
        topic: &str,
        context: &str,
    ) -> Result<(), EngineError> {
        self.profiles
            .note_disconnection(user_id, topic, context)
            .await
            .map_err(EngineError::Upstream)
    }

    /// Scan one message for generalization biases.
    pub fn analyze_bias(&self, text: &str) -> BiasAnalysis {
        self.bias.analyze(text)
    }

    /// Evaluate a decision context against the fixed risk tiers.
    pub fn evaluate_decision(&self, context: DecisionContext) -> DecisionAssessment {
        decision::evaluate(context)
    }

    pub fn dialogue(&self) -> &DialogueFlow {
        &self.dialogue
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }
}

fn system_prompt(snippets: &[String], guidance: &GenerationGuidance) -> String {
    let mut prompt = String::from(
        "You are eidos, an attentive conversational companion with long-term memory of this \
         user. Reply naturally and concretely.",
    );
    if !snippets.is_empty() {
        prompt.push_str("\nContext from memory:\n");
        for snippet in snippets {
            prompt.push_str("- ");
            prompt.push_str(snippet);
            prompt.push('\n');
        }
    }
    if guidance.confidence > 0.0 {
        prompt.push_str("\nAudience note: ");
        prompt.push_str(&guidance.guidance);
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockCompletion;
    use eidos_memory::InMemoryRepository;

    fn engine() -> Engine {
        Engine::new(
            Arc::new(InMemoryRepository::new()),
            Arc::new(MockCompletion::new("Base reply from the model.")),
            &EidosConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_process_turn_outcome() {
        let engine = engine();
        let outcome = engine
            .process_turn("u1", "I AM SO HAPPY!!!")
            .await
            .unwrap();
        assert_eq!(outcome.emotion, Emotion::Happy);
        assert!(outcome.intensity > 1.5);
        assert!(outcome.resource_state.compute_rate > 1.0);

        let snapshot = engine.insights("u1").await.unwrap();
        assert_eq!(snapshot.memory_stats.total_memories, 1);
    }

    #[tokio::test]
    async fn test_respond_shapes_and_stores() {
        let engine = engine();
        let reply = engine
            .respond("u1", "I'm so happy about the new job, I love it!")
            .await
            .unwrap();
        assert!(reply.contains("Base reply from the model."));
        assert!(reply.starts_with("I love your positive energy!"));

        // The turn was stored as a memory.
        let snapshot = engine.insights("u1").await.unwrap();
        assert_eq!(snapshot.memory_stats.total_memories, 1);
    }

    #[tokio::test]
    async fn test_respond_wraps_biased_input() {
        let engine = engine();
        let reply = engine
            .respond("u1", "everyone always ignores advice")
            .await
            .unwrap();
        assert!(reply.starts_with("I notice some potential biases"));
    }

    #[tokio::test]
    async fn test_clear_user_memories_round_trip() {
        let engine = engine();
        engine.process_turn("u1", "my goal is to read more").await.unwrap();
        engine.clear_user_memories("u1").await.unwrap();

        let snapshot = engine.insights("u1").await.unwrap();
        assert_eq!(snapshot, InsightSnapshot::default());
    }

    #[tokio::test]
    async fn test_decision_and_bias_helpers() {
        let engine = engine();
        let assessment = engine.evaluate_decision(DecisionContext {
            risk_factor: 10.0,
            optimization_factor: 90.0,
            projected_outcome: 90.0,
        });
        assert_eq!(assessment.tier, eidos_core::DecisionTier::Safe);

        let bias = engine.analyze_bias("they all think alike");
        assert!(!bias.is_clear());
    }

    #[tokio::test]
    async fn test_dialogue_is_reachable_through_engine() {
        let engine = engine();
        let state = engine.dialogue().process_response("hello").await;
        assert_eq!(
            state.stage,
            eidos_dialogue::DialogueStage::Demographics
        );
    }

    #[tokio::test]
    async fn test_profile_export_import_through_engine() {
        let engine = engine();
        engine
            .process_turn("u1", "my goal is to learn the cello")
            .await
            .unwrap();
        let blob = engine.export_profile("u1").await.unwrap();
        engine.import_profile("u2", &blob).await.unwrap();
        let snapshot = engine.insights("u2").await.unwrap();
        assert!(snapshot
            .personal_context
            .goals
            .iter()
            .any(|g| g.contains("cello")));
    }
}
