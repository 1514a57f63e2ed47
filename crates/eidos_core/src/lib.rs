pub mod bias;
pub mod config;
pub mod decision;
pub mod emotion;
pub mod error;
pub mod resource;

pub use bias::{BiasAnalysis, BiasDetector, BiasKind};
pub use config::{EidosConfig, InterviewConfig, MemoryConfig, ProfileLimits};
pub use decision::{DecisionAssessment, DecisionContext, DecisionTier};
pub use emotion::{Emotion, EmotionClassifier, EmotionalSignal};
pub use error::EngineError;
pub use resource::ResourceState;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One immutable record of a single conversational turn, owned by a user.
///
/// Content never changes after creation; only `last_accessed` and
/// `access_count` mutate, and only when the node is returned from a
/// relevance query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryNode {
    pub id: Uuid,
    pub user_id: String,
    pub content: String,
    pub emotion: Emotion,
    /// Emotional intensity at capture time (0.0 - 2.0, 1.0 is balanced)
    pub intensity: f32,
    /// Caller-supplied importance weight (0.0 - 1.0)
    pub importance: f32,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub access_count: u32,
    /// Derived tags: emotion label + topic categories + temporal markers
    pub tags: Vec<String>,
    /// Simulated resource state captured when the node was created
    pub resource_state: ResourceState,
}

impl MemoryNode {
    /// Build a fresh node for a turn. Tags and the resource snapshot are
    /// derived here so every creation path gets identical bookkeeping.
    pub fn new(
        user_id: &str,
        content: &str,
        emotion: Emotion,
        intensity: f32,
        importance: f32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            content: content.to_string(),
            emotion,
            intensity: intensity.clamp(0.0, 2.0),
            importance: importance.clamp(0.0, 1.0),
            created_at: now,
            last_accessed: now,
            access_count: 0,
            tags: derive_tags(content, emotion),
            resource_state: ResourceState::for_emotion(emotion, intensity),
        }
    }

    /// Age of the node in days relative to `now`. Negative ages (clock
    /// skew) are treated as zero so decay never amplifies a score.
    pub fn age_days(&self, now: DateTime<Utc>) -> f64 {
        let millis = now.signed_duration_since(self.created_at).num_milliseconds();
        (millis.max(0) as f64) / (24.0 * 60.0 * 60.0 * 1000.0)
    }
}

/// Topic keyword lists used for tag derivation on every stored turn.
const TAG_TOPICS: &[(&str, &[&str])] = &[
    (
        "work",
        &["work", "job", "career", "office", "meeting", "project", "deadline", "boss", "colleague"],
    ),
    (
        "family",
        &["family", "mom", "dad", "sister", "brother", "parent", "child", "kids", "spouse"],
    ),
    (
        "health",
        &["health", "doctor", "medicine", "exercise", "diet", "sick", "pain", "therapy"],
    ),
    (
        "technology",
        &["code", "programming", "computer", "software", "app", "website", "tech"],
    ),
    (
        "education",
        &["school", "study", "learn", "class", "teacher", "student", "homework", "exam"],
    ),
    (
        "hobbies",
        &["hobby", "music", "art", "sports", "game", "book", "movie", "travel"],
    ),
    (
        "relationships",
        &["friend", "relationship", "dating", "love", "partner", "social"],
    ),
];

/// Derive the tag set for a turn: the emotion label, any matching topic
/// category, and coarse temporal markers.
pub fn derive_tags(content: &str, emotion: Emotion) -> Vec<String> {
    let lower = content.to_lowercase();
    let mut tags = vec![emotion.as_str().to_string()];

    for (topic, keywords) in TAG_TOPICS {
        if keywords.iter().any(|kw| lower.contains(kw)) {
            tags.push((*topic).to_string());
        }
    }

    if lower.contains("tomorrow") || lower.contains("next") {
        tags.push("future".to_string());
    }
    if lower.contains("yesterday") || lower.contains("last") {
        tags.push("past".to_string());
    }
    if lower.contains("today") || lower.contains("now") {
        tags.push("present".to_string());
    }

    tags
}
