//! Per-user conversation profiles and their aggregation.
//!
//! One `ConversationProfile` per user, created lazily on the first stored
//! memory and folded forward on every turn. All bounded lists enforce
//! their caps immediately after each mutation; a single repository write
//! per fold keeps the update atomic with respect to readers.

use crate::bounded;
use crate::extract::{ContextCategory, ContextExtractor};
use crate::repository::MemoryRepository;
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use eidos_core::{Emotion, EngineError, MemoryNode, ProfileLimits};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// How many characters of a message become an emotional-pattern trigger
/// snippet.
const TRIGGER_SNIPPET_CHARS: usize = 50;

/// Recency window for "recent" memory statistics and emotion trends.
const RECENT_WINDOW_DAYS: i64 = 7;

/// Recency window for topic-driven predictive questions.
const TOPIC_QUESTION_WINDOW_DAYS: i64 = 3;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmotionalPattern {
    pub emotion: Emotion,
    pub frequency: u32,
    /// Bounded list of message snippets that triggered this emotion.
    pub triggers: Vec<String>,
    pub last_seen: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FutureEvent {
    pub event: String,
    /// Concrete date when known, otherwise "TBD".
    pub date: String,
    pub importance: f32,
    pub mentioned: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopicEntry {
    pub topic: String,
    pub frequency: u32,
    /// Emotion attached to the most recent mention.
    pub sentiment: Emotion,
    pub last_discussed: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PersonalContext {
    pub goals: Vec<String>,
    pub challenges: Vec<String>,
    pub preferences: Vec<String>,
    pub relationships: Vec<String>,
    pub future_events: Vec<FutureEvent>,
    /// Kept sorted by frequency descending, recency breaking ties.
    pub topics: Vec<TopicEntry>,
}

/// A place where the agent failed to help. Append-only; never pruned
/// automatically.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisconnectionPoint {
    pub topic: String,
    pub context: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub memory_id: Uuid,
    pub content: String,
    pub emotion: Emotion,
    pub timestamp: DateTime<Utc>,
    pub importance: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationProfile {
    pub user_id: String,
    /// Unique by emotion.
    pub emotional_patterns: Vec<EmotionalPattern>,
    pub personal_context: PersonalContext,
    pub disconnection_points: Vec<DisconnectionPoint>,
    /// Ring buffer of recent turns, oldest evicted.
    pub conversation_history: Vec<HistoryEntry>,
}

impl ConversationProfile {
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            emotional_patterns: Vec::new(),
            personal_context: PersonalContext::default(),
            disconnection_points: Vec::new(),
            conversation_history: Vec::new(),
        }
    }
}

// ============================================================================
// Insight projections
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmotionTrend {
    pub emotion: Emotion,
    pub frequency: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopicCount {
    pub topic: String,
    pub frequency: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MemorySummary {
    pub total_memories: usize,
    /// Nodes created within the last seven days.
    pub recent_memories: usize,
    pub top_topics: Vec<TopicCount>,
}

/// Read-only projection over a user's profile and memory statistics.
/// A user with no profile gets the all-empty default, never an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InsightSnapshot {
    pub emotional_trends: Vec<EmotionTrend>,
    pub personal_context: PersonalContext,
    pub disconnection_points: Vec<DisconnectionPoint>,
    pub memory_stats: MemorySummary,
}

// ============================================================================
// Aggregator
// ============================================================================

/// Folds memory nodes into per-user profiles and serves projections.
pub struct ProfileAggregator {
    repo: Arc<dyn MemoryRepository>,
    extractor: ContextExtractor,
    limits: ProfileLimits,
}

impl ProfileAggregator {
    pub fn new(repo: Arc<dyn MemoryRepository>, limits: ProfileLimits) -> Self {
        Self {
            repo,
            extractor: ContextExtractor::new(),
            limits,
        }
    }

    /// Fold one memory node into the owner's profile. Creates the profile
    /// lazily; writes it back once, so readers see either the old or the
    /// new profile, never a partial update.
    pub async fn fold(&self, node: &MemoryNode) -> Result<()> {
        let mut profile = self
            .repo
            .load_profile(&node.user_id)
            .await?
            .unwrap_or_else(|| ConversationProfile::new(&node.user_id));

        self.update_emotional_patterns(&mut profile, node);
        self.merge_extractions(&mut profile, &node.content, node.created_at);
        self.update_topics(&mut profile, &node.content, node.emotion, node.created_at);

        bounded::push_rolling(
            &mut profile.conversation_history,
            HistoryEntry {
                memory_id: node.id,
                content: node.content.clone(),
                emotion: node.emotion,
                timestamp: node.created_at,
                importance: node.importance,
            },
            self.limits.history,
        );

        self.repo.save_profile(&profile).await
    }

    fn update_emotional_patterns(&self, profile: &mut ConversationProfile, node: &MemoryNode) {
        let snippet: String = node.content.chars().take(TRIGGER_SNIPPET_CHARS).collect();
        let patterns = &mut profile.emotional_patterns;
        match patterns.iter().position(|p| p.emotion == node.emotion) {
            Some(idx) => {
                let pattern = &mut patterns[idx];
                pattern.frequency += 1;
                pattern.last_seen = node.created_at;
                bounded::push_unique(&mut pattern.triggers, snippet, self.limits.triggers);
            }
            None => patterns.push(EmotionalPattern {
                emotion: node.emotion,
                frequency: 1,
                triggers: vec![snippet],
                last_seen: node.created_at,
            }),
        }
    }

    fn merge_extractions(
        &self,
        profile: &mut ConversationProfile,
        content: &str,
        at: DateTime<Utc>,
    ) {
        let context = &mut profile.personal_context;
        for extraction in self.extractor.extract(content) {
            match extraction.category {
                ContextCategory::Future => {
                    if !context.future_events.iter().any(|e| e.event == extraction.text) {
                        bounded::push_rolling(
                            &mut context.future_events,
                            FutureEvent {
                                event: extraction.text,
                                date: "TBD".to_string(),
                                importance: 0.7,
                                mentioned: at,
                            },
                            self.limits.future_events,
                        );
                    }
                }
                ContextCategory::Goal => {
                    bounded::push_unique(&mut context.goals, extraction.text, self.limits.goals);
                }
                ContextCategory::Challenge => {
                    bounded::push_unique(
                        &mut context.challenges,
                        extraction.text,
                        self.limits.challenges,
                    );
                }
                ContextCategory::Preference => {
                    bounded::push_unique(
                        &mut context.preferences,
                        extraction.text,
                        self.limits.preferences,
                    );
                }
                ContextCategory::Relationship => {
                    bounded::push_unique(
                        &mut context.relationships,
                        extraction.text,
                        self.limits.relationships,
                    );
                }
            }
        }
    }

    fn update_topics(
        &self,
        profile: &mut ConversationProfile,
        content: &str,
        sentiment: Emotion,
        at: DateTime<Utc>,
    ) {
        let topics = &mut profile.personal_context.topics;
        for token in ContextExtractor::topics(content) {
            match topics.iter().position(|t| t.topic == token) {
                Some(idx) => {
                    let entry = &mut topics[idx];
                    entry.frequency += 1;
                    entry.sentiment = sentiment;
                    entry.last_discussed = at;
                }
                None => topics.push(TopicEntry {
                    topic: token,
                    frequency: 1,
                    sentiment,
                    last_discussed: at,
                }),
            }
        }

        // Frequency descending, most recently discussed first on ties.
        topics.sort_by(|a, b| {
            b.frequency
                .cmp(&a.frequency)
                .then(b.last_discussed.cmp(&a.last_discussed))
        });
        topics.truncate(self.limits.topics);
    }

    /// Record a point where the agent failed to help. Append-only.
    pub async fn note_disconnection(
        &self,
        user_id: &str,
        topic: &str,
        context: &str,
    ) -> Result<()> {
        let mut profile = self
            .repo
            .load_profile(user_id)
            .await?
            .unwrap_or_else(|| ConversationProfile::new(user_id));
        profile.disconnection_points.push(DisconnectionPoint {
            topic: topic.to_string(),
            context: context.to_string(),
            timestamp: Utc::now(),
        });
        self.repo.save_profile(&profile).await
    }

    /// Read-only insight projection. Pure with respect to stored state:
    /// calling it twice without an intervening fold yields identical
    /// results.
    pub async fn insights(&self, user_id: &str) -> Result<InsightSnapshot> {
        let profile = match self.repo.load_profile(user_id).await? {
            Some(profile) => profile,
            None => return Ok(InsightSnapshot::default()),
        };

        let mut trends: Vec<EmotionTrend> = profile
            .emotional_patterns
            .iter()
            .map(|p| EmotionTrend {
                emotion: p.emotion,
                frequency: p.frequency,
            })
            .collect();
        trends.sort_by(|a, b| b.frequency.cmp(&a.frequency));

        let nodes = self.repo.nodes_for_user(user_id).await?;
        let cutoff = Utc::now() - Duration::days(RECENT_WINDOW_DAYS);
        let recent = nodes.iter().filter(|n| n.created_at > cutoff).count();

        let top_topics = profile
            .personal_context
            .topics
            .iter()
            .take(10)
            .map(|t| TopicCount {
                topic: t.topic.clone(),
                frequency: t.frequency,
            })
            .collect();

        Ok(InsightSnapshot {
            emotional_trends: trends,
            personal_context: profile.personal_context.clone(),
            disconnection_points: profile.disconnection_points.clone(),
            memory_stats: MemorySummary {
                total_memories: nodes.len(),
                recent_memories: recent,
                top_topics,
            },
        })
    }

    /// Templated follow-up questions from the profile, capped at five.
    pub async fn predictive_questions(&self, user_id: &str) -> Result<Vec<String>> {
        let profile = match self.repo.load_profile(user_id).await? {
            Some(profile) => profile,
            None => return Ok(Vec::new()),
        };

        let mut questions = Vec::new();
        let context = &profile.personal_context;

        for event in &context.future_events {
            questions.push(format!("How are you feeling about {}?", event.event));
            questions.push(format!(
                "Do you need any help preparing for {}?",
                event.event
            ));
        }
        for goal in &context.goals {
            questions.push(format!("How is your progress on {goal}?"));
            questions.push(format!("What's the next step for {goal}?"));
        }
        for challenge in &context.challenges {
            questions.push(format!("How are you handling {challenge}?"));
            questions.push(format!("Have you found any solutions for {challenge}?"));
        }

        let cutoff = Utc::now() - Duration::days(TOPIC_QUESTION_WINDOW_DAYS);
        for topic in context
            .topics
            .iter()
            .filter(|t| t.last_discussed > cutoff)
            .take(3)
        {
            questions.push(format!("How are things going with {}?", topic.topic));
        }

        questions.truncate(5);
        Ok(questions)
    }

    /// Short reminder lines from future events and goals, capped at three.
    pub async fn reminders(&self, user_id: &str) -> Result<Vec<String>> {
        let profile = match self.repo.load_profile(user_id).await? {
            Some(profile) => profile,
            None => return Ok(Vec::new()),
        };

        let mut reminders = Vec::new();
        for event in &profile.personal_context.future_events {
            reminders.push(format!("Remember: {}", event.event));
        }
        for goal in &profile.personal_context.goals {
            reminders.push(format!("Goal: {goal}"));
        }
        reminders.truncate(3);
        Ok(reminders)
    }

    /// "I remember..." lines for response shaping: the best-matching
    /// memory, the dominant recent emotion, the first goal, and the first
    /// upcoming event.
    pub async fn contextual_snippets(
        &self,
        user_id: &str,
        top_memory: Option<&MemoryNode>,
    ) -> Result<Vec<String>> {
        let profile = match self.repo.load_profile(user_id).await? {
            Some(profile) => profile,
            None => return Ok(Vec::new()),
        };

        let mut lines = Vec::new();

        if let Some(memory) = top_memory {
            let snippet: String = memory.content.chars().take(100).collect();
            lines.push(format!("I remember we discussed: {snippet}..."));
        }

        let cutoff = Utc::now() - Duration::days(RECENT_WINDOW_DAYS);
        if let Some(pattern) = profile
            .emotional_patterns
            .iter()
            .filter(|p| p.last_seen > cutoff)
            .max_by_key(|p| p.frequency)
        {
            lines.push(format!(
                "I notice you've been feeling {} lately.",
                pattern.emotion
            ));
        }

        if let Some(goal) = profile.personal_context.goals.first() {
            lines.push(format!("Considering your goal to {goal}."));
        }
        if let Some(event) = profile.personal_context.future_events.first() {
            lines.push(format!("I remember you mentioned {}.", event.event));
        }

        Ok(lines)
    }

    /// Serialize a user's profile to JSON for export.
    pub async fn export_profile(&self, user_id: &str) -> Result<String, EngineError> {
        let profile = self
            .repo
            .load_profile(user_id)
            .await
            .map_err(EngineError::Upstream)?
            .ok_or_else(|| EngineError::NotFound(format!("profile for user {user_id}")))?;
        serde_json::to_string(&profile)
            .map_err(|e| EngineError::Upstream(anyhow::Error::from(e)))
    }

    /// Import a previously exported profile under `user_id` (which may
    /// differ from the exporting user). A blob that fails to parse is
    /// logged and reported as malformed; the caller is never crashed.
    pub async fn import_profile(&self, user_id: &str, blob: &str) -> Result<(), EngineError> {
        let mut profile: ConversationProfile = match serde_json::from_str(blob) {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!("Rejected malformed profile import for {}: {}", user_id, e);
                return Err(EngineError::Malformed(format!(
                    "profile blob failed to parse: {e}"
                )));
            }
        };
        profile.user_id = user_id.to_string();
        self.repo
            .save_profile(&profile)
            .await
            .map_err(EngineError::Upstream)
    }
}
