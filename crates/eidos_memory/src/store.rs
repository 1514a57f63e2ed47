//! The append-and-query memory store.
//!
//! Append-only per user: every processed turn becomes a `MemoryNode` and
//! is folded into the owner's profile. Retrieval ranks nodes by word
//! overlap, importance, and recency decay, and bumps access bookkeeping
//! on everything it returns.

use crate::profile::ProfileAggregator;
use crate::repository::MemoryRepository;
use anyhow::Result;
use chrono::{DateTime, Utc};
use eidos_core::{Emotion, MemoryNode};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

/// Relevance score weights. Word overlap dominates so an exact restatement
/// of a stored turn always surfaces first.
const WEIGHT_OVERLAP: f64 = 0.4;
const WEIGHT_IMPORTANCE: f64 = 0.3;
const WEIGHT_RECENCY: f64 = 0.3;

pub struct MemoryStore {
    repo: Arc<dyn MemoryRepository>,
    aggregator: Arc<ProfileAggregator>,
}

impl MemoryStore {
    pub fn new(repo: Arc<dyn MemoryRepository>, aggregator: Arc<ProfileAggregator>) -> Self {
        Self { repo, aggregator }
    }

    /// Store one turn. Always succeeds (barring repository failure):
    /// creates the node with its tag set and resource snapshot, persists
    /// it, and folds it into the user's profile.
    pub async fn append(
        &self,
        user_id: &str,
        content: &str,
        emotion: Emotion,
        intensity: f32,
        importance: f32,
    ) -> Result<Uuid> {
        let node = MemoryNode::new(user_id, content, emotion, intensity, importance);
        self.repo.insert_node(&node).await?;
        self.aggregator.fold(&node).await?;
        tracing::debug!(
            "Stored memory {} for user {} ({} tags)",
            node.id,
            user_id,
            node.tags.len()
        );
        Ok(node.id)
    }

    /// Relevance-ranked retrieval. Returns the top `limit` nodes by
    /// descending score; ties keep insertion order (stable sort). Bumps
    /// `access_count` / `last_accessed` on every returned node and
    /// persists the update. A user with no nodes gets an empty list.
    pub async fn retrieve_relevant(
        &self,
        user_id: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<MemoryNode>> {
        let nodes = self.repo.nodes_for_user(user_id).await?;
        if nodes.is_empty() {
            return Ok(Vec::new());
        }

        let now = Utc::now();
        let mut scored: Vec<(f64, MemoryNode)> = nodes
            .into_iter()
            .map(|node| (relevance_score(query, &node, now), node))
            .collect();

        // Stable sort: equal scores stay in insertion order.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        let mut selected: Vec<MemoryNode> =
            scored.into_iter().take(limit).map(|(_, n)| n).collect();

        let ids: Vec<Uuid> = selected.iter().map(|n| n.id).collect();
        self.repo.record_access(&ids, now).await?;
        for node in &mut selected {
            node.access_count += 1;
            node.last_accessed = now;
        }

        Ok(selected)
    }

    /// Remove every node and the profile for a user. Atomic and
    /// idempotent; immediately visible to subsequent reads.
    pub async fn clear_user(&self, user_id: &str) -> Result<()> {
        self.repo.clear_user(user_id).await?;
        tracing::info!("Cleared all memories for user {}", user_id);
        Ok(())
    }

    /// Aggregate statistics over a user's stored nodes.
    pub async fn stats(&self, user_id: &str) -> Result<MemoryStats> {
        let nodes = self.repo.nodes_for_user(user_id).await?;

        let mut by_emotion: BTreeMap<&'static str, u32> = BTreeMap::new();
        let mut by_tag: BTreeMap<String, u32> = BTreeMap::new();
        let mut by_day: BTreeMap<String, u32> = BTreeMap::new();

        for node in &nodes {
            *by_emotion.entry(node.emotion.as_str()).or_default() += 1;
            for tag in &node.tags {
                *by_tag.entry(tag.clone()).or_default() += 1;
            }
            let day = node.created_at.format("%Y-%m-%d").to_string();
            *by_day.entry(day).or_default() += 1;
        }

        let emotional_breakdown = by_emotion
            .into_iter()
            .map(|(emotion, count)| EmotionCount {
                emotion: emotion.to_string(),
                count,
            })
            .collect();

        let mut top_tags: Vec<TagCount> = by_tag
            .into_iter()
            .map(|(tag, count)| TagCount { tag, count })
            .collect();
        top_tags.sort_by(|a, b| b.count.cmp(&a.count));
        top_tags.truncate(10);

        let timeline = by_day
            .into_iter()
            .map(|(date, count)| DayCount { date, count })
            .collect();

        Ok(MemoryStats {
            total_memories: nodes.len(),
            emotional_breakdown,
            top_tags,
            timeline,
        })
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmotionCount {
    pub emotion: String,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TagCount {
    pub tag: String,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DayCount {
    pub date: String,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MemoryStats {
    pub total_memories: usize,
    pub emotional_breakdown: Vec<EmotionCount>,
    pub top_tags: Vec<TagCount>,
    /// Per-day creation counts, date ascending.
    pub timeline: Vec<DayCount>,
}

/// Score = 0.4 * word overlap + 0.3 * importance + 0.3 * recency decay,
/// where decay = 1 / (1 + age in days). Empty queries score zero overlap
/// rather than dividing by zero.
fn relevance_score(query: &str, node: &MemoryNode, now: DateTime<Utc>) -> f64 {
    let query_words: Vec<String> = query
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect();
    let content_words: Vec<String> = node
        .content
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect();

    let overlap = if query_words.is_empty() {
        0.0
    } else {
        let hits = query_words
            .iter()
            .filter(|w| content_words.contains(w))
            .count();
        hits as f64 / query_words.len() as f64
    };

    let recency = 1.0 / (1.0 + node.age_days(now));

    WEIGHT_OVERLAP * overlap + WEIGHT_IMPORTANCE * node.importance as f64 + WEIGHT_RECENCY * recency
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(content: &str, importance: f32) -> MemoryNode {
        MemoryNode::new("u1", content, Emotion::Content, 1.0, importance)
    }

    #[test]
    fn test_exact_match_scores_full_overlap() {
        let n = node("the quarterly report is done", 0.5);
        let score = relevance_score("the quarterly report is done", &n, Utc::now());
        // overlap 1.0, recency ~1.0, importance 0.5
        assert!(score > 0.84, "score={score}");
    }

    #[test]
    fn test_empty_query_scores_zero_overlap() {
        let n = node("anything", 0.0);
        let score = relevance_score("", &n, Utc::now());
        assert!(score <= WEIGHT_RECENCY + 1e-9);
    }

    #[test]
    fn test_overlap_is_case_insensitive() {
        let n = node("Budget Review Friday", 0.0);
        let with_match = relevance_score("budget review", &n, Utc::now());
        let without = relevance_score("vacation plans", &n, Utc::now());
        assert!(with_match > without);
    }

    #[test]
    fn test_recency_decay_reduces_score() {
        let n = node("same words here", 0.0);
        let now = Utc::now();
        let fresh = relevance_score("same words here", &n, now);
        let stale = relevance_score("same words here", &n, now + chrono::Duration::days(10));
        assert!(fresh > stale);
    }
}
