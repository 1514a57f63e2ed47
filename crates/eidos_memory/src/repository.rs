//! The persistence seam for memory nodes and profiles.
//!
//! The store and aggregator never touch a backing medium directly; they
//! go through `MemoryRepository`. Two implementations ship: a durable
//! sqlite repository (`crate::sqlite`) and the in-memory one here, used
//! for tests and ephemeral sessions.

use crate::profile::ConversationProfile;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eidos_core::MemoryNode;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[async_trait]
pub trait MemoryRepository: Send + Sync {
    async fn insert_node(&self, node: &MemoryNode) -> Result<()>;

    /// All nodes owned by a user, in insertion order. Unknown users yield
    /// an empty list.
    async fn nodes_for_user(&self, user_id: &str) -> Result<Vec<MemoryNode>>;

    /// Bump access counters and last-accessed timestamps for the given
    /// node ids.
    async fn record_access(&self, ids: &[Uuid], at: DateTime<Utc>) -> Result<()>;

    async fn load_profile(&self, user_id: &str) -> Result<Option<ConversationProfile>>;

    async fn save_profile(&self, profile: &ConversationProfile) -> Result<()>;

    /// Remove every node and the profile for a user in one atomic step.
    /// Idempotent: clearing an unknown user succeeds.
    async fn clear_user(&self, user_id: &str) -> Result<()>;
}

#[derive(Default)]
struct InMemoryState {
    /// Insertion-ordered; retrieval relies on stable ordering for ties.
    nodes: Vec<MemoryNode>,
    profiles: HashMap<String, ConversationProfile>,
}

/// HashMap-backed repository. Mutations take the write lock for their
/// full duration, so `clear_user` is atomic and immediately visible.
#[derive(Default)]
pub struct InMemoryRepository {
    state: RwLock<InMemoryState>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MemoryRepository for InMemoryRepository {
    async fn insert_node(&self, node: &MemoryNode) -> Result<()> {
        self.state.write().await.nodes.push(node.clone());
        Ok(())
    }

    async fn nodes_for_user(&self, user_id: &str) -> Result<Vec<MemoryNode>> {
        let state = self.state.read().await;
        Ok(state
            .nodes
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn record_access(&self, ids: &[Uuid], at: DateTime<Utc>) -> Result<()> {
        let mut state = self.state.write().await;
        for node in state.nodes.iter_mut() {
            if ids.contains(&node.id) {
                node.access_count += 1;
                node.last_accessed = at;
            }
        }
        Ok(())
    }

    async fn load_profile(&self, user_id: &str) -> Result<Option<ConversationProfile>> {
        Ok(self.state.read().await.profiles.get(user_id).cloned())
    }

    async fn save_profile(&self, profile: &ConversationProfile) -> Result<()> {
        self.state
            .write()
            .await
            .profiles
            .insert(profile.user_id.clone(), profile.clone());
        Ok(())
    }

    async fn clear_user(&self, user_id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state.nodes.retain(|n| n.user_id != user_id);
        state.profiles.remove(user_id);
        Ok(())
    }
}
