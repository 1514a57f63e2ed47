//! Durable sqlite-backed repository.
//!
//! Nodes live in a flat table; profiles persist as JSON blobs keyed by
//! user id. Timestamps are stored as unix milliseconds. The schema is
//! created on connect, so a fresh database file is usable immediately.

use crate::profile::ConversationProfile;
use crate::repository::MemoryRepository;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eidos_core::{Emotion, MemoryNode, ResourceState};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Row, Sqlite};
use std::path::Path;
use uuid::Uuid;

#[derive(Clone)]
pub struct SqliteRepository {
    pool: Pool<Sqlite>,
}

impl SqliteRepository {
    pub async fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_url = format!("sqlite://{}?mode=rwc", db_path.as_ref().display());
        // Single connection: the engine is single-writer per user anyway,
        // and it keeps `:memory:` databases coherent in tests.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&db_url)
            .await
            .context("Failed to connect to SQLite database")?;

        let repo = Self { pool };
        repo.migrate().await?;
        Ok(repo)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS memory_nodes (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                content TEXT NOT NULL,
                emotion TEXT NOT NULL,
                intensity REAL NOT NULL,
                importance REAL NOT NULL,
                created_at INTEGER NOT NULL,
                last_accessed INTEGER NOT NULL,
                access_count INTEGER NOT NULL DEFAULT 0,
                tags_json TEXT NOT NULL,
                resource_json TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create memory_nodes table")?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_memory_nodes_user ON memory_nodes(user_id)")
            .execute(&self.pool)
            .await
            .context("Failed to create memory_nodes user index")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS profiles (
                user_id TEXT PRIMARY KEY,
                profile_json TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create profiles table")?;

        Ok(())
    }

    fn node_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<MemoryNode> {
        let id_str: String = row.get("id");
        let emotion_str: String = row.get("emotion");
        let tags_json: String = row.get("tags_json");
        let resource_json: String = row.get("resource_json");
        let created_at: i64 = row.get("created_at");
        let last_accessed: i64 = row.get("last_accessed");
        let access_count: i64 = row.get("access_count");
        let intensity: f64 = row.get("intensity");
        let importance: f64 = row.get("importance");

        let tags: Vec<String> =
            serde_json::from_str(&tags_json).context("Failed to parse node tags")?;
        let resource_state: ResourceState =
            serde_json::from_str(&resource_json).context("Failed to parse resource snapshot")?;

        Ok(MemoryNode {
            id: Uuid::parse_str(&id_str).context("Invalid node id")?,
            user_id: row.get("user_id"),
            content: row.get("content"),
            emotion: Emotion::parse(&emotion_str),
            intensity: intensity as f32,
            importance: importance as f32,
            created_at: DateTime::from_timestamp_millis(created_at)
                .context("Invalid created_at timestamp")?,
            last_accessed: DateTime::from_timestamp_millis(last_accessed)
                .context("Invalid last_accessed timestamp")?,
            access_count: access_count as u32,
            tags,
            resource_state,
        })
    }
}

#[async_trait]
impl MemoryRepository for SqliteRepository {
    async fn insert_node(&self, node: &MemoryNode) -> Result<()> {
        let tags_json = serde_json::to_string(&node.tags)?;
        let resource_json = serde_json::to_string(&node.resource_state)?;

        sqlx::query(
            r#"
            INSERT INTO memory_nodes
                (id, user_id, content, emotion, intensity, importance,
                 created_at, last_accessed, access_count, tags_json, resource_json)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(node.id.to_string())
        .bind(&node.user_id)
        .bind(&node.content)
        .bind(node.emotion.as_str())
        .bind(node.intensity as f64)
        .bind(node.importance as f64)
        .bind(node.created_at.timestamp_millis())
        .bind(node.last_accessed.timestamp_millis())
        .bind(node.access_count as i64)
        .bind(tags_json)
        .bind(resource_json)
        .execute(&self.pool)
        .await
        .context("Failed to insert memory node")?;

        Ok(())
    }

    async fn nodes_for_user(&self, user_id: &str) -> Result<Vec<MemoryNode>> {
        let rows = sqlx::query(
            "SELECT * FROM memory_nodes WHERE user_id = ? ORDER BY created_at ASC, rowid ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch memory nodes")?;

        rows.iter().map(Self::node_from_row).collect()
    }

    async fn record_access(&self, ids: &[Uuid], at: DateTime<Utc>) -> Result<()> {
        let mut tx = self.pool.begin().await.context("Failed to begin access tx")?;
        for id in ids {
            sqlx::query(
                "UPDATE memory_nodes SET access_count = access_count + 1, last_accessed = ? WHERE id = ?",
            )
            .bind(at.timestamp_millis())
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .context("Failed to record node access")?;
        }
        tx.commit().await.context("Failed to commit access tx")?;
        Ok(())
    }

    async fn load_profile(&self, user_id: &str) -> Result<Option<ConversationProfile>> {
        let row = sqlx::query("SELECT profile_json FROM profiles WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to load profile")?;

        match row {
            Some(row) => {
                let blob: String = row.get("profile_json");
                let profile =
                    serde_json::from_str(&blob).context("Failed to parse stored profile")?;
                Ok(Some(profile))
            }
            None => Ok(None),
        }
    }

    async fn save_profile(&self, profile: &ConversationProfile) -> Result<()> {
        let blob = serde_json::to_string(profile)?;
        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, profile_json, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                profile_json = excluded.profile_json,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&profile.user_id)
        .bind(blob)
        .bind(Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await
        .context("Failed to save profile")?;
        Ok(())
    }

    async fn clear_user(&self, user_id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await.context("Failed to begin clear tx")?;
        sqlx::query("DELETE FROM memory_nodes WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete memory nodes")?;
        sqlx::query("DELETE FROM profiles WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete profile")?;
        tx.commit().await.context("Failed to commit clear tx")?;
        Ok(())
    }
}
