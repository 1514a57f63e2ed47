use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EidosConfig {
    pub memory: MemoryConfig,
    pub limits: ProfileLimits,
    pub interview: InterviewConfig,
}

impl EidosConfig {
    /// Load config from a TOML file, falling back to defaults for missing
    /// fields. Env var overrides are applied after loading.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config: EidosConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Try to load from path; if the file is missing or invalid, return
    /// defaults with env overrides.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!("Config file not found or invalid ({}), using defaults", e);
                let mut cfg = Self::default();
                cfg.apply_env_overrides();
                cfg
            }
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("EIDOS_DB_PATH") {
            self.memory.db_path = v;
        }
        if let Ok(v) = std::env::var("EIDOS_ANALYSIS_DELAY_MS") {
            if let Ok(n) = v.parse() {
                self.interview.analysis_delay_ms = n;
            }
        }
    }
}

// ============================================================================
// Sub-configs
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Path to the sqlite database backing the durable store.
    pub db_path: String,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            db_path: "eidos.db".to_string(),
        }
    }
}

/// Caps for every bounded profile list. These are product constants kept
/// as configuration; changing them changes eviction behavior, nothing else.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ProfileLimits {
    pub goals: usize,
    pub challenges: usize,
    pub preferences: usize,
    pub relationships: usize,
    pub future_events: usize,
    pub topics: usize,
    pub triggers: usize,
    pub history: usize,
}

impl Default for ProfileLimits {
    fn default() -> Self {
        Self {
            goals: 20,
            challenges: 20,
            preferences: 30,
            relationships: 15,
            future_events: 25,
            topics: 50,
            triggers: 10,
            history: 100,
        }
    }
}

/// Guided-interview pacing. The accuracy numbers are hand-tuned product
/// heuristics preserved for compatibility.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct InterviewConfig {
    pub accuracy_start: u8,
    pub accuracy_step: u8,
    pub accuracy_cap: u8,
    /// Timeline answers required before the analysis stage begins.
    pub min_timeline_answers: usize,
    /// Simulated analysis delay. A UX affordance only; zero is valid.
    pub analysis_delay_ms: u64,
}

impl Default for InterviewConfig {
    fn default() -> Self {
        Self {
            accuracy_start: 20,
            accuracy_step: 15,
            accuracy_cap: 95,
            min_timeline_answers: 3,
            analysis_delay_ms: 0,
        }
    }
}
