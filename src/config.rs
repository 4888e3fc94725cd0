use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::TriageError;
use crate::kernel::extract::ReadingLimits;
use crate::kernel::vocabulary::Vocabulary;

/// Session engine settings. One value can back any number of sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    /// How many recent turns the extractor scans on each step.
    pub window_turns: usize,
    pub limits: ReadingLimits,
    pub summary_top_n: usize,
    pub slot_minutes_base: u32,
    pub slot_minutes_extended: u32,
    /// Durations above this many days get the extended slot.
    pub extended_after_days: u32,
    pub vocabulary: Arc<Vocabulary>,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            window_turns: 6,
            limits: ReadingLimits::default(),
            summary_top_n: 3,
            slot_minutes_base: 10,
            slot_minutes_extended: 15,
            extended_after_days: 7,
            vocabulary: Arc::new(Vocabulary::default()),
        }
    }
}

impl TriageConfig {
    /// Missing keys fall back to defaults. Vocabulary forms are re-normalized on load.
    pub fn from_json(json: &str) -> Result<Self, TriageError> {
        let mut config: TriageConfig = serde_json::from_str(json)?;
        config.vocabulary = Arc::new(config.vocabulary.as_ref().clone().normalized());
        if config.window_turns == 0 {
            config.window_turns = 1;
        }
        Ok(config)
    }
}

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Connection settings for the external phrasing service.
#[derive(Clone)]
pub struct PhrasingConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_ms: u64,
    pub api_key: Option<String>,
}

impl Default for PhrasingConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.3,
            timeout_ms: 5000,
            api_key: None,
        }
    }
}

// The key never reaches logs.
impl fmt::Debug for PhrasingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhrasingConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("timeout_ms", &self.timeout_ms)
            .field("has_key", &self.has_api_key())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfTest {
    pub has_key: bool,
    pub model: String,
    pub base_url: String,
}

impl PhrasingConfig {
    /// Reads `OPENAI_API_KEY`, `TRIAGE_LLM_URL`, `TRIAGE_LLM_MODEL`, `TRIAGE_LLM_TIMEOUT_MS`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.trim().is_empty() {
                config.api_key = Some(key.trim().to_string());
            }
        }
        if let Ok(url) = std::env::var("TRIAGE_LLM_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(model) = std::env::var("TRIAGE_LLM_MODEL") {
            config.model = model;
        }
        if let Some(ms) = std::env::var("TRIAGE_LLM_TIMEOUT_MS").ok().and_then(|v| v.parse().ok()) {
            config.timeout_ms = ms;
        }
        config
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| k.starts_with("sk-"))
    }

    pub fn self_test(&self) -> SelfTest {
        SelfTest {
            has_key: self.has_api_key(),
            model: self.model.clone(),
            base_url: self.base_url.clone(),
        }
    }
}
