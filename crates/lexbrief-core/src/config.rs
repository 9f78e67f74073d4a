//! Runtime settings shared across crates.
//!
//! Defaults match a hosted OpenAI-compatible endpoint and the public
//! CourtListener and Harvard Caselaw APIs. The CLI overrides individual fields
//! from flags and environment variables.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of an OpenAI-compatible API (no trailing `/chat/completions`).
    pub generation_url: String,
    pub generation_api_key: String,
    pub model: String,
    pub temperature: f32,
    /// Per-request timeout for generation calls, in seconds.
    pub generation_timeout_secs: u64,
    pub courtlistener_url: String,
    pub courtlistener_api_key: String,
    pub caselaw_url: String,
    /// Per-request timeout for case-law sources, in seconds.
    pub source_timeout_secs: u64,
    pub index_path: PathBuf,
    pub retry: RetrySettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            generation_url: "https://api.openai.com/v1".into(),
            generation_api_key: String::new(),
            model: "gpt-4".into(),
            temperature: 0.1,
            generation_timeout_secs: 120,
            courtlistener_url: "https://www.courtlistener.com/api/rest/v3".into(),
            courtlistener_api_key: String::new(),
            caselaw_url: "https://api.case.law/v1".into(),
            source_timeout_secs: 30,
            index_path: PathBuf::from("lexbrief_index.json"),
            retry: RetrySettings::default(),
        }
    }
}

impl Settings {
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source_timeout_secs)
    }
}

/// Attempt budget, backoff, and self-evaluation behaviour for each stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub multiplier: f64,
    pub min_wait_secs: f64,
    pub max_wait_secs: f64,
    /// Run the self-evaluation gate after each successful attempt.
    pub self_evaluation: bool,
    /// Accept results when the evaluator itself errors.
    pub fail_open: bool,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            multiplier: 1.0,
            min_wait_secs: 4.0,
            max_wait_secs: 10.0,
            self_evaluation: true,
            fail_open: true,
        }
    }
}
