//! Data shapes flowing through retrieval, analysis, and composition.
//!
//! Citations and findings are immutable value objects once built; each stage
//! produces a fresh artifact rather than mutating its input.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A free-text research question with optional scoping hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    #[serde(alias = "query")]
    pub text: String,
    #[serde(default)]
    pub jurisdiction: Option<String>,
    #[serde(default)]
    pub case_types: Option<Vec<String>>,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            jurisdiction: None,
            case_types: None,
        }
    }

    pub fn with_jurisdiction(mut self, jurisdiction: impl Into<String>) -> Self {
        self.jurisdiction = Some(jurisdiction.into());
        self
    }

    pub fn with_case_types(mut self, case_types: Vec<String>) -> Self {
        self.case_types = Some(case_types);
        self
    }
}

/// A reported case as returned by a case-law source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub case_name: String,
    pub citation_text: String,
    pub court: String,
    pub date: NaiveDate,
    pub jurisdiction: String,
    /// Source-provided relevance, clamped to [0, 1].
    pub relevance_score: f64,
    pub url: Option<String>,
}

/// A unit of retrieved evidence.
///
/// `authority_score` is derived from the court of the attached citation (or a
/// fixed value for semantic matches), never taken from the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub content: String,
    pub source_label: String,
    pub citations: Vec<Citation>,
    pub relevance_score: f64,
    pub authority_score: f64,
}

/// Output of the analysis stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageAnalysis {
    pub analysis: String,
    pub key_patterns: Vec<String>,
    /// Jurisdiction name → narrative summary of that jurisdiction's cases.
    pub jurisdictional_analysis: BTreeMap<String, String>,
    pub precedent_strength: f64,
    pub confidence_score: f64,
}

/// Output of the summarization stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub executive_summary: String,
    pub key_findings: Vec<String>,
    pub conclusions: Vec<String>,
}

/// The terminal research artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brief {
    pub query: String,
    pub executive_summary: String,
    pub key_findings: Vec<String>,
    /// Top 10 citations by relevance, descending, ties in discovery order.
    pub supporting_cases: Vec<Citation>,
    pub legal_analysis: String,
    pub conclusions: Vec<String>,
    pub jurisdiction_analysis: BTreeMap<String, String>,
    pub generated_at: DateTime<Utc>,
}

/// A brief together with its document-style rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposedBrief {
    pub brief: Brief,
    pub formatted_brief: String,
}

/// The four pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Retrieve,
    Analyze,
    Summarize,
    Compose,
}

impl Stage {
    /// Name of the agent that runs this stage.
    pub fn agent_name(&self) -> &'static str {
        match self {
            Self::Retrieve => "Retriever",
            Self::Analyze => "Analyzer",
            Self::Summarize => "Summarizer",
            Self::Compose => "Composer",
        }
    }

    /// User-facing message when this stage exhausts its attempts.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Self::Retrieve => "Failed to retrieve legal information",
            Self::Analyze => "Failed to analyze legal findings",
            Self::Summarize => "Failed to summarize findings",
            Self::Compose => "Failed to compose legal brief",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.agent_name())
    }
}

/// Uniform envelope returned by every stage execution.
///
/// A successful result always carries a payload; a failed one never does.
#[derive(Debug, Clone)]
pub struct StageResult<T> {
    pub stage: Stage,
    pub success: bool,
    pub payload: Option<T>,
    pub elapsed: Duration,
    pub retry_count: u32,
}

impl<T> StageResult<T> {
    pub fn succeeded(stage: Stage, payload: T) -> Self {
        Self {
            stage,
            success: true,
            payload: Some(payload),
            elapsed: Duration::ZERO,
            retry_count: 0,
        }
    }

    pub fn failed(stage: Stage) -> Self {
        Self {
            stage,
            success: false,
            payload: None,
            elapsed: Duration::ZERO,
            retry_count: 0,
        }
    }

    /// The payload, if the stage succeeded.
    pub fn into_payload(self) -> Option<T> {
        if self.success { self.payload } else { None }
    }
}

/// Top-level result surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResponse {
    pub success: bool,
    pub payload: Option<ComposedBrief>,
    pub error_message: Option<String>,
    pub elapsed_secs: f64,
}

impl PipelineResponse {
    pub fn completed(payload: ComposedBrief, elapsed: Duration) -> Self {
        Self {
            success: true,
            payload: Some(payload),
            error_message: None,
            elapsed_secs: elapsed.as_secs_f64(),
        }
    }

    pub fn failed(message: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            success: false,
            payload: None,
            error_message: Some(message.into()),
            elapsed_secs: elapsed.as_secs_f64(),
        }
    }
}

/// Liveness report for the orchestrator and its agents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub orchestrator: String,
    pub agents: BTreeMap<String, String>,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn citation(name: &str, score: f64) -> Citation {
        Citation {
            case_name: name.into(),
            citation_text: "477 U.S. 317".into(),
            court: "Supreme Court".into(),
            date: NaiveDate::from_ymd_opt(1986, 6, 25).unwrap(),
            jurisdiction: "US".into(),
            relevance_score: score,
            url: None,
        }
    }

    #[test]
    fn query_accepts_legacy_field_name() {
        let q: Query = serde_json::from_str(r#"{"query": "summary judgment standard"}"#).unwrap();
        assert_eq!(q.text, "summary judgment standard");
        assert!(q.jurisdiction.is_none());
        assert!(q.case_types.is_none());
    }

    #[test]
    fn brief_json_roundtrip_preserves_case_order() {
        let brief = Brief {
            query: "What is the standard for summary judgment?".into(),
            executive_summary: "Movant must show no genuine dispute.".into(),
            key_findings: vec!["Burden shifts".into(), "Materiality".into()],
            supporting_cases: vec![
                citation("Celotex Corp. v. Catrett", 0.9),
                citation("Anderson v. Liberty Lobby", 0.9),
                citation("Matsushita v. Zenith", 0.4),
            ],
            legal_analysis: "Rule 56 governs.".into(),
            conclusions: vec!["Motion likely to succeed".into()],
            jurisdiction_analysis: BTreeMap::from([("US".into(), "Uniform standard".into())]),
            generated_at: Utc::now(),
        };

        let json = serde_json::to_string(&brief).unwrap();
        let parsed: Brief = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, brief);
        let names: Vec<&str> = parsed
            .supporting_cases
            .iter()
            .map(|c| c.case_name.as_str())
            .collect();
        assert_eq!(
            names,
            ["Celotex Corp. v. Catrett", "Anderson v. Liberty Lobby", "Matsushita v. Zenith"]
        );
    }

    #[test]
    fn failed_stage_has_no_payload() {
        let mut result: StageResult<u32> = StageResult::failed(Stage::Analyze);
        result.payload = Some(7);
        assert_eq!(result.into_payload(), None);

        let ok = StageResult::succeeded(Stage::Analyze, 7);
        assert_eq!(ok.into_payload(), Some(7));
    }

    #[test]
    fn stage_messages_name_the_stage() {
        assert_eq!(Stage::Analyze.failure_message(), "Failed to analyze legal findings");
        assert_eq!(Stage::Compose.to_string(), "Composer");
        assert_eq!(serde_json::to_string(&Stage::Retrieve).unwrap(), "\"retrieve\"");
    }

    #[test]
    fn failed_response_carries_message() {
        let resp = PipelineResponse::failed("boom", Duration::from_millis(1500));
        assert!(!resp.success);
        assert!(resp.payload.is_none());
        assert_eq!(resp.error_message.as_deref(), Some("boom"));
        assert!((resp.elapsed_secs - 1.5).abs() < 1e-9);
    }
}
