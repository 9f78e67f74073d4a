use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use lexbrief_ai::{GenerationError, TextGeneration};
use lexbrief_core::parse::parse_bullets;
use lexbrief_core::{
    Finding, Stage, StageAnalysis, StageResult, confidence_score, precedent_strength,
};
use tracing::{info, warn};

use crate::Agent;

pub const MAX_PATTERNS: usize = 5;

// ── Prompt templates ──

fn build_analysis_prompt(content: &str) -> String {
    format!(
        "Analyze these legal findings for common themes and legal principles:\n\
         \n\
         {content}\n\
         \n\
         Cover common legal principles, conflicting viewpoints, emerging trends \
         and jurisdictional differences. Keep the analysis concise but thorough."
    )
}

fn build_pattern_prompt(content: &str) -> String {
    format!(
        "Identify key legal patterns and recurring themes in these findings:\n\
         \n\
         {content}\n\
         \n\
         Return 3-5 key patterns, one per line, each starting with \"- \"."
    )
}

fn build_jurisdiction_prompt(jurisdiction: &str, cases: &[&str]) -> String {
    format!(
        "Analyze the legal position in {jurisdiction} based on these cases:\n\
         {}\n\
         \n\
         Provide a brief summary of the jurisdiction's stance.",
        cases.join("\n")
    )
}

/// Case names grouped by jurisdiction, in jurisdiction order.
fn cases_by_jurisdiction(findings: &[Finding]) -> BTreeMap<&str, Vec<&str>> {
    let mut groups: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for citation in findings.iter().flat_map(|f| &f.citations) {
        groups
            .entry(citation.jurisdiction.as_str())
            .or_default()
            .push(citation.case_name.as_str());
    }
    groups
}

/// Stage 2: narrative analysis, recurring patterns, per-jurisdiction views,
/// and the two derived scores.
pub struct Analyzer {
    generator: Arc<dyn TextGeneration>,
}

impl Analyzer {
    pub fn new(generator: Arc<dyn TextGeneration>) -> Self {
        Self { generator }
    }

    async fn analyze(&self, findings: &[Finding]) -> Result<StageAnalysis, GenerationError> {
        let content = findings
            .iter()
            .map(|f| f.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let analysis = self.generator.generate(&build_analysis_prompt(&content)).await?;

        let mut key_patterns = parse_bullets(
            &self.generator.generate(&build_pattern_prompt(&content)).await?,
        );
        key_patterns.truncate(MAX_PATTERNS);

        let mut jurisdictional_analysis = BTreeMap::new();
        for (jurisdiction, cases) in cases_by_jurisdiction(findings) {
            let view = self
                .generator
                .generate(&build_jurisdiction_prompt(jurisdiction, &cases))
                .await?;
            jurisdictional_analysis.insert(jurisdiction.to_string(), view);
        }

        Ok(StageAnalysis {
            analysis,
            key_patterns,
            jurisdictional_analysis,
            precedent_strength: precedent_strength(findings),
            confidence_score: confidence_score(findings),
        })
    }
}

#[async_trait]
impl Agent for Analyzer {
    type Input = Vec<Finding>;
    type Output = StageAnalysis;

    fn stage(&self) -> Stage {
        Stage::Analyze
    }

    async fn execute(&self, findings: &Vec<Finding>) -> StageResult<StageAnalysis> {
        match self.analyze(findings).await {
            Ok(analysis) => {
                info!(
                    patterns = analysis.key_patterns.len(),
                    jurisdictions = analysis.jurisdictional_analysis.len(),
                    "analysis complete"
                );
                StageResult::succeeded(Stage::Analyze, analysis)
            }
            Err(e) => {
                warn!(error = %e, "analysis failed");
                StageResult::failed(Stage::Analyze)
            }
        }
    }
}
