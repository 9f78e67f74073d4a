use std::sync::Arc;

use async_trait::async_trait;
use lexbrief_ai::{GenerationError, TextGeneration};
use lexbrief_core::parse::{excerpt, parse_bullets};
use lexbrief_core::{Stage, StageResult, Summary};
use tracing::{info, warn};

use crate::{Agent, SummaryInput};

pub const MAX_KEY_FINDINGS: usize = 7;
pub const MAX_CONCLUSIONS: usize = 5;
const PROMPT_FINDINGS: usize = 5;
const FINDING_EXCERPT_CHARS: usize = 300;

// ── Prompt templates ──

/// Shared context block: the query, the analysis, and a digest of the
/// strongest findings.
fn build_context(input: &SummaryInput) -> String {
    let findings: String = input
        .findings
        .iter()
        .take(PROMPT_FINDINGS)
        .map(|f| format!("- {}\n", excerpt(&f.content, FINDING_EXCERPT_CHARS)))
        .collect();
    format!(
        "Legal query: \"{query}\"\n\
         \n\
         Analysis:\n\
         {analysis}\n\
         \n\
         Key findings:\n\
         {findings}",
        query = input.query,
        analysis = input.analysis.analysis,
    )
}

fn build_executive_prompt(context: &str) -> String {
    format!(
        "{context}\n\
         Write an executive summary of 2-3 paragraphs answering the query for a practising lawyer."
    )
}

fn build_key_findings_prompt(context: &str) -> String {
    format!(
        "{context}\n\
         List the 5-7 most important findings, one per line, each starting with \"- \"."
    )
}

fn build_conclusions_prompt(context: &str) -> String {
    format!(
        "{context}\n\
         State 3-5 practical conclusions, one per line, each starting with \"- \"."
    )
}

/// Stage 3: condense findings and analysis into an executive summary, key
/// findings and conclusions.
pub struct Summarizer {
    generator: Arc<dyn TextGeneration>,
}

impl Summarizer {
    pub fn new(generator: Arc<dyn TextGeneration>) -> Self {
        Self { generator }
    }

    async fn summarize(&self, input: &SummaryInput) -> Result<Summary, GenerationError> {
        let context = build_context(input);

        let executive_summary = self
            .generator
            .generate(&build_executive_prompt(&context))
            .await?
            .trim()
            .to_string();

        let mut key_findings = parse_bullets(
            &self
                .generator
                .generate(&build_key_findings_prompt(&context))
                .await?,
        );
        key_findings.truncate(MAX_KEY_FINDINGS);

        let mut conclusions = parse_bullets(
            &self
                .generator
                .generate(&build_conclusions_prompt(&context))
                .await?,
        );
        conclusions.truncate(MAX_CONCLUSIONS);

        Ok(Summary {
            executive_summary,
            key_findings,
            conclusions,
        })
    }
}

#[async_trait]
impl Agent for Summarizer {
    type Input = SummaryInput;
    type Output = Summary;

    fn stage(&self) -> Stage {
        Stage::Summarize
    }

    async fn execute(&self, input: &SummaryInput) -> StageResult<Summary> {
        match self.summarize(input).await {
            Ok(summary) => {
                info!(
                    key_findings = summary.key_findings.len(),
                    conclusions = summary.conclusions.len(),
                    "summary complete"
                );
                StageResult::succeeded(Stage::Summarize, summary)
            }
            Err(e) => {
                warn!(error = %e, "summary failed");
                StageResult::failed(Stage::Summarize)
            }
        }
    }
}
