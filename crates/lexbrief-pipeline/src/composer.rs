use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use lexbrief_ai::{GenerationError, TextGeneration};
use lexbrief_core::parse::excerpt;
use lexbrief_core::{Brief, Citation, ComposedBrief, Stage, StageResult, supporting_cases};
use tracing::{info, warn};

use crate::{Agent, CompositionInput};

const FINDING_EXCERPT_CHARS: usize = 300;

// ── Prompt templates ──

fn build_legal_analysis_prompt(input: &CompositionInput, cases: &[Citation]) -> String {
    let patterns = bullet_list(&input.analysis.key_patterns);
    let findings: String = input
        .findings
        .iter()
        .map(|f| format!("- {}\n", excerpt(&f.content, FINDING_EXCERPT_CHARS)))
        .collect();
    let cases: String = cases.iter().map(|c| citation_line(c) + "\n").collect();
    format!(
        "Legal query: \"{query}\"\n\
         \n\
         Executive summary:\n\
         {summary}\n\
         \n\
         Findings:\n\
         {findings}\n\
         Supporting cases:\n\
         {cases}\n\
         Preliminary analysis:\n\
         {analysis}\n\
         \n\
         Recurring patterns:\n\
         {patterns}\n\
         Precedent strength: {strength:.2}\n\
         \n\
         Write the legal analysis section of a research brief. Apply the \
         governing principles to the query and note where authority is weak or divided.",
        query = input.query,
        summary = input.summary.executive_summary,
        analysis = input.analysis.analysis,
        strength = input.analysis.precedent_strength,
    )
}

fn citation_line(c: &Citation) -> String {
    if c.citation_text.is_empty() {
        format!("- {} ({}, {})", c.case_name, c.court, c.date)
    } else {
        format!("- {}, {} ({}, {})", c.case_name, c.citation_text, c.court, c.date)
    }
}

fn bullet_list(items: &[String]) -> String {
    items.iter().map(|i| format!("- {i}\n")).collect()
}

fn build_format_prompt(brief: &Brief) -> String {
    let cases: String = brief
        .supporting_cases
        .iter()
        .map(|c| citation_line(c) + "\n")
        .collect();
    format!(
        "Format the following research brief as a professional legal memorandum \
         with headings for each section. Do not add facts or authorities.\n\
         \n\
         Question presented: {query}\n\
         \n\
         Executive summary:\n\
         {summary}\n\
         \n\
         Key findings:\n\
         {findings}\n\
         Supporting cases:\n\
         {cases}\n\
         Legal analysis:\n\
         {analysis}\n\
         \n\
         Conclusions:\n\
         {conclusions}",
        query = brief.query,
        summary = brief.executive_summary,
        findings = bullet_list(&brief.key_findings),
        analysis = brief.legal_analysis,
        conclusions = bullet_list(&brief.conclusions),
    )
}

/// Stage 4: assemble the brief and its document rendering.
pub struct Composer {
    generator: Arc<dyn TextGeneration>,
}

impl Composer {
    pub fn new(generator: Arc<dyn TextGeneration>) -> Self {
        Self { generator }
    }

    async fn compose(&self, input: &CompositionInput) -> Result<ComposedBrief, GenerationError> {
        let supporting_cases = supporting_cases(&input.findings);
        let legal_analysis = self
            .generator
            .generate(&build_legal_analysis_prompt(input, &supporting_cases))
            .await?
            .trim()
            .to_string();

        let brief = Brief {
            query: input.query.clone(),
            executive_summary: input.summary.executive_summary.clone(),
            key_findings: input.summary.key_findings.clone(),
            supporting_cases,
            legal_analysis,
            conclusions: input.summary.conclusions.clone(),
            jurisdiction_analysis: input.analysis.jurisdictional_analysis.clone(),
            generated_at: Utc::now(),
        };

        let formatted_brief = self.generator.generate(&build_format_prompt(&brief)).await?;
        Ok(ComposedBrief {
            brief,
            formatted_brief,
        })
    }
}

#[async_trait]
impl Agent for Composer {
    type Input = CompositionInput;
    type Output = ComposedBrief;

    fn stage(&self) -> Stage {
        Stage::Compose
    }

    async fn execute(&self, input: &CompositionInput) -> StageResult<ComposedBrief> {
        match self.compose(input).await {
            Ok(composed) => {
                info!(
                    supporting_cases = composed.brief.supporting_cases.len(),
                    "brief composed"
                );
                StageResult::succeeded(Stage::Compose, composed)
            }
            Err(e) => {
                warn!(error = %e, "composition failed");
                StageResult::failed(Stage::Compose)
            }
        }
    }
}
