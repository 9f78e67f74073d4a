mod common;

use chrono::NaiveDate;
use common::{ScriptedGenerator, cooperative_reply};
use lexbrief_ai::GenerationError;
use lexbrief_core::{Citation, Finding, Stage, StageAnalysis, Summary};
use lexbrief_pipeline::{Agent, Analyzer, Composer, CompositionInput, Summarizer, SummaryInput};

const QUERY: &str = "What is the standard for summary judgment in federal court?";

fn finding(case_name: &str, jurisdiction: &str) -> Finding {
    Finding {
        content: format!("Case: {case_name}"),
        source_label: "Legal Database".into(),
        citations: vec![Citation {
            case_name: case_name.into(),
            citation_text: String::new(),
            court: "Court of Appeals".into(),
            date: NaiveDate::from_ymd_opt(2004, 9, 14).unwrap(),
            jurisdiction: jurisdiction.into(),
            relevance_score: 0.8,
            url: None,
        }],
        relevance_score: 0.8,
        authority_score: 0.9,
    }
}

fn findings() -> Vec<Finding> {
    vec![
        finding("Anderson v. Liberty Lobby", "California"),
        finding("Matsushita v. Zenith", "New York"),
    ]
}

/// Cooperative replies, except an outage on any prompt containing `needle`.
fn failing_on(needle: &'static str) -> std::sync::Arc<ScriptedGenerator> {
    ScriptedGenerator::new(move |prompt| {
        if prompt.contains(needle) {
            Err(GenerationError::Other("upstream timeout".into()))
        } else {
            Ok(cooperative_reply(prompt).to_string())
        }
    })
}

fn composition_input() -> CompositionInput {
    CompositionInput {
        query: QUERY.into(),
        findings: findings(),
        analysis: StageAnalysis::default(),
        summary: Summary {
            executive_summary: "Summary judgment turns on genuine disputes.".into(),
            key_findings: vec!["Movant bears the initial burden".into()],
            conclusions: vec!["Summary judgment is available".into()],
        },
    }
}

#[tokio::test]
async fn analyzer_covers_every_jurisdiction() {
    let generator = ScriptedGenerator::cooperative();
    let result = Analyzer::new(generator.clone()).execute(&findings()).await;

    assert!(result.success);
    let analysis = result.payload.unwrap();
    assert_eq!(analysis.key_patterns.len(), 3);
    let jurisdictions: Vec<&str> = analysis
        .jurisdictional_analysis
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(jurisdictions, ["California", "New York"]);
    assert_eq!(generator.calls_containing("legal position in"), 2);
}

#[tokio::test]
async fn analyzer_fails_when_one_jurisdiction_prompt_fails() {
    let generator = failing_on("legal position in New York");
    let result = Analyzer::new(generator.clone()).execute(&findings()).await;

    assert_eq!(result.stage, Stage::Analyze);
    assert!(!result.success);
    assert!(result.payload.is_none());
    assert_eq!(generator.calls_containing("legal position in New York"), 1);
}

#[tokio::test]
async fn analyzer_fails_when_pattern_prompt_fails() {
    let result = Analyzer::new(failing_on("key patterns")).execute(&findings()).await;
    assert!(!result.success);
    assert!(result.payload.is_none());
}

#[tokio::test]
async fn summarizer_fails_when_any_section_fails() {
    let input = SummaryInput {
        query: QUERY.into(),
        findings: findings(),
        analysis: StageAnalysis::default(),
    };
    for needle in [
        "executive summary",
        "most important findings",
        "practical conclusions",
    ] {
        let result = Summarizer::new(failing_on(needle)).execute(&input).await;
        assert_eq!(result.stage, Stage::Summarize);
        assert!(!result.success, "{needle}");
        assert!(result.payload.is_none(), "{needle}");
    }
}

#[tokio::test]
async fn composer_fails_when_legal_analysis_fails() {
    let generator = failing_on("Write the legal analysis section");
    let result = Composer::new(generator.clone())
        .execute(&composition_input())
        .await;

    assert_eq!(result.stage, Stage::Compose);
    assert!(!result.success);
    assert!(result.payload.is_none());
    // No formatting request after the analysis is lost.
    assert_eq!(generator.calls_containing("Format the following"), 0);
}

#[tokio::test]
async fn composer_fails_when_formatting_fails() {
    let generator = failing_on("Format the following");
    let result = Composer::new(generator.clone())
        .execute(&composition_input())
        .await;

    assert!(!result.success);
    assert!(result.payload.is_none());
    assert_eq!(generator.calls(), 2);
}

#[tokio::test]
async fn composer_grounds_analysis_on_findings() {
    let generator = ScriptedGenerator::cooperative();
    let composed = Composer::new(generator.clone())
        .execute(&composition_input())
        .await
        .into_payload()
        .unwrap();

    assert_eq!(composed.brief.supporting_cases.len(), 2);
    let prompts = generator.prompts();
    let analysis_prompt = prompts
        .iter()
        .find(|p| p.contains("Write the legal analysis section"))
        .unwrap();
    assert!(analysis_prompt.contains("Case: Anderson v. Liberty Lobby"));
    assert!(analysis_prompt.contains("- Matsushita v. Zenith (Court of Appeals, 2004-09-14)"));
}
