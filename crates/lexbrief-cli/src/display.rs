//! Terminal cards for briefs, validation reports, index hits and health.
//!
//! Everything goes to stdout; logs stay on stderr.

use lexbrief_core::{Brief, Citation, HealthStatus, PipelineResponse, ValidationReport};
use lexbrief_store::IndexHit;

const LABEL_WIDTH: usize = 26;
const MAX_HIT_CHARS: usize = 240;

// ── Public API ──

pub fn print_response(response: &PipelineResponse) {
    match (&response.payload, &response.error_message) {
        (Some(composed), _) if response.success => {
            print_brief_card(&composed.brief);
            if !composed.formatted_brief.trim().is_empty() {
                println!("Formatted Brief");
                println!("{}", indent(composed.formatted_brief.trim()));
                println!();
            }
        }
        (_, Some(message)) => println!("Research failed: {message}"),
        _ => println!("Research failed"),
    }
    println!("  {:<LABEL_WIDTH$} {:.1}s", "elapsed", response.elapsed_secs);
}

/// Print a brief as a vertical card grouped into sections.
pub fn print_brief_card(brief: &Brief) {
    println!("=== Research Brief ===");
    println!("{}", brief.query);
    println!();

    print_field_section(
        "Overview",
        &[
            ("generated_at", brief.generated_at.format("%Y-%m-%d %H:%M UTC").to_string()),
            ("supporting_cases", brief.supporting_cases.len().to_string()),
            ("jurisdictions", brief.jurisdiction_analysis.len().to_string()),
        ],
    );
    print_text_section("Executive Summary", &brief.executive_summary);
    print_list_section("Key Findings", &brief.key_findings);
    print_cases_section(&brief.supporting_cases);
    print_text_section("Legal Analysis", &brief.legal_analysis);
    if !brief.jurisdiction_analysis.is_empty() {
        println!("Jurisdictions");
        for (jurisdiction, view) in &brief.jurisdiction_analysis {
            println!("  {jurisdiction}:");
            println!("{}", indent_by(view.trim(), 4));
        }
        println!();
    }
    print_list_section("Conclusions", &brief.conclusions);
}

pub fn print_validation(report: &ValidationReport) {
    println!(
        "  {:<LABEL_WIDTH$} {}",
        "valid",
        if report.valid { "yes" } else { "no" }
    );
    for error in &report.errors {
        println!("  {:<LABEL_WIDTH$} {error}", "error");
    }
    for warning in &report.warnings {
        println!("  {:<LABEL_WIDTH$} {warning}", "warning");
    }
}

pub fn print_hits(hits: &[IndexHit]) {
    if hits.is_empty() {
        println!("No passages found.");
        return;
    }
    for (rank, hit) in hits.iter().enumerate() {
        println!("{:>2}. [{:.3}] {}", rank + 1, hit.score, clip(&hit.content, MAX_HIT_CHARS));
        if !hit.metadata.is_null() && hit.metadata != serde_json::json!({}) {
            println!("      {}", hit.metadata);
        }
    }
}

pub fn print_health(health: &HealthStatus) {
    println!("  {:<LABEL_WIDTH$} {}", "orchestrator", health.orchestrator);
    for (agent, status) in &health.agents {
        println!("  {:<LABEL_WIDTH$} {status}", agent);
    }
    println!(
        "  {:<LABEL_WIDTH$} {}",
        "timestamp",
        health.timestamp.to_rfc3339()
    );
}

// ── Section rendering ──

fn print_field_section(header: &str, fields: &[(&str, String)]) {
    println!("{header}");
    for (name, value) in fields {
        println!("  {:<LABEL_WIDTH$} {value}", name);
    }
    println!();
}

fn print_text_section(header: &str, text: &str) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    println!("{header}");
    println!("{}", indent(text));
    println!();
}

fn print_list_section(header: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("{header} ({})", items.len());
    for item in items {
        println!("  - {item}");
    }
    println!();
}

fn print_cases_section(cases: &[Citation]) {
    if cases.is_empty() {
        return;
    }
    println!("Supporting Cases ({})", cases.len());
    for case in cases {
        println!("  {}", case_line(case));
        if let Some(url) = &case.url {
            println!("      {url}");
        }
    }
    println!();
}

fn case_line(case: &Citation) -> String {
    let cite = if case.citation_text.is_empty() {
        String::new()
    } else {
        format!(", {}", case.citation_text)
    };
    format!(
        "{}{cite} ({}, {}) relevance {:.2}",
        case.case_name,
        case.court,
        case.date.format("%Y"),
        case.relevance_score
    )
}

fn indent(text: &str) -> String {
    indent_by(text, 2)
}

fn indent_by(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    text.lines()
        .map(|line| format!("{pad}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn clip(text: &str, max_chars: usize) -> String {
    let clipped = lexbrief_core::parse::excerpt(text, max_chars);
    if clipped.len() < text.len() {
        format!("{clipped}...")
    } else {
        clipped.to_string()
    }
}
