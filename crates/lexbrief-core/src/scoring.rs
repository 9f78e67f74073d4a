//! Derived scores over citations and findings.
//!
//! # Authority
//!
//! A citation's authority comes from its court name, matched case-insensitively
//! against [`COURT_AUTHORITY`] in table order. The first matching key wins, so
//! "Federal Court of Appeals" scores as a court of appeals (0.9), not as a
//! federal court (0.8).

use crate::model::{Citation, Finding};

/// Court-name fragments and their authority, most authoritative first.
pub const COURT_AUTHORITY: &[(&str, f64)] = &[
    ("Supreme Court", 1.0),
    ("Court of Appeals", 0.9),
    ("Federal", 0.8),
    ("District", 0.7),
];

/// Authority for a court that matches no entry in [`COURT_AUTHORITY`].
pub const DEFAULT_AUTHORITY: f64 = 0.6;

/// Authority assigned to semantic matches, which carry no court signal.
pub const SEMANTIC_AUTHORITY: f64 = 0.8;

/// Maximum number of citations carried into a brief.
pub const MAX_SUPPORTING_CASES: usize = 10;

/// Look up the authority of a court by name.
pub fn authority_score(court: &str) -> f64 {
    let court = court.to_lowercase();
    COURT_AUTHORITY
        .iter()
        .find(|(key, _)| court.contains(&key.to_lowercase()))
        .map(|&(_, score)| score)
        .unwrap_or(DEFAULT_AUTHORITY)
}

/// Relevance-weighted mean authority: `Σ(aᵢ·rᵢ) / Σ(rᵢ)`.
///
/// Zero when there are no findings or the total relevance weight is zero.
pub fn precedent_strength(findings: &[Finding]) -> f64 {
    let total_weight: f64 = findings.iter().map(|f| f.relevance_score).sum();
    if findings.is_empty() || total_weight <= 0.0 {
        return 0.0;
    }
    let weighted: f64 = findings
        .iter()
        .map(|f| f.authority_score * f.relevance_score)
        .sum();
    (weighted / total_weight).clamp(0.0, 1.0)
}

/// Mean of average relevance and average authority. Zero for no findings.
pub fn confidence_score(findings: &[Finding]) -> f64 {
    if findings.is_empty() {
        return 0.0;
    }
    let n = findings.len() as f64;
    let avg_relevance = findings.iter().map(|f| f.relevance_score).sum::<f64>() / n;
    let avg_authority = findings.iter().map(|f| f.authority_score).sum::<f64>() / n;
    ((avg_relevance + avg_authority) / 2.0).clamp(0.0, 1.0)
}

/// Collect every citation across `findings`, most relevant first.
///
/// The sort is stable: citations with equal relevance keep discovery order.
/// Truncated to [`MAX_SUPPORTING_CASES`].
pub fn supporting_cases(findings: &[Finding]) -> Vec<Citation> {
    let mut citations: Vec<Citation> = findings
        .iter()
        .flat_map(|f| f.citations.iter().cloned())
        .collect();
    citations.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
    citations.truncate(MAX_SUPPORTING_CASES);
    citations
}
