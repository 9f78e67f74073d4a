//! Concurrent fan-out over every registered source, merged into a bounded
//! list of scored findings.
//!
//! Output order is fixed by registration order, never by completion order:
//! all case findings come first (sources in registration order, each in its
//! own relevance order), then semantic findings.

use std::sync::Arc;

use futures::future::join_all;
use lexbrief_core::scoring::SEMANTIC_AUTHORITY;
use lexbrief_core::{Citation, Finding, authority_score};
use lexbrief_sources::{Passage, SourceRecord, SourceSearcher};
use tracing::info;

/// Case findings kept after the merge.
pub const MAX_CASE_FINDINGS: usize = 5;
/// Semantic findings kept after the similarity cut.
pub const MAX_SEMANTIC_FINDINGS: usize = 5;
/// Passages must score strictly above this to become findings.
pub const SIMILARITY_THRESHOLD: f64 = 0.7;

pub const CASE_SOURCE_LABEL: &str = "Legal Database";
pub const SEMANTIC_SOURCE_LABEL: &str = "Vector Store";

pub struct RetrievalMerger {
    searchers: Vec<Arc<dyn SourceSearcher>>,
}

impl RetrievalMerger {
    pub fn new(searchers: Vec<Arc<dyn SourceSearcher>>) -> Self {
        Self { searchers }
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.searchers.iter().map(|s| s.name()).collect()
    }

    /// Query every source at once and wait for all of them.
    ///
    /// Sources that fail contribute nothing. No results anywhere is an empty
    /// list, not an error.
    pub async fn merge(&self, query: &str, jurisdiction: Option<&str>) -> Vec<Finding> {
        let per_source = join_all(
            self.searchers
                .iter()
                .map(|searcher| searcher.search(query, jurisdiction)),
        )
        .await;

        let mut cases = Vec::new();
        let mut passages = Vec::new();
        for record in per_source.into_iter().flatten() {
            match record {
                SourceRecord::Case(citation) => cases.push(citation),
                SourceRecord::Passage(passage) => passages.push(passage),
            }
        }

        let mut findings: Vec<Finding> = cases
            .into_iter()
            .take(MAX_CASE_FINDINGS)
            .map(case_finding)
            .collect();
        let case_count = findings.len();
        findings.extend(
            passages
                .into_iter()
                .filter(|p| p.similarity > SIMILARITY_THRESHOLD)
                .take(MAX_SEMANTIC_FINDINGS)
                .map(semantic_finding),
        );

        info!(
            sources = self.searchers.len(),
            cases = case_count,
            passages = findings.len() - case_count,
            "retrieval merged"
        );
        findings
    }
}

fn case_finding(citation: Citation) -> Finding {
    Finding {
        content: format!("Case: {}", citation.case_name),
        source_label: CASE_SOURCE_LABEL.to_string(),
        relevance_score: citation.relevance_score,
        authority_score: authority_score(&citation.court),
        citations: vec![citation],
    }
}

fn semantic_finding(passage: Passage) -> Finding {
    Finding {
        content: passage.content,
        source_label: SEMANTIC_SOURCE_LABEL.to_string(),
        citations: Vec::new(),
        relevance_score: passage.similarity.clamp(0.0, 1.0),
        authority_score: SEMANTIC_AUTHORITY,
    }
}
