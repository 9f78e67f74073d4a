use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use lexbrief_ai::TextGeneration;
use lexbrief_core::parse::{excerpt, parse_index_list};
use lexbrief_core::{Finding, Query, Stage, StageResult};
use tracing::{info, warn};

use crate::{Agent, RetrievalMerger};

/// Findings kept after re-ranking.
pub const MAX_RANKED_FINDINGS: usize = 5;
const RANK_EXCERPT_CHARS: usize = 200;

fn build_rank_prompt(query: &str, findings: &[Finding]) -> String {
    let listing: String = findings
        .iter()
        .enumerate()
        .map(|(i, f)| format!("[{i}] {}\n", excerpt(&f.content, RANK_EXCERPT_CHARS)))
        .collect();
    format!(
        "Given the legal query: \"{query}\"\n\
         \n\
         Rank these findings by relevance and legal authority:\n\
         {listing}\n\
         Return only the indices of the top {MAX_RANKED_FINDINGS} most relevant findings.\n\
         Format: [0, 1, 2, 3, 4]"
    )
}

/// Apply a ranking response to `findings`.
///
/// Out-of-range and repeated indices are skipped. Anything that leaves no
/// usable index keeps the first [`MAX_RANKED_FINDINGS`] in merge order.
fn apply_ranking(response: Option<&str>, findings: Vec<Finding>) -> Vec<Finding> {
    let indices = response.and_then(parse_index_list).unwrap_or_default();
    let mut seen = HashSet::new();
    let picked: Vec<usize> = indices
        .into_iter()
        .filter(|&i| i < findings.len() && seen.insert(i))
        .take(MAX_RANKED_FINDINGS)
        .collect();

    if picked.is_empty() {
        warn!(count = findings.len(), "ranking unusable, keeping merge order");
        return findings.into_iter().take(MAX_RANKED_FINDINGS).collect();
    }
    let mut slots: Vec<Option<Finding>> = findings.into_iter().map(Some).collect();
    picked.into_iter().filter_map(|i| slots[i].take()).collect()
}

/// Stage 1: gather candidate findings and keep the strongest few.
pub struct Retriever {
    merger: RetrievalMerger,
    generator: Arc<dyn TextGeneration>,
}

impl Retriever {
    pub fn new(merger: RetrievalMerger, generator: Arc<dyn TextGeneration>) -> Self {
        Self { merger, generator }
    }

    async fn rerank(&self, query: &str, findings: Vec<Finding>) -> Vec<Finding> {
        if findings.is_empty() {
            return findings;
        }
        let prompt = build_rank_prompt(query, &findings);
        match self.generator.generate(&prompt).await {
            Ok(response) => apply_ranking(Some(&response), findings),
            Err(e) => {
                warn!(error = %e, "ranking request failed");
                apply_ranking(None, findings)
            }
        }
    }
}

#[async_trait]
impl Agent for Retriever {
    type Input = Query;
    type Output = Vec<Finding>;

    fn stage(&self) -> Stage {
        Stage::Retrieve
    }

    async fn execute(&self, query: &Query) -> StageResult<Vec<Finding>> {
        let merged = self
            .merger
            .merge(&query.text, query.jurisdiction.as_deref())
            .await;
        let ranked = self.rerank(&query.text, merged).await;
        info!(count = ranked.len(), "retrieval complete");
        StageResult::succeeded(Stage::Retrieve, ranked)
    }
}
