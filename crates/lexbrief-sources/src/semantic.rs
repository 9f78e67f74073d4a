use std::sync::Arc;

use async_trait::async_trait;
use lexbrief_store::VectorIndex;
use tracing::{debug, warn};

use crate::{Passage, SourceRecord, SourceSearcher};

/// Passages retrieved per query.
pub const SEMANTIC_TOP_K: usize = 10;

/// Similarity search over the local vector index.
///
/// The jurisdiction filter does not apply; passages carry no court metadata.
pub struct SemanticSearcher {
    index: Arc<dyn VectorIndex>,
    k: usize,
}

impl SemanticSearcher {
    pub fn new(index: Arc<dyn VectorIndex>) -> Self {
        Self {
            index,
            k: SEMANTIC_TOP_K,
        }
    }
}

#[async_trait]
impl SourceSearcher for SemanticSearcher {
    fn name(&self) -> &str {
        "semantic"
    }

    async fn search(&self, query: &str, _jurisdiction: Option<&str>) -> Vec<SourceRecord> {
        match self.index.search(query, self.k).await {
            Ok(hits) => {
                debug!(count = hits.len(), "semantic search complete");
                hits.into_iter()
                    .map(|hit| {
                        SourceRecord::Passage(Passage {
                            content: hit.content,
                            similarity: f64::from(hit.score),
                        })
                    })
                    .collect()
            }
            Err(e) => {
                warn!(error = %e, "vector index unavailable");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexbrief_ai::HashingEmbedder;
    use lexbrief_store::{Document, IndexHit, MemoryIndex, StoreError};
    use serde_json::json;

    struct BrokenIndex;

    #[async_trait]
    impl VectorIndex for BrokenIndex {
        async fn search(&self, _query: &str, _k: usize) -> Result<Vec<IndexHit>, StoreError> {
            Err(StoreError::Other("disk on fire".into()))
        }
        async fn add_documents(&self, _documents: Vec<Document>) -> Result<usize, StoreError> {
            Ok(0)
        }
        async fn len(&self) -> Result<usize, StoreError> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn hits_become_passages() {
        let index = MemoryIndex::in_memory(Arc::new(HashingEmbedder::default()));
        let docs = Document::zip(
            vec![
                "summary judgment standard".into(),
                "adverse possession elements".into(),
            ],
            vec![json!({}), json!({})],
        )
        .unwrap();
        index.add_documents(docs).await.unwrap();

        let searcher = SemanticSearcher::new(Arc::new(index));
        let records = searcher.search("summary judgment standard", None).await;
        assert_eq!(records.len(), 2);
        let SourceRecord::Passage(best) = &records[0] else {
            panic!("expected a passage");
        };
        assert_eq!(best.content, "summary judgment standard");
        assert!(best.similarity > 0.99);
    }

    #[tokio::test]
    async fn index_failure_yields_nothing() {
        let searcher = SemanticSearcher::new(Arc::new(BrokenIndex));
        assert!(searcher.search("anything", None).await.is_empty());
    }
}
