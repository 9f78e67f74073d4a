use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::StoreError;

/// A passage to index, with free-form metadata carried through to hits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    #[serde(default)]
    pub metadata: Value,
}

impl Document {
    /// Pair parallel document and metadata arrays.
    ///
    /// Fails without producing anything when the lengths differ.
    pub fn zip(documents: Vec<String>, metadata: Vec<Value>) -> Result<Vec<Self>, StoreError> {
        if documents.len() != metadata.len() {
            return Err(StoreError::LengthMismatch {
                documents: documents.len(),
                metadata: metadata.len(),
            });
        }
        Ok(documents
            .into_iter()
            .zip(metadata)
            .map(|(content, metadata)| Self { content, metadata })
            .collect())
    }
}

/// A search result: the stored passage and its similarity to the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexHit {
    pub content: String,
    pub score: f32,
    pub metadata: Value,
}

/// Append-only similarity index over text passages.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// The `k` passages most similar to `query`, best first.
    async fn search(&self, query: &str, k: usize) -> Result<Vec<IndexHit>, StoreError>;

    /// Append documents; returns how many were written.
    async fn add_documents(&self, documents: Vec<Document>) -> Result<usize, StoreError>;

    /// Number of indexed passages.
    async fn len(&self) -> Result<usize, StoreError>;
}
