//! In-memory flat index with an optional JSON snapshot on disk.
//!
//! Search is an exhaustive inner product against every stored embedding, which
//! is adequate for the few thousand passages a local research corpus holds.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use lexbrief_core::embedding::{TextEmbedder, dot};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::info;

use crate::{Document, IndexHit, StoreError, VectorIndex};

#[derive(Clone, Serialize, Deserialize)]
struct Entry {
    content: String,
    metadata: Value,
    embedding: Vec<f32>,
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    dim: usize,
    entries: Vec<Entry>,
}

pub struct MemoryIndex {
    embedder: Arc<dyn TextEmbedder>,
    entries: RwLock<Vec<Entry>>,
    path: Option<PathBuf>,
}

impl MemoryIndex {
    /// An index that lives only as long as the process.
    pub fn in_memory(embedder: Arc<dyn TextEmbedder>) -> Self {
        Self {
            embedder,
            entries: RwLock::new(Vec::new()),
            path: None,
        }
    }

    /// Open a file-backed index, loading the snapshot at `path` if present.
    pub async fn open(path: &Path, embedder: Arc<dyn TextEmbedder>) -> Result<Self, StoreError> {
        let entries = if tokio::fs::try_exists(path).await? {
            let bytes = tokio::fs::read(path).await?;
            let snapshot: Snapshot = serde_json::from_slice(&bytes)?;
            if snapshot.dim != embedder.dim() {
                return Err(StoreError::DimensionMismatch {
                    expected: embedder.dim(),
                    found: snapshot.dim,
                });
            }
            info!(path = %path.display(), count = snapshot.entries.len(), "loaded vector index");
            snapshot.entries
        } else {
            Vec::new()
        };
        Ok(Self {
            embedder,
            entries: RwLock::new(entries),
            path: Some(path.to_path_buf()),
        })
    }

    async fn persist(&self, entries: &[Entry]) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let snapshot = Snapshot {
            dim: self.embedder.dim(),
            entries: entries.to_vec(),
        };
        let bytes = serde_json::to_vec(&snapshot)?;
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<IndexHit>, StoreError> {
        let query_vec = self.embedder.embed(query)?;
        let entries = self.entries.read().await;
        let mut hits: Vec<IndexHit> = entries
            .iter()
            .map(|e| IndexHit {
                content: e.content.clone(),
                score: dot(&query_vec, &e.embedding),
                metadata: e.metadata.clone(),
            })
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(k);
        Ok(hits)
    }

    async fn add_documents(&self, documents: Vec<Document>) -> Result<usize, StoreError> {
        if documents.is_empty() {
            return Ok(0);
        }
        let texts: Vec<&str> = documents.iter().map(|d| d.content.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts)?;

        let count = documents.len();
        let mut entries = self.entries.write().await;
        entries.extend(
            documents
                .into_iter()
                .zip(embeddings)
                .map(|(doc, embedding)| Entry {
                    content: doc.content,
                    metadata: doc.metadata,
                    embedding,
                }),
        );
        self.persist(&entries).await?;
        info!(added = count, total = entries.len(), "indexed documents");
        Ok(count)
    }

    async fn len(&self) -> Result<usize, StoreError> {
        Ok(self.entries.read().await.len())
    }
}
