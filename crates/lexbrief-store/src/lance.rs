//! LanceDB-backed vector index.
//!
//! One table, `research_passages`, with columns `content`, `metadata` (JSON text)
//! and a fixed-size `embedding` list. Appends go to the existing table; the
//! table is created on first write.

use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    Array, FixedSizeListBuilder, Float32Array, Float32Builder, RecordBatchIterator, StringArray,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use futures::TryStreamExt;
use lancedb::DistanceType;
use lancedb::query::{ExecutableQuery, QueryBase};
use lexbrief_core::embedding::TextEmbedder;
use tracing::info;

use crate::{Document, IndexHit, StoreError, VectorIndex};

const PASSAGES_TABLE: &str = "research_passages";

pub struct LanceIndex {
    db: lancedb::Connection,
    embedder: Arc<dyn TextEmbedder>,
}

impl LanceIndex {
    /// Connect to a LanceDB database directory, creating it if needed.
    pub async fn open(path: &Path, embedder: Arc<dyn TextEmbedder>) -> Result<Self, StoreError> {
        let uri = path
            .to_str()
            .ok_or_else(|| StoreError::Other("non-UTF8 database path".into()))?;
        let db = lancedb::connect(uri).execute().await?;
        Ok(Self { db, embedder })
    }

    async fn has_table(&self) -> Result<bool, StoreError> {
        let names = self.db.table_names().execute().await?;
        Ok(names.iter().any(|n| n == PASSAGES_TABLE))
    }

    fn schema(&self) -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("content", DataType::Utf8, false),
            Field::new("metadata", DataType::Utf8, false),
            Field::new(
                "embedding",
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, true)),
                    self.embedder.dim() as i32,
                ),
                true,
            ),
        ]))
    }

    fn to_batch(&self, documents: &[Document], embeddings: &[Vec<f32>]) -> Result<RecordBatch, StoreError> {
        let contents = StringArray::from_iter_values(documents.iter().map(|d| d.content.as_str()));
        let metadata = documents
            .iter()
            .map(|d| serde_json::to_string(&d.metadata))
            .collect::<Result<Vec<_>, _>>()?;
        let metadata = StringArray::from(metadata);

        let mut vectors = FixedSizeListBuilder::new(Float32Builder::new(), self.embedder.dim() as i32);
        for embedding in embeddings {
            vectors.values().append_slice(embedding);
            vectors.append(true);
        }

        let batch = RecordBatch::try_new(
            self.schema(),
            vec![Arc::new(contents), Arc::new(metadata), Arc::new(vectors.finish())],
        )?;
        Ok(batch)
    }
}

#[async_trait]
impl VectorIndex for LanceIndex {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<IndexHit>, StoreError> {
        if !self.has_table().await? {
            return Ok(Vec::new());
        }
        let query_vec = self.embedder.embed(query)?;
        let table = self.db.open_table(PASSAGES_TABLE).execute().await?;
        let batches: Vec<RecordBatch> = table
            .vector_search(query_vec.as_slice())?
            .distance_type(DistanceType::Cosine)
            .limit(k)
            .execute()
            .await?
            .try_collect()
            .await?;

        let mut hits = Vec::new();
        for batch in &batches {
            let contents = string_column(batch, "content")?;
            let metadata = string_column(batch, "metadata")?;
            let distances = batch
                .column_by_name("_distance")
                .and_then(|c| c.as_any().downcast_ref::<Float32Array>())
                .ok_or_else(|| StoreError::Other("missing _distance column".into()))?;
            for i in 0..batch.num_rows() {
                hits.push(IndexHit {
                    content: contents.value(i).to_string(),
                    score: 1.0 - distances.value(i),
                    metadata: serde_json::from_str(metadata.value(i))?,
                });
            }
        }
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(hits)
    }

    async fn add_documents(&self, documents: Vec<Document>) -> Result<usize, StoreError> {
        if documents.is_empty() {
            return Ok(0);
        }
        let texts: Vec<&str> = documents.iter().map(|d| d.content.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts)?;
        let batch = self.to_batch(&documents, &embeddings)?;
        let reader = RecordBatchIterator::new(vec![Ok(batch)], self.schema());

        if self.has_table().await? {
            let table = self.db.open_table(PASSAGES_TABLE).execute().await?;
            table.add(Box::new(reader)).execute().await?;
        } else {
            self.db
                .create_table(PASSAGES_TABLE, Box::new(reader))
                .execute()
                .await?;
        }
        info!(table = PASSAGES_TABLE, rows = documents.len(), "appended passages");
        Ok(documents.len())
    }

    async fn len(&self) -> Result<usize, StoreError> {
        if !self.has_table().await? {
            return Ok(0);
        }
        let table = self.db.open_table(PASSAGES_TABLE).execute().await?;
        Ok(table.count_rows(None).await?)
    }
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray, StoreError> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| StoreError::Other(format!("missing {name} column")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexbrief_ai::HashingEmbedder;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn append_then_search() {
        let tmp = TempDir::new().unwrap();
        let index = LanceIndex::open(&tmp.path().join("lance"), Arc::new(HashingEmbedder::default()))
            .await
            .unwrap();
        assert_eq!(index.len().await.unwrap(), 0);
        assert!(index.search("anything", 3).await.unwrap().is_empty());

        let docs = Document::zip(
            vec![
                "summary judgment requires no genuine dispute".into(),
                "maritime liens attach to vessels".into(),
            ],
            vec![json!({"id": 1}), json!({"id": 2})],
        )
        .unwrap();
        index.add_documents(docs.clone()).await.unwrap();
        index.add_documents(docs).await.unwrap();
        assert_eq!(index.len().await.unwrap(), 4);

        let hits = index.search("summary judgment dispute", 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].metadata["id"], 1);
    }
}
