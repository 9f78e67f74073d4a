//! Reading passages to index from a JSON file.

use std::path::Path;

use anyhow::Context;
use lexbrief_store::Document;
use serde::Deserialize;
use serde_json::Value;

/// `{"documents": [...], "metadata": [...]}`; metadata may be omitted.
#[derive(Deserialize)]
struct Batch {
    documents: Vec<String>,
    #[serde(default)]
    metadata: Option<Vec<Value>>,
}

pub fn read_documents(path: &Path) -> anyhow::Result<Vec<Document>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    parse_documents(&text).with_context(|| format!("parsing {}", path.display()))
}

fn parse_documents(text: &str) -> anyhow::Result<Vec<Document>> {
    let batch: Batch = serde_json::from_str(text)?;
    let metadata = batch
        .metadata
        .unwrap_or_else(|| vec![Value::Object(Default::default()); batch.documents.len()]);
    Ok(Document::zip(batch.documents, metadata)?)
}
