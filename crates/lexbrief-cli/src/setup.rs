//! Embedder and index selection from command-line settings.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use lexbrief_core::TextEmbedder;
use lexbrief_store::{MemoryIndex, VectorIndex};

/// The ONNX model when a directory is given, otherwise the hashing embedder.
pub fn embedder(model_dir: Option<&Path>) -> anyhow::Result<Arc<dyn TextEmbedder>> {
    match model_dir {
        None => Ok(Arc::new(lexbrief_ai::HashingEmbedder::default())),
        #[cfg(feature = "onnx")]
        Some(dir) => {
            let model = lexbrief_ai::OnnxEmbedder::load(dir)
                .with_context(|| format!("loading embedding model from {}", dir.display()))?;
            Ok(Arc::new(model))
        }
        #[cfg(not(feature = "onnx"))]
        Some(dir) => anyhow::bail!(
            "{} given as embedding model, but this build has no ONNX support (enable the `onnx` feature)",
            dir.display()
        ),
    }
}

/// A `.json` path opens the file-backed index; anything else is a LanceDB
/// directory.
pub async fn open_index(
    path: &Path,
    embedder: Arc<dyn TextEmbedder>,
) -> anyhow::Result<Arc<dyn VectorIndex>> {
    if is_snapshot_path(path) {
        let index = MemoryIndex::open(path, embedder)
            .await
            .with_context(|| format!("opening index {}", path.display()))?;
        return Ok(Arc::new(index));
    }
    open_lance(path, embedder).await
}

fn is_snapshot_path(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

#[cfg(feature = "lancedb")]
async fn open_lance(
    path: &Path,
    embedder: Arc<dyn TextEmbedder>,
) -> anyhow::Result<Arc<dyn VectorIndex>> {
    let index = lexbrief_store::LanceIndex::open(path, embedder)
        .await
        .with_context(|| format!("opening LanceDB at {}", path.display()))?;
    Ok(Arc::new(index))
}

#[cfg(not(feature = "lancedb"))]
async fn open_lance(
    path: &Path,
    _embedder: Arc<dyn TextEmbedder>,
) -> anyhow::Result<Arc<dyn VectorIndex>> {
    anyhow::bail!(
        "{} is not a .json index and this build has no LanceDB support (enable the `lancedb` feature)",
        path.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_paths_are_snapshots() {
        assert!(is_snapshot_path(Path::new("lexbrief_index.json")));
        assert!(is_snapshot_path(Path::new("/data/INDEX.JSON")));
        assert!(!is_snapshot_path(Path::new("/data/lance")));
    }

    #[tokio::test]
    async fn hashing_embedder_opens_a_fresh_index() {
        let tmp = tempfile::TempDir::new().unwrap();
        let embedder = embedder(None).unwrap();
        assert_eq!(embedder.dim(), 384);
        let index = open_index(&tmp.path().join("idx.json"), embedder).await.unwrap();
        assert_eq!(index.len().await.unwrap(), 0);
    }
}
