//! Sentence-transformer embeddings via ONNX Runtime.
//!
//! Expects a model directory holding `model.onnx` and `tokenizer.json` for
//! all-MiniLM-L6-v2 (384 dimensions). Token embeddings are mean-pooled under the
//! attention mask and L2-normalized.

use std::path::Path;
use std::sync::Mutex;

use lexbrief_core::embedding::{EmbedError, TextEmbedder, normalize};
use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;
use tracing::info;

const MAX_TOKENS: usize = 256;

struct Model {
    session: Session,
    tokenizer: Tokenizer,
}

pub struct OnnxEmbedder {
    model: Mutex<Model>,
    dim: usize,
}

fn err(context: &str, e: impl std::fmt::Display) -> EmbedError {
    EmbedError(format!("{context}: {e}"))
}

impl OnnxEmbedder {
    pub fn load(model_dir: &Path) -> Result<Self, EmbedError> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");
        if !model_path.exists() || !tokenizer_path.exists() {
            return Err(EmbedError(format!(
                "model.onnx and tokenizer.json required in {model_dir:?}"
            )));
        }

        let session = Session::builder()
            .map_err(|e| err("session builder", e))?
            .commit_from_file(&model_path)
            .map_err(|e| err("load model", e))?;
        let dim = output_dim(session.outputs()[0].dtype()).unwrap_or(384);

        let mut tokenizer =
            Tokenizer::from_file(&tokenizer_path).map_err(|e| err("load tokenizer", e))?;
        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: MAX_TOKENS,
                ..Default::default()
            }))
            .map_err(|e| err("set truncation", e))?;
        tokenizer.with_padding(Some(tokenizers::PaddingParams::default()));

        info!(dim, model = %model_path.display(), "loaded ONNX embedder");
        Ok(Self {
            model: Mutex::new(Model { session, tokenizer }),
            dim,
        })
    }
}

impl TextEmbedder for OnnxEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }
        let mut model = self
            .model
            .lock()
            .map_err(|e| err("embedder lock poisoned", e))?;

        let encodings = model
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| err("tokenize", e))?;
        let batch = texts.len();
        let seq_len = encodings.iter().map(|e| e.get_ids().len()).max().unwrap_or(0);

        let mut ids = vec![0i64; batch * seq_len];
        let mut mask = vec![0i64; batch * seq_len];
        let mut type_ids = vec![0i64; batch * seq_len];
        for (i, enc) in encodings.iter().enumerate() {
            let row = i * seq_len;
            for (j, ((&id, &m), &t)) in enc
                .get_ids()
                .iter()
                .zip(enc.get_attention_mask())
                .zip(enc.get_type_ids())
                .enumerate()
            {
                ids[row + j] = id as i64;
                mask[row + j] = m as i64;
                type_ids[row + j] = t as i64;
            }
        }

        let shape = [batch as i64, seq_len as i64];
        let inputs = ort::inputs![
            "input_ids" => Tensor::from_array((shape, ids.into_boxed_slice())).map_err(|e| err("input_ids", e))?,
            "attention_mask" => Tensor::from_array((shape, mask.clone().into_boxed_slice())).map_err(|e| err("attention_mask", e))?,
            "token_type_ids" => Tensor::from_array((shape, type_ids.into_boxed_slice())).map_err(|e| err("token_type_ids", e))?,
        ];
        let outputs = model.session.run(inputs).map_err(|e| err("inference", e))?;
        let (out_shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| err("extract output", e))?;
        let dims: &[i64] = out_shape;
        if dims.len() != 3 || dims[0] as usize != batch || dims[2] as usize != self.dim {
            return Err(EmbedError(format!("unexpected output shape {dims:?}")));
        }
        let out_seq = dims[1] as usize;

        let mut vectors = Vec::with_capacity(batch);
        for i in 0..batch {
            let mut pooled = vec![0.0f32; self.dim];
            let mut tokens = 0.0f32;
            for j in 0..out_seq.min(seq_len) {
                if mask[i * seq_len + j] == 0 {
                    continue;
                }
                let offset = (i * out_seq + j) * self.dim;
                for (d, p) in pooled.iter_mut().enumerate() {
                    *p += data[offset + d];
                }
                tokens += 1.0;
            }
            if tokens > 0.0 {
                pooled.iter_mut().for_each(|p| *p /= tokens);
            }
            normalize(&mut pooled);
            vectors.push(pooled);
        }
        Ok(vectors)
    }
}

fn output_dim(output_type: &ort::value::ValueType) -> Option<usize> {
    match output_type {
        ort::value::ValueType::Tensor { shape, .. } => shape
            .last()
            .and_then(|&d| if d > 0 { Some(d as usize) } else { None }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexbrief_core::embedding::dot;
    use std::path::PathBuf;

    fn model_dir() -> Option<PathBuf> {
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../models/all-MiniLM-L6-v2");
        dir.join("model.onnx").exists().then_some(dir)
    }

    #[test]
    fn missing_model_is_an_error() {
        assert!(OnnxEmbedder::load(Path::new("/nonexistent/model")).is_err());
    }

    #[test]
    fn related_legal_texts_are_closer() {
        let Some(dir) = model_dir() else {
            eprintln!("skipping: all-MiniLM-L6-v2 not downloaded");
            return;
        };
        let embedder = OnnxEmbedder::load(&dir).unwrap();
        assert_eq!(embedder.dim(), 384);
        let q = embedder.embed("standard for summary judgment").unwrap();
        let near = embedder.embed("no genuine dispute as to any material fact").unwrap();
        let far = embedder.embed("recipe for sourdough bread").unwrap();
        assert!(dot(&q, &near) > dot(&q, &far));
    }
}
