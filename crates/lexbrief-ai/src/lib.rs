//! AI layer: remote text generation for the pipeline stages, local embedders for
//! the vector index.

pub mod generation;
mod hashing;

#[cfg(feature = "onnx")]
mod embedder;

pub use generation::{ChatClient, GenerationError, TextGeneration};
pub use hashing::HashingEmbedder;

#[cfg(feature = "onnx")]
pub use embedder::OnnxEmbedder;
