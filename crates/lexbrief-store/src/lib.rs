//! Storage layer: the vector index behind semantic search.
//!
//! The default [`MemoryIndex`] keeps embeddings in memory and snapshots them to a
//! JSON file after every append. The `lancedb` feature adds [`LanceIndex`].

mod error;
mod index;
mod memory;

#[cfg(feature = "lancedb")]
mod lance;

pub use error::StoreError;
pub use index::{Document, IndexHit, VectorIndex};
pub use memory::MemoryIndex;

#[cfg(feature = "lancedb")]
pub use lance::LanceIndex;
