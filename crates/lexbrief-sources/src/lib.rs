//! Retrieval sources: structured case-law APIs and semantic search over the
//! vector index, all behind the [`SourceSearcher`] contract.

mod caselaw;
mod courtlistener;
mod http;
pub mod parse;
mod searcher;
mod semantic;

pub use caselaw::CaselawSearcher;
pub use courtlistener::CourtListenerSearcher;
pub use http::SourceError;
pub use searcher::{Passage, SourceRecord, SourceSearcher};
pub use semantic::SemanticSearcher;
