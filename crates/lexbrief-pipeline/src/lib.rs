//! The research pipeline: four stage agents run in sequence, each behind a
//! retry gate that re-runs the stage until a self-evaluation accepts it.
//!
//! ```text
//! Query ─► Retriever ─► Analyzer ─► Summarizer ─► Composer ─► ComposedBrief
//!            │
//!            └─ RetrievalMerger ─► [SourceSearcher; N] (concurrent)
//! ```

pub mod agent;
mod analyzer;
mod composer;
pub mod executor;
pub mod merger;
mod orchestrator;
mod retriever;
mod summarizer;

pub use agent::{Agent, CompositionInput, SummaryInput};
pub use analyzer::Analyzer;
pub use composer::Composer;
pub use executor::{RetryPolicy, RetryingExecutor};
pub use merger::RetrievalMerger;
pub use orchestrator::{
    AnalyzeAgent, ComposeAgent, Orchestrator, PipelineState, RetrieveAgent, SummarizeAgent,
};
pub use retriever::Retriever;
pub use summarizer::Summarizer;
