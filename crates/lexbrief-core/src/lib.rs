//! Shared types for the research pipeline: queries, citations, findings, and the
//! artifacts each stage hands to the next.

pub mod config;
pub mod embedding;
pub mod model;
pub mod parse;
pub mod scoring;
pub mod validate;

pub use config::{RetrySettings, Settings};
pub use embedding::{EmbedError, TextEmbedder};
pub use model::{
    Brief, Citation, ComposedBrief, Finding, HealthStatus, PipelineResponse, Query, Stage,
    StageAnalysis, StageResult, Summary,
};
pub use scoring::{authority_score, confidence_score, precedent_strength, supporting_cases};
pub use validate::{ValidationReport, validate_query};
