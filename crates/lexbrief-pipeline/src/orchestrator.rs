//! Stage sequencing.
//!
//! ```text
//! RETRIEVING ─► ANALYZING ─► SUMMARIZING ─► COMPOSING ─► DONE
//!      └────────────┴─────────────┴─────────────┴──────► FAILED
//! ```
//!
//! Every transition goes through the [`RetryingExecutor`]. The first stage
//! that comes back failed ends the run; earlier stage output is dropped.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use lexbrief_ai::TextGeneration;
use lexbrief_core::{
    ComposedBrief, Finding, HealthStatus, PipelineResponse, Query, Stage, StageAnalysis, Summary,
    ValidationReport, validate_query,
};
use lexbrief_sources::SourceSearcher;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::{
    Agent, Analyzer, Composer, CompositionInput, RetrievalMerger, Retriever, RetryPolicy,
    RetryingExecutor, Summarizer, SummaryInput,
};

pub type RetrieveAgent = dyn Agent<Input = Query, Output = Vec<Finding>>;
pub type AnalyzeAgent = dyn Agent<Input = Vec<Finding>, Output = StageAnalysis>;
pub type SummarizeAgent = dyn Agent<Input = SummaryInput, Output = Summary>;
pub type ComposeAgent = dyn Agent<Input = CompositionInput, Output = ComposedBrief>;

const HEALTHY: &str = "healthy";

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Retrieving,
    Analyzing,
    Summarizing,
    Composing,
    Done,
    Failed(Stage),
}

impl From<Stage> for PipelineState {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::Retrieve => Self::Retrieving,
            Stage::Analyze => Self::Analyzing,
            Stage::Summarize => Self::Summarizing,
            Stage::Compose => Self::Composing,
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Retrieving => f.write_str("RETRIEVING"),
            Self::Analyzing => f.write_str("ANALYZING"),
            Self::Summarizing => f.write_str("SUMMARIZING"),
            Self::Composing => f.write_str("COMPOSING"),
            Self::Done => f.write_str("DONE"),
            Self::Failed(stage) => write!(f, "FAILED({stage})"),
        }
    }
}

pub struct Orchestrator {
    executor: RetryingExecutor,
    retriever: Arc<RetrieveAgent>,
    analyzer: Arc<AnalyzeAgent>,
    summarizer: Arc<SummarizeAgent>,
    composer: Arc<ComposeAgent>,
}

impl Orchestrator {
    pub fn new(
        executor: RetryingExecutor,
        retriever: Arc<RetrieveAgent>,
        analyzer: Arc<AnalyzeAgent>,
        summarizer: Arc<SummarizeAgent>,
        composer: Arc<ComposeAgent>,
    ) -> Self {
        Self {
            executor,
            retriever,
            analyzer,
            summarizer,
            composer,
        }
    }

    /// Wire the standard four agents around one generator and a set of
    /// sources. The same generator backs the stages and the evaluator.
    pub fn standard(
        generator: Arc<dyn TextGeneration>,
        searchers: Vec<Arc<dyn SourceSearcher>>,
        policy: RetryPolicy,
    ) -> Self {
        let merger = RetrievalMerger::new(searchers);
        debug!(
            sources = ?merger.source_names(),
            max_attempts = policy.max_attempts,
            "assembling standard pipeline"
        );
        Self::new(
            RetryingExecutor::new(generator.clone(), policy),
            Arc::new(Retriever::new(merger, generator.clone())),
            Arc::new(Analyzer::new(generator.clone())),
            Arc::new(Summarizer::new(generator.clone())),
            Arc::new(Composer::new(generator)),
        )
    }

    /// Pre-flight check; never starts a stage.
    pub async fn validate(&self, query: &Query) -> ValidationReport {
        validate_query(query)
    }

    /// Run all four stages. Failures come back as an unsuccessful response
    /// naming the stage that gave out.
    pub async fn process(&self, query: &Query) -> PipelineResponse {
        let started = Instant::now();
        match self.run_stages(query).await {
            Ok(composed) => {
                let elapsed = started.elapsed();
                info!(state = %PipelineState::Done, elapsed_ms = elapsed.as_millis() as u64, "pipeline complete");
                PipelineResponse::completed(composed, elapsed)
            }
            Err(stage) => {
                let elapsed = started.elapsed();
                warn!(state = %PipelineState::Failed(stage), elapsed_ms = elapsed.as_millis() as u64, "pipeline halted");
                PipelineResponse::failed(stage.failure_message(), elapsed)
            }
        }
    }

    /// Validate, then process if the query is acceptable.
    pub async fn research(&self, query: &Query) -> PipelineResponse {
        let report = self.validate(query).await;
        for warning in &report.warnings {
            warn!(%warning, "query warning");
        }
        if !report.valid {
            return PipelineResponse::failed(
                format!("Invalid query: {}", report.errors.join(", ")),
                Duration::ZERO,
            );
        }
        self.process(query).await
    }

    pub async fn health(&self) -> HealthStatus {
        let agents = [
            self.retriever.stage(),
            self.analyzer.stage(),
            self.summarizer.stage(),
            self.composer.stage(),
        ]
        .iter()
        .map(|stage| (stage.agent_name().to_lowercase(), HEALTHY.to_string()))
        .collect::<BTreeMap<_, _>>();
        HealthStatus {
            orchestrator: HEALTHY.to_string(),
            agents,
            timestamp: Utc::now(),
        }
    }

    async fn run_stages(&self, query: &Query) -> Result<ComposedBrief, Stage> {
        let findings = self.step(self.retriever.as_ref(), query).await?;

        let analysis = self.step(self.analyzer.as_ref(), &findings).await?;

        let summary_input = SummaryInput {
            query: query.text.clone(),
            findings,
            analysis,
        };
        let summary = self.step(self.summarizer.as_ref(), &summary_input).await?;

        let SummaryInput {
            query: text,
            findings,
            analysis,
        } = summary_input;
        let composition_input = CompositionInput {
            query: text,
            findings,
            analysis,
            summary,
        };
        self.step(self.composer.as_ref(), &composition_input).await
    }

    async fn step<A>(&self, agent: &A, input: &A::Input) -> Result<A::Output, Stage>
    where
        A: Agent + ?Sized,
    {
        let stage = agent.stage();
        info!(state = %PipelineState::from(stage), "entering stage");
        let result = self.executor.run(agent, input).await;
        let (retries, elapsed) = (result.retry_count, result.elapsed);
        match result.into_payload() {
            Some(payload) => {
                info!(%stage, retries, elapsed_ms = elapsed.as_millis() as u64, "stage complete");
                Ok(payload)
            }
            None => Err(stage),
        }
    }
}
