use async_trait::async_trait;
use lexbrief_core::{Finding, Stage, StageAnalysis, StageResult, Summary};
use serde::Serialize;

/// One pipeline stage.
///
/// `execute` is total: any internal failure comes back as
/// [`StageResult::failed`], never as a panic or an error value. Input and
/// output are serializable so the retry gate can show both to the evaluator.
#[async_trait]
pub trait Agent: Send + Sync {
    type Input: Serialize + Send + Sync;
    type Output: Serialize + Send + Sync;

    fn stage(&self) -> Stage;

    async fn execute(&self, input: &Self::Input) -> StageResult<Self::Output>;
}

/// What the Summarizer sees: the query and everything retrieved and analyzed.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryInput {
    pub query: String,
    pub findings: Vec<Finding>,
    pub analysis: StageAnalysis,
}

/// What the Composer sees: the summary input plus the summary itself.
#[derive(Debug, Clone, Serialize)]
pub struct CompositionInput {
    pub query: String,
    pub findings: Vec<Finding>,
    pub analysis: StageAnalysis,
    pub summary: Summary,
}
