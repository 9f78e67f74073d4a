//! Bounded retry around any [`Agent`], with exponential backoff and a
//! self-evaluation gate.
//!
//! ```text
//! RUNNING ──fail──────────────────────────┐
//!    │                                     ▼
//!    └─ok─► EVALUATING ──reject──► RETRY (backoff) ─► RUNNING
//!              │                     │
//!              └─pass─► ACCEPTED      └─budget spent─► EXHAUSTED
//! ```
//!
//! The executor never raises: exhaustion is a failed [`StageResult`] whose
//! `retry_count` equals the number of attempts made.

use std::sync::Arc;
use std::time::Duration;

use lexbrief_ai::TextGeneration;
use lexbrief_core::parse::evaluation_passed;
use lexbrief_core::{RetrySettings, Stage, StageResult};
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::Agent;

// ── Prompt templates ──

fn build_evaluation_prompt(stage: Stage, input: &str, output: &str) -> String {
    format!(
        "Evaluate the quality of this {stage} result.\n\
         \n\
         Input:\n\
         {input}\n\
         \n\
         Output:\n\
         {output}\n\
         \n\
         Judge its relevance and legal authority.\n\
         Respond with only 'PASS' or 'FAIL'."
    )
}

// ── Policy ──

/// Attempt budget and backoff schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub multiplier: f64,
    pub min_wait: Duration,
    pub max_wait: Duration,
    pub self_evaluation: bool,
    pub fail_open: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetrySettings::default())
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            multiplier: settings.multiplier,
            min_wait: Duration::from_secs_f64(settings.min_wait_secs.max(0.0)),
            max_wait: Duration::from_secs_f64(settings.max_wait_secs.max(0.0)),
            self_evaluation: settings.self_evaluation,
            fail_open: settings.fail_open,
        }
    }
}

impl RetryPolicy {
    /// Wait before the attempt following attempt number `attempt` (1-based):
    /// `multiplier · 2^(attempt-1)`, clamped to `[min_wait, max_wait]`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let ceiling = self.max_wait.max(self.min_wait);
        let exp = 2f64.powi(attempt.saturating_sub(1).min(62) as i32);
        let secs = (self.multiplier * exp).min(ceiling.as_secs_f64());
        let raw = if secs.is_finite() && secs > 0.0 {
            Duration::from_secs_f64(secs)
        } else {
            Duration::ZERO
        };
        raw.clamp(self.min_wait, ceiling)
    }
}

// ── Executor ──

pub struct RetryingExecutor {
    evaluator: Arc<dyn TextGeneration>,
    policy: RetryPolicy,
}

impl RetryingExecutor {
    pub fn new(evaluator: Arc<dyn TextGeneration>, policy: RetryPolicy) -> Self {
        Self { evaluator, policy }
    }

    /// Run `agent` until an attempt is accepted or the budget is spent.
    pub async fn run<A>(&self, agent: &A, input: &A::Input) -> StageResult<A::Output>
    where
        A: Agent + ?Sized,
    {
        let stage = agent.stage();
        let started = Instant::now();

        for attempt in 1..=self.policy.max_attempts {
            let mut result = agent.execute(input).await;
            let accepted = if result.success && result.payload.is_some() {
                self.evaluate(stage, input, &result.payload).await
            } else {
                false
            };

            if accepted {
                result.elapsed = started.elapsed();
                result.retry_count = attempt - 1;
                info!(%stage, attempt, elapsed_ms = result.elapsed.as_millis() as u64, "stage accepted");
                return result;
            }

            warn!(%stage, attempt, succeeded = result.success, "stage attempt rejected");
            if attempt < self.policy.max_attempts {
                let wait = self.policy.backoff(attempt);
                debug!(%stage, attempt, wait_ms = wait.as_millis() as u64, "backing off");
                tokio::time::sleep(wait).await;
            }
        }

        let mut exhausted = StageResult::failed(stage);
        exhausted.elapsed = started.elapsed();
        exhausted.retry_count = self.policy.max_attempts;
        warn!(%stage, attempts = self.policy.max_attempts, "stage exhausted");
        exhausted
    }

    async fn evaluate<I, O>(&self, stage: Stage, input: &I, output: &O) -> bool
    where
        I: Serialize + ?Sized,
        O: Serialize + ?Sized,
    {
        if !self.policy.self_evaluation {
            return true;
        }
        let prompt = build_evaluation_prompt(
            stage,
            &serde_json::to_string(input).unwrap_or_default(),
            &serde_json::to_string(output).unwrap_or_default(),
        );
        match self.evaluator.generate(&prompt).await {
            Ok(verdict) => evaluation_passed(&verdict),
            Err(e) => {
                warn!(%stage, error = %e, fail_open = self.policy.fail_open, "evaluation unavailable");
                self.policy.fail_open
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schedule_waits_four_seconds() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.backoff(1), Duration::from_secs(4));
        assert_eq!(policy.backoff(2), Duration::from_secs(4));
        assert_eq!(policy.backoff(3), Duration::from_secs(4));
        assert_eq!(policy.backoff(4), Duration::from_secs(8));
        assert_eq!(policy.backoff(5), Duration::from_secs(10));
        assert_eq!(policy.backoff(40), Duration::from_secs(10));
    }

    #[test]
    fn zero_attempts_still_runs_once() {
        let settings = RetrySettings {
            max_attempts: 0,
            ..RetrySettings::default()
        };
        assert_eq!(RetryPolicy::from(&settings).max_attempts, 1);
    }

    #[test]
    fn evaluation_prompt_carries_both_sides() {
        let prompt = build_evaluation_prompt(Stage::Analyze, "{\"in\":1}", "{\"out\":2}");
        assert!(prompt.contains("Analyzer result"));
        assert!(prompt.contains("{\"in\":1}"));
        assert!(prompt.contains("{\"out\":2}"));
        assert!(prompt.contains("'PASS' or 'FAIL'"));
    }
}
