//! Scripted collaborators for pipeline tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use lexbrief_ai::{GenerationError, TextGeneration};
use lexbrief_core::{Citation, Stage, StageResult};
use lexbrief_pipeline::Agent;
use lexbrief_sources::{Passage, SourceRecord, SourceSearcher};
use serde::Serialize;

type Reply = Box<dyn Fn(&str) -> Result<String, GenerationError> + Send + Sync>;

/// A generator that answers each prompt through a closure and records every
/// prompt it was given.
pub struct ScriptedGenerator {
    reply: Reply,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(
        reply: impl Fn(&str) -> Result<String, GenerationError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            reply: Box::new(reply),
            prompts: Mutex::new(Vec::new()),
        })
    }

    /// Plausible answers for every prompt the standard agents send.
    pub fn cooperative() -> Arc<Self> {
        Self::new(|prompt| Ok(cooperative_reply(prompt).to_string()))
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls_containing(&self, needle: &str) -> usize {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.contains(needle))
            .count()
    }
}

pub fn cooperative_reply(prompt: &str) -> &'static str {
    if prompt.starts_with("Evaluate the quality") {
        "PASS"
    } else if prompt.contains("Return only the indices") {
        "[0, 1, 2, 3]"
    } else if prompt.contains("key patterns") {
        "Patterns:\n- Burden shifting\n- Materiality\n- Genuine dispute"
    } else if prompt.contains("most important findings") {
        "- Movant bears the initial burden\n- Facts viewed for the non-movant"
    } else if prompt.contains("practical conclusions") {
        "- Summary judgment is available\n- Evidence must be admissible"
    } else if prompt.starts_with("Format the following") {
        "MEMORANDUM\n\nQuestion presented..."
    } else {
        "Narrative text."
    }
}

#[async_trait]
impl TextGeneration for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        (self.reply)(prompt)
    }
}

/// A source that returns fixed records, optionally after a delay.
pub struct StaticSearcher {
    name: &'static str,
    records: Vec<SourceRecord>,
    delay: Duration,
}

impl StaticSearcher {
    pub fn new(name: &'static str, records: Vec<SourceRecord>) -> Arc<Self> {
        Self::delayed(name, records, Duration::ZERO)
    }

    pub fn delayed(name: &'static str, records: Vec<SourceRecord>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            name,
            records,
            delay,
        })
    }
}

#[async_trait]
impl SourceSearcher for StaticSearcher {
    fn name(&self) -> &str {
        self.name
    }

    async fn search(&self, _query: &str, _jurisdiction: Option<&str>) -> Vec<SourceRecord> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.records.clone()
    }
}

pub fn case(name: &str, court: &str, score: f64) -> SourceRecord {
    SourceRecord::Case(Citation {
        case_name: name.into(),
        citation_text: String::new(),
        court: court.into(),
        date: NaiveDate::from_ymd_opt(1995, 5, 1).unwrap(),
        jurisdiction: "US".into(),
        relevance_score: score,
        url: None,
    })
}

pub fn passage(content: &str, similarity: f64) -> SourceRecord {
    SourceRecord::Passage(Passage {
        content: content.into(),
        similarity,
    })
}

/// An agent with a scripted outcome per attempt that counts its invocations.
pub struct CountingAgent<I, O> {
    stage: Stage,
    outcomes: Mutex<Vec<Option<O>>>,
    fallback: Option<O>,
    calls: AtomicUsize,
    _input: std::marker::PhantomData<fn(&I)>,
}

impl<I, O: Clone> CountingAgent<I, O> {
    /// Succeeds with `output` on every attempt.
    pub fn succeeding(stage: Stage, output: O) -> Arc<Self> {
        Self::scripted(stage, Vec::new(), Some(output))
    }

    /// Fails on every attempt.
    pub fn failing(stage: Stage) -> Arc<Self> {
        Self::scripted(stage, Vec::new(), None)
    }

    /// Plays `outcomes` in order, then repeats `fallback`.
    pub fn scripted(stage: Stage, outcomes: Vec<Option<O>>, fallback: Option<O>) -> Arc<Self> {
        let mut outcomes = outcomes;
        outcomes.reverse();
        Arc::new(Self {
            stage,
            outcomes: Mutex::new(outcomes),
            fallback,
            calls: AtomicUsize::new(0),
            _input: std::marker::PhantomData,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<I, O> Agent for CountingAgent<I, O>
where
    I: Serialize + Send + Sync,
    O: Serialize + Clone + Send + Sync,
{
    type Input = I;
    type Output = O;

    fn stage(&self) -> Stage {
        self.stage
    }

    async fn execute(&self, _input: &I) -> StageResult<O> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.outcomes.lock().unwrap().pop();
        match next.unwrap_or_else(|| self.fallback.clone()) {
            Some(output) => StageResult::succeeded(self.stage, output),
            None => StageResult::failed(self.stage),
        }
    }
}
