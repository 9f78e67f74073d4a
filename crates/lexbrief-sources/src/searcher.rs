use async_trait::async_trait;
use lexbrief_core::Citation;

/// A passage matched by similarity rather than by case metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Passage {
    pub content: String,
    pub similarity: f64,
}

/// One raw result from a source, before scoring.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceRecord {
    Case(Citation),
    Passage(Passage),
}

/// A search backend queried during retrieval.
///
/// `search` never fails: a source that errors internally logs the problem and
/// returns no records, so one bad source cannot abort the fan-out.
#[async_trait]
pub trait SourceSearcher: Send + Sync {
    fn name(&self) -> &str;

    async fn search(&self, query: &str, jurisdiction: Option<&str>) -> Vec<SourceRecord>;
}
