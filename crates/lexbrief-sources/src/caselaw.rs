//! Harvard Caselaw Access Project case search.

use std::time::Duration;

use async_trait::async_trait;
use lexbrief_core::Settings;
use tracing::{info, warn};

use crate::http::fetch_results;
use crate::parse::parse_case;
use crate::{SourceRecord, SourceSearcher};

pub struct CaselawSearcher {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl CaselawSearcher {
    pub fn new(base_url: String, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.caselaw_url.clone(), settings.source_timeout())
    }
}

#[async_trait]
impl SourceSearcher for CaselawSearcher {
    fn name(&self) -> &str {
        "caselaw"
    }

    async fn search(&self, query: &str, jurisdiction: Option<&str>) -> Vec<SourceRecord> {
        let url = format!("{}/cases/", self.base_url);
        let mut params = vec![("search", query), ("format", "json"), ("full_case", "true")];
        if let Some(j) = jurisdiction {
            params.push(("jurisdiction", j));
        }
        let request = self.client.get(&url).query(&params).timeout(self.timeout);

        match fetch_results(request).await {
            Ok(results) => {
                let cases: Vec<SourceRecord> = results
                    .iter()
                    .filter_map(parse_case)
                    .map(SourceRecord::Case)
                    .collect();
                info!(source = self.name(), count = cases.len(), "case search complete");
                cases
            }
            Err(e) => {
                warn!(source = self.name(), error = %e, "source unavailable");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::serve_once;

    #[tokio::test]
    async fn reads_nested_case_fields() {
        let (url, request) = serve_once(
            "200 OK",
            r#"{"results": [{
                "name": "Anderson v. Liberty Lobby, Inc.",
                "citations": [{"cite": "477 U.S. 242"}],
                "court": {"name": "Supreme Court of the United States"},
                "decision_date": "1986-06-25",
                "jurisdiction": {"name": "U.S."}
            }]}"#,
        )
        .await;
        let searcher = CaselawSearcher::new(format!("{url}/"), Duration::from_secs(5));

        let records = searcher.search("summary judgment", Some("us")).await;
        let [SourceRecord::Case(case)] = records.as_slice() else {
            panic!("expected one case, got {records:?}");
        };
        assert_eq!(case.citation_text, "477 U.S. 242");
        assert_eq!(case.jurisdiction, "U.S.");

        let head = request.await.unwrap();
        assert!(head.starts_with("GET /cases/?"));
        assert!(head.contains("full_case=true"));
        assert!(head.contains("jurisdiction=us"));
    }

    #[tokio::test]
    async fn malformed_body_yields_nothing() {
        let (url, _request) = serve_once("200 OK", "not json").await;
        let searcher = CaselawSearcher::new(url, Duration::from_secs(5));
        assert!(searcher.search("summary judgment", None).await.is_empty());
    }
}
