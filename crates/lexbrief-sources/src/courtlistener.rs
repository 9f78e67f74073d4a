//! CourtListener opinion search (`/search/?type=o`).

use std::time::Duration;

use async_trait::async_trait;
use lexbrief_core::Settings;
use tracing::{info, warn};

use crate::http::fetch_results;
use crate::parse::parse_case;
use crate::{SourceRecord, SourceSearcher};

pub struct CourtListenerSearcher {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl CourtListenerSearcher {
    /// `base_url` should be like `https://www.courtlistener.com/api/rest/v3`.
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            timeout,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.courtlistener_url.clone(),
            settings.courtlistener_api_key.clone(),
            settings.source_timeout(),
        )
    }
}

#[async_trait]
impl SourceSearcher for CourtListenerSearcher {
    fn name(&self) -> &str {
        "courtlistener"
    }

    async fn search(&self, query: &str, jurisdiction: Option<&str>) -> Vec<SourceRecord> {
        let url = format!("{}/search/", self.base_url);
        let mut params = vec![
            ("q", query),
            ("type", "o"),
            ("order_by", "score desc"),
            ("format", "json"),
        ];
        if let Some(court) = jurisdiction {
            params.push(("court", court));
        }

        let mut request = self
            .client
            .get(&url)
            .query(&params)
            .timeout(self.timeout);
        if !self.api_key.is_empty() {
            request = request.header("Authorization", format!("Token {}", self.api_key));
        }

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
    async fn parses_results_and_sends_token() {
        let (url, request) = serve_once(
            "200 OK",
            r#"{"count": 2, "results": [
                {"caseName": "Celotex Corp. v. Catrett", "court": "Supreme Court", "dateFiled": "1986-06-25", "score": 0.9},
                {"caseName": "Broken", "dateFiled": "not-a-date"}
            ]}"#,
        )
        .await;
        let searcher = CourtListenerSearcher::new(url, "secret".into(), Duration::from_secs(5));

        let records = searcher.search("summary judgment", Some("scotus")).await;
        assert_eq!(records.len(), 1);
        assert!(matches!(&records[0], SourceRecord::Case(c) if c.case_name == "Celotex Corp. v. Catrett"));

        let head = request.await.unwrap();
        assert!(head.starts_with("GET /search/?"));
        assert!(head.contains("court=scotus"));
        assert!(head.contains("type=o"));
        assert!(head.to_lowercase().contains("authorization: token secret"));
    }

    #[tokio::test]
    async fn server_error_yields_nothing() {
        let (url, _request) = serve_once("503 Service Unavailable", "{}").await;
        let searcher = CourtListenerSearcher::new(url, String::new(), Duration::from_secs(5));
        assert!(searcher.search("summary judgment", None).await.is_empty());
    }

    #[tokio::test]
    async fn unreachable_host_yields_nothing() {
        let searcher = CourtListenerSearcher::new(
            "http://127.0.0.1:9".into(),
            String::new(),
            Duration::from_secs(2),
        );
        assert!(searcher.search("summary judgment", None).await.is_empty());
    }
}
