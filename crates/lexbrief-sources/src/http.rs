//! Shared request plumbing for the JSON case-law APIs.

use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Send a prepared request and return the `results` array of its JSON body.
///
/// A body without `results` yields an empty list.
pub(crate) async fn fetch_results(request: reqwest::RequestBuilder) -> Result<Vec<Value>, SourceError> {
    let resp = request.send().await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(SourceError::Server {
            status: status.as_u16(),
            body,
        });
    }
    let body: Value = serde_json::from_str(&resp.text().await?)?;
    Ok(match body {
        Value::Object(mut map) => match map.remove("results") {
            Some(Value::Array(results)) => results,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    })
}
