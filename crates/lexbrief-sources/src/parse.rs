//! Lenient conversion of case-law API records into [`Citation`]s.
//!
//! CourtListener and Harvard Caselaw name the same facts differently, and both
//! nest some of them. Each field tries the known spellings in order and falls
//! back to a neutral default; only an unreadable date rejects the record.

use chrono::NaiveDate;
use lexbrief_core::Citation;
use serde_json::Value;

const UNKNOWN: &str = "Unknown";
const DEFAULT_DATE: &str = "2000-01-01";
const DEFAULT_RELEVANCE: f64 = 0.5;

/// Build a citation from one API record, or `None` if the record is unusable.
pub fn parse_case(record: &Value) -> Option<Citation> {
    let record = record.as_object()?;

    let case_name = first_text(record.get("caseName"))
        .or_else(|| first_text(record.get("name")))
        .unwrap_or_else(|| UNKNOWN.to_string());
    let citation_text = first_text(record.get("citation"))
        .or_else(|| first_text(record.get("citations")))
        .unwrap_or_default();
    let court = first_text(record.get("court"))
        .or_else(|| first_text(record.get("court_name")))
        .unwrap_or_else(|| UNKNOWN.to_string());
    let raw_date = first_text(record.get("dateFiled"))
        .or_else(|| first_text(record.get("decision_date")))
        .unwrap_or_else(|| DEFAULT_DATE.to_string());
    let date = parse_date(&raw_date)?;
    let jurisdiction =
        first_text(record.get("jurisdiction")).unwrap_or_else(|| UNKNOWN.to_string());
    let relevance_score = record
        .get("score")
        .and_then(Value::as_f64)
        .unwrap_or(DEFAULT_RELEVANCE)
        .clamp(0.0, 1.0);
    let url = first_text(record.get("absolute_url")).or_else(|| first_text(record.get("url")));

    Some(Citation {
        case_name,
        citation_text,
        court,
        date,
        jurisdiction,
        relevance_score,
        url,
    })
}

/// Text from a string, the first element of an array, or a nested object's
/// `name`/`cite` field.
fn first_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Array(items) => first_text(items.first()),
        Value::Object(map) => first_text(map.get("name")).or_else(|| first_text(map.get("cite"))),
        _ => None,
    }
}

/// Parse the leading `YYYY-MM-DD` of an ISO date or timestamp.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}
