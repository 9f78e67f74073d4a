//! Pre-flight query validation, run before any pipeline stage.

use serde::{Deserialize, Serialize};

use crate::model::Query;

/// Minimum query length in characters, after trimming whitespace.
pub const MIN_QUERY_CHARS: usize = 10;

/// Jurisdictions shorter than this produce a warning.
pub const MIN_JURISDICTION_CHARS: usize = 2;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Check a query before it enters the pipeline.
///
/// Errors block the pipeline; warnings are advisory only.
pub fn validate_query(query: &Query) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if query.text.trim().chars().count() < MIN_QUERY_CHARS {
        errors.push(format!(
            "Query must be at least {MIN_QUERY_CHARS} characters long"
        ));
    }

    if let Some(jurisdiction) = query.jurisdiction.as_deref()
        && !jurisdiction.is_empty()
        && jurisdiction.chars().count() < MIN_JURISDICTION_CHARS
    {
        warnings.push("Jurisdiction should be more specific".to_string());
    }

    ValidationReport {
        valid: errors.is_empty(),
        errors,
        warnings,
    }
}
