//! Structural matching of one mock against the provider schema.

use tracing::trace;

use crate::mock::Mock;
use crate::schema::{Operation, Schema};
use crate::types::{Issue, MatchResult};

pub const ENDPOINT_NOT_FOUND: &str = "Endpoint not found in provider schema";
pub const METHOD_NOT_SUPPORTED: &str = "Method not supported for this endpoint";
pub const RESPONSE_SCHEMA_MISSING: &str = "Response schema not defined in provider contract";

/// Check whether the schema defines what a mock exercises.
///
/// Incompatibilities are returned as issues, never as errors. The checks run
/// in order and stop at the first missing endpoint or method:
///
/// 1. the endpoint exists (exact string match),
/// 2. the method exists on it (case-insensitive),
/// 3. the response status code is declared,
/// 4. the declared response has a JSON content schema.
///
/// The result depends only on `schema` and `mock`.
pub fn match_mock(schema: &Schema, mock: &Mock) -> MatchResult {
    MatchResult::new(mock.clone(), find_issues(schema, mock))
}

/// The issues [`match_mock`] would report, without building a result.
pub fn find_issues(schema: &Schema, mock: &Mock) -> Vec<Issue> {
    let endpoint = mock.request.endpoint.as_str();

    let Some(path_item) = schema.path(endpoint) else {
        return vec![Issue::error(endpoint, ENDPOINT_NOT_FOUND)];
    };

    let label = mock.operation_label();
    let Some(operation) = path_item.operation(&mock.request.method) else {
        return vec![Issue::error(label, METHOD_NOT_SUPPORTED)];
    };

    let mut issues = Vec::new();
    check_request(operation, mock, &label);
    check_response(operation, mock, &label, &mut issues);
    issues
}

/// Request bodies are accepted as long as the operation exists.
///
/// A declared request schema is not compared field by field; payload
/// validation would plug in here.
fn check_request(operation: &Operation, mock: &Mock, label: &str) {
    if operation.request_schema().is_some() && mock.request.body.is_some() {
        trace!(operation = label, "request body schema declared, not compared");
    }
}

fn check_response(operation: &Operation, mock: &Mock, label: &str, issues: &mut Vec<Issue>) {
    let status = mock.status_key();

    match operation.response(&status) {
        None => issues.push(Issue::error(
            format!("{} response.statusCode", label),
            format!("Status code {} not defined in provider contract", status),
        )),
        Some(response) if response.content_schema().is_none() => issues.push(Issue::error(
            format!("{} response.body", label),
            RESPONSE_SCHEMA_MISSING,
        )),
        Some(_) => {}
    }
}
