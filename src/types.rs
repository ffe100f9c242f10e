//! Core types for contract verification results.
//!
//! Compatibility flags are derived: a [`MatchResult`] is compatible iff it
//! holds no error issue, a [`ConsumerResult`] succeeds iff all its match
//! results are compatible, and a [`ValidationResult`] succeeds iff all its
//! consumers do. None of them can be set directly, and deserializing a stored
//! result recomputes them.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MockError;
use crate::mock::Mock;

/// Severity of a compatibility issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One structural discrepancy between a mock and the provider schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Offending schema location, e.g. `"GET /orders/{id} response.statusCode"`.
    pub path: String,
    /// Human-readable cause.
    pub description: String,
    pub severity: Severity,
}

impl Issue {
    pub fn error(path: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            description: description.into(),
            severity: Severity::Error,
        }
    }

    pub fn warning(path: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            description: description.into(),
            severity: Severity::Warning,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.description)
    }
}

/// Verdict for one mock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredMatchResult")]
pub struct MatchResult {
    mock: Mock,
    is_compatible: bool,
    issues: Vec<Issue>,
}

#[derive(Deserialize)]
struct StoredMatchResult {
    mock: Mock,
    #[serde(default)]
    issues: Vec<Issue>,
}

impl From<StoredMatchResult> for MatchResult {
    fn from(stored: StoredMatchResult) -> Self {
        MatchResult::new(stored.mock, stored.issues)
    }
}

impl MatchResult {
    /// Build a result; compatibility follows from the issue severities.
    pub fn new(mock: Mock, issues: Vec<Issue>) -> Self {
        let is_compatible = !issues.iter().any(Issue::is_error);
        Self {
            mock,
            is_compatible,
            issues,
        }
    }

    pub fn mock(&self) -> &Mock {
        &self.mock
    }

    pub fn is_compatible(&self) -> bool {
        self.is_compatible
    }

    /// Issues in the order they were raised.
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Issues with error severity.
    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.is_error())
    }
}

/// All verdicts for one consumer, in encounter order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredConsumerResult")]
pub struct ConsumerResult {
    consumer_name: String,
    match_results: Vec<MatchResult>,
    success: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredConsumerResult {
    consumer_name: String,
    #[serde(default)]
    match_results: Vec<MatchResult>,
}

impl From<StoredConsumerResult> for ConsumerResult {
    fn from(stored: StoredConsumerResult) -> Self {
        let mut result = ConsumerResult::new(stored.consumer_name);
        for match_result in stored.match_results {
            result.push(match_result);
        }
        result
    }
}

impl ConsumerResult {
    pub fn new(consumer_name: impl Into<String>) -> Self {
        Self {
            consumer_name: consumer_name.into(),
            match_results: Vec::new(),
            success: true,
        }
    }

    pub(crate) fn push(&mut self, result: MatchResult) {
        self.success = self.success && result.is_compatible();
        self.match_results.push(result);
    }

    pub fn consumer_name(&self) -> &str {
        &self.consumer_name
    }

    pub fn match_results(&self) -> &[MatchResult] {
        &self.match_results
    }

    pub fn success(&self) -> bool {
        self.success
    }

    /// Match results that are not compatible.
    pub fn failures(&self) -> impl Iterator<Item = &MatchResult> {
        self.match_results.iter().filter(|r| !r.is_compatible())
    }
}

/// A mock record that was never matched because it could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedMock {
    /// Where the record came from (usually a file path).
    pub source: String,
    pub reason: String,
}

impl From<&MockError> for SkippedMock {
    fn from(err: &MockError) -> Self {
        Self {
            source: err.path().display().to_string(),
            reason: err.to_string(),
        }
    }
}

/// Outcome of one verification run for one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredValidationResult")]
pub struct ValidationResult {
    provider_name: String,
    schema_path: String,
    timestamp: DateTime<Utc>,
    consumer_results: BTreeMap<String, ConsumerResult>,
    overall_success: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    skipped: Vec<SkippedMock>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredValidationResult {
    provider_name: String,
    #[serde(default)]
    schema_path: String,
    timestamp: DateTime<Utc>,
    #[serde(default)]
    consumer_results: BTreeMap<String, ConsumerResult>,
    #[serde(default)]
    skipped: Vec<SkippedMock>,
}

impl From<StoredValidationResult> for ValidationResult {
    fn from(stored: StoredValidationResult) -> Self {
        let overall_success = stored.consumer_results.values().all(ConsumerResult::success);
        Self {
            provider_name: stored.provider_name,
            schema_path: stored.schema_path,
            timestamp: stored.timestamp,
            consumer_results: stored.consumer_results,
            overall_success,
            skipped: stored.skipped,
        }
    }
}

impl ValidationResult {
    /// Start an empty result stamped with the current time.
    pub(crate) fn new(provider_name: impl Into<String>, schema_path: impl Into<String>) -> Self {
        Self::at(provider_name, schema_path, Utc::now())
    }

    pub(crate) fn at(
        provider_name: impl Into<String>,
        schema_path: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            provider_name: provider_name.into(),
            schema_path: schema_path.into(),
            timestamp,
            consumer_results: BTreeMap::new(),
            overall_success: true,
            skipped: Vec::new(),
        }
    }

    /// Append a verdict to its consumer's results.
    pub(crate) fn record(&mut self, result: MatchResult) {
        let consumer = result.mock().consumer.clone();
        let entry = self
            .consumer_results
            .entry(consumer.clone())
            .or_insert_with(|| ConsumerResult::new(consumer));
        entry.push(result);
        self.overall_success = self.consumer_results.values().all(ConsumerResult::success);
    }

    pub(crate) fn record_skipped(&mut self, skipped: SkippedMock) {
        self.skipped.push(skipped);
    }

    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    pub fn schema_path(&self) -> &str {
        &self.schema_path
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn overall_success(&self) -> bool {
        self.overall_success
    }

    /// Per-consumer results keyed by consumer name.
    pub fn consumer_results(&self) -> &BTreeMap<String, ConsumerResult> {
        &self.consumer_results
    }

    pub fn consumer(&self, name: &str) -> Option<&ConsumerResult> {
        self.consumer_results.get(name)
    }

    pub fn consumers(&self) -> impl Iterator<Item = &str> {
        self.consumer_results.keys().map(String::as_str)
    }

    pub fn skipped(&self) -> &[SkippedMock] {
        &self.skipped
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Number of mocks that were matched.
    pub fn total_mocks(&self) -> usize {
        self.consumer_results
            .values()
            .map(|c| c.match_results().len())
            .sum()
    }

    pub fn incompatible_mocks(&self) -> usize {
        self.consumer_results
            .values()
            .map(|c| c.failures().count())
            .sum()
    }
}

/// Options for a verification run.
#[derive(Debug, Clone)]
pub struct VerifyOptions {
    /// Provider schema source: file path or URL.
    pub schema: String,
    /// Directory searched recursively for `*.json` mock files.
    pub mocks_dir: PathBuf,
    /// Provider to verify. Defaults to the schema's parent directory name.
    pub provider: Option<String>,
    /// Base URL of the provider service. Recorded for reporting, never contacted.
    pub provider_url: Option<String>,
}

impl VerifyOptions {
    pub fn new(schema: impl Into<String>, mocks_dir: impl Into<PathBuf>) -> Self {
        Self {
            schema: schema.into(),
            mocks_dir: mocks_dir.into(),
            provider: None,
            provider_url: None,
        }
    }

    /// Verify mocks of this provider instead of deriving it from the schema path.
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn provider_url(mut self, url: impl Into<String>) -> Self {
        self.provider_url = Some(url.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock(consumer: &str) -> Mock {
        Mock::new("order-service", consumer, "GET", "/orders", 200)
    }

    fn compatible(consumer: &str) -> MatchResult {
        MatchResult::new(mock(consumer), vec![])
    }

    fn incompatible(consumer: &str) -> MatchResult {
        MatchResult::new(
            mock(consumer),
            vec![Issue::error("/orders", "Endpoint not found in provider schema")],
        )
    }

    fn assert_flags_consistent(result: &ValidationResult) {
        for consumer in result.consumer_results().values() {
            let expected = consumer.match_results().iter().all(|m| m.is_compatible());
            assert_eq!(consumer.success(), expected);
        }
        let expected = result.consumer_results().values().all(|c| c.success());
        assert_eq!(result.overall_success(), expected);
    }

    #[test]
    fn warnings_do_not_break_compatibility() {
        let result = MatchResult::new(mock("web"), vec![Issue::warning("GET /orders", "deprecated")]);
        assert!(result.is_compatible());
        assert_eq!(result.errors().count(), 0);
    }

    #[test]
    fn error_breaks_compatibility() {
        let result = MatchResult::new(
            mock("web"),
            vec![
                Issue::warning("GET /orders", "deprecated"),
                Issue::error("GET /orders response.body", "missing"),
            ],
        );
        assert!(!result.is_compatible());
        assert_eq!(result.errors().count(), 1);
    }

    #[test]
    fn consumer_success_tracks_every_push() {
        let mut consumer = ConsumerResult::new("web");
        assert!(consumer.success());

        consumer.push(compatible("web"));
        assert!(consumer.success());

        consumer.push(incompatible("web"));
        assert!(!consumer.success());

        consumer.push(compatible("web"));
        assert!(!consumer.success());
        assert_eq!(consumer.failures().count(), 1);
    }

    #[test]
    fn overall_success_recomputed_after_each_record() {
        let mut result = ValidationResult::new("order-service", "openapi.yaml");
        assert!(result.overall_success());
        assert_flags_consistent(&result);

        for match_result in [
            compatible("web"),
            compatible("billing"),
            incompatible("billing"),
            compatible("web"),
        ] {
            result.record(match_result);
            assert_flags_consistent(&result);
        }

        assert!(!result.overall_success());
        assert!(result.consumer("web").unwrap().success());
        assert!(!result.consumer("billing").unwrap().success());
        assert_eq!(result.total_mocks(), 4);
        assert_eq!(result.incompatible_mocks(), 1);
    }

    #[test]
    fn record_keeps_encounter_order() {
        let mut result = ValidationResult::new("order-service", "openapi.yaml");
        for endpoint in ["/a", "/b", "/c"] {
            let m = Mock::new("order-service", "web", "GET", endpoint, 200);
            result.record(MatchResult::new(m, vec![]));
        }
        let endpoints: Vec<_> = result
            .consumer("web")
            .unwrap()
            .match_results()
            .iter()
            .map(|r| r.mock().request.endpoint.as_str())
            .collect();
        assert_eq!(endpoints, vec!["/a", "/b", "/c"]);
    }

    #[test]
    fn skipped_does_not_affect_success() {
        let mut result = ValidationResult::new("order-service", "openapi.yaml");
        result.record(compatible("web"));
        result.record_skipped(SkippedMock {
            source: "mocks/bad.json".into(),
            reason: "invalid mock".into(),
        });
        assert!(result.overall_success());
        assert_eq!(result.skipped_count(), 1);
    }

    #[test]
    fn deserialize_recomputes_flags() {
        let mut result = ValidationResult::new("order-service", "openapi.yaml");
        result.record(incompatible("web"));

        let mut value = serde_json::to_value(&result).unwrap();
        value["overallSuccess"] = serde_json::Value::Bool(true);
        value["consumerResults"]["web"]["success"] = serde_json::Value::Bool(true);
        value["consumerResults"]["web"]["matchResults"][0]["isCompatible"] =
            serde_json::Value::Bool(true);

        let loaded: ValidationResult = serde_json::from_value(value).unwrap();
        assert!(!loaded.overall_success());
        assert!(!loaded.consumer("web").unwrap().success());
        assert!(!loaded.consumer("web").unwrap().match_results()[0].is_compatible());
        assert_eq!(loaded, result);
    }

    #[test]
    fn serialized_field_names() {
        let mut result = ValidationResult::new("order-service", "openapi.yaml");
        result.record(incompatible("web"));
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["providerName"], "order-service");
        assert_eq!(value["schemaPath"], "openapi.yaml");
        assert_eq!(value["overallSuccess"], false);
        let web = &value["consumerResults"]["web"];
        assert_eq!(web["consumerName"], "web");
        assert_eq!(web["matchResults"][0]["isCompatible"], false);
        assert_eq!(web["matchResults"][0]["issues"][0]["severity"], "error");
        assert!(value.get("skipped").is_none());
    }

    #[test]
    fn verify_options_builder() {
        let opts = VerifyOptions::new("openapi.yaml", "mocks")
            .provider("order-service")
            .provider_url("http://localhost:8080");
        assert_eq!(opts.provider.as_deref(), Some("order-service"));
        assert_eq!(opts.provider_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(opts.mocks_dir, PathBuf::from("mocks"));
    }
}
