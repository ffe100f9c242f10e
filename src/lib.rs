//! Contract Verifier
//!
//! Provider-driven contract verification: checks consumer mocks against a
//! provider's OpenAPI-style schema and reports, per consumer, which
//! expectations the provider does not honor.
//!
//! This library loads a provider schema, matches every mock recorded for that
//! provider against it, and aggregates the verdicts into a
//! [`ValidationResult`].
//!
//! # Example
//!
//! ```
//! use contract_verifier::{load_schema_str, validate, MemoryMockSource, Mock, SchemaFormat};
//!
//! let schema = load_schema_str(
//!     r#"
//! paths:
//!   /orders:
//!     post:
//!       responses:
//!         "201":
//!           content:
//!             application/json:
//!               schema: { type: object }
//! "#,
//!     SchemaFormat::Yaml,
//! )
//! .unwrap();
//!
//! let mocks = MemoryMockSource::from(vec![
//!     Mock::new("order-service", "web-frontend", "POST", "/orders", 201),
//!     Mock::new("order-service", "billing", "DELETE", "/orders", 204),
//! ]);
//!
//! let result = validate(&schema, &mocks, "order-service").unwrap();
//!
//! assert!(!result.overall_success());
//! assert!(result.consumer("web-frontend").unwrap().success());
//! assert!(!result.consumer("billing").unwrap().success());
//! ```
//!
//! # Issue paths
//!
//! | Problem | Issue path |
//! |---------|------------|
//! | Endpoint absent | `<endpoint>` |
//! | Method absent | `<METHOD> <endpoint>` |
//! | Status absent | `<METHOD> <endpoint> response.statusCode` |
//! | No JSON response schema | `<METHOD> <endpoint> response.body` |
//!
//! Matching stops at the first failing step, so a mock carries at most one
//! error.

mod error;
mod loader;
mod matcher;
mod mock;
mod report;
mod repository;
mod schema;
mod types;
mod validator;

pub use error::{MockError, ReportError, RepositoryError, SchemaLoadError, VerifyError};
pub use loader::{
    is_url, load_mock, load_schema, load_schema_auto, load_schema_str, parse_document,
    SchemaFormat,
};
pub use matcher::{
    find_issues, match_mock, ENDPOINT_NOT_FOUND, METHOD_NOT_SUPPORTED, RESPONSE_SCHEMA_MISSING,
};
pub use mock::{Mock, MockRequest, MockResponse};
pub use report::{read_results, render, summary, to_json, write_results, ReportFormat};
pub use repository::{
    ContractRepository, DirectoryMockSource, MemoryMockSource, MockRecord, MockSource,
    PROVIDER_SCHEMA_FILE,
};
pub use schema::{
    json_type_name, Operation, PathItem, ResponseSpec, Schema, HTTP_METHODS, JSON_MEDIA_TYPE,
};
pub use types::{
    ConsumerResult, Issue, MatchResult, Severity, SkippedMock, ValidationResult, VerifyOptions,
};
pub use validator::{provider_name_from_schema_path, validate, Validator};

#[cfg(feature = "remote")]
pub use loader::load_schema_url;
