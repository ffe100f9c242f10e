//! Rendering and persistence of validation results.

use std::fmt::Write as _;
use std::path::Path;

use crate::error::ReportError;
use crate::types::ValidationResult;

/// Output format for a stored result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Human-readable summary.
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl ReportFormat {
    /// Parse a format name. Returns `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

/// Plain-text summary of a run.
///
/// Failing consumers list each incompatible mock followed by its issues.
pub fn summary(result: &ValidationResult) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(out, "Validation Results for Provider: {}", result.provider_name());
    let _ = writeln!(out, "Schema: {}", result.schema_path());
    let _ = writeln!(
        out,
        "Timestamp: {}\n",
        result.timestamp().format("%Y-%m-%d %H:%M:%S")
    );

    if result.overall_success() {
        out.push_str("✓ Overall: All consumer contracts are compatible\n\n");
    } else {
        out.push_str("✗ Overall: Some consumer contracts are incompatible\n\n");
    }

    out.push_str("Consumer Results:\n");
    if result.consumer_results().is_empty() {
        out.push_str("  (no mocks found)\n");
    }

    for (name, consumer) in result.consumer_results() {
        if consumer.success() {
            let _ = writeln!(out, "  ✓ {}: All expectations met", name);
            continue;
        }

        let _ = writeln!(out, "  ✗ {}: Incompatibilities found", name);
        for failure in consumer.failures() {
            let _ = writeln!(out, "    - Mock: {}", failure.mock().display_name());
            for issue in failure.issues() {
                let _ = writeln!(out, "      • {}", issue);
            }
        }
    }

    if result.skipped_count() > 0 {
        let _ = writeln!(
            out,
            "\nSkipped {} unreadable mock record(s):",
            result.skipped_count()
        );
        for skipped in result.skipped() {
            let _ = writeln!(out, "  - {}", skipped.reason);
        }
    }

    out
}

/// Pretty JSON form of a result.
pub fn to_json(result: &ValidationResult) -> Result<String, ReportError> {
    serde_json::to_string_pretty(result).map_err(|source| ReportError::Serialize { source })
}

/// Render a result in the given format.
pub fn render(result: &ValidationResult, format: ReportFormat) -> Result<String, ReportError> {
    match format {
        ReportFormat::Text => Ok(summary(result)),
        ReportFormat::Json => to_json(result),
    }
}

/// Store a result as pretty JSON.
pub fn write_results(result: &ValidationResult, path: &Path) -> Result<(), ReportError> {
    let json = to_json(result)?;
    std::fs::write(path, json).map_err(|source| ReportError::WriteError {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a stored result. Compatibility flags are recomputed from the stored
/// match results.
pub fn read_results(path: &Path) -> Result<ValidationResult, ReportError> {
    let content = std::fs::read_to_string(path).map_err(|source| ReportError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ReportError::InvalidResults { source })
}
