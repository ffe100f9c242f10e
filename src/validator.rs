//! Aggregation of per-mock verdicts into a provider-wide result.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::VerifyError;
use crate::loader::load_schema_auto;
use crate::matcher::match_mock;
use crate::repository::{DirectoryMockSource, MockSource};
use crate::schema::Schema;
use crate::types::{SkippedMock, ValidationResult, VerifyOptions};

/// Verify every mock of `provider` against `schema`.
///
/// Mocks are matched in the order the source returns them and grouped by
/// consumer. Records that failed to load are skipped and listed in
/// [`ValidationResult::skipped`]; they never count as incompatible. Mocks of
/// other providers are dropped before matching.
///
/// # Errors
///
/// Returns `VerifyError::Repository` if the source cannot enumerate its mocks.
/// Incompatible mocks are not errors.
pub fn validate<S>(
    schema: &Schema,
    source: &S,
    provider: &str,
) -> Result<ValidationResult, VerifyError>
where
    S: MockSource + ?Sized,
{
    let records = source.list_mocks_for_provider(provider)?;
    let mut result = ValidationResult::new(provider, schema.source().unwrap_or_default());

    for record in records {
        let mock = match record {
            Ok(mock) => mock,
            Err(e) => {
                warn!(error = %e, "skipping mock");
                result.record_skipped(SkippedMock::from(&e));
                continue;
            }
        };

        if mock.provider != provider {
            debug!(provider = %mock.provider, "ignoring mock of another provider");
            continue;
        }

        let matched = match_mock(schema, &mock);
        debug!(
            consumer = %mock.consumer,
            operation = %mock.operation_label(),
            status = mock.response.status_code,
            compatible = matched.is_compatible(),
            "matched mock"
        );
        result.record(matched);
    }

    if result.total_mocks() == 0 {
        warn!(provider, "no mocks found for provider");
    }

    info!(
        provider,
        consumers = result.consumer_results().len(),
        mocks = result.total_mocks(),
        incompatible = result.incompatible_mocks(),
        skipped = result.skipped_count(),
        success = result.overall_success(),
        "verification complete"
    );

    Ok(result)
}

/// Runs a verification from [`VerifyOptions`]: loads the schema, then
/// validates the mocks found under the mocks directory.
#[derive(Debug, Clone)]
pub struct Validator {
    options: VerifyOptions,
}

impl Validator {
    pub fn new(options: VerifyOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &VerifyOptions {
        &self.options
    }

    /// # Errors
    ///
    /// `VerifyError::Schema` if the schema can't be loaded,
    /// `VerifyError::MissingProvider` if no provider was given and none can be
    /// derived from the schema path, `VerifyError::Repository` if the mocks
    /// directory can't be read.
    pub fn run(&self) -> Result<ValidationResult, VerifyError> {
        let schema = load_schema_auto(&self.options.schema)?;

        let provider = match &self.options.provider {
            Some(provider) => provider.clone(),
            None => provider_name_from_schema_path(&self.options.schema).ok_or_else(|| {
                VerifyError::MissingProvider {
                    schema: self.options.schema.clone(),
                }
            })?,
        };

        if let Some(url) = &self.options.provider_url {
            debug!(provider = %provider, url = %url, "provider base URL");
        }

        let source = DirectoryMockSource::new(self.options.mocks_dir.clone());
        validate(&schema, &source, &provider)
    }
}

/// The provider a schema belongs to: its parent directory's name.
///
/// `contracts/providers/order-service/openapi.yaml` → `order-service`.
pub fn provider_name_from_schema_path(schema: &str) -> Option<String> {
    Path::new(schema)
        .parent()?
        .file_name()?
        .to_str()
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}
