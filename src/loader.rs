//! Schema and mock loading.
//!
//! Provider schemas are loaded from YAML or JSON files, strings, or HTTP URLs
//! and converted into a typed [`Schema`]. Mocks are loaded from JSON files.

use std::path::Path;

use serde_json::{Map, Number, Value};

use crate::error::{MockError, SchemaLoadError};
use crate::mock::Mock;
use crate::schema::Schema;

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for HTTP requests (10 seconds).
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Serialization format of a schema document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFormat {
    Yaml,
    Json,
}

impl SchemaFormat {
    /// `.json` files are JSON; everything else is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SchemaFormat::Json,
            _ => SchemaFormat::Yaml,
        }
    }
}

/// Load a provider schema from a file path.
///
/// # Errors
///
/// Returns `SchemaLoadError::FileNotFound` if the file doesn't exist,
/// a parse error if it isn't valid YAML/JSON, or
/// `SchemaLoadError::InvalidSchema` if it isn't shaped like an OpenAPI document.
pub fn load_schema(path: &Path) -> Result<Schema, SchemaLoadError> {
    if !path.exists() {
        return Err(SchemaLoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| SchemaLoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    let schema = load_schema_str(&content, SchemaFormat::from_path(path))?;
    Ok(schema.with_source(path.display().to_string()))
}

/// Load a provider schema from a string.
pub fn load_schema_str(content: &str, format: SchemaFormat) -> Result<Schema, SchemaLoadError> {
    let document = parse_document(content, format)?;
    Schema::from_value(&document)
}

/// Parse a schema document into a JSON value without interpreting it.
pub fn parse_document(content: &str, format: SchemaFormat) -> Result<Value, SchemaLoadError> {
    match format {
        SchemaFormat::Json => {
            serde_json::from_str(content).map_err(|source| SchemaLoadError::InvalidJson { source })
        }
        SchemaFormat::Yaml => {
            let mut yaml: serde_yaml::Value = serde_yaml::from_str(content)
                .map_err(|source| SchemaLoadError::InvalidYaml { source })?;
            // `<<: *anchor` merge keys are left as plain keys until applied.
            yaml.apply_merge()
                .map_err(|source| SchemaLoadError::InvalidYaml { source })?;
            yaml_to_json(yaml, "")
        }
    }
}

/// Convert a YAML value into JSON.
///
/// YAML allows non-string mapping keys; OpenAPI status codes are commonly
/// written unquoted (`200:`), so scalar keys are converted to their string form.
fn yaml_to_json(value: serde_yaml::Value, pointer: &str) -> Result<Value, SchemaLoadError> {
    use serde_yaml::Value as Yaml;

    Ok(match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else {
                n.as_f64()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .ok_or_else(|| {
                        SchemaLoadError::invalid(
                            at(pointer),
                            format!("unsupported number {}", n),
                        )
                    })?
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| yaml_to_json(item, &format!("{}/{}", pointer, i)))
                .collect::<Result<_, _>>()?,
        ),
        Yaml::Mapping(mapping) => {
            let mut obj = Map::new();
            for (key, item) in mapping {
                let key = match key {
                    Yaml::String(s) => s,
                    Yaml::Number(n) => n.to_string(),
                    Yaml::Bool(b) => b.to_string(),
                    other => {
                        return Err(SchemaLoadError::invalid(
                            at(pointer),
                            format!("unsupported mapping key {:?}", other),
                        ))
                    }
                };
                let child = format!("{}/{}", pointer, key.replace('~', "~0").replace('/', "~1"));
                let converted = yaml_to_json(item, &child)?;
                obj.insert(key, converted);
            }
            Value::Object(obj)
        }
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value, pointer)?,
    })
}

fn at(pointer: &str) -> &str {
    if pointer.is_empty() {
        "/"
    } else {
        pointer
    }
}

/// Load a published provider schema from an HTTP/HTTPS URL.
///
/// Requires the `remote` feature (enabled by default). The document is read
/// as JSON when the URL ends in `.json` or the response declares a JSON
/// content type, otherwise as YAML.
///
/// # Errors
///
/// Returns `SchemaLoadError::NetworkError` if the request fails or the server
/// answers with an error status, or a parse error for a malformed document.
#[cfg(feature = "remote")]
pub fn load_schema_url(url: &str) -> Result<Schema, SchemaLoadError> {
    let network_error = |source: reqwest::Error| SchemaLoadError::NetworkError {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(network_error)?;

    let response = client.get(url).send().map_err(network_error)?;

    // Check for HTTP errors before parsing
    let response = response.error_for_status().map_err(network_error)?;

    let declares_json = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("json"))
        .unwrap_or(false);
    let format = if declares_json {
        SchemaFormat::Json
    } else {
        SchemaFormat::from_path(Path::new(url))
    };

    let content = response.text().map_err(network_error)?;
    Ok(load_schema_str(&content, format)?.with_source(url))
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Load a provider schema from a file path or URL.
///
/// URL loading requires the `remote` feature.
pub fn load_schema_auto(source: &str) -> Result<Schema, SchemaLoadError> {
    if is_url(source) {
        #[cfg(feature = "remote")]
        {
            load_schema_url(source)
        }
        #[cfg(not(feature = "remote"))]
        {
            Err(SchemaLoadError::FileNotFound {
                path: std::path::PathBuf::from(source),
            })
        }
    } else {
        load_schema(Path::new(source))
    }
}

/// Load one mock from a JSON file.
///
/// # Errors
///
/// Returns `MockError::ReadError` if the file can't be read, or
/// `MockError::InvalidMock` if it isn't a well-formed mock.
pub fn load_mock(path: &Path) -> Result<Mock, MockError> {
    let content = std::fs::read_to_string(path).map_err(|source| MockError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| MockError::InvalidMock {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    const ORDERS_YAML: &str = r#"
openapi: 3.0.0
info:
  title: order-service
  version: 1.0.0
paths:
  /orders:
    post:
      responses:
        201:
          description: Order created
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Order'
        "400":
          description: Invalid input
"#;

    fn temp_with_suffix(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn load_schema_yaml_file() {
        let file = temp_with_suffix(".yaml", ORDERS_YAML);

        let schema = load_schema(file.path()).unwrap();
        let post = schema.lookup("/orders", "POST").unwrap();
        assert!(post.response("201").unwrap().content_schema().is_some());
        assert!(post.response("400").is_some());
        assert_eq!(schema.source(), Some(file.path().display().to_string().as_str()));
    }

    #[test]
    fn load_schema_json_file() {
        let file = temp_with_suffix(
            ".json",
            r#"{"paths": {"/orders": {"get": {"responses": {"200": {}}}}}}"#,
        );

        let schema = load_schema(file.path()).unwrap();
        assert!(schema.lookup("/orders", "get").is_some());
    }

    #[test]
    fn load_schema_file_not_found() {
        let result = load_schema(Path::new("/nonexistent/openapi.yaml"));
        assert!(matches!(result, Err(SchemaLoadError::FileNotFound { .. })));
    }

    #[test]
    fn load_schema_invalid_yaml() {
        let file = temp_with_suffix(".yaml", "paths: [unclosed");
        let result = load_schema(file.path());
        assert!(matches!(result, Err(SchemaLoadError::InvalidYaml { .. })));
    }

    #[test]
    fn load_schema_invalid_json() {
        let file = temp_with_suffix(".json", "not valid json");
        let result = load_schema(file.path());
        assert!(matches!(result, Err(SchemaLoadError::InvalidJson { .. })));
    }

    #[test]
    fn load_schema_without_paths() {
        let file = temp_with_suffix(".yaml", "openapi: 3.0.0\ninfo:\n  title: x\n");
        let result = load_schema(file.path());
        assert!(matches!(result, Err(SchemaLoadError::InvalidSchema { .. })));
    }

    #[test]
    fn unquoted_status_codes_become_strings() {
        let value = parse_document(ORDERS_YAML, SchemaFormat::Yaml).unwrap();
        assert!(value["paths"]["/orders"]["post"]["responses"].get("201").is_some());
    }

    #[test]
    fn yaml_merge_keys_are_applied() {
        let yaml = r#"
x-json-object: &json-object
  content:
    application/json:
      schema: { type: object }
paths:
  /orders:
    get:
      responses:
        "200":
          <<: *json-object
          description: Found
"#;
        let schema = load_schema_str(yaml, SchemaFormat::Yaml).unwrap();
        let response = schema.lookup("/orders", "GET").unwrap().response("200").unwrap();
        assert!(response.content_schema().is_some());
        assert_eq!(response.description(), Some("Found"));
    }

    #[test]
    fn yaml_reads_json_documents() {
        let schema = load_schema_str(r#"{"paths": {"/a": {"get": {}}}}"#, SchemaFormat::Yaml).unwrap();
        assert!(schema.lookup("/a", "GET").is_some());
    }

    #[test]
    fn format_from_path() {
        assert_eq!(SchemaFormat::from_path(Path::new("openapi.json")), SchemaFormat::Json);
        assert_eq!(SchemaFormat::from_path(Path::new("openapi.JSON")), SchemaFormat::Json);
        assert_eq!(SchemaFormat::from_path(Path::new("openapi.yaml")), SchemaFormat::Yaml);
        assert_eq!(SchemaFormat::from_path(Path::new("openapi")), SchemaFormat::Yaml);
    }

    #[test]
    fn is_url_detection() {
        assert!(is_url("https://example.com/openapi.yaml"));
        assert!(is_url("http://example.com/openapi.yaml"));
        assert!(!is_url("/path/to/openapi.yaml"));
        assert!(!is_url("openapi.yaml"));
    }

    #[test]
    fn load_schema_auto_file() {
        let file = temp_with_suffix(".yaml", ORDERS_YAML);
        let schema = load_schema_auto(file.path().to_str().unwrap()).unwrap();
        assert!(schema.lookup("/orders", "post").is_some());
    }

    #[test]
    fn load_mock_valid() {
        let file = temp_with_suffix(
            ".json",
            r#"{
                "provider": "order-service",
                "consumer": "web",
                "request": {"method": "GET", "endpoint": "/orders"},
                "response": {"statusCode": 200}
            }"#,
        );
        let mock = load_mock(file.path()).unwrap();
        assert_eq!(mock.request.endpoint, "/orders");
    }

    #[test]
    fn load_mock_invalid() {
        let file = temp_with_suffix(".json", r#"{"provider": "order-service"}"#);
        let result = load_mock(file.path());
        assert!(matches!(result, Err(MockError::InvalidMock { .. })));
    }

    #[test]
    fn load_mock_missing_file() {
        let result = load_mock(Path::new("/nonexistent/mock.json"));
        assert!(matches!(result, Err(MockError::ReadError { .. })));
    }

    #[cfg(feature = "remote")]
    mod remote {
        use super::*;

        #[test]
        fn load_schema_url_yaml() {
            let mut server = mockito::Server::new();
            let mock = server
                .mock("GET", "/providers/order-service/openapi.yaml")
                .with_status(200)
                .with_header("content-type", "application/yaml")
                .with_body(ORDERS_YAML)
                .create();

            let url = format!("{}/providers/order-service/openapi.yaml", server.url());
            let schema = load_schema_url(&url).unwrap();

            mock.assert();
            assert!(schema.lookup("/orders", "post").is_some());
            assert_eq!(schema.source(), Some(url.as_str()));
        }

        #[test]
        fn load_schema_url_json_content_type() {
            let mut server = mockito::Server::new();
            let _m = server
                .mock("GET", "/swagger/doc")
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body(r#"{"paths": {"/orders": {"get": {}}}}"#)
                .create();

            let schema = load_schema_url(&format!("{}/swagger/doc", server.url())).unwrap();
            assert!(schema.lookup("/orders", "get").is_some());
        }

        #[test]
        fn load_schema_url_404() {
            let mut server = mockito::Server::new();
            let _m = server.mock("GET", "/openapi.yaml").with_status(404).create();

            let result = load_schema_url(&format!("{}/openapi.yaml", server.url()));
            assert!(matches!(result, Err(SchemaLoadError::NetworkError { .. })));
        }

        #[test]
        fn load_schema_auto_url() {
            let mut server = mockito::Server::new();
            let _m = server
                .mock("GET", "/openapi.yaml")
                .with_status(200)
                .with_body(ORDERS_YAML)
                .create();

            let result = load_schema_auto(&format!("{}/openapi.yaml", server.url()));
            assert!(result.is_ok());
        }
    }
}
