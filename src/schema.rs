//! Typed, read-only projection of a provider's OpenAPI document.
//!
//! The raw document is converted once into [`Schema`] / [`PathItem`] /
//! [`Operation`] / [`ResponseSpec`]. Only the parts contract verification
//! looks at are kept: which paths exist, which methods each path supports,
//! whether a request body schema is declared and which status codes carry a
//! JSON response schema.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::SchemaLoadError;

/// HTTP methods recognised as operations inside an OpenAPI path item.
///
/// Other path item keys (`parameters`, `summary`, `servers`, ...) are ignored.
pub const HTTP_METHODS: &[&str] = &[
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Media type whose schema counts as "the response schema".
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A parsed provider schema.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    source: Option<String>,
    paths: BTreeMap<String, PathItem>,
}

/// The operations declared under one endpoint path, keyed by lowercase method.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathItem {
    operations: BTreeMap<String, Operation>,
}

/// One method on one path.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Operation {
    request_schema: Option<Value>,
    responses: BTreeMap<String, ResponseSpec>,
}

/// A declared response for one status code.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResponseSpec {
    description: Option<String>,
    content_schema: Option<Value>,
}

impl Schema {
    /// Convert a raw OpenAPI document into a typed schema.
    ///
    /// The document must be an object with a `paths` object. Every path item
    /// and every operation must be an object as well.
    ///
    /// # Errors
    ///
    /// Returns `SchemaLoadError::InvalidSchema` naming the JSON Pointer of the
    /// first malformed node.
    pub fn from_value(document: &Value) -> Result<Self, SchemaLoadError> {
        let root = expect_object(document, "")?;
        let paths_value = root
            .get("paths")
            .ok_or_else(|| SchemaLoadError::invalid("/", "missing \"paths\""))?;
        let paths_obj = expect_object(paths_value, "/paths")?;

        let mut paths = BTreeMap::new();
        for (endpoint, item) in paths_obj {
            let pointer = format!("/paths/{}", escape_pointer(endpoint));
            paths.insert(endpoint.clone(), PathItem::from_value(item, &pointer)?);
        }

        Ok(Schema {
            source: None,
            paths,
        })
    }

    /// Attach the location this schema was loaded from.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Where the schema was loaded from, if known.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Find the operation for an endpoint and method.
    ///
    /// The endpoint must equal a declared path key exactly: `/orders/{id}`
    /// does not match `/orders/123`. The method is case-insensitive.
    pub fn lookup(&self, endpoint: &str, method: &str) -> Option<&Operation> {
        self.path(endpoint)?.operation(method)
    }

    /// Find a path item by exact endpoint string.
    pub fn path(&self, endpoint: &str) -> Option<&PathItem> {
        self.paths.get(endpoint)
    }

    /// Declared endpoint paths, sorted.
    pub fn endpoints(&self) -> impl Iterator<Item = &str> {
        self.paths.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl PathItem {
    fn from_value(value: &Value, pointer: &str) -> Result<Self, SchemaLoadError> {
        let obj = expect_object(value, pointer)?;
        let mut operations = BTreeMap::new();

        for (key, op) in obj {
            let method = key.to_ascii_lowercase();
            if !HTTP_METHODS.contains(&method.as_str()) {
                continue;
            }
            let op_pointer = format!("{}/{}", pointer, key);
            if operations.contains_key(&method) {
                return Err(SchemaLoadError::invalid(
                    op_pointer,
                    format!("duplicate operation for method {}", method.to_uppercase()),
                ));
            }
            operations.insert(method, Operation::from_value(op, &op_pointer)?);
        }

        Ok(PathItem { operations })
    }

    /// Find an operation by method, ignoring case.
    pub fn operation(&self, method: &str) -> Option<&Operation> {
        self.operations.get(&method.to_ascii_lowercase())
    }

    /// Lowercase method names declared on this path.
    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }
}

impl Operation {
    fn from_value(value: &Value, pointer: &str) -> Result<Self, SchemaLoadError> {
        let obj = expect_object(value, pointer)?;

        let request_schema = match obj.get("requestBody") {
            Some(body) => {
                let body_pointer = format!("{}/requestBody", pointer);
                json_content_schema(expect_object(body, &body_pointer)?, &body_pointer)?
            }
            None => None,
        };

        let mut responses = BTreeMap::new();
        if let Some(value) = obj.get("responses") {
            let responses_pointer = format!("{}/responses", pointer);
            for (status, response) in expect_object(value, &responses_pointer)? {
                let response_pointer = format!("{}/{}", responses_pointer, escape_pointer(status));
                responses.insert(
                    status.clone(),
                    ResponseSpec::from_value(response, &response_pointer)?,
                );
            }
        }

        Ok(Operation {
            request_schema,
            responses,
        })
    }

    /// JSON schema of the request body, when one is declared.
    pub fn request_schema(&self) -> Option<&Value> {
        self.request_schema.as_ref()
    }

    /// Find the response declared for a status code key (e.g. `"201"`).
    pub fn response(&self, status: &str) -> Option<&ResponseSpec> {
        self.responses.get(status)
    }

    /// Declared status code keys, sorted.
    pub fn status_codes(&self) -> impl Iterator<Item = &str> {
        self.responses.keys().map(String::as_str)
    }
}

impl ResponseSpec {
    fn from_value(value: &Value, pointer: &str) -> Result<Self, SchemaLoadError> {
        let obj = expect_object(value, pointer)?;
        Ok(ResponseSpec {
            description: obj
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string),
            content_schema: json_content_schema(obj, pointer)?,
        })
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// JSON schema of the response body, when one is declared.
    pub fn content_schema(&self) -> Option<&Value> {
        self.content_schema.as_ref()
    }
}

/// Extract `content.application/json.schema` from a request body or response.
///
/// Media type parameters are ignored, so `application/json; charset=utf-8`
/// counts as JSON. The first JSON entry that carries a schema wins.
fn json_content_schema(
    obj: &Map<String, Value>,
    pointer: &str,
) -> Result<Option<Value>, SchemaLoadError> {
    let Some(content) = obj.get("content") else {
        return Ok(None);
    };
    let content_pointer = format!("{}/content", pointer);

    for (media_type, media) in expect_object(content, &content_pointer)? {
        if !is_json_media_type(media_type) {
            continue;
        }
        let media_pointer = format!("{}/{}", content_pointer, escape_pointer(media_type));
        let media_obj = expect_object(media, &media_pointer)?;
        match media_obj.get("schema") {
            Some(schema @ Value::Object(_)) => return Ok(Some(schema.clone())),
            Some(Value::Bool(true)) => return Ok(Some(Value::Bool(true))),
            _ => {}
        }
    }

    Ok(None)
}

fn is_json_media_type(media_type: &str) -> bool {
    media_type
        .split(';')
        .next()
        .map(|essence| essence.trim().eq_ignore_ascii_case(JSON_MEDIA_TYPE))
        .unwrap_or(false)
}

fn expect_object<'a>(
    value: &'a Value,
    pointer: &str,
) -> Result<&'a Map<String, Value>, SchemaLoadError> {
    value.as_object().ok_or_else(|| {
        let at = if pointer.is_empty() { "/" } else { pointer };
        SchemaLoadError::invalid(
            at,
            format!("expected object, got {}", json_type_name(value)),
        )
    })
}

/// Escape a key for use in a JSON Pointer (`~` → `~0`, `/` → `~1`).
fn escape_pointer(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}
