//! Consumer-recorded interactions.
//!
//! A mock file is a JSON document:
//!
//! ```json
//! {
//!   "provider": "order-service",
//!   "consumer": "web-frontend",
//!   "description": "Create an order",
//!   "request": { "method": "POST", "endpoint": "/orders", "body": { "sku": "A1" } },
//!   "response": { "statusCode": 201, "body": { "id": "o-1" } }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One recorded request/response interaction owned by a consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mock {
    /// Provider whose schema this interaction targets.
    pub provider: String,
    /// Service that recorded the interaction.
    #[serde(default)]
    pub consumer: String,
    /// Free text, used for reporting only.
    #[serde(default)]
    pub description: String,
    pub request: MockRequest,
    pub response: MockResponse,
    /// Identifiers of other mocks this one depends on. Not interpreted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockRequest {
    pub method: String,
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockResponse {
    pub status_code: i64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl Mock {
    /// Create a mock with empty headers and bodies.
    pub fn new(
        provider: impl Into<String>,
        consumer: impl Into<String>,
        method: impl Into<String>,
        endpoint: impl Into<String>,
        status_code: i64,
    ) -> Self {
        Self {
            provider: provider.into(),
            consumer: consumer.into(),
            description: String::new(),
            request: MockRequest {
                method: method.into(),
                endpoint: endpoint.into(),
                headers: BTreeMap::new(),
                body: None,
            },
            response: MockResponse {
                status_code,
                headers: BTreeMap::new(),
                body: None,
            },
            dependencies: Vec::new(),
        }
    }

    /// Set the free-text description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the request body.
    pub fn request_body(mut self, body: Value) -> Self {
        self.request.body = Some(body);
        self
    }

    /// Set the response body.
    pub fn response_body(mut self, body: Value) -> Self {
        self.response.body = Some(body);
        self
    }

    /// Status code in the form used as a response key (`201` → `"201"`).
    pub fn status_key(&self) -> String {
        self.response.status_code.to_string()
    }

    /// `METHOD endpoint`, with the method uppercased.
    pub fn operation_label(&self) -> String {
        format!(
            "{} {}",
            self.request.method.to_ascii_uppercase(),
            self.request.endpoint
        )
    }

    /// Description if present, otherwise the operation label.
    pub fn display_name(&self) -> String {
        if self.description.trim().is_empty() {
            self.operation_label()
        } else {
            self.description.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserialize_camel_case_mock() {
        let mock: Mock = serde_json::from_value(json!({
            "provider": "order-service",
            "consumer": "web-frontend",
            "description": "Create an order",
            "request": {
                "method": "POST",
                "endpoint": "/orders",
                "headers": { "Content-Type": "application/json" },
                "body": { "sku": "A1", "quantity": 2 }
            },
            "response": { "statusCode": 201, "body": { "id": "o-1" } },
            "dependencies": ["list-products"]
        }))
        .unwrap();

        assert_eq!(mock.provider, "order-service");
        assert_eq!(mock.request.headers["Content-Type"], "application/json");
        assert_eq!(mock.response.status_code, 201);
        assert_eq!(mock.dependencies, vec!["list-products"]);
    }

    #[test]
    fn optional_fields_default() {
        let mock: Mock = serde_json::from_value(json!({
            "provider": "order-service",
            "request": { "method": "GET", "endpoint": "/orders" },
            "response": { "statusCode": 200 }
        }))
        .unwrap();

        assert!(mock.consumer.is_empty());
        assert!(mock.description.is_empty());
        assert!(mock.request.body.is_none());
        assert!(mock.dependencies.is_empty());
    }

    #[test]
    fn missing_status_code_is_rejected() {
        let result = serde_json::from_value::<Mock>(json!({
            "provider": "order-service",
            "request": { "method": "GET", "endpoint": "/orders" },
            "response": {}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn status_key_is_decimal() {
        let mock = Mock::new("order-service", "web", "get", "/orders", 404);
        assert_eq!(mock.status_key(), "404");
    }

    #[test]
    fn display_name_falls_back_to_operation() {
        let mock = Mock::new("order-service", "web", "delete", "/orders/{orderId}", 204);
        assert_eq!(mock.display_name(), "DELETE /orders/{orderId}");

        let mock = mock.description("Cancel an order");
        assert_eq!(mock.display_name(), "Cancel an order");
    }

    #[test]
    fn serialize_uses_status_code_key() {
        let mock = Mock::new("order-service", "web", "GET", "/orders", 200);
        let value = serde_json::to_value(&mock).unwrap();
        assert_eq!(value["response"]["statusCode"], 200);
        assert!(value.get("dependencies").is_none());
    }
}
