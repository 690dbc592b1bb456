//! Structured requests and their builder methods.

use crate::query::QueryParams;
use crate::resource::HttpMethod;
use serde_json::Value;

/// A request to one resource endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    /// Resource name, e.g. `caseversion`
    pub resource: String,
    /// Present for detail endpoints
    pub id: Option<String>,
    pub params: QueryParams,
    pub body: Option<Value>,
    /// Request ID for tracing; generated when absent
    pub request_id: Option<String>,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, resource: impl Into<String>) -> Self {
        Self {
            method,
            resource: resource.into(),
            id: None,
            params: QueryParams::new(),
            body: None,
            request_id: None,
        }
    }

    /// GET on the list endpoint.
    pub fn list(resource: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, resource)
    }

    /// GET on a detail endpoint.
    pub fn get(resource: impl Into<String>, id: impl ToString) -> Self {
        Self::new(HttpMethod::Get, resource).with_id(id)
    }

    /// POST to the list endpoint.
    pub fn create(resource: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Post, resource).with_body(body)
    }

    /// PUT on a detail endpoint.
    pub fn update(resource: impl Into<String>, id: impl ToString, body: Value) -> Self {
        Self::new(HttpMethod::Put, resource)
            .with_id(id)
            .with_body(body)
    }

    /// PUT on the list endpoint; `body` carries an `objects` array.
    pub fn bulk_update(resource: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Put, resource).with_body(body)
    }

    pub fn with_id(mut self, id: impl ToString) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push(key, value);
        self
    }

    pub fn with_params(mut self, params: QueryParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Add `username` and `api_key` query parameters.
    pub fn with_credentials(self, username: impl Into<String>, api_key: impl Into<String>) -> Self {
        self.with_param("username", username)
            .with_param("api_key", api_key)
    }

    /// Add request ID to the request.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Whether the request targets a detail endpoint.
    pub fn is_detail(&self) -> bool {
        self.id.is_some()
    }
}
