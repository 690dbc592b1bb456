use serde_json::Value;

/// Status, JSON body and headers of a handled request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
    /// `Location` of a created row
    pub location: Option<String>,
    pub request_id: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self {
            status,
            body,
            location: None,
            request_id: String::new(),
        }
    }

    pub fn ok(body: Value) -> Self {
        Self::new(200, body)
    }

    pub fn created(body: Value, location: String) -> Self {
        Self {
            location: Some(location),
            ..Self::new(201, body)
        }
    }

    pub fn accepted(body: Value) -> Self {
        Self::new(202, body)
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
