//! Error response creation shared by all handlers.

use crate::error::ApiError;
use crate::handler::ApiResponse;
use serde_json::json;

/// Create an error response from an ApiError.
///
/// The body is `{"error": message, "code": CODE}` with the error's HTTP status.
pub fn create_error_response(error: ApiError, request_id: String) -> ApiResponse {
    let message = match &error {
        // storage details stay in the logs
        ApiError::Storage(_) => "Storage error".to_string(),
        _ => error.to_string(),
    };

    ApiResponse::new(
        error.status_code(),
        json!({
            "error": message,
            "code": error.code(),
        }),
    )
    .with_request_id(request_id)
}
