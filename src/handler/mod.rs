//! Framework-agnostic request handling for the library API.
//!
//! Callers translate their transport's request into an [`ApiRequest`] (method,
//! resource name, optional id, query parameters, optional JSON body) and get back
//! an [`ApiResponse`] carrying an HTTP status and JSON body. Routing, content
//! negotiation and the socket are left to the caller.
//!
//! # Key Types
//!
//! - [`LibraryApi`] - dispatches requests to list, detail and write handlers
//! - [`LibraryApiBuilder`] / [`ApiConfig`] - URL prefix and pagination settings
//! - [`ApiRequest`] / [`ApiResponse`] - the structured request and response
//!
//! # Examples
//!
//! ```rust,no_run
//! use case_library::handler::{ApiRequest, LibraryApi};
//! use case_library::storage::InMemoryStorage;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = LibraryApi::builder(InMemoryStorage::new())
//!     .with_base_path("/api")
//!     .build()?;
//!
//! let request = ApiRequest::list("caseversions-selection")
//!     .with_param("for_suite", "3")
//!     .with_param("productversion", "2");
//! let response = api.handle(request).await;
//! assert_eq!(response.status, 200);
//! # Ok(())
//! # }
//! ```

mod builder;
mod core;
mod errors;
mod handlers;
mod request;
mod response;

pub use builder::{ApiConfig, LibraryApiBuilder};
pub use core::LibraryApi;
pub use errors::create_error_response;
pub use request::ApiRequest;
pub use response::ApiResponse;
