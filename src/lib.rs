//! REST resources for a test-case library.
//!
//! Exposes suites, cases, case versions and case steps (plus the products,
//! product versions, environments and tags they reference) as declarative JSON
//! resources over a pluggable async storage backend, with filtering, pagination,
//! API-key protected writes, and a case-version selection endpoint for building
//! suites.
//!
//! # Core Components
//!
//! - [`LibraryApi`] - transport-agnostic request handler
//! - [`StorageProvider`](storage::StorageProvider) - trait for storage backends
//! - [`ResourceRegistry`] - the resource definitions being served
//! - [`selection`] - order lookup, annotation and partitioning for suite editing
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use case_library::{ApiRequest, LibraryApi};
//! use case_library::storage::InMemoryStorage;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = LibraryApi::new(InMemoryStorage::new())?;
//!
//! let response = api
//!     .handle(ApiRequest::list("caseversions-selection").with_param("for_suite", "1"))
//!     .await;
//! println!("{}", response.body["objects"]["selected"]);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod error;
pub mod handler;
pub mod model;
pub mod query;
pub mod resource;
pub mod selection;
pub mod storage;

// Re-export commonly used types for convenience
pub use error::{ApiError, ApiResult, BuildError, ValidationError};
pub use handler::{ApiConfig, ApiRequest, ApiResponse, LibraryApi, LibraryApiBuilder};
pub use model::Library;
pub use query::QueryParams;
pub use resource::{HttpMethod, ResourceDefinition, ResourceRegistry};
