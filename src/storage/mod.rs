//! Storage abstraction layer for library rows.
//!
//! The `StorageProvider` trait defines pure data storage operations over JSON rows,
//! keyed by table name and a numeric id. It knows nothing about resources, URIs,
//! filters or authorization; those live in the resource and handler layers.
//!
//! # Architecture
//!
//! The storage layer is responsible for:
//! - Pure PUT/GET operations on JSON rows
//! - Id allocation per table
//! - Exact-match attribute lookups (the "foreign key" queries)
//! - Consistent (ascending id) ordering of listings
//!
//! The storage layer is NOT responsible for:
//! - Related-field resolution or nested representations
//! - Filter DSL evaluation
//! - Authentication or authorization
//!
//! # Example Usage
//!
//! ```rust
//! use case_library::storage::{StorageProvider, StorageKey, InMemoryStorage};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = InMemoryStorage::new();
//!
//! let id = storage.next_id("suite").await?;
//! let key = StorageKey::new("suite", id);
//! storage.put(key.clone(), json!({"id": id, "name": "Smoke"})).await?;
//!
//! let retrieved = storage.get(key).await?;
//! assert!(retrieved.is_some());
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod in_memory;

pub use errors::StorageError;
pub use in_memory::InMemoryStorage;

use serde_json::Value;
use std::fmt;
use std::future::Future;

/// Key identifying a single row: `table` → `id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey {
    table: String,
    id: u64,
}

impl StorageKey {
    /// Create a new storage key.
    pub fn new(table: impl Into<String>, id: u64) -> Self {
        Self {
            table: table.into(),
            id,
        }
    }

    /// Get the table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Get the row id.
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.table, self.id)
    }
}

/// Core trait for storage providers that handle pure row persistence.
///
/// # Design Principles
///
/// - **PUT/GET Model**: create and update are both PUT
/// - **PUT Returns Data**: the stored row is handed back so callers can respond without a re-read
/// - **Ordered Listings**: rows come back in ascending id order
pub trait StorageProvider: Send + Sync {
    /// The error type returned by storage operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Store a row at the specified key and return the stored row.
    ///
    /// An existing row under the same key is replaced entirely.
    fn put(
        &self,
        key: StorageKey,
        data: Value,
    ) -> impl Future<Output = Result<Value, Self::Error>> + Send;

    /// Retrieve a row by key. `None` if it doesn't exist.
    fn get(
        &self,
        key: StorageKey,
    ) -> impl Future<Output = Result<Option<Value>, Self::Error>> + Send;

    /// List rows of a table with pagination, ordered by ascending id.
    ///
    /// If `offset` exceeds the row count, or `limit` is 0, an empty vector is returned.
    fn list(
        &self,
        table: &str,
        offset: usize,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<(StorageKey, Value)>, Self::Error>> + Send;

    /// Find rows whose attribute (dot notation for nesting) equals `value`.
    ///
    /// Values are compared by their string form, so `"3"` matches both `3` and `"3"`.
    /// Results are ordered by ascending id and are not paginated.
    fn find_by_attribute(
        &self,
        table: &str,
        attribute: &str,
        value: &str,
    ) -> impl Future<Output = Result<Vec<(StorageKey, Value)>, Self::Error>> + Send;

    /// Check whether a row exists.
    fn exists(&self, key: StorageKey) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// Count the rows in a table.
    fn count(&self, table: &str) -> impl Future<Output = Result<usize, Self::Error>> + Send;

    /// Allocate the next id for a table.
    ///
    /// Ids start at 1 and are never handed out twice.
    fn next_id(&self, table: &str) -> impl Future<Output = Result<u64, Self::Error>> + Send;
}
