//! In-memory storage implementation for library rows.
//!
//! Thread-safe implementation of [`StorageProvider`] using ordered maps behind a
//! tokio `RwLock`. Intended for tests, development and embedding; nothing is persisted.
//!
//! # Performance Characteristics
//!
//! * PUT/GET: O(log n)
//! * LIST with pagination: O(offset + limit)
//! * FIND_BY_ATTRIBUTE: O(n) over the table
//!
//! # Example Usage
//!
//! ```rust
//! use case_library::storage::{InMemoryStorage, StorageProvider, StorageKey};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = InMemoryStorage::new();
//!
//! storage.put(StorageKey::new("suitecase", 1), json!({"id": 1, "suite_id": 4, "case_id": 9, "order": 2})).await?;
//! storage.put(StorageKey::new("suitecase", 2), json!({"id": 2, "suite_id": 5, "case_id": 9, "order": 1})).await?;
//!
//! let found = storage.find_by_attribute("suitecase", "suite_id", "4").await?;
//! assert_eq!(found.len(), 1);
//! # Ok(())
//! # }
//! ```

use crate::storage::{StorageError, StorageKey, StorageProvider};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    // table -> id -> row
    rows: HashMap<String, BTreeMap<u64, Value>>,
    // table -> last id handed out or stored
    sequences: HashMap<String, u64>,
}

/// Thread-safe in-memory storage.
///
/// Cloning is cheap; clones share the same underlying tables.
#[derive(Clone)]
pub struct InMemoryStorage {
    data: Arc<RwLock<Tables>>,
}

impl InMemoryStorage {
    /// Create a new empty in-memory storage instance.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(Tables::default())),
        }
    }

    /// Extract a nested attribute value from a row using dot notation.
    fn extract_attribute_value(data: &Value, attribute_path: &str) -> Option<String> {
        let mut current = data;

        for part in attribute_path.split('.') {
            current = match part.parse::<usize>() {
                Ok(index) => current.get(index)?,
                Err(_) => current.get(part)?,
            };
        }

        match current {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageProvider for InMemoryStorage {
    type Error = StorageError;

    async fn put(&self, key: StorageKey, data: Value) -> Result<Value, Self::Error> {
        if !data.is_object() {
            return Err(StorageError::invalid_data(
                format!("cannot store row {}", key),
                "row must be a JSON object",
            ));
        }
        if let Some(id) = data.get("id").and_then(Value::as_u64) {
            if id != key.id() {
                return Err(StorageError::invalid_data(
                    format!("cannot store row {}", key),
                    format!("row id {} does not match key", id),
                ));
            }
        }

        let mut guard = self.data.write().await;

        let sequence = guard.sequences.entry(key.table().to_string()).or_insert(0);
        if *sequence < key.id() {
            *sequence = key.id();
        }

        guard
            .rows
            .entry(key.table().to_string())
            .or_default()
            .insert(key.id(), data.clone());

        Ok(data)
    }

    async fn get(&self, key: StorageKey) -> Result<Option<Value>, Self::Error> {
        let guard = self.data.read().await;

        Ok(guard
            .rows
            .get(key.table())
            .and_then(|table| table.get(&key.id()))
            .cloned())
    }

    async fn list(
        &self,
        table: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<(StorageKey, Value)>, Self::Error> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let guard = self.data.read().await;

        let rows = match guard.rows.get(table) {
            Some(rows) => rows,
            None => return Ok(Vec::new()),
        };

        Ok(rows
            .iter()
            .skip(offset)
            .take(limit)
            .map(|(id, row)| (StorageKey::new(table, *id), row.clone()))
            .collect())
    }

    async fn find_by_attribute(
        &self,
        table: &str,
        attribute: &str,
        value: &str,
    ) -> Result<Vec<(StorageKey, Value)>, Self::Error> {
        let guard = self.data.read().await;

        let rows = match guard.rows.get(table) {
            Some(rows) => rows,
            None => return Ok(Vec::new()),
        };

        Ok(rows
            .iter()
            .filter(|(_, row)| {
                Self::extract_attribute_value(row, attribute).as_deref() == Some(value)
            })
            .map(|(id, row)| (StorageKey::new(table, *id), row.clone()))
            .collect())
    }

    async fn exists(&self, key: StorageKey) -> Result<bool, Self::Error> {
        let guard = self.data.read().await;

        Ok(guard
            .rows
            .get(key.table())
            .is_some_and(|table| table.contains_key(&key.id())))
    }

    async fn count(&self, table: &str) -> Result<usize, Self::Error> {
        let guard = self.data.read().await;
        Ok(guard.rows.get(table).map(BTreeMap::len).unwrap_or(0))
    }

    async fn next_id(&self, table: &str) -> Result<u64, Self::Error> {
        let mut guard = self.data.write().await;
        let sequence = guard.sequences.entry(table.to_string()).or_insert(0);
        *sequence += 1;
        Ok(*sequence)
    }
}
