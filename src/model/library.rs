//! Typed repository over a [`StorageProvider`].

use crate::error::{ApiError, ApiResult};
use crate::model::{Case, Record, SuiteCase, User};
use crate::storage::{StorageError, StorageKey, StorageProvider};
use serde_json::Value;

/// Typed access to library rows.
///
/// Wraps a storage backend and (de)serializes rows into [`Record`] types.
/// Storage failures surface as [`ApiError::Storage`].
#[derive(Clone)]
pub struct Library<S> {
    storage: S,
}

impl<S: StorageProvider> Library<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Access the underlying storage backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Allocate a fresh id in the record's table.
    pub async fn allocate_id<R: Record>(&self) -> ApiResult<u64> {
        self.next_row_id(R::TABLE).await
    }

    /// Store a record, replacing any row with the same id.
    pub async fn save<R: Record>(&self, record: &R) -> ApiResult<()> {
        let row = serde_json::to_value(record)?;
        self.put_row(R::TABLE, record.id(), row).await?;
        Ok(())
    }

    /// Fetch a record by id.
    pub async fn get<R: Record>(&self, id: u64) -> ApiResult<Option<R>> {
        match self.get_row(R::TABLE, id).await? {
            Some(row) => decode::<R>(row).map(Some),
            None => Ok(None),
        }
    }

    /// Fetch every record of a type in ascending id order.
    pub async fn all<R: Record>(&self) -> ApiResult<Vec<R>> {
        self.rows(R::TABLE)
            .await?
            .into_iter()
            .map(decode::<R>)
            .collect()
    }

    /// Fetch the records whose `attribute` equals `value`.
    pub async fn find<R: Record>(&self, attribute: &str, value: &str) -> ApiResult<Vec<R>> {
        self.find_rows(R::TABLE, attribute, value)
            .await?
            .into_iter()
            .map(decode::<R>)
            .collect()
    }

    /// SuiteCase rows for a suite, in ascending id order.
    pub async fn suitecases_for_suite(&self, suite_id: u64) -> ApiResult<Vec<SuiteCase>> {
        self.find::<SuiteCase>("suite_id", &suite_id.to_string())
            .await
    }

    /// The creator of a case, if one is set and still exists.
    pub async fn creator_of(&self, case: &Case) -> ApiResult<Option<User>> {
        match case.created_by_id {
            Some(user_id) => self.get::<User>(user_id).await,
            None => Ok(None),
        }
    }

    /// Allocate a fresh id in a table.
    pub(crate) async fn next_row_id(&self, table: &str) -> ApiResult<u64> {
        self.storage.next_id(table).await.map_err(ApiError::storage)
    }

    pub(crate) async fn get_row(&self, table: &str, id: u64) -> ApiResult<Option<Value>> {
        self.storage
            .get(StorageKey::new(table, id))
            .await
            .map_err(ApiError::storage)
    }

    pub(crate) async fn put_row(&self, table: &str, id: u64, row: Value) -> ApiResult<Value> {
        self.storage
            .put(StorageKey::new(table, id), row)
            .await
            .map_err(ApiError::storage)
    }

    pub(crate) async fn rows(&self, table: &str) -> ApiResult<Vec<Value>> {
        let count = self
            .storage
            .count(table)
            .await
            .map_err(ApiError::storage)?;
        let rows = self
            .storage
            .list(table, 0, count)
            .await
            .map_err(ApiError::storage)?;
        Ok(rows.into_iter().map(|(_, row)| row).collect())
    }

    pub(crate) async fn find_rows(
        &self,
        table: &str,
        attribute: &str,
        value: &str,
    ) -> ApiResult<Vec<Value>> {
        let rows = self
            .storage
            .find_by_attribute(table, attribute, value)
            .await
            .map_err(ApiError::storage)?;
        Ok(rows.into_iter().map(|(_, row)| row).collect())
    }

    pub(crate) async fn exists(&self, table: &str, id: u64) -> ApiResult<bool> {
        self.storage
            .exists(StorageKey::new(table, id))
            .await
            .map_err(ApiError::storage)
    }
}

fn decode<R: Record>(row: Value) -> ApiResult<R> {
    serde_json::from_value(row)
        .map_err(|e| ApiError::from(StorageError::serialization(R::TABLE, e.to_string())))
}
