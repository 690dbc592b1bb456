//! Resolving related fields to target row ids.

use crate::error::ApiResult;
use crate::model::Library;
use crate::resource::Relation;
use crate::storage::StorageProvider;
use serde_json::Value;

/// Read a row's numeric id.
pub fn row_id(row: &Value) -> Option<u64> {
    row.get("id").and_then(Value::as_u64)
}

/// Ids of the rows a relation points at, in relation order.
///
/// `target_table` is the table behind the related resource; it is only consulted
/// for reverse relations.
pub async fn related_ids<S: StorageProvider>(
    library: &Library<S>,
    relation: Relation,
    target_table: &str,
    row: &Value,
) -> ApiResult<Vec<u64>> {
    match relation {
        Relation::ForeignKey { column } => {
            Ok(row.get(column).and_then(Value::as_u64).into_iter().collect())
        }
        Relation::ManyToMany { column } => Ok(row
            .get(column)
            .and_then(Value::as_array)
            .map(|ids| ids.iter().filter_map(Value::as_u64).collect())
            .unwrap_or_default()),
        Relation::Reverse { column } => {
            let Some(id) = row_id(row) else {
                return Ok(Vec::new());
            };
            let rows = library
                .find_rows(target_table, column, &id.to_string())
                .await?;
            Ok(rows.iter().filter_map(row_id).collect())
        }
        Relation::Through {
            table,
            source,
            target,
        } => {
            let Some(id) = row_id(row) else {
                return Ok(Vec::new());
            };
            let rows = library.find_rows(table, source, &id.to_string()).await?;
            Ok(rows
                .iter()
                .filter_map(|link| link.get(target).and_then(Value::as_u64))
                .collect())
        }
    }
}
