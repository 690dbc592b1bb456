use crate::error::{ApiError, ApiResult};
use crate::model::{Case, Library};
use crate::resource::Bundle;
use crate::selection::OrderCache;
use crate::storage::StorageProvider;
use serde_json::{Value, json};

/// Add the selection widget's convenience fields to a case-version bundle.
///
/// Sets `case_id`, `product_id`, `product: {id}`, `created_by: {id, username}`
/// (null when the case has no creator or the user is gone) and `order` (null when
/// there is no cache or the case is not in the suite).
pub async fn annotate<S: StorageProvider>(
    library: &Library<S>,
    cache: Option<&OrderCache>,
    bundle: &mut Bundle,
) -> ApiResult<()> {
    let case = case_of(library, &bundle.row).await?;

    let created_by = match library.creator_of(&case).await? {
        Some(user) => json!({
            "id": user.id.to_string(),
            "username": user.username,
        }),
        None => Value::Null,
    };
    let order = cache
        .and_then(|cache| cache.order_of(case.id))
        .map(Value::from)
        .unwrap_or(Value::Null);

    let data = &mut bundle.data;
    data.insert("case_id".to_string(), Value::String(case.id.to_string()));
    data.insert(
        "product_id".to_string(),
        Value::String(case.product_id.to_string()),
    );
    data.insert(
        "product".to_string(),
        json!({ "id": case.product_id.to_string() }),
    );
    data.insert("created_by".to_string(), created_by);
    data.insert("order".to_string(), order);
    Ok(())
}

async fn case_of<S: StorageProvider>(library: &Library<S>, row: &Value) -> ApiResult<Case> {
    let caseversion_id = row.get("id").cloned().unwrap_or(Value::Null);
    let case_id = row
        .get("case_id")
        .and_then(Value::as_u64)
        .ok_or_else(|| {
            ApiError::internal(format!("caseversion {} has no case", caseversion_id))
        })?;

    library.get::<Case>(case_id).await?.ok_or_else(|| {
        ApiError::internal(format!(
            "case {} of caseversion {} does not exist",
            case_id, caseversion_id
        ))
    })
}
