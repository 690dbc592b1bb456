//! POST and PUT handling.
//!
//! Bodies are hydrated in full before anything is stored, so a request that
//! fails validation leaves the library unchanged.

use crate::error::{ApiError, ApiResult};
use crate::handler::handlers::parse_id;
use crate::handler::{ApiRequest, ApiResponse, LibraryApi};
use crate::resource::ResourceDefinition;
use crate::storage::StorageProvider;
use log::info;
use serde_json::{Map, Value};

fn body(request: &ApiRequest) -> ApiResult<&Value> {
    request
        .body
        .as_ref()
        .ok_or_else(|| ApiError::bad_request("request body is required"))
}

/// Handle POST on a list endpoint: create a row, 201 with its representation.
pub async fn handle_create<S: StorageProvider>(
    api: &LibraryApi<S>,
    definition: &ResourceDefinition,
    request: &ApiRequest,
) -> ApiResult<ApiResponse> {
    let body = body(request)?;
    let id = api.library().next_row_id(definition.table).await?;
    let row = api.hydrator().hydrate(definition, body, None, id).await?;
    let row = api.library().put_row(definition.table, id, row).await?;
    info!("Created {} {}", definition.name, id);

    let bundle = api.dehydrator().bundle(definition, row).await?;
    Ok(ApiResponse::created(
        bundle.into_json(),
        api.uris().detail(definition.name, id),
    ))
}

/// Handle PUT on a detail endpoint.
///
/// Updates the row (202) or, when it does not exist yet, creates it under the
/// requested id (201).
pub async fn handle_update<S: StorageProvider>(
    api: &LibraryApi<S>,
    definition: &ResourceDefinition,
    raw_id: &str,
    request: &ApiRequest,
) -> ApiResult<ApiResponse> {
    let body = body(request)?;
    let id = parse_id(definition, raw_id)?;
    let existing = api.library().get_row(definition.table, id).await?;
    let creating = existing.is_none();

    let row = api.hydrator().hydrate(definition, body, existing, id).await?;
    let row = api.library().put_row(definition.table, id, row).await?;
    let json = api.dehydrator().bundle(definition, row).await?.into_json();

    if creating {
        info!("Created {} {} by PUT", definition.name, id);
        Ok(ApiResponse::created(json, api.uris().detail(definition.name, id)))
    } else {
        info!("Updated {} {}", definition.name, id);
        Ok(ApiResponse::accepted(json))
    }
}

/// Handle PUT on a list endpoint: update-or-create every entry of `objects`.
///
/// An entry updates the row named by its `id` or `resource_uri` when that row
/// exists; otherwise it is created with a fresh id. Responds 202 with the stored
/// representations in request order.
pub async fn handle_bulk_update<S: StorageProvider>(
    api: &LibraryApi<S>,
    definition: &ResourceDefinition,
    request: &ApiRequest,
) -> ApiResult<ApiResponse> {
    let objects = body(request)?
        .get("objects")
        .and_then(Value::as_array)
        .ok_or_else(|| ApiError::bad_request("body must contain an 'objects' array"))?;

    let hydrator = api.hydrator();
    let mut rows = Vec::with_capacity(objects.len());
    for object in objects {
        let existing = match target_id(api, definition, object) {
            Some(id) => api.library().get_row(definition.table, id).await?,
            None => None,
        };
        let id = match existing.as_ref().and_then(|row| row.get("id")).and_then(Value::as_u64) {
            Some(id) => id,
            None => api.library().next_row_id(definition.table).await?,
        };
        rows.push((id, hydrator.hydrate(definition, object, existing, id).await?));
    }

    let dehydrator = api.dehydrator();
    let mut stored = Vec::with_capacity(rows.len());
    for (id, row) in rows {
        let row = api.library().put_row(definition.table, id, row).await?;
        stored.push(dehydrator.bundle(definition, row).await?.into_json());
    }
    info!("Bulk updated {} {} rows", stored.len(), definition.name);

    let mut body = Map::new();
    body.insert("objects".to_string(), Value::Array(stored));
    Ok(ApiResponse::accepted(Value::Object(body)))
}

fn target_id<S: StorageProvider>(
    api: &LibraryApi<S>,
    definition: &ResourceDefinition,
    object: &Value,
) -> Option<u64> {
    match object.get("id") {
        Some(Value::Number(n)) => return n.as_u64(),
        Some(Value::String(s)) => return s.parse().ok(),
        _ => {}
    }
    let uri = object.get("resource_uri")?.as_str()?;
    match api.uris().parse_detail(uri) {
        Some((resource, id)) if resource == definition.name => Some(id),
        _ => None,
    }
}
