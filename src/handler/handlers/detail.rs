use crate::error::{ApiError, ApiResult};
use crate::handler::handlers::parse_id;
use crate::handler::{ApiResponse, LibraryApi};
use crate::resource::ResourceDefinition;
use crate::storage::StorageProvider;

/// Handle GET on a detail endpoint.
pub async fn handle_get<S: StorageProvider>(
    api: &LibraryApi<S>,
    definition: &ResourceDefinition,
    raw_id: &str,
) -> ApiResult<ApiResponse> {
    let id = parse_id(definition, raw_id)?;
    let row = api
        .library()
        .get_row(definition.table, id)
        .await?
        .filter(|row| definition.in_base_query(row))
        .ok_or_else(|| ApiError::not_found(definition.name, id))?;

    let bundle = api.dehydrator().bundle(definition, row).await?;
    Ok(ApiResponse::ok(bundle.into_json()))
}
