//! List endpoint handling, including the case-version selection listing.

use crate::error::ApiResult;
use crate::handler::{ApiRequest, ApiResponse, LibraryApi};
use crate::query::filter::{FilterClause, parse_filters};
use crate::resource::{Bundle, ResourceDefinition, ResourceKind};
use crate::selection::{OrderCache, annotate, partition};
use crate::storage::StorageProvider;
use serde_json::{Map, Value};

/// Handle GET on a list endpoint.
///
/// The body is `{"meta": {...}, "objects": [...]}`. For the selection resource
/// `objects` is `{"selected": [...], "unselected": [...]}` instead.
pub async fn handle_list<S: StorageProvider>(
    api: &LibraryApi<S>,
    definition: &ResourceDefinition,
    request: &ApiRequest,
) -> ApiResult<ApiResponse> {
    let filters = parse_filters(api.registry(), api.uris(), definition, &request.params)?;

    // lives until this response is built
    let cache = match definition.kind {
        ResourceKind::CaseSelection => {
            OrderCache::load(api.library(), request.params.get("for_suite")).await?
        }
        ResourceKind::Standard => None,
    };

    let rows = matching_rows(api, definition, &filters).await?;
    let page = api.paginator().paginate(
        rows,
        &request.params,
        &api.uris().list(definition.name),
        definition.default_limit,
    )?;

    let dehydrator = api.dehydrator();
    let mut bundles = Vec::with_capacity(page.objects.len());
    for row in page.objects {
        let mut bundle = dehydrator.bundle(definition, row).await?;
        if definition.kind == ResourceKind::CaseSelection {
            annotate(api.library(), cache.as_ref(), &mut bundle).await?;
        }
        bundles.push(bundle);
    }

    let objects = match definition.kind {
        ResourceKind::CaseSelection => serde_json::to_value(partition(bundles))?,
        ResourceKind::Standard => Value::Array(bundles.into_iter().map(Bundle::into_json).collect()),
    };

    let mut body = Map::new();
    body.insert("meta".to_string(), serde_json::to_value(&page.meta)?);
    body.insert("objects".to_string(), objects);
    Ok(ApiResponse::ok(Value::Object(body)))
}

/// Rows of the resource's table inside its base query and matching every filter,
/// in ascending id order.
pub(crate) async fn matching_rows<S: StorageProvider>(
    api: &LibraryApi<S>,
    definition: &ResourceDefinition,
    filters: &[FilterClause],
) -> ApiResult<Vec<Value>> {
    let mut matched = Vec::new();
    'rows: for row in api.library().rows(definition.table).await? {
        if !definition.in_base_query(&row) {
            continue;
        }
        for clause in filters {
            if !clause.matches(api.library(), &row).await? {
                continue 'rows;
            }
        }
        matched.push(row);
    }
    Ok(matched)
}
