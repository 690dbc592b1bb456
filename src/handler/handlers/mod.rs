//! Handlers for the list, detail and write endpoints.

pub mod detail;
pub mod list;
pub mod write;

use crate::error::{ApiError, ApiResult};
use crate::resource::ResourceDefinition;

/// Parse a detail id; ids that cannot exist are simply not found.
pub(crate) fn parse_id(definition: &ResourceDefinition, raw: &str) -> ApiResult<u64> {
    raw.parse::<u64>()
        .map_err(|_| ApiError::not_found(definition.name, raw))
}
