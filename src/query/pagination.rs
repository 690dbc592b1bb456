//! Limit/offset pagination of list responses.

use crate::error::{ApiError, ApiResult};
use crate::query::QueryParams;
use serde::{Deserialize, Serialize};

/// Paging metadata returned under `meta`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub limit: usize,
    pub offset: usize,
    pub total_count: usize,
    pub next: Option<String>,
    pub previous: Option<String>,
}

/// One page of list results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub meta: PageMeta,
    pub objects: Vec<T>,
}

/// Slices result sets according to `limit` and `offset` parameters.
///
/// A requested limit of `0` asks for everything, but is still capped by
/// `max_limit` when one is configured. A resource whose own default limit is `0`
/// is unpaginated: without an explicit `limit` it returns every row regardless
/// of `max_limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    default_limit: usize,
    max_limit: Option<usize>,
}

impl Paginator {
    pub fn new(default_limit: usize, max_limit: Option<usize>) -> Self {
        Self {
            default_limit,
            max_limit,
        }
    }

    /// Effective limit for a request; `resource_default` overrides the API default.
    pub fn limit(&self, params: &QueryParams, resource_default: Option<usize>) -> ApiResult<usize> {
        let limit = match params.get("limit") {
            Some(raw) => parse_non_negative("limit", raw)?,
            None if resource_default == Some(0) => return Ok(0),
            None => resource_default.unwrap_or(self.default_limit),
        };

        match self.max_limit {
            Some(max) if limit == 0 || limit > max => Ok(max),
            _ => Ok(limit),
        }
    }

    pub fn offset(&self, params: &QueryParams) -> ApiResult<usize> {
        match params.get("offset") {
            Some(raw) => parse_non_negative("offset", raw),
            None => Ok(0),
        }
    }

    /// Slice `items` and build the page metadata.
    ///
    /// `list_uri` is the endpoint's list URI; `next`/`previous` carry every other
    /// request parameter along.
    pub fn paginate<T>(
        &self,
        items: Vec<T>,
        params: &QueryParams,
        list_uri: &str,
        resource_default: Option<usize>,
    ) -> ApiResult<Page<T>> {
        let limit = self.limit(params, resource_default)?;
        let offset = self.offset(params)?;
        let total_count = items.len();

        let objects: Vec<T> = if limit == 0 {
            items.into_iter().skip(offset).collect()
        } else {
            items.into_iter().skip(offset).take(limit).collect()
        };

        let (next, previous) = if limit == 0 {
            (None, None)
        } else {
            let next = offset
                .checked_add(limit)
                .filter(|end| *end < total_count)
                .map(|end| page_uri(list_uri, params, limit, end));
            let previous =
                (offset >= limit).then(|| page_uri(list_uri, params, limit, offset - limit));
            (next, previous)
        };

        Ok(Page {
            meta: PageMeta {
                limit,
                offset,
                total_count,
                next,
                previous,
            },
            objects,
        })
    }
}

fn parse_non_negative(name: &str, raw: &str) -> ApiResult<usize> {
    raw.parse::<usize>().map_err(|_| {
        ApiError::bad_request(format!(
            "Invalid {} '{}' provided. Please provide a positive integer.",
            name, raw
        ))
    })
}

fn page_uri(list_uri: &str, params: &QueryParams, limit: usize, offset: usize) -> String {
    let params = params
        .without(&["limit", "offset"])
        .with("limit", limit.to_string())
        .with("offset", offset.to_string());
    format!("{}?{}", list_uri, params.to_query_string())
}
