//! Filter expressions on list endpoints.
//!
//! A filter key is a `__`-separated path, optionally ending in a lookup:
//! `name__icontains=login`, `productversion=2`, `productversion__product__name=Firefox`.
//! Each step must be allowed by the filtering policy of the resource it is
//! evaluated against; crossing into a related resource needs
//! [`FilterPolicy::AllWithRelations`](crate::resource::FilterPolicy::AllWithRelations).
//!
//! Matching across to-many relations is existential: a row matches if any related
//! value satisfies the lookup.

use crate::error::{ApiError, ApiResult};
use crate::model::Library;
use crate::query::QueryParams;
use crate::resource::relations::related_ids;
use crate::resource::{Relation, ResourceDefinition, ResourceRegistry, UriBuilder};
use crate::storage::StorageProvider;
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

/// Comparison applied at the end of a filter path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Exact,
    IExact,
    Contains,
    IContains,
    StartsWith,
    IStartsWith,
    In,
    Gt,
    Gte,
    Lt,
    Lte,
    IsNull,
}

impl Lookup {
    pub fn parse(term: &str) -> Option<Self> {
        let lookup = match term {
            "exact" => Lookup::Exact,
            "iexact" => Lookup::IExact,
            "contains" => Lookup::Contains,
            "icontains" => Lookup::IContains,
            "startswith" => Lookup::StartsWith,
            "istartswith" => Lookup::IStartsWith,
            "in" => Lookup::In,
            "gt" => Lookup::Gt,
            "gte" => Lookup::Gte,
            "lt" => Lookup::Lt,
            "lte" => Lookup::Lte,
            "isnull" => Lookup::IsNull,
            _ => return None,
        };
        Some(lookup)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Lookup::Exact => "exact",
            Lookup::IExact => "iexact",
            Lookup::Contains => "contains",
            Lookup::IContains => "icontains",
            Lookup::StartsWith => "startswith",
            Lookup::IStartsWith => "istartswith",
            Lookup::In => "in",
            Lookup::Gt => "gt",
            Lookup::Gte => "gte",
            Lookup::Lt => "lt",
            Lookup::Lte => "lte",
            Lookup::IsNull => "isnull",
        }
    }
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One hop into a related resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Traversal {
    pub relation: Relation,
    pub table: &'static str,
}

/// What the lookup is applied to once the path is walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterTarget {
    Field(&'static str),
    /// Ids of the related rows.
    Related {
        relation: Relation,
        table: &'static str,
    },
}

/// Parsed right-hand side of a filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Text(String),
    List(Vec<String>),
    Ids(Vec<u64>),
    Flag(bool),
}

/// A validated filter ready to be evaluated against rows.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterClause {
    pub key: String,
    pub traversals: Vec<Traversal>,
    pub target: FilterTarget,
    pub lookup: Lookup,
    pub operand: Operand,
}

/// Parse every filter parameter of a request against a resource.
pub fn parse_filters(
    registry: &ResourceRegistry,
    uris: &UriBuilder,
    definition: &ResourceDefinition,
    params: &QueryParams,
) -> ApiResult<Vec<FilterClause>> {
    params
        .filters()
        .map(|(key, value)| FilterClause::parse(registry, uris, definition, key, value))
        .collect()
}

impl FilterClause {
    pub fn parse(
        registry: &ResourceRegistry,
        uris: &UriBuilder,
        definition: &ResourceDefinition,
        key: &str,
        value: &str,
    ) -> ApiResult<Self> {
        let mut parts: Vec<&str> = key.split("__").collect();
        let mut lookup = Lookup::Exact;
        if parts.len() > 1 {
            if let Some(term) = parts.last().and_then(|last| Lookup::parse(last)) {
                lookup = term;
                parts.pop();
            }
        }

        let mut current = definition;
        let mut traversals = Vec::new();

        for (index, part) in parts.iter().enumerate() {
            let last = index + 1 == parts.len();
            let policy = current.filter_policy(part).ok_or_else(|| {
                ApiError::invalid_filter(
                    key,
                    format!("filtering on '{}' is not allowed for {}", part, current.name),
                )
            })?;

            if let Some(related) = current.related_field(part) {
                let target = registry.get(related.to)?;

                if last {
                    if !matches!(lookup, Lookup::Exact | Lookup::In | Lookup::IsNull)
                        || !policy.allows(lookup)
                    {
                        return Err(ApiError::invalid_filter(
                            key,
                            format!("lookup '{}' is not allowed on '{}'", lookup, part),
                        ));
                    }
                    return Ok(Self {
                        key: key.to_string(),
                        traversals,
                        target: FilterTarget::Related {
                            relation: related.relation,
                            table: target.table,
                        },
                        lookup,
                        operand: related_operand(uris, key, related.to, lookup, value)?,
                    });
                }

                if !policy.allows_relations() {
                    return Err(ApiError::invalid_filter(
                        key,
                        format!("lookups across '{}' are not allowed", part),
                    ));
                }
                traversals.push(Traversal {
                    relation: related.relation,
                    table: target.table,
                });
                current = target;
            } else if let Some(field) = current.field(part) {
                if !last {
                    return Err(ApiError::invalid_filter(
                        key,
                        format!("'{}' is not a related field", part),
                    ));
                }
                if !policy.allows(lookup) {
                    return Err(ApiError::invalid_filter(
                        key,
                        format!("lookup '{}' is not allowed on '{}'", lookup, part),
                    ));
                }
                return Ok(Self {
                    key: key.to_string(),
                    traversals,
                    target: FilterTarget::Field(field.name),
                    lookup,
                    operand: field_operand(key, lookup, value)?,
                });
            } else {
                return Err(ApiError::invalid_filter(
                    key,
                    format!("'{}' is not a field of {}", part, current.name),
                ));
            }
        }

        Err(ApiError::invalid_filter(key, "empty filter path"))
    }

    /// Evaluate the clause against a row of the resource it was parsed for.
    pub async fn matches<S: StorageProvider>(
        &self,
        library: &Library<S>,
        row: &Value,
    ) -> ApiResult<bool> {
        let mut rows = vec![row.clone()];
        for traversal in &self.traversals {
            let mut next = Vec::new();
            for current in &rows {
                for id in related_ids(library, traversal.relation, traversal.table, current).await? {
                    if let Some(target) = library.get_row(traversal.table, id).await? {
                        next.push(target);
                    }
                }
            }
            rows = next;
        }

        let mut values = Vec::new();
        match self.target {
            FilterTarget::Field(name) => {
                values.extend(rows.iter().map(|r| r.get(name).cloned().unwrap_or(Value::Null)));
            }
            FilterTarget::Related { relation, table } => {
                for current in &rows {
                    let ids = related_ids(library, relation, table, current).await?;
                    if ids.is_empty() {
                        values.push(Value::Null);
                    }
                    values.extend(ids.into_iter().map(Value::from));
                }
            }
        }
        if values.is_empty() {
            values.push(Value::Null);
        }

        Ok(match &self.operand {
            Operand::Flag(want_null) => {
                if *want_null {
                    values.iter().any(Value::is_null)
                } else {
                    values.iter().any(|v| !v.is_null())
                }
            }
            Operand::Ids(ids) => values
                .iter()
                .filter_map(Value::as_u64)
                .any(|id| ids.contains(&id)),
            Operand::List(candidates) => values.iter().any(|v| {
                candidates
                    .iter()
                    .any(|candidate| compare(Lookup::Exact, v, candidate))
            }),
            Operand::Text(text) => values.iter().any(|v| compare(self.lookup, v, text)),
        })
    }
}

fn parse_flag(key: &str, value: &str) -> ApiResult<bool> {
    match value {
        "true" | "True" | "1" => Ok(true),
        "false" | "False" | "0" => Ok(false),
        _ => Err(ApiError::invalid_filter(
            key,
            format!("'{}' is not a boolean", value),
        )),
    }
}

fn field_operand(key: &str, lookup: Lookup, value: &str) -> ApiResult<Operand> {
    Ok(match lookup {
        Lookup::IsNull => Operand::Flag(parse_flag(key, value)?),
        Lookup::In => Operand::List(value.split(',').map(str::to_string).collect()),
        _ => Operand::Text(value.to_string()),
    })
}

fn related_operand(
    uris: &UriBuilder,
    key: &str,
    resource: &str,
    lookup: Lookup,
    value: &str,
) -> ApiResult<Operand> {
    if lookup == Lookup::IsNull {
        return Ok(Operand::Flag(parse_flag(key, value)?));
    }

    let parse_one = |raw: &str| -> ApiResult<u64> {
        if let Ok(id) = raw.parse::<u64>() {
            return Ok(id);
        }
        match uris.parse_detail(raw) {
            Some((target, id)) if target == resource => Ok(id),
            _ => Err(ApiError::invalid_filter(
                key,
                format!("'{}' is not an id or {} URI", raw, resource),
            )),
        }
    };

    let ids = if lookup == Lookup::In {
        value.split(',').map(parse_one).collect::<ApiResult<Vec<_>>>()?
    } else {
        vec![parse_one(value)?]
    };
    Ok(Operand::Ids(ids))
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn compare(lookup: Lookup, value: &Value, text: &str) -> bool {
    let Some(actual) = value_text(value) else {
        return false;
    };

    match lookup {
        Lookup::Exact if value.is_boolean() => actual.eq_ignore_ascii_case(text),
        Lookup::Exact | Lookup::In => actual == text,
        Lookup::IExact => actual.to_lowercase() == text.to_lowercase(),
        Lookup::Contains => actual.contains(text),
        Lookup::IContains => actual.to_lowercase().contains(&text.to_lowercase()),
        Lookup::StartsWith => actual.starts_with(text),
        Lookup::IStartsWith => actual.to_lowercase().starts_with(&text.to_lowercase()),
        Lookup::Gt | Lookup::Gte | Lookup::Lt | Lookup::Lte => {
            let ordering = match (actual.parse::<f64>(), text.parse::<f64>()) {
                (Ok(a), Ok(b)) => a.partial_cmp(&b),
                _ => Some(actual.as_str().cmp(text)),
            };
            match (lookup, ordering) {
                (Lookup::Gt, Some(Ordering::Greater)) => true,
                (Lookup::Gte, Some(Ordering::Greater | Ordering::Equal)) => true,
                (Lookup::Lt, Some(Ordering::Less)) => true,
                (Lookup::Lte, Some(Ordering::Less | Ordering::Equal)) => true,
                _ => false,
            }
        }
        Lookup::IsNull => false,
    }
}
