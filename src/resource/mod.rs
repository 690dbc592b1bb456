//! Declarative resource definitions.
//!
//! A resource maps one table onto a REST endpoint: which plain fields it exposes,
//! which related fields it resolves (flat URIs or full nested representations),
//! which fields may be filtered and how, and which methods the list and detail
//! endpoints accept.
//!
//! # Key Components
//!
//! * [`ResourceDefinition`] - one endpoint's declaration
//! * [`ResourceRegistry`] - the named set of definitions an API serves
//! * [`dehydrate`] - row → JSON representation
//! * [`hydrate`] - JSON request body → row
//! * [`uri`] - resource URI construction and parsing

pub mod definitions;
pub mod dehydrate;
pub mod hydrate;
pub mod relations;
pub mod uri;

pub use definitions::ResourceRegistry;
pub use dehydrate::{Bundle, Dehydrator};
pub use uri::UriBuilder;

use crate::query::Lookup;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// HTTP methods a resource endpoint can allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Safe methods never modify state and skip write authentication.
    pub fn is_safe(self) -> bool {
        matches!(self, HttpMethod::Get)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// JSON type of a plain field, checked on hydration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Primary key; read-only, rendered as a string.
    Id,
    String,
    UnsignedInteger,
    Integer,
    Boolean,
}

/// A plain (non-related) field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl Field {
    pub const fn id() -> Self {
        Self {
            name: "id",
            kind: FieldKind::Id,
        }
    }

    pub const fn string(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::String,
        }
    }

    pub const fn unsigned(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::UnsignedInteger,
        }
    }

    pub const fn integer(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Integer,
        }
    }

    pub const fn boolean(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Boolean,
        }
    }
}

/// How a related field finds its target rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// `column` on this row holds the target id.
    ForeignKey { column: &'static str },
    /// `column` on this row holds an array of target ids.
    ManyToMany { column: &'static str },
    /// Target rows whose `column` holds this row's id.
    Reverse { column: &'static str },
    /// Rows of `table` whose `source` column holds this row's id; `target` holds the target id.
    Through {
        table: &'static str,
        source: &'static str,
        target: &'static str,
    },
}

impl Relation {
    /// Whether the relation yields many targets.
    pub fn is_to_many(self) -> bool {
        !matches!(self, Relation::ForeignKey { .. })
    }

    /// Whether hydration can write this relation from a request body.
    pub fn is_writable(self) -> bool {
        matches!(
            self,
            Relation::ForeignKey { .. } | Relation::ManyToMany { .. }
        )
    }
}

/// A field resolved through another resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelatedField {
    pub name: &'static str,
    /// Name of the target resource.
    pub to: &'static str,
    pub relation: Relation,
    /// Render the full target representation instead of its URI.
    pub full: bool,
}

impl RelatedField {
    pub const fn foreign_key(name: &'static str, to: &'static str, column: &'static str) -> Self {
        Self {
            name,
            to,
            relation: Relation::ForeignKey { column },
            full: false,
        }
    }

    pub const fn to_many(name: &'static str, to: &'static str, relation: Relation) -> Self {
        Self {
            name,
            to,
            relation,
            full: false,
        }
    }

    pub const fn full(mut self) -> Self {
        self.full = true;
        self
    }
}

/// Filtering allowed on a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterPolicy {
    /// Any lookup on the field itself.
    All,
    /// Any lookup, including traversal into the related resource.
    AllWithRelations,
    /// Only the listed lookups.
    Only(Vec<Lookup>),
}

impl FilterPolicy {
    pub fn allows(&self, lookup: Lookup) -> bool {
        match self {
            FilterPolicy::All | FilterPolicy::AllWithRelations => true,
            FilterPolicy::Only(lookups) => lookups.contains(&lookup),
        }
    }

    pub fn allows_relations(&self) -> bool {
        matches!(self, FilterPolicy::AllWithRelations)
    }
}

/// Authentication and authorization applied to an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Anyone may call any allowed method.
    Open,
    /// Reads are open; writes need an API key whose owner may report results.
    ReportResults,
}

/// Which list behavior the endpoint has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Standard,
    /// Case-version selection: annotated and split into selected/unselected.
    CaseSelection,
}

/// One REST endpoint's declaration.
#[derive(Debug, Clone)]
pub struct ResourceDefinition {
    pub name: &'static str,
    pub table: &'static str,
    pub kind: ResourceKind,
    pub fields: Vec<Field>,
    pub related: Vec<RelatedField>,
    pub filtering: Vec<(&'static str, FilterPolicy)>,
    /// Field names that must be present when creating.
    pub required: Vec<&'static str>,
    /// Column values applied to every created row unless the body sets them.
    pub defaults: Vec<(&'static str, Value)>,
    /// Column equalities every listed row must satisfy.
    pub base_query: Vec<(&'static str, Value)>,
    pub list_allowed_methods: Vec<HttpMethod>,
    pub detail_allowed_methods: Vec<HttpMethod>,
    /// Overrides the API-wide default page size; `Some(0)` means unpaginated.
    pub default_limit: Option<usize>,
    pub access: AccessPolicy,
}

impl ResourceDefinition {
    /// Start a read-only definition over `table`.
    pub fn new(name: &'static str, table: &'static str) -> Self {
        Self {
            name,
            table,
            kind: ResourceKind::Standard,
            fields: Vec::new(),
            related: Vec::new(),
            filtering: Vec::new(),
            required: Vec::new(),
            defaults: Vec::new(),
            base_query: Vec::new(),
            list_allowed_methods: vec![HttpMethod::Get],
            detail_allowed_methods: vec![HttpMethod::Get],
            default_limit: None,
            access: AccessPolicy::Open,
        }
    }

    pub fn with_kind(mut self, kind: ResourceKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn with_related(mut self, related: RelatedField) -> Self {
        self.related.push(related);
        self
    }

    pub fn with_filter(mut self, field: &'static str, policy: FilterPolicy) -> Self {
        self.filtering.push((field, policy));
        self
    }

    pub fn with_required(mut self, fields: impl IntoIterator<Item = &'static str>) -> Self {
        self.required.extend(fields);
        self
    }

    pub fn with_default(mut self, column: &'static str, value: Value) -> Self {
        self.defaults.push((column, value));
        self
    }

    pub fn with_base_query(mut self, column: &'static str, value: Value) -> Self {
        self.base_query.push((column, value));
        self
    }

    pub fn with_list_methods(mut self, methods: impl IntoIterator<Item = HttpMethod>) -> Self {
        self.list_allowed_methods = methods.into_iter().collect();
        self
    }

    pub fn with_detail_methods(mut self, methods: impl IntoIterator<Item = HttpMethod>) -> Self {
        self.detail_allowed_methods = methods.into_iter().collect();
        self
    }

    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = Some(limit);
        self
    }

    pub fn with_access(mut self, access: AccessPolicy) -> Self {
        self.access = access;
        self
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn related_field(&self, name: &str) -> Option<&RelatedField> {
        self.related.iter().find(|r| r.name == name)
    }

    pub fn filter_policy(&self, name: &str) -> Option<&FilterPolicy> {
        self.filtering
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, policy)| policy)
    }

    pub fn allows(&self, method: HttpMethod, detail: bool) -> bool {
        if detail {
            self.detail_allowed_methods.contains(&method)
        } else {
            self.list_allowed_methods.contains(&method)
        }
    }

    /// Whether a stored row belongs to this resource's base query.
    pub fn in_base_query(&self, row: &Value) -> bool {
        self.base_query
            .iter()
            .all(|(column, expected)| row.get(*column) == Some(expected))
    }
}
