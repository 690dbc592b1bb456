//! Turning request bodies into stored rows.
//!
//! Only fields declared on the resource are read; everything else in the body is
//! ignored. Reverse and through relations are read-only.

use crate::error::{ApiResult, ValidationError};
use crate::model::Library;
use crate::resource::{
    FieldKind, Relation, RelatedField, ResourceDefinition, ResourceRegistry, UriBuilder,
};
use crate::storage::StorageProvider;
use serde_json::{Map, Value};

/// Builds rows from request bodies.
pub struct Hydrator<'a, S> {
    library: &'a Library<S>,
    registry: &'a ResourceRegistry,
    uris: &'a UriBuilder,
}

impl<'a, S: StorageProvider> Hydrator<'a, S> {
    pub fn new(library: &'a Library<S>, registry: &'a ResourceRegistry, uris: &'a UriBuilder) -> Self {
        Self {
            library,
            registry,
            uris,
        }
    }

    /// Apply `body` on top of `existing` (or an empty row when creating) and stamp `id`.
    ///
    /// A null plain field resets the column to its default. Required fields must be
    /// present and non-null on create and cannot be nulled on update.
    pub async fn hydrate(
        &self,
        definition: &ResourceDefinition,
        body: &Value,
        existing: Option<Value>,
        id: u64,
    ) -> ApiResult<Value> {
        let body = body.as_object().ok_or(ValidationError::NotAnObject)?;
        let creating = existing.is_none();

        let mut row = match existing {
            Some(Value::Object(row)) => row,
            _ => Map::new(),
        };
        row.insert("id".to_string(), Value::from(id));

        for name in &definition.required {
            let value = body.get(*name);
            let missing = match value {
                None => creating,
                Some(Value::Null) => true,
                Some(_) => false,
            };
            if missing {
                return Err(ValidationError::MissingRequiredField {
                    field: name.to_string(),
                }
                .into());
            }
        }

        for field in &definition.fields {
            if field.kind == FieldKind::Id {
                continue;
            }
            match body.get(field.name) {
                None => {}
                Some(Value::Null) => {
                    row.remove(field.name);
                }
                Some(value) => {
                    check_kind(field.name, field.kind, value)?;
                    row.insert(field.name.to_string(), value.clone());
                }
            }
        }

        for related in definition.related.iter().filter(|r| r.relation.is_writable()) {
            let Some(value) = body.get(related.name) else {
                continue;
            };
            match related.relation {
                Relation::ForeignKey { column } => {
                    let target = match value {
                        Value::Null => Value::Null,
                        value => Value::from(self.resolve_existing(related, value).await?),
                    };
                    row.insert(column.to_string(), target);
                }
                Relation::ManyToMany { column } => {
                    let items = value.as_array().ok_or_else(|| ValidationError::InvalidFieldType {
                        field: related.name.to_string(),
                        expected: "array".to_string(),
                    })?;
                    let mut ids = Vec::with_capacity(items.len());
                    for item in items {
                        ids.push(Value::from(self.resolve_existing(related, item).await?));
                    }
                    row.insert(column.to_string(), Value::Array(ids));
                }
                Relation::Reverse { .. } | Relation::Through { .. } => {}
            }
        }

        if creating {
            for (column, value) in &definition.defaults {
                row.entry(column.to_string()).or_insert_with(|| value.clone());
            }
        }

        Ok(Value::Object(row))
    }

    async fn resolve_existing(&self, related: &RelatedField, value: &Value) -> ApiResult<u64> {
        let target = self.registry.get(related.to)?;
        let id = self.resolve_reference(related, value)?;
        if !self.library.exists(target.table, id).await? {
            return Err(ValidationError::BrokenReference {
                field: related.name.to_string(),
                resource: target.name.to_string(),
                id,
            }
            .into());
        }
        Ok(id)
    }

    /// Accepts an id, a numeric string, a detail URI of the target resource, or an
    /// object carrying `id` or `resource_uri`.
    fn resolve_reference(&self, related: &RelatedField, value: &Value) -> Result<u64, ValidationError> {
        let invalid = || ValidationError::InvalidReference {
            field: related.name.to_string(),
            value: value.to_string(),
        };

        match value {
            Value::Number(n) => n.as_u64().ok_or_else(invalid),
            Value::String(s) => {
                if let Ok(id) = s.parse::<u64>() {
                    return Ok(id);
                }
                match self.uris.parse_detail(s) {
                    Some((resource, id)) if resource == related.to => Ok(id),
                    _ => Err(invalid()),
                }
            }
            Value::Object(object) => match object.get("id").or_else(|| object.get("resource_uri")) {
                Some(inner @ (Value::Number(_) | Value::String(_))) => {
                    self.resolve_reference(related, inner)
                }
                _ => Err(invalid()),
            },
            _ => Err(invalid()),
        }
    }
}

fn check_kind(name: &str, kind: FieldKind, value: &Value) -> Result<(), ValidationError> {
    let (ok, expected) = match kind {
        FieldKind::Id => (true, "id"),
        FieldKind::String => (value.is_string(), "string"),
        FieldKind::UnsignedInteger => (value.is_u64(), "unsigned integer"),
        FieldKind::Integer => (value.is_i64(), "integer"),
        FieldKind::Boolean => (value.is_boolean(), "boolean"),
    };
    if ok {
        Ok(())
    } else {
        Err(ValidationError::InvalidFieldType {
            field: name.to_string(),
            expected: expected.to_string(),
        })
    }
}
