//! Turning stored rows into JSON representations.

use crate::error::ApiResult;
use crate::model::Library;
use crate::resource::relations::{related_ids, row_id};
use crate::resource::{FieldKind, ResourceDefinition, ResourceRegistry, UriBuilder};
use crate::storage::StorageProvider;
use serde_json::{Map, Value};
use std::future::Future;
use std::pin::Pin;

type DehydrateFuture<'f> = Pin<Box<dyn Future<Output = ApiResult<Map<String, Value>>> + Send + 'f>>;

/// A stored row together with its representation while a response is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Bundle {
    pub row: Value,
    pub data: Map<String, Value>,
}

impl Bundle {
    pub fn into_json(self) -> Value {
        Value::Object(self.data)
    }
}

/// Renders rows of any registered resource.
pub struct Dehydrator<'a, S> {
    library: &'a Library<S>,
    registry: &'a ResourceRegistry,
    uris: &'a UriBuilder,
}

impl<'a, S: StorageProvider> Dehydrator<'a, S> {
    pub fn new(library: &'a Library<S>, registry: &'a ResourceRegistry, uris: &'a UriBuilder) -> Self {
        Self {
            library,
            registry,
            uris,
        }
    }

    /// Dehydrate a row into a bundle.
    pub async fn bundle(&self, definition: &ResourceDefinition, row: Value) -> ApiResult<Bundle> {
        let data = self.dehydrate(definition, &row).await?;
        Ok(Bundle { row, data })
    }

    /// Build the representation of `row` under `definition`.
    ///
    /// Plain fields missing from the row render as null. Flat related fields render
    /// as detail URIs, full ones as the target's own representation; targets that no
    /// longer exist are left out.
    pub fn dehydrate<'f>(
        &'f self,
        definition: &'f ResourceDefinition,
        row: &'f Value,
    ) -> DehydrateFuture<'f> {
        Box::pin(async move {
            let mut data = Map::new();

            for field in &definition.fields {
                let value = match field.kind {
                    FieldKind::Id => row_id(row)
                        .map(|id| Value::String(id.to_string()))
                        .unwrap_or(Value::Null),
                    _ => row.get(field.name).cloned().unwrap_or(Value::Null),
                };
                data.insert(field.name.to_string(), value);
            }

            for related in &definition.related {
                let target = self.registry.get(related.to)?;
                let ids = related_ids(self.library, related.relation, target.table, row).await?;

                let mut rendered = Vec::with_capacity(ids.len());
                for id in ids {
                    if related.full {
                        if let Some(target_row) = self.library.get_row(target.table, id).await? {
                            let nested = self.dehydrate(target, &target_row).await?;
                            rendered.push(Value::Object(nested));
                        }
                    } else {
                        rendered.push(Value::String(self.uris.detail(target.name, id)));
                    }
                }

                let value = if related.relation.is_to_many() {
                    Value::Array(rendered)
                } else {
                    rendered.into_iter().next().unwrap_or(Value::Null)
                };
                data.insert(related.name.to_string(), value);
            }

            if let Some(id) = row_id(row) {
                data.insert(
                    "resource_uri".to_string(),
                    Value::String(self.uris.detail(definition.name, id)),
                );
            }

            Ok(data)
        })
    }
}
