//! The resources served by the library API.

use crate::error::{ApiError, ApiResult, BuildError, BuildResult};
use crate::resource::{
    AccessPolicy, Field, FilterPolicy, HttpMethod, RelatedField, Relation, ResourceDefinition,
    ResourceKind,
};
use serde_json::json;
use std::collections::BTreeMap;

/// Named set of resource definitions.
#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    resources: BTreeMap<&'static str, ResourceDefinition>,
}

impl ResourceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every library resource and the collaborators they reference.
    pub fn library() -> Self {
        let mut registry = Self::new();
        for definition in [
            product(),
            productversion(),
            environment(),
            tag(),
            suite(),
            case(),
            casestep(),
            caseversion(),
            caseversion_selection(),
        ] {
            registry.resources.insert(definition.name, definition);
        }
        registry
    }

    /// Add a definition; names must be unique.
    pub fn register(&mut self, definition: ResourceDefinition) -> BuildResult<()> {
        if self.resources.contains_key(definition.name) {
            return Err(BuildError::DuplicateResource {
                name: definition.name.to_string(),
            });
        }
        self.resources.insert(definition.name, definition);
        Ok(())
    }

    pub fn get(&self, name: &str) -> ApiResult<&ResourceDefinition> {
        self.resources
            .get(name)
            .ok_or_else(|| ApiError::UnknownResource(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.resources.keys().copied()
    }

    /// Check that every related field points at a registered resource.
    pub fn validate(&self) -> BuildResult<()> {
        for definition in self.resources.values() {
            for related in &definition.related {
                if !self.resources.contains_key(related.to) {
                    return Err(BuildError::InvalidConfiguration {
                        message: format!(
                            "{}.{} targets unregistered resource '{}'",
                            definition.name, related.name, related.to
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

const READ_WRITE: [HttpMethod; 2] = [HttpMethod::Get, HttpMethod::Post];
const DETAIL_READ_WRITE: [HttpMethod; 2] = [HttpMethod::Get, HttpMethod::Put];

pub fn product() -> ResourceDefinition {
    ResourceDefinition::new("product", "product")
        .with_fields([
            Field::id(),
            Field::string("name"),
            Field::string("description"),
        ])
        .with_filter("name", FilterPolicy::All)
}

pub fn productversion() -> ResourceDefinition {
    ResourceDefinition::new("productversion", "productversion")
        .with_fields([
            Field::id(),
            Field::string("version"),
            Field::string("codename"),
        ])
        .with_related(RelatedField::foreign_key("product", "product", "product_id"))
        .with_filter("version", FilterPolicy::All)
        .with_filter("product", FilterPolicy::AllWithRelations)
}

pub fn environment() -> ResourceDefinition {
    ResourceDefinition::new("environment", "environment")
        .with_fields([Field::id(), Field::string("name")])
        .with_filter("name", FilterPolicy::All)
}

pub fn tag() -> ResourceDefinition {
    ResourceDefinition::new("tag", "tag")
        .with_fields([
            Field::id(),
            Field::string("name"),
            Field::string("description"),
        ])
        .with_related(RelatedField::foreign_key("product", "product", "product_id"))
        .with_filter("name", FilterPolicy::All)
}

pub fn suite() -> ResourceDefinition {
    ResourceDefinition::new("suite", "suite")
        .with_fields([Field::string("name")])
        .with_filter("name", FilterPolicy::All)
        .with_required(["name"])
        .with_list_methods(READ_WRITE)
        .with_detail_methods(DETAIL_READ_WRITE)
}

pub fn case() -> ResourceDefinition {
    ResourceDefinition::new("case", "case")
        .with_fields([Field::id()])
        .with_related(
            RelatedField::to_many(
                "suites",
                "suite",
                Relation::Through {
                    table: "suitecase",
                    source: "case_id",
                    target: "suite_id",
                },
            )
            .full(),
        )
        .with_related(RelatedField::foreign_key("product", "product", "product_id"))
        .with_filter("suites", FilterPolicy::AllWithRelations)
        .with_required(["product"])
        .with_list_methods(READ_WRITE)
        .with_detail_methods(DETAIL_READ_WRITE)
}

pub fn casestep() -> ResourceDefinition {
    ResourceDefinition::new("casestep", "casestep")
        .with_fields([
            Field::unsigned("number"),
            Field::string("instruction"),
            Field::string("expected"),
        ])
        .with_related(RelatedField::foreign_key(
            "caseversion",
            "caseversion",
            "caseversion_id",
        ))
        .with_required(["caseversion", "number", "instruction"])
        .with_list_methods(READ_WRITE)
        .with_detail_methods(DETAIL_READ_WRITE)
}

pub fn caseversion() -> ResourceDefinition {
    ResourceDefinition::new("caseversion", "caseversion")
        .with_fields([
            Field::id(),
            Field::string("name"),
            Field::string("description"),
        ])
        .with_related(RelatedField::foreign_key("case", "case", "case_id").full())
        .with_related(
            RelatedField::to_many(
                "steps",
                "casestep",
                Relation::Reverse {
                    column: "caseversion_id",
                },
            )
            .full(),
        )
        .with_related(
            RelatedField::to_many(
                "environments",
                "environment",
                Relation::ManyToMany {
                    column: "environment_ids",
                },
            )
            .full(),
        )
        .with_related(RelatedField::foreign_key(
            "productversion",
            "productversion",
            "productversion_id",
        ))
        .with_related(
            RelatedField::to_many(
                "tags",
                "tag",
                Relation::ManyToMany { column: "tag_ids" },
            )
            .full(),
        )
        .with_filter("environments", FilterPolicy::All)
        .with_filter("productversion", FilterPolicy::AllWithRelations)
        .with_filter("case", FilterPolicy::AllWithRelations)
        .with_filter("tags", FilterPolicy::AllWithRelations)
        .with_required(["name", "case", "productversion"])
        .with_default("latest", json!(true))
        .with_list_methods([HttpMethod::Get, HttpMethod::Put, HttpMethod::Post])
        .with_detail_methods(DETAIL_READ_WRITE)
        .with_access(AccessPolicy::ReportResults)
}

/// Latest case versions for the suite form's case multi-select widget.
pub fn caseversion_selection() -> ResourceDefinition {
    ResourceDefinition::new("caseversions-selection", "caseversion")
        .with_kind(ResourceKind::CaseSelection)
        .with_fields([Field::id(), Field::string("name")])
        .with_related(RelatedField::foreign_key("case", "case", "case_id"))
        .with_related(RelatedField::foreign_key(
            "productversion",
            "productversion",
            "productversion_id",
        ))
        .with_related(
            RelatedField::to_many(
                "tags",
                "tag",
                Relation::ManyToMany { column: "tag_ids" },
            )
            .full(),
        )
        .with_filter("productversion", FilterPolicy::AllWithRelations)
        .with_base_query("latest", json!(true))
        .with_list_methods([HttpMethod::Get])
        .with_detail_methods(Vec::<HttpMethod>::new())
        .with_default_limit(0)
}
