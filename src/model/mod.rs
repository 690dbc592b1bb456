//! Typed entities of the test-case library.
//!
//! Rows are persisted as JSON objects (see [`crate::storage`]); these structs are
//! their typed projections. Foreign keys are stored as `<name>_id` columns and
//! many-to-many links as `<name>_ids` arrays, except suite membership which lives
//! in its own [`SuiteCase`] association table because it carries an order.

pub mod library;

pub use library::Library;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A typed row stored in a named table.
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    /// Table the rows live in.
    const TABLE: &'static str;

    /// Primary key.
    fn id(&self) -> u64;
}

macro_rules! record {
    ($type:ty, $table:literal) => {
        impl Record for $type {
            const TABLE: &'static str = $table;

            fn id(&self) -> u64 {
                self.id
            }
        }
    };
}

fn default_true() -> bool {
    true
}

/// A user account; creators of cases and owners of API keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    /// Permission codenames, e.g. `execution.execute`.
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl User {
    /// Check whether the user holds a permission codename.
    pub fn has_perm(&self, permission: &str) -> bool {
        self.is_active && self.permissions.iter().any(|p| p == permission)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKey {
    pub id: u64,
    pub owner_id: u64,
    pub key: String,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVersion {
    pub id: u64,
    pub product_id: u64,
    pub version: String,
    #[serde(default)]
    pub codename: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Global tags have no product.
    #[serde(default)]
    pub product_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suite {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub product_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    pub id: u64,
    pub product_id: u64,
    /// Cases imported or created by the system may have no creator.
    #[serde(default)]
    pub created_by_id: Option<u64>,
}

/// One version of a case; only the `latest` version is eligible for suite selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseVersion {
    pub id: u64,
    pub case_id: u64,
    pub productversion_id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub latest: bool,
    #[serde(default)]
    pub environment_ids: Vec<u64>,
    #[serde(default)]
    pub tag_ids: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseStep {
    pub id: u64,
    pub caseversion_id: u64,
    pub number: u32,
    pub instruction: String,
    #[serde(default)]
    pub expected: String,
}

/// Membership of a case in a suite, with its display position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteCase {
    pub id: u64,
    pub suite_id: u64,
    pub case_id: u64,
    pub order: i64,
}

record!(User, "user");
record!(ApiKey, "apikey");
record!(Product, "product");
record!(ProductVersion, "productversion");
record!(Environment, "environment");
record!(Tag, "tag");
record!(Suite, "suite");
record!(Case, "case");
record!(CaseVersion, "caseversion");
record!(CaseStep, "casestep");
record!(SuiteCase, "suitecase");
