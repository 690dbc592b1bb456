//! Configuration and builder for [`LibraryApi`] instances.

use crate::error::{BuildError, BuildResult};
use crate::handler::LibraryApi;
use crate::resource::{ResourceDefinition, ResourceRegistry};
use crate::storage::StorageProvider;

/// URL prefix and pagination settings.
///
/// Resource URIs are `{base_path}/{api_name}/{resource}/{id}/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Path the API is mounted under, e.g. `/api`.
    pub base_path: String,

    /// API version segment. Defaults to "v1".
    pub api_name: String,

    /// Page size when neither the request nor the resource sets one.
    pub default_limit: usize,

    /// Upper bound on any requested page size, including "no limit" (`limit=0`).
    /// `None` lets `limit=0` return every row. Resources whose default limit is
    /// `0` are not capped unless the request names a limit.
    pub max_limit: Option<usize>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_path: "/api".to_string(),
            api_name: "v1".to_string(),
            default_limit: 20,
            max_limit: Some(1000),
        }
    }
}

impl ApiConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> BuildResult<()> {
        let invalid = |message: &str| {
            Err(BuildError::InvalidConfiguration {
                message: message.to_string(),
            })
        };

        if !self.base_path.starts_with('/') {
            return invalid("base path must start with '/'");
        }
        if self.api_name.is_empty() || self.api_name.contains('/') {
            return invalid("API name must be a single non-empty path segment");
        }
        if let Some(max) = self.max_limit {
            if max == 0 {
                return invalid("max_limit must be positive; use None for no maximum");
            }
            if self.default_limit > max {
                return invalid("default_limit cannot exceed max_limit");
            }
        }
        Ok(())
    }
}

/// Builder for configuring and creating [`LibraryApi`] instances.
///
/// Starts from the standard library resources and [`ApiConfig::default`].
///
/// # Examples
///
/// ```rust
/// use case_library::handler::LibraryApiBuilder;
/// use case_library::storage::InMemoryStorage;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let api = LibraryApiBuilder::new(InMemoryStorage::new())
///     .with_base_path("/manage/api")
///     .with_default_limit(50)
///     .with_max_limit(None)
///     .build()?;
/// assert_eq!(api.uris().list("suite"), "/manage/api/v1/suite/");
/// # Ok(())
/// # }
/// ```
pub struct LibraryApiBuilder<S> {
    storage: S,
    config: ApiConfig,
    registry: ResourceRegistry,
    extra: Vec<ResourceDefinition>,
}

impl<S: StorageProvider> LibraryApiBuilder<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            config: ApiConfig::default(),
            registry: ResourceRegistry::library(),
            extra: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: ApiConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.config.base_path = base_path.into();
        self
    }

    pub fn with_api_name(mut self, api_name: impl Into<String>) -> Self {
        self.config.api_name = api_name.into();
        self
    }

    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.config.default_limit = limit;
        self
    }

    pub fn with_max_limit(mut self, limit: Option<usize>) -> Self {
        self.config.max_limit = limit;
        self
    }

    /// Serve an additional resource next to the library ones.
    pub fn with_resource(mut self, definition: ResourceDefinition) -> Self {
        self.extra.push(definition);
        self
    }

    /// Replace the resource set entirely.
    pub fn with_registry(mut self, registry: ResourceRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Build the configured API.
    ///
    /// # Errors
    ///
    /// Returns a `BuildError` if the configuration is invalid, a resource name is
    /// registered twice, or a related field targets an unregistered resource.
    pub fn build(self) -> BuildResult<LibraryApi<S>> {
        self.config.validate()?;

        let mut registry = self.registry;
        for definition in self.extra {
            registry.register(definition)?;
        }
        registry.validate()?;

        log::debug!(
            "Library API mounted at {}/{} with {} resources",
            self.config.base_path.trim_end_matches('/'),
            self.config.api_name,
            registry.names().count()
        );
        Ok(LibraryApi::from_parts(self.storage, registry, self.config))
    }
}
