//! Core request handler infrastructure
//!
//! Holds the [`LibraryApi`] dispatcher: resource lookup, method and access checks,
//! and routing to the list, detail and write handlers.

use crate::auth::{
    ApiKeyAuthentication, Authentication, Authorization, Credential, ReportResultsAuthorization,
};
use crate::error::{ApiError, ApiResult, BuildResult};
use crate::handler::handlers::{detail, list, write};
use crate::handler::{ApiConfig, ApiRequest, ApiResponse, LibraryApiBuilder, create_error_response};
use crate::model::Library;
use crate::query::Paginator;
use crate::resource::hydrate::Hydrator;
use crate::resource::{
    AccessPolicy, Dehydrator, HttpMethod, ResourceDefinition, ResourceRegistry, UriBuilder,
};
use crate::storage::StorageProvider;
use log::{debug, info, warn};

/// Transport-agnostic handler for the library's REST resources.
///
/// Holds no per-request state; concurrent calls to [`handle`](Self::handle) only
/// share the storage backend.
pub struct LibraryApi<S: StorageProvider> {
    library: Library<S>,
    registry: ResourceRegistry,
    config: ApiConfig,
    uris: UriBuilder,
    paginator: Paginator,
}

impl<S: StorageProvider> LibraryApi<S> {
    /// API with the standard resources and default configuration.
    pub fn new(storage: S) -> BuildResult<Self> {
        LibraryApiBuilder::new(storage).build()
    }

    pub fn builder(storage: S) -> LibraryApiBuilder<S> {
        LibraryApiBuilder::new(storage)
    }

    pub(super) fn from_parts(storage: S, registry: ResourceRegistry, config: ApiConfig) -> Self {
        Self {
            library: Library::new(storage),
            uris: UriBuilder::new(&config.base_path, &config.api_name),
            paginator: Paginator::new(config.default_limit, config.max_limit),
            registry,
            config,
        }
    }

    pub fn library(&self) -> &Library<S> {
        &self.library
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn uris(&self) -> &UriBuilder {
        &self.uris
    }

    pub(super) fn paginator(&self) -> &Paginator {
        &self.paginator
    }

    pub(super) fn dehydrator(&self) -> Dehydrator<'_, S> {
        Dehydrator::new(&self.library, &self.registry, &self.uris)
    }

    pub(super) fn hydrator(&self) -> Hydrator<'_, S> {
        Hydrator::new(&self.library, &self.registry, &self.uris)
    }

    /// Handle a structured request.
    ///
    /// Never fails: errors become responses with the matching status and an
    /// `{"error", "code"}` body.
    pub async fn handle(&self, request: ApiRequest) -> ApiResponse {
        let request_id = request
            .request_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        info!(
            "Library API processing {} {}{} (request: '{}')",
            request.method,
            request.resource,
            request
                .id
                .as_deref()
                .map(|id| format!("/{}", id))
                .unwrap_or_default(),
            request_id
        );

        match self.dispatch(&request).await {
            Ok(response) => {
                debug!(
                    "Library API completed with status {} (request: '{}')",
                    response.status, request_id
                );
                response.with_request_id(request_id)
            }
            Err(e) => {
                warn!("Library API request failed: {} (request: '{}')", e, request_id);
                create_error_response(e, request_id)
            }
        }
    }

    async fn dispatch(&self, request: &ApiRequest) -> ApiResult<ApiResponse> {
        let definition = self.registry.get(&request.resource)?;

        if !definition.allows(request.method, request.is_detail()) {
            return Err(method_not_allowed(definition, request));
        }
        self.check_access(definition, request).await?;

        match (request.method, request.id.as_deref()) {
            (HttpMethod::Get, None) => list::handle_list(self, definition, request).await,
            (HttpMethod::Get, Some(id)) => detail::handle_get(self, definition, id).await,
            (HttpMethod::Post, None) => write::handle_create(self, definition, request).await,
            (HttpMethod::Put, None) => write::handle_bulk_update(self, definition, request).await,
            (HttpMethod::Put, Some(id)) => {
                write::handle_update(self, definition, id, request).await
            }
            _ => Err(method_not_allowed(definition, request)),
        }
    }

    async fn check_access(
        &self,
        definition: &ResourceDefinition,
        request: &ApiRequest,
    ) -> ApiResult<()> {
        match definition.access {
            AccessPolicy::Open => Ok(()),
            AccessPolicy::ReportResults => {
                let witness = ApiKeyAuthentication
                    .authenticate(
                        &self.library,
                        request.method,
                        Credential::from_params(&request.params),
                    )
                    .await?;
                ReportResultsAuthorization.authorize(request.method, witness.as_ref())
            }
        }
    }
}

fn method_not_allowed(definition: &ResourceDefinition, request: &ApiRequest) -> ApiError {
    ApiError::MethodNotAllowed {
        resource: definition.name.to_string(),
        method: request.method.to_string(),
        endpoint: if request.is_detail() { "detail" } else { "list" }.to_string(),
    }
}
