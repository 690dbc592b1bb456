//! API-key authentication and report-results authorization.
//!
//! Write requests to protected resources carry `username` and `api_key` query
//! parameters. Authentication consumes that raw credential and, when it names an
//! active user holding an active key, returns an [`AuthenticationWitness`]: a
//! value only this module can construct, so holding one proves validation took
//! place. Authorization then decides from the witness whether the user may write.
//!
//! Authentication state is tracked with phantom types:
//!
//! * [`Credential<Unauthenticated>`]: raw values straight from the request
//! * [`Credential<Authenticated>`]: only obtainable from a witness
//!
//! # Example Usage
//!
//! ```rust
//! use case_library::auth::{ApiKeyAuthentication, Authentication, Credential};
//! use case_library::model::{ApiKey, Library, User};
//! use case_library::resource::HttpMethod;
//! use case_library::storage::InMemoryStorage;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let library = Library::new(InMemoryStorage::new());
//! library.save(&User {
//!     id: 1,
//!     username: "tester".to_string(),
//!     permissions: vec!["execution.execute".to_string()],
//!     is_active: true,
//! }).await?;
//! library.save(&ApiKey { id: 1, owner_id: 1, key: "s3cret".to_string(), active: true }).await?;
//!
//! let credential = Credential::new("tester", "s3cret");
//! let witness = ApiKeyAuthentication
//!     .authenticate(&library, HttpMethod::Post, Some(credential))
//!     .await?
//!     .expect("writes always produce a witness");
//! assert_eq!(witness.username(), "tester");
//! # Ok(())
//! # }
//! ```

use crate::error::{ApiError, ApiResult};
use crate::model::{ApiKey, Library, User};
use crate::query::QueryParams;
use crate::resource::HttpMethod;
use crate::storage::StorageProvider;
use sha2::{Digest, Sha256};
use std::future::Future;
use std::marker::PhantomData;

/// Permission codename required to write through report-results resources.
pub const EXECUTE_PERMISSION: &str = "execution.execute";

/// Type-level authentication states using phantom types
pub trait AuthState: Send + Sync + 'static {}

/// Phantom type for unauthenticated state
#[derive(Debug, Clone, Copy)]
pub struct Unauthenticated;
impl AuthState for Unauthenticated {}

/// Phantom type for authenticated state
#[derive(Debug, Clone, Copy)]
pub struct Authenticated;
impl AuthState for Authenticated {}

/// Username and API key with compile-time authentication state
#[derive(Debug, Clone)]
pub struct Credential<S: AuthState> {
    pub(crate) username: String,
    pub(crate) api_key: String,
    pub(crate) _phantom: PhantomData<S>,
}

impl Credential<Unauthenticated> {
    /// Create a new unauthenticated credential
    pub fn new(username: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            api_key: api_key.into(),
            _phantom: PhantomData,
        }
    }

    /// Read `username` and `api_key` from query parameters; both must be present.
    pub fn from_params(params: &QueryParams) -> Option<Self> {
        Some(Self::new(params.get("username")?, params.get("api_key")?))
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Get the raw key (only available for unauthenticated)
    pub fn raw_key(&self) -> &str {
        &self.api_key
    }
}

impl Credential<Authenticated> {
    pub fn username(&self) -> &str {
        &self.username
    }
}

/// Proof of a successful API-key authentication.
///
/// Only [`ApiKeyAuthentication`] constructs these.
#[derive(Debug, Clone)]
pub struct AuthenticationWitness {
    user_id: u64,
    credential: Credential<Authenticated>,
    permissions: Vec<String>,
    key_hash: String,
    validated_at: chrono::DateTime<chrono::Utc>,
}

impl AuthenticationWitness {
    fn new(user: User, credential: Credential<Unauthenticated>) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(credential.api_key.as_bytes());
        let key_hash = format!("{:x}", hasher.finalize());

        Self {
            user_id: user.id,
            credential: Credential {
                username: credential.username,
                api_key: credential.api_key,
                _phantom: PhantomData,
            },
            permissions: user.permissions,
            key_hash,
            validated_at: chrono::Utc::now(),
        }
    }

    pub fn user_id(&self) -> u64 {
        self.user_id
    }

    pub fn username(&self) -> &str {
        self.credential.username()
    }

    pub fn credential(&self) -> &Credential<Authenticated> {
        &self.credential
    }

    pub fn has_perm(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    /// Get validation timestamp
    pub fn validated_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.validated_at
    }

    /// SHA-256 of the key, for audit logging
    pub fn key_hash(&self) -> &str {
        &self.key_hash
    }
}

/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("username and api_key are required")]
    MissingCredential,
    #[error("Invalid credential provided")]
    InvalidCredential,
    #[error("User account is disabled")]
    InactiveUser,
}

impl From<AuthenticationError> for ApiError {
    fn from(error: AuthenticationError) -> Self {
        ApiError::unauthorized(error.to_string())
    }
}

/// Decides whether a request is authenticated.
pub trait Authentication: Send + Sync {
    /// `Ok(None)` means the request passes without identifying anyone.
    fn authenticate<S: StorageProvider>(
        &self,
        library: &Library<S>,
        method: HttpMethod,
        credential: Option<Credential<Unauthenticated>>,
    ) -> impl Future<Output = ApiResult<Option<AuthenticationWitness>>> + Send;
}

/// Decides whether an authenticated request may proceed.
pub trait Authorization: Send + Sync {
    fn authorize(&self, method: HttpMethod, witness: Option<&AuthenticationWitness>)
    -> ApiResult<()>;
}

/// Reads are anonymous; every other method needs an active user with an active key.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiKeyAuthentication;

impl Authentication for ApiKeyAuthentication {
    async fn authenticate<S: StorageProvider>(
        &self,
        library: &Library<S>,
        method: HttpMethod,
        credential: Option<Credential<Unauthenticated>>,
    ) -> ApiResult<Option<AuthenticationWitness>> {
        if method.is_safe() {
            return Ok(None);
        }

        let credential = credential.ok_or(AuthenticationError::MissingCredential)?;
        let user = library
            .find::<User>("username", credential.username())
            .await?
            .into_iter()
            .next()
            .ok_or(AuthenticationError::InvalidCredential)?;
        if !user.is_active {
            log::warn!("Rejected API key for disabled user '{}'", user.username);
            return Err(AuthenticationError::InactiveUser.into());
        }

        let owns_key = library
            .find::<ApiKey>("key", credential.raw_key())
            .await?
            .iter()
            .any(|key| key.active && key.owner_id == user.id);
        if !owns_key {
            log::warn!("Rejected API key for user '{}'", user.username);
            return Err(AuthenticationError::InvalidCredential.into());
        }

        let witness = AuthenticationWitness::new(user, credential);
        log::debug!(
            "Authenticated '{}' with key {}",
            witness.username(),
            &witness.key_hash()[..12]
        );
        Ok(Some(witness))
    }
}

/// Reads are open; writes need [`EXECUTE_PERMISSION`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportResultsAuthorization;

impl Authorization for ReportResultsAuthorization {
    fn authorize(
        &self,
        method: HttpMethod,
        witness: Option<&AuthenticationWitness>,
    ) -> ApiResult<()> {
        if method.is_safe() {
            return Ok(());
        }
        match witness {
            Some(witness) if witness.has_perm(EXECUTE_PERMISSION) => Ok(()),
            Some(witness) => Err(ApiError::forbidden(format!(
                "user '{}' lacks permission {}",
                witness.username(),
                EXECUTE_PERMISSION
            ))),
            None => Err(ApiError::forbidden("authentication required")),
        }
    }
}
