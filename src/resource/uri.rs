//! Resource URI construction and parsing.
//!
//! Detail URIs look like `{base_path}/{api_name}/{resource}/{id}/`, list URIs
//! like `{base_path}/{api_name}/{resource}/`.

/// Builds and parses resource URIs under a fixed prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriBuilder {
    prefix: String,
}

impl UriBuilder {
    /// `base_path` is e.g. `/api`, `api_name` e.g. `v1`.
    pub fn new(base_path: &str, api_name: &str) -> Self {
        Self {
            prefix: format!("{}/{}", base_path.trim_end_matches('/'), api_name),
        }
    }

    pub fn list(&self, resource: &str) -> String {
        format!("{}/{}/", self.prefix, resource)
    }

    pub fn detail(&self, resource: &str, id: u64) -> String {
        format!("{}/{}/{}/", self.prefix, resource, id)
    }

    /// Split a detail URI into resource name and id.
    ///
    /// Returns `None` for URIs outside this prefix or without a numeric id.
    pub fn parse_detail<'a>(&self, uri: &'a str) -> Option<(&'a str, u64)> {
        let rest = uri.strip_prefix(self.prefix.as_str())?.strip_prefix('/')?;
        let mut parts = rest.trim_end_matches('/').split('/');
        let resource = parts.next().filter(|r| !r.is_empty())?;
        let id = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some((resource, id))
    }
}
