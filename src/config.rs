//! Connection parameters for the Frappe server.
//!
//! The host stores them as two system parameters; here they come in through
//! a [`ConfigProvider`] so callers decide where the values live. They are
//! read fresh on every operation and never cached.

use std::collections::HashMap;

use url::Url;

use crate::error::{ApiError, ApiResult};

pub const SERVER_URL_PARAM: &str = "frappe.server.url";
pub const AUTH_TOKEN_PARAM: &str = "frappe.auth.token";

/// Source of named configuration values.
pub trait ConfigProvider {
    fn get(&self, key: &str) -> Option<String>;
}

/// In-memory parameter table.
#[derive(Debug, Clone, Default)]
pub struct MemoryConfig {
    params: HashMap<String, String>,
}

impl MemoryConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }
}

impl ConfigProvider for MemoryConfig {
    fn get(&self, key: &str) -> Option<String> {
        self.params.get(key).cloned()
    }
}

/// Reads parameters from the process environment; `frappe.server.url`
/// becomes `FRAPPE_SERVER_URL`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvConfig;

impl ConfigProvider for EnvConfig {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(env_var_name(key)).ok()
    }
}

fn env_var_name(key: &str) -> String {
    key.replace('.', "_").to_uppercase()
}

/// A resolved connection to the Frappe server. Lives for one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrappeConnection {
    pub server_url: String,
    pub auth_token: String,
}

impl FrappeConnection {
    /// Reads both connection parameters from the provider.
    ///
    /// # Errors
    ///
    /// [`ApiError::Configuration`] when either parameter is missing or
    /// empty, or when the server URL does not parse.
    pub fn resolve<C: ConfigProvider>(config: &C) -> ApiResult<Self> {
        let server_url = config.get(SERVER_URL_PARAM).filter(|v| !v.is_empty());
        let auth_token = config.get(AUTH_TOKEN_PARAM).filter(|v| !v.is_empty());
        let (Some(server_url), Some(auth_token)) = (server_url, auth_token) else {
            return Err(ApiError::Configuration(format!(
                "system parameters {SERVER_URL_PARAM}, {AUTH_TOKEN_PARAM} not found"
            )));
        };
        Url::parse(&server_url).map_err(|err| {
            ApiError::Configuration(format!("{SERVER_URL_PARAM} is not a valid URL: {err}"))
        })?;
        Ok(Self {
            server_url: server_url.trim_end_matches('/').to_string(),
            auth_token,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn params(url: &str, token: &str) -> MemoryConfig {
        let mut config = MemoryConfig::new();
        config.set(SERVER_URL_PARAM, url);
        config.set(AUTH_TOKEN_PARAM, token);
        config
    }

    #[test]
    fn resolves_both_parameters() {
        let conn = FrappeConnection::resolve(&params("https://erp.example.com", "s3cret")).unwrap();
        assert_eq!(conn.server_url, "https://erp.example.com");
        assert_eq!(conn.auth_token, "s3cret");
    }

    #[test]
    fn trims_trailing_slashes_off_the_server_url() {
        let conn = FrappeConnection::resolve(&params("https://erp.example.com/", "t")).unwrap();
        assert_eq!(conn.server_url, "https://erp.example.com");
    }

    #[test]
    fn missing_token_is_a_configuration_error() {
        let mut config = MemoryConfig::new();
        config.set(SERVER_URL_PARAM, "https://erp.example.com");
        let err = FrappeConnection::resolve(&config).unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));
    }

    #[test]
    fn empty_url_is_a_configuration_error() {
        let err = FrappeConnection::resolve(&params("", "t")).unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));
    }

    #[test]
    fn unparsable_url_is_a_configuration_error() {
        let err = FrappeConnection::resolve(&params("not a url", "t")).unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));
    }

    #[test]
    fn parameter_names_map_to_env_var_names() {
        assert_eq!(env_var_name(SERVER_URL_PARAM), "FRAPPE_SERVER_URL");
        assert_eq!(env_var_name(AUTH_TOKEN_PARAM), "FRAPPE_AUTH_TOKEN");
    }
}
