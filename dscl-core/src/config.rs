// ============================================================================
// dscl-core/src/config.rs
// ============================================================================
//
// CONFIGURATION: Client Configuration and Environment Overrides
//
// This module defines the immutable configuration a DsclClient is built from:
// which executable to run, which datasource (directory node) to target, and
// the optional credentials passed with every invocation.
//
// KEY COMPONENTS:
// - ClientConfig: Configuration value handed to the client at construction
// - ClientConfigBuilder: Fluent construction of ClientConfig
// - get_env_* helpers: Environment variable lookups with defaults
//
// USAGE:
// A client never mutates its configuration. To rotate credentials or switch
// datasource, build a new ClientConfig and a new client from it.
//
// AI-ASSISTANT-INFO: Configuration structures and environment handling for dscl-core

// ---- External crate imports ----
use serde::{Deserialize, Serialize};

// ============================================================================
// DEFAULT CONSTANTS
// ============================================================================

/// Name of the directory-service utility looked up on `PATH`.
pub const DEFAULT_EXECUTABLE: &str = "dscl";

/// The local directory node.
pub const LOCAL_DATASOURCE: &str = ".";

/// Environment variable overriding the executable name or path.
pub const ENV_EXECUTABLE: &str = "DSCL_EXECUTABLE";
/// Environment variable selecting the datasource.
pub const ENV_DATASOURCE: &str = "DSCL_DATASOURCE";
/// Environment variable carrying the authentication user.
pub const ENV_USER: &str = "DSCL_USER";
/// Environment variable carrying the authentication password.
pub const ENV_PASSWORD: &str = "DSCL_PASSWORD";

// ============================================================================
// ENVIRONMENT HELPERS
// ============================================================================

/// Get a string value from an environment variable or use the default
pub fn get_env_string(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or(default)
}

/// Get an optional, non-empty string value from an environment variable
pub fn get_env_opt_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

// ============================================================================
// CLIENT CONFIGURATION
// ============================================================================

/// Configuration for a [`DsclClient`](crate::DsclClient).
///
/// Credentials are optional. Without them dscl runs with the invoking
/// process's own authorization. The password is never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Executable name (looked up on `PATH`) or absolute path
    pub executable: String,

    /// Datasource the commands operate against; `.` is the local node
    datasource: String,

    /// Authentication user, passed as `-u`
    pub user: Option<String>,

    /// Authentication password, passed as `-P`
    #[serde(skip_serializing)]
    pub password: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            executable: DEFAULT_EXECUTABLE.to_string(),
            datasource: LOCAL_DATASOURCE.to_string(),
            user: None,
            password: None,
        }
    }
}

impl ClientConfig {
    /// Configuration for the given datasource with no credentials.
    /// An empty datasource means the local node.
    pub fn for_datasource(datasource: impl Into<String>) -> Self {
        Self {
            datasource: normalize_datasource(datasource.into()),
            ..Self::default()
        }
    }

    /// Builds a configuration from `DSCL_*` environment variables, falling
    /// back to the defaults for anything unset.
    pub fn from_env() -> Self {
        let config = Self {
            executable: get_env_string(ENV_EXECUTABLE, DEFAULT_EXECUTABLE.to_string()),
            datasource: normalize_datasource(get_env_string(
                ENV_DATASOURCE,
                LOCAL_DATASOURCE.to_string(),
            )),
            user: get_env_opt_string(ENV_USER),
            password: get_env_opt_string(ENV_PASSWORD),
        };
        log::debug!(
            "Loaded dscl configuration from environment: datasource={}, user={:?}",
            config.datasource,
            config.user
        );
        config
    }

    pub fn datasource(&self) -> &str {
        if self.datasource.is_empty() {
            LOCAL_DATASOURCE
        } else {
            &self.datasource
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.user.as_deref().is_some_and(|u| !u.is_empty())
            || self.password.as_deref().is_some_and(|p| !p.is_empty())
    }
}

fn normalize_datasource(datasource: String) -> String {
    if datasource.trim().is_empty() {
        LOCAL_DATASOURCE.to_string()
    } else {
        datasource
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Builder for creating ClientConfig instances.
///
/// # Examples
///
/// ```rust
/// use dscl_core::config::ClientConfigBuilder;
///
/// let config = ClientConfigBuilder::new()
///     .datasource("/LDAPv3/ldap.example.com")
///     .user("diradmin")
///     .password("secret")
///     .build();
/// assert_eq!(config.datasource(), "/LDAPv3/ldap.example.com");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing configuration, e.g. one loaded from the
    /// environment.
    pub fn from_config(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn executable(mut self, executable: impl Into<String>) -> Self {
        self.config.executable = executable.into();
        self
    }

    pub fn datasource(mut self, datasource: impl Into<String>) -> Self {
        self.config.datasource = normalize_datasource(datasource.into());
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.config.user = Some(user.into()).filter(|u: &String| !u.is_empty());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.password = Some(password.into()).filter(|p: &String| !p.is_empty());
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}
