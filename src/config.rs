//! Update-client configuration.
//!
//! [`ClientConfig`] is immutable once built. It can be assembled with the
//! chained [`ConfigBuilder`], or in one step from a [`ClientOptions`] record
//! via [`ClientConfig::from_options`]. Neither path validates its inputs.

use serde::{Deserialize, Serialize};

/// Deployment key every client is built with.
pub const DEFAULT_DEPLOYMENT_KEY: &str = "deprecated_deployment_key";

/// Service URL used when the host does not configure one.
pub const DEFAULT_SERVICE_URL: &str = "https://codepush.appcenter.ms/";

/// Environment variable read by [`ServiceDefaults::from_env`].
pub const SERVICE_URL_ENV: &str = "CODEPUSH_SERVICE_URL";

/// Host-provided defaults, injected at startup instead of read from globals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDefaults {
    pub service_url: String,
}

impl Default for ServiceDefaults {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
        }
    }
}

impl ServiceDefaults {
    /// Defaults with an explicit service URL.
    pub fn new(service_url: impl Into<String>) -> Self {
        Self {
            service_url: service_url.into(),
        }
    }

    /// Read the service URL from `CODEPUSH_SERVICE_URL`, falling back to
    /// [`DEFAULT_SERVICE_URL`] when unset.
    pub fn from_env() -> Self {
        match std::env::var(SERVICE_URL_ENV) {
            Ok(url) => Self::new(url),
            Err(_) => Self::default(),
        }
    }
}

/// Finished client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    deployment_key: String,
    debug_mode: bool,
    server_url: String,
    public_key_resource_id: Option<i32>,
}

impl ClientConfig {
    /// Build a configuration from optional values, filling gaps from `defaults`.
    pub fn from_options(options: ClientOptions, defaults: &ServiceDefaults) -> Self {
        Self {
            deployment_key: DEFAULT_DEPLOYMENT_KEY.to_string(),
            debug_mode: options.debug_mode.unwrap_or(false),
            server_url: options
                .server_url
                .unwrap_or_else(|| defaults.service_url.clone()),
            public_key_resource_id: options.public_key_resource_id,
        }
    }

    pub fn deployment_key(&self) -> &str {
        &self.deployment_key
    }

    pub fn is_debug_mode(&self) -> bool {
        self.debug_mode
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn public_key_resource_id(&self) -> Option<i32> {
        self.public_key_resource_id
    }
}

/// Optional configuration values. Unset fields take documented defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientOptions {
    /// Defaults to `false`.
    pub debug_mode: Option<bool>,
    /// Defaults to [`ServiceDefaults::service_url`].
    pub server_url: Option<String>,
    /// Defaults to none.
    pub public_key_resource_id: Option<i32>,
}

impl ClientOptions {
    /// Parse options from a JSON document such as a host config file.
    pub fn from_json(raw: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Chained builder over [`ClientOptions`].
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    defaults: ServiceDefaults,
    options: ClientOptions,
}

impl ConfigBuilder {
    pub fn new(defaults: &ServiceDefaults) -> Self {
        Self {
            defaults: defaults.clone(),
            options: ClientOptions::default(),
        }
    }

    pub fn set_is_debug_mode(mut self, is_debug_mode: bool) -> Self {
        self.options.debug_mode = Some(is_debug_mode);
        self
    }

    pub fn set_server_url(mut self, server_url: impl Into<String>) -> Self {
        self.options.server_url = Some(server_url.into());
        self
    }

    pub fn set_public_key_resource_descriptor(mut self, descriptor: i32) -> Self {
        self.options.public_key_resource_id = Some(descriptor);
        self
    }

    pub fn build(self) -> ClientConfig {
        ClientConfig::from_options(self.options, &self.defaults)
    }
}
