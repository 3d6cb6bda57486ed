//! Configuration types for regflow
//!
//! Configuration is read once from environment variables into an immutable
//! [`RegflowConfig`] which is then passed by reference to both provider
//! clients and the orchestrator. Nothing reads the environment after startup.

use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// Production registrar endpoint
pub const NAMECHEAP_API_URL: &str = "https://api.namecheap.com/xml.response";

/// Sandbox registrar endpoint
pub const NAMECHEAP_SANDBOX_URL: &str = "https://api.sandbox.namecheap.com/xml.response";

/// DNS provider API base URL
pub const CLOUDFLARE_API_URL: &str = "https://api.cloudflare.com/client/v4";

/// Environment variable names
pub mod vars {
    pub const NAMECHEAP_API_USER: &str = "NAMECHEAP_API_USER";
    pub const NAMECHEAP_API_KEY: &str = "NAMECHEAP_API_KEY";
    pub const NAMECHEAP_USERNAME: &str = "NAMECHEAP_USERNAME";
    pub const NAMECHEAP_CLIENT_IP: &str = "NAMECHEAP_CLIENT_IP";
    pub const NAMECHEAP_SANDBOX: &str = "NAMECHEAP_SANDBOX";
    pub const CLOUDFLARE_API_TOKEN: &str = "CLOUDFLARE_API_TOKEN";
    pub const WORKER_SUBDOMAIN: &str = "REGFLOW_WORKER_SUBDOMAIN";
    pub const PLACEHOLDER_IP: &str = "REGFLOW_PLACEHOLDER_IP";
    pub const RECORD_TTL: &str = "REGFLOW_RECORD_TTL";
    pub const LOG_LEVEL: &str = "REGFLOW_LOG_LEVEL";
}

/// Main regflow configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegflowConfig {
    /// Registrar account configuration
    pub registrar: NamecheapConfig,

    /// DNS provider configuration
    pub dns: CloudflareConfig,

    /// Workflow settings
    #[serde(default)]
    pub setup: SetupConfig,

    /// Log level for the binary (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl RegflowConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> crate::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    ///
    /// Empty values count as missing. Every missing required variable is
    /// reported at once in [`crate::Error::ConfigurationMissing`].
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut missing = Vec::new();
        let mut required = |key: &'static str| {
            get(key).unwrap_or_else(|| {
                missing.push(key.to_string());
                String::new()
            })
        };

        let api_user = required(vars::NAMECHEAP_API_USER);
        let api_key = required(vars::NAMECHEAP_API_KEY);
        let username = required(vars::NAMECHEAP_USERNAME);
        let client_ip = required(vars::NAMECHEAP_CLIENT_IP);
        let api_token = required(vars::CLOUDFLARE_API_TOKEN);

        if !missing.is_empty() {
            return Err(crate::Error::ConfigurationMissing(missing));
        }

        let sandbox = get(vars::NAMECHEAP_SANDBOX)
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let mut setup = SetupConfig::default();
        if let Some(label) = get(vars::WORKER_SUBDOMAIN) {
            setup.worker_subdomain = label;
        }
        if let Some(ip) = get(vars::PLACEHOLDER_IP) {
            setup.placeholder_ip = ip.parse().map_err(|_| {
                crate::Error::config(format!(
                    "{} must be an IPv4 address. Got: {}",
                    vars::PLACEHOLDER_IP,
                    ip
                ))
            })?;
        }
        if let Some(ttl) = get(vars::RECORD_TTL) {
            setup.record_ttl = ttl.parse().map_err(|_| {
                crate::Error::config(format!(
                    "{} must be a positive integer. Got: {}",
                    vars::RECORD_TTL,
                    ttl
                ))
            })?;
        }

        let config = Self {
            registrar: NamecheapConfig::new(api_user, api_key, username, client_ip, sandbox),
            dns: CloudflareConfig::new(api_token),
            setup,
            log_level: get(vars::LOG_LEVEL).unwrap_or_else(default_log_level),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> crate::Result<()> {
        let mut missing = self.registrar.missing_fields();
        if self.dns.api_token.is_empty() {
            missing.push(vars::CLOUDFLARE_API_TOKEN.to_string());
        }
        if !missing.is_empty() {
            return Err(crate::Error::ConfigurationMissing(missing));
        }

        self.setup.validate()?;

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            _ => Err(crate::Error::config(format!(
                "{} '{}' is not valid. Valid levels: trace, debug, info, warn, error",
                vars::LOG_LEVEL,
                self.log_level
            ))),
        }
    }
}

/// Registrar (Namecheap) account configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct NamecheapConfig {
    /// API user
    pub api_user: String,

    /// API key
    /// ⚠️ NEVER log this value
    pub api_key: String,

    /// Account user name
    pub username: String,

    /// Whitelisted client IP sent with every request
    pub client_ip: String,

    /// Use the sandbox endpoint
    #[serde(default)]
    pub sandbox: bool,

    /// Endpoint URL (overridable for tests)
    #[serde(default = "default_namecheap_url")]
    pub api_url: String,
}

impl NamecheapConfig {
    /// Create a registrar configuration pointing at the production or sandbox endpoint
    pub fn new(
        api_user: impl Into<String>,
        api_key: impl Into<String>,
        username: impl Into<String>,
        client_ip: impl Into<String>,
        sandbox: bool,
    ) -> Self {
        Self {
            api_user: api_user.into(),
            api_key: api_key.into(),
            username: username.into(),
            client_ip: client_ip.into(),
            sandbox,
            api_url: if sandbox {
                NAMECHEAP_SANDBOX_URL.to_string()
            } else {
                NAMECHEAP_API_URL.to_string()
            },
        }
    }

    /// Point the client at a different endpoint
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    fn missing_fields(&self) -> Vec<String> {
        [
            (vars::NAMECHEAP_API_USER, &self.api_user),
            (vars::NAMECHEAP_API_KEY, &self.api_key),
            (vars::NAMECHEAP_USERNAME, &self.username),
            (vars::NAMECHEAP_CLIENT_IP, &self.client_ip),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name.to_string())
        .collect()
    }
}

impl std::fmt::Debug for NamecheapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamecheapConfig")
            .field("api_user", &self.api_user)
            .field("api_key", &"<REDACTED>")
            .field("username", &self.username)
            .field("client_ip", &self.client_ip)
            .field("sandbox", &self.sandbox)
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// DNS provider (Cloudflare) configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct CloudflareConfig {
    /// API token with Zone:Edit and DNS:Edit permissions
    /// ⚠️ NEVER log this value
    pub api_token: String,

    /// API base URL (overridable for tests)
    #[serde(default = "default_cloudflare_url")]
    pub api_url: String,
}

impl CloudflareConfig {
    /// Create a DNS provider configuration for the public API
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            api_url: CLOUDFLARE_API_URL.to_string(),
        }
    }

    /// Point the client at a different base URL
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

impl std::fmt::Debug for CloudflareConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareConfig")
            .field("api_token", &"<REDACTED>")
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// Workflow settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupConfig {
    /// Label of the worker subdomain placeholder (`<label>.<domain>`)
    #[serde(default = "default_worker_subdomain")]
    pub worker_subdomain: String,

    /// Address the placeholder record points at until a worker route replaces it
    ///
    /// Defaults to 192.0.2.1 (TEST-NET-1), which is never routable.
    #[serde(default = "default_placeholder_ip")]
    pub placeholder_ip: Ipv4Addr,

    /// TTL for records created by the workflow
    #[serde(default = "default_record_ttl")]
    pub record_ttl: u32,
}

impl SetupConfig {
    /// Validate the workflow settings
    pub fn validate(&self) -> crate::Result<()> {
        let label = &self.worker_subdomain;
        if label.is_empty()
            || label.len() > 63
            || label.starts_with('-')
            || label.ends_with('-')
            || !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(crate::Error::config(format!(
                "Worker subdomain '{}' is not a valid DNS label",
                label
            )));
        }
        if self.record_ttl == 0 {
            return Err(crate::Error::config("Record TTL must be > 0"));
        }
        Ok(())
    }
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            worker_subdomain: default_worker_subdomain(),
            placeholder_ip: default_placeholder_ip(),
            record_ttl: default_record_ttl(),
        }
    }
}

fn default_worker_subdomain() -> String {
    "app".to_string()
}

fn default_placeholder_ip() -> Ipv4Addr {
    Ipv4Addr::new(192, 0, 2, 1)
}

fn default_record_ttl() -> u32 {
    300
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_namecheap_url() -> String {
    NAMECHEAP_API_URL.to_string()
}

fn default_cloudflare_url() -> String {
    CLOUDFLARE_API_URL.to_string()
}
