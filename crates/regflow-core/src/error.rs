//! Error types for regflow
//!
//! This module defines all error types used throughout the workspace.

use thiserror::Error;

/// Result type alias for regflow operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for regflow
#[derive(Error, Debug)]
pub enum Error {
    /// A remote call failed or the provider reported an error payload
    #[error("{provider} API error: {message}")]
    Provider {
        /// Provider name (e.g. "namecheap", "cloudflare")
        provider: String,
        /// Error message, including any provider-reported text
        message: String,
    },

    /// The registrar price list has no entry for the TLD
    #[error("No pricing information found for .{0} domains")]
    PricingNotFound(String),

    /// The registrar response did not carry an account balance
    #[error("Could not retrieve account balance")]
    BalanceUnavailable,

    /// Account balance does not cover the registration price
    #[error("Insufficient balance. Required: ${required:.2}, Available: ${available:.2}")]
    InsufficientBalance {
        /// Registration price
        required: f64,
        /// Available account balance
        available: f64,
    },

    /// The operator declined a confirmation prompt
    #[error("Registration cancelled by user")]
    UserCancelled,

    /// The domain must be registered but registration was not authorized
    #[error("Domain {0} is not registered, registration not authorized (use --force-registration)")]
    NotRegisteredUnauthorized(String),

    /// One or more required configuration values are missing
    #[error("Missing required configuration: {}", .0.join(", "))]
    ConfigurationMissing(Vec<String>),

    /// A configuration value is present but invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input (e.g. a malformed domain name)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Reading an answer from the operator failed
    #[error("Prompt error: {0}")]
    Prompt(String),
}

impl Error {
    /// Create a provider error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a "pricing not found" error for a TLD
    pub fn pricing_not_found(tld: impl Into<String>) -> Self {
        Self::PricingNotFound(tld.into())
    }

    /// Create an insufficient balance error
    pub fn insufficient_balance(required: f64, available: f64) -> Self {
        Self::InsufficientBalance {
            required,
            available,
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a prompt error
    pub fn prompt(msg: impl Into<String>) -> Self {
        Self::Prompt(msg.into())
    }

    /// Whether this error came from a remote provider
    pub fn is_provider(&self) -> bool {
        matches!(self, Self::Provider { .. })
    }

    /// Whether this error comes from missing or invalid configuration
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_) | Self::ConfigurationMissing(_))
    }
}
