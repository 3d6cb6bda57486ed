//! Core traits for regflow
//!
//! This module defines the abstract interfaces that the workflow is written against.
//!
//! - [`Registrar`]: Domain registrar account (availability, pricing, delegation)
//! - [`DnsProvider`]: DNS host (zones, nameservers, records)
//! - [`Prompt`]: Operator confirmation in front of paid actions

pub mod dns_provider;
pub mod prompt;
pub mod registrar;

pub use dns_provider::DnsProvider;
pub use prompt::{DeclinePrompt, Prompt};
pub use registrar::Registrar;
