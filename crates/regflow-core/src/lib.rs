// # regflow-core
//
// Core library for the regflow domain onboarding workflow.
//
// ## Architecture Overview
//
// Given one domain name, regflow makes a registrar and a DNS host agree:
// - **Registrar**: Trait for the registrar account (availability, pricing,
//   registration, nameserver delegation)
// - **DnsProvider**: Trait for the DNS host (zones, nameservers, records)
// - **Prompt**: Trait for the operator confirmation gate in front of paid actions
// - **StatusReconciler**: Builds a unified `DomainStatus` snapshot from both sides
// - **SetupOrchestrator**: Drives the idempotent convergence workflow
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Vendor wire formats live in their own crates
// 2. **Best-Effort Reads**: Probes degrade to empty/false, they never abort a status query
// 3. **Fail-Fast Writes**: A failed mutating call ends the workflow, nothing is retried
// 4. **Library-First**: The binary is a thin shell over this crate
// 5. **Idempotency**: Re-running setup on a converged domain issues no writes

pub mod config;
pub mod error;
pub mod setup;
pub mod status;
pub mod traits;
pub mod types;

// Re-export core types for convenience
pub use config::{CloudflareConfig, NamecheapConfig, RegflowConfig, SetupConfig};
pub use error::{Error, Result};
pub use setup::{SetupOptions, SetupOrchestrator, SetupResult, SetupStep};
pub use status::{DomainStatus, StatusReconciler, nameservers_match};
pub use traits::{DeclinePrompt, DnsProvider, Prompt, Registrar};
pub use types::{DnsRecord, Pricing, RecordRequest, RegistrantInfo, Zone};
