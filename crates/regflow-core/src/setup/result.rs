//! Setup inputs and outputs

use serde::Serialize;
use std::fmt;

use crate::types::{DnsRecord, RegistrantInfo};

/// Steps the setup workflow can complete, in a closed vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupStep {
    DomainAlreadyRegistered,
    DomainRegistration,
    DomainRegistrationDryRun,
    CloudflareZoneAlreadyExists,
    CloudflareZoneCreation,
    CloudflareZoneCreationDryRun,
    NameserversAlreadyConfigured,
    NameserverUpdate,
    NameserverUpdateDryRun,
    BasicDnsSetup,
    WorkerSubdomainAlreadyExists,
    WorkerSubdomainSetup,
    WorkerSubdomainSetupDryRun,
}

impl SetupStep {
    /// Wire name of the step
    pub fn as_str(&self) -> &'static str {
        match self {
            SetupStep::DomainAlreadyRegistered => "domain_already_registered",
            SetupStep::DomainRegistration => "domain_registration",
            SetupStep::DomainRegistrationDryRun => "domain_registration_dry_run",
            SetupStep::CloudflareZoneAlreadyExists => "cloudflare_zone_already_exists",
            SetupStep::CloudflareZoneCreation => "cloudflare_zone_creation",
            SetupStep::CloudflareZoneCreationDryRun => "cloudflare_zone_creation_dry_run",
            SetupStep::NameserversAlreadyConfigured => "nameservers_already_configured",
            SetupStep::NameserverUpdate => "nameserver_update",
            SetupStep::NameserverUpdateDryRun => "nameserver_update_dry_run",
            SetupStep::BasicDnsSetup => "basic_dns_setup",
            SetupStep::WorkerSubdomainAlreadyExists => "worker_subdomain_already_exists",
            SetupStep::WorkerSubdomainSetup => "worker_subdomain_setup",
            SetupStep::WorkerSubdomainSetupDryRun => "worker_subdomain_setup_dry_run",
        }
    }

    /// Whether the step issued a mutating provider call
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            SetupStep::DomainRegistration
                | SetupStep::CloudflareZoneCreation
                | SetupStep::NameserverUpdate
                | SetupStep::WorkerSubdomainSetup
        )
    }
}

impl fmt::Display for SetupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for one setup run
#[derive(Debug, Clone)]
pub struct SetupOptions {
    /// Contact record for registration (placeholder contact if absent)
    pub registrant: Option<RegistrantInfo>,

    /// Create the worker subdomain placeholder
    pub setup_workers: bool,

    /// Report intended actions without mutating calls or prompts
    pub dry_run: bool,

    /// Authorize a paid registration when the domain is not in the account
    pub force_registration: bool,
}

impl SetupOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the registrant contact
    pub fn with_registrant(mut self, registrant: RegistrantInfo) -> Self {
        self.registrant = Some(registrant);
        self
    }

    /// Enable or disable the worker subdomain stage
    pub fn with_workers(mut self, setup_workers: bool) -> Self {
        self.setup_workers = setup_workers;
        self
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Authorize or forbid registration
    pub fn with_force_registration(mut self, force_registration: bool) -> Self {
        self.force_registration = force_registration;
        self
    }
}

impl Default for SetupOptions {
    fn default() -> Self {
        Self {
            registrant: None,
            setup_workers: true,
            dry_run: false,
            force_registration: false,
        }
    }
}

/// Outcome of one setup run
///
/// `steps_completed` is append-only and records the exact path taken. A
/// missing `success` means the run did not reach its terminal success point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetupResult {
    pub domain: String,

    pub steps_completed: Vec<SetupStep>,

    pub errors: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nameservers: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_records: Option<Vec<DnsRecord>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_record: Option<DnsRecord>,
}

impl SetupResult {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            steps_completed: Vec::new(),
            errors: Vec::new(),
            success: None,
            zone_id: None,
            nameservers: None,
            dns_records: None,
            worker_record: None,
        }
    }

    /// The run reached its terminal success point without errors
    pub fn is_success(&self) -> bool {
        self.success == Some(true) && self.errors.is_empty()
    }

    /// The run stopped early without error (dry run with no zone to inspect)
    pub fn is_dry_run_stop(&self) -> bool {
        self.success.is_none()
            && self.errors.is_empty()
            && self.completed(SetupStep::CloudflareZoneCreationDryRun)
    }

    /// Whether `step` was completed
    pub fn completed(&self, step: SetupStep) -> bool {
        self.steps_completed.contains(&step)
    }

    /// Wire names of the completed steps
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps_completed.iter().map(SetupStep::as_str).collect()
    }

    pub(crate) fn push(&mut self, step: SetupStep) {
        self.steps_completed.push(step);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_serialize_to_wire_names() {
        let mut result = SetupResult::new("example.com");
        result.push(SetupStep::CloudflareZoneCreationDryRun);
        result.push(SetupStep::NameserverUpdate);

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value["steps_completed"],
            serde_json::json!(["cloudflare_zone_creation_dry_run", "nameserver_update"])
        );
        assert_eq!(
            result.step_names(),
            vec!["cloudflare_zone_creation_dry_run", "nameserver_update"]
        );
    }

    #[test]
    fn test_missing_success_is_omitted_and_not_success() {
        let result = SetupResult::new("example.com");
        let value = serde_json::to_value(&result).unwrap();

        assert!(value.get("success").is_none());
        assert!(!result.is_success());
    }

    #[test]
    fn test_default_options_create_workers() {
        let options = SetupOptions::default();
        assert!(options.setup_workers);
        assert!(!options.dry_run);
        assert!(!options.force_registration);
        assert!(options.registrant.is_none());
    }
}
