//! Status reconciliation
//!
//! The [`StatusReconciler`] asks both systems of record about one domain and
//! folds the answers into a single [`DomainStatus`] snapshot:
//!
//! ```text
//!                  ┌──────────────────┐
//!                  │ StatusReconciler │
//!                  └──────────────────┘
//!                    │              │
//!        list_domains│              │get_zone_info
//!  domain_nameservers│              │get_zone_nameservers
//!                    ▼              ▼
//!             ┌───────────┐   ┌─────────────┐
//!             │ Registrar │   │ DnsProvider │
//!             └───────────┘   └─────────────┘
//! ```
//!
//! Every probe is independent. A failing probe leaves its fields at the
//! empty/false default, records the reason in the snapshot, and never hides
//! what the other probes learned.

use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::traits::{DnsProvider, Registrar};
use crate::types::Zone;

/// Unified view of a domain across registrar and DNS provider
///
/// Computed fresh per query and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainStatus {
    /// Lowercase-normalized domain name
    pub domain: String,

    /// Domain appears in the registrar account
    pub registered: bool,

    /// Nameservers delegated at the registrar (empty if unknown or unregistered)
    pub registrar_nameservers: Vec<String>,

    /// Zone at the DNS provider, if one exists
    pub dns_zone: Option<Zone>,

    /// Nameservers the DNS provider assigned to the zone (empty if no zone)
    pub dns_nameservers: Vec<String>,

    /// Why the registration probe degraded
    pub registration_error: Option<String>,

    /// Why the DNS provider probe degraded
    pub dns_error: Option<String>,

    /// Why the registrar nameserver probe degraded
    pub registrar_nameserver_error: Option<String>,
}

impl DomainStatus {
    /// Create an empty snapshot for `domain`
    pub fn new(domain: &str) -> Self {
        Self {
            domain: normalize_domain(domain),
            registered: false,
            registrar_nameservers: Vec::new(),
            dns_zone: None,
            dns_nameservers: Vec::new(),
            registration_error: None,
            dns_error: None,
            registrar_nameserver_error: None,
        }
    }

    /// Set the registrar-side nameservers
    pub fn with_registrar_nameservers(mut self, nameservers: Vec<String>) -> Self {
        self.registrar_nameservers = nameservers;
        self
    }

    /// Set the DNS-provider-side zone and nameservers
    pub fn with_dns_zone(mut self, zone: Zone, nameservers: Vec<String>) -> Self {
        self.dns_zone = Some(zone);
        self.dns_nameservers = nameservers;
        self
    }

    /// Mark the domain as registered
    pub fn with_registered(mut self, registered: bool) -> Self {
        self.registered = registered;
        self
    }

    /// Both nameserver sets are known and equal
    ///
    /// Computed from the current lists on every call.
    pub fn nameservers_match(&self) -> bool {
        nameservers_match(&self.registrar_nameservers, &self.dns_nameservers)
    }

    /// Whether any probe degraded
    pub fn has_errors(&self) -> bool {
        self.registration_error.is_some()
            || self.dns_error.is_some()
            || self.registrar_nameserver_error.is_some()
    }
}

impl Serialize for DomainStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("DomainStatus", 9)?;
        state.serialize_field("domain", &self.domain)?;
        state.serialize_field("registered", &self.registered)?;
        state.serialize_field("registrar_nameservers", &self.registrar_nameservers)?;
        state.serialize_field("dns_zone", &self.dns_zone)?;
        state.serialize_field("dns_nameservers", &self.dns_nameservers)?;
        state.serialize_field("nameservers_match", &self.nameservers_match())?;

        let diagnostics = [
            ("registration_error", &self.registration_error),
            ("dns_error", &self.dns_error),
            ("registrar_nameserver_error", &self.registrar_nameserver_error),
        ];
        for (name, value) in diagnostics {
            match value {
                Some(message) => state.serialize_field(name, message)?,
                None => state.skip_field(name)?,
            }
        }
        state.end()
    }
}

/// Compare two nameserver lists as sets
///
/// Comparison ignores order, ASCII case and a trailing root dot. An empty
/// side never matches: unknown is not agreement.
pub fn nameservers_match(left: &[String], right: &[String]) -> bool {
    if left.is_empty() || right.is_empty() {
        return false;
    }
    nameserver_set(left) == nameserver_set(right)
}

fn nameserver_set(nameservers: &[String]) -> HashSet<String> {
    nameservers
        .iter()
        .map(|ns| ns.trim().trim_end_matches('.').to_ascii_lowercase())
        .filter(|ns| !ns.is_empty())
        .collect()
}

pub(crate) fn normalize_domain(domain: &str) -> String {
    domain.trim().trim_end_matches('.').to_ascii_lowercase()
}

/// Builds [`DomainStatus`] snapshots from both providers
#[derive(Clone)]
pub struct StatusReconciler {
    registrar: Arc<dyn Registrar>,
    dns: Arc<dyn DnsProvider>,
}

impl StatusReconciler {
    /// Create a reconciler over the two providers
    pub fn new(registrar: Arc<dyn Registrar>, dns: Arc<dyn DnsProvider>) -> Self {
        Self { registrar, dns }
    }

    /// Query both providers for the current state of `domain`
    ///
    /// Never fails: each probe that errors is recorded in the returned
    /// snapshot and its fields keep their empty/false defaults.
    pub async fn get_status(&self, domain: &str) -> DomainStatus {
        let mut status = DomainStatus::new(domain);
        let domain = status.domain.clone();

        // Registration
        match self.registrar.list_domains().await {
            Ok(domains) => {
                status.registered = domains.iter().any(|d| d.eq_ignore_ascii_case(&domain));
                debug!("{} registered: {}", domain, status.registered);
            }
            Err(e) => {
                warn!("Registration probe failed for {}: {}", domain, e);
                status.registration_error = Some(e.to_string());
            }
        }

        // DNS zone and its nameservers
        match self.dns.get_zone_info(&domain).await {
            Ok(Some(zone)) => {
                debug!("Found {} zone {} ({})", self.dns.provider_name(), zone.id, zone.status);
                match self.dns.get_zone_nameservers(&zone.id).await {
                    Ok(nameservers) => status.dns_nameservers = nameservers,
                    Err(e) => {
                        warn!("Zone nameserver probe failed for {}: {}", domain, e);
                        status.dns_error = Some(e.to_string());
                    }
                }
                status.dns_zone = Some(zone);
            }
            Ok(None) => debug!("No {} zone for {}", self.dns.provider_name(), domain),
            Err(e) => {
                warn!("Zone probe failed for {}: {}", domain, e);
                status.dns_error = Some(e.to_string());
            }
        }

        // Registrar delegation, only meaningful for a registered domain
        if status.registered {
            match self.registrar.domain_nameservers(&domain).await {
                Ok(nameservers) => status.registrar_nameservers = nameservers,
                Err(e) => {
                    warn!("Registrar nameserver probe failed for {}: {}", domain, e);
                    status.registrar_nameserver_error = Some(e.to_string());
                }
            }
        }

        status
    }
}

impl fmt::Display for DomainStatus {
    /// Human-readable status report
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Domain Status: {} ===", self.domain)?;

        if self.registered {
            writeln!(f, "✓ Domain is registered at the registrar")?;
        } else {
            writeln!(f, "✗ Domain is NOT registered at the registrar")?;
            if let Some(ref e) = self.registration_error {
                writeln!(f, "  Error: {}", e)?;
            }
        }

        match self.dns_zone {
            Some(ref zone) => writeln!(
                f,
                "✓ DNS zone exists (ID: {}, Status: {})",
                zone.id, zone.status
            )?,
            None => writeln!(f, "✗ No DNS zone found")?,
        }
        if let Some(ref e) = self.dns_error {
            writeln!(f, "  Error: {}", e)?;
        }

        writeln!(f, "Registrar nameservers: {}", join_or_none(&self.registrar_nameservers))?;
        if let Some(ref e) = self.registrar_nameserver_error {
            writeln!(f, "  Error: {}", e)?;
        }
        writeln!(f, "DNS provider nameservers: {}", join_or_none(&self.dns_nameservers))?;

        let verdict = match (
            self.registrar_nameservers.is_empty(),
            self.dns_nameservers.is_empty(),
        ) {
            (true, true) => "⚠ Cannot retrieve nameservers from either service",
            (true, false) => {
                "⚠ Cannot retrieve registrar nameservers - unable to verify configuration"
            }
            (false, true) => {
                "⚠ Cannot retrieve DNS provider nameservers - unable to verify configuration"
            }
            _ if self.nameservers_match() => "✓ Nameservers are properly configured",
            _ => "✗ Nameservers do NOT match",
        };
        writeln!(f, "{}", verdict)?;

        write!(f, "{}", "=".repeat(50))
    }
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "None".to_string()
    } else {
        items.join(", ")
    }
}
