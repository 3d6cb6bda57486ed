//! Setup orchestrator
//!
//! The SetupOrchestrator is responsible for:
//! - Taking a status snapshot through the [`StatusReconciler`]
//! - Registering the domain when needed and authorized
//! - Creating the DNS zone if absent
//! - Delegating the domain to the zone's nameservers if they differ
//! - Seeding baseline records and the worker subdomain placeholder
//!
//! ## Stage Flow
//!
//! ```text
//! ┌──────────────┐   ┌──────────┐   ┌─────────────┐   ┌──────────┐   ┌──────────┐
//! │ A: register  │──▶│ B: zone  │──▶│ C: delegate │──▶│ D: seed  │──▶│ E: worker│──▶ success
//! └──────────────┘   └──────────┘   └─────────────┘   └──────────┘   └──────────┘
//!        │                │                │                               │
//!        ▼                ▼                ▼                               ▼
//!     failure    failure / dry-run stop  failure                        failure
//! ```
//!
//! Every stage first checks the snapshot and only writes what is missing, so
//! a second run over a converged domain completes the `*_already_*` steps and
//! issues no writes. A failed stage ends the run: its message is appended to
//! `errors` and `success` stays unset. Nothing is retried.

mod result;

pub use result::{SetupOptions, SetupResult, SetupStep};

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::SetupConfig;
use crate::error::Error;
use crate::status::{DomainStatus, StatusReconciler, nameservers_match, normalize_domain};
use crate::traits::{DnsProvider, Prompt, Registrar};
use crate::types::RegistrantInfo;

/// Registration length requested from the registrar
const REGISTRATION_YEARS: u32 = 1;

/// Token the operator must type verbatim to authorize a registration
const REGISTER_TOKEN: &str = "REGISTER";

/// Message of a stage that ended the run
type StageFailure = String;

/// Drives one domain through the onboarding workflow
///
/// ## Threading
///
/// All state of a run lives in the [`SetupResult`] it returns, so one
/// orchestrator can serve sequential runs, or parallel runs for different
/// domains.
pub struct SetupOrchestrator {
    registrar: Arc<dyn Registrar>,
    dns: Arc<dyn DnsProvider>,
    prompt: Arc<dyn Prompt>,
    reconciler: StatusReconciler,
    settings: SetupConfig,
}

impl SetupOrchestrator {
    /// Create a new orchestrator
    ///
    /// # Parameters
    ///
    /// - `registrar`: Registrar client
    /// - `dns`: DNS provider client
    /// - `prompt`: Confirmation source for paid registrations
    /// - `settings`: Workflow settings
    pub fn new(
        registrar: Arc<dyn Registrar>,
        dns: Arc<dyn DnsProvider>,
        prompt: Arc<dyn Prompt>,
        settings: &SetupConfig,
    ) -> Self {
        Self {
            reconciler: StatusReconciler::new(Arc::clone(&registrar), Arc::clone(&dns)),
            registrar,
            dns,
            prompt,
            settings: settings.clone(),
        }
    }

    /// The reconciler used for status snapshots
    pub fn reconciler(&self) -> &StatusReconciler {
        &self.reconciler
    }

    /// Run the setup workflow for `domain`
    ///
    /// Never fails: stage failures are collected into the result's `errors`.
    pub async fn setup(&self, domain: &str, options: &SetupOptions) -> SetupResult {
        let domain = normalize_domain(domain);
        let mut result = SetupResult::new(domain.clone());

        info!(
            "Setting up {} [mode: {}]",
            domain,
            if options.dry_run { "DRY-RUN" } else { "LIVE" }
        );

        match self.run(&domain, options, &mut result).await {
            Ok(true) => {
                result.success = Some(true);
                info!("Domain {} setup completed successfully", domain);
            }
            Ok(false) => {
                info!("Dry run for {} stopped before nameserver setup", domain);
            }
            Err(message) => {
                warn!("Setup of {} failed: {}", domain, message);
                result.errors.push(message);
            }
        }

        result
    }

    /// Run all stages, returning `Ok(false)` for the dry-run stop
    async fn run(
        &self,
        domain: &str,
        options: &SetupOptions,
        result: &mut SetupResult,
    ) -> Result<bool, StageFailure> {
        let status = self.reconciler.get_status(domain).await;

        self.ensure_registration(domain, &status, options, result)
            .await?;

        let Some(zone_id) = self.ensure_zone(domain, &status, options, result).await? else {
            return Ok(false);
        };

        self.ensure_delegation(domain, &zone_id, &status, options, result)
            .await?;

        // Baseline records are deferred: the stage completes with no records.
        result.dns_records = Some(Vec::new());
        result.push(SetupStep::BasicDnsSetup);

        if options.setup_workers {
            self.ensure_worker_subdomain(domain, &zone_id, options, result)
                .await?;
        }

        Ok(true)
    }

    /// Stage A: registration
    async fn ensure_registration(
        &self,
        domain: &str,
        status: &DomainStatus,
        options: &SetupOptions,
        result: &mut SetupResult,
    ) -> Result<(), StageFailure> {
        if status.registered {
            info!("✓ Domain {} is already registered", domain);
            result.push(SetupStep::DomainAlreadyRegistered);
            return Ok(());
        }

        if !options.force_registration {
            return Err(Error::NotRegisteredUnauthorized(domain.to_string()).to_string());
        }

        info!("Checking availability for {}", domain);
        let available = self
            .registrar
            .check_availability(domain)
            .await
            .map_err(|e| format!("Failed to check availability of {}: {}", domain, e))?;
        if !available {
            return Err(format!("Domain {} is not available for registration", domain));
        }

        let pricing = self
            .registrar
            .get_pricing(domain)
            .await
            .map_err(|e| format!("Failed to get pricing/balance: {}", e))?;
        let balance = self
            .registrar
            .get_account_balance()
            .await
            .map_err(|e| format!("Failed to get pricing/balance: {}", e))?;

        if balance < pricing.register {
            return Err(Error::insufficient_balance(pricing.register, balance).to_string());
        }

        info!(
            "Registration quote for {}: price ${:.2}, balance ${:.2}, remaining ${:.2}",
            domain,
            pricing.register,
            balance,
            balance - pricing.register
        );
        if pricing.renew_is_estimate {
            debug!(
                "Renewal price for {} not reported, assuming registration price",
                domain
            );
        }

        if options.dry_run {
            warn!("[DRY-RUN] Would register domain {}", domain);
            result.push(SetupStep::DomainRegistrationDryRun);
            return Ok(());
        }

        warn!(
            "This will charge ${:.2} to your {} account!",
            pricing.register,
            self.registrar.provider_name()
        );
        self.confirm_registration(domain, pricing.register)?;

        info!("Registering domain {}", domain);
        let default_registrant = RegistrantInfo::default();
        let registrant = options.registrant.as_ref().unwrap_or(&default_registrant);
        match self
            .registrar
            .register_domain(domain, REGISTRATION_YEARS, registrant)
            .await
        {
            Ok(true) => {
                info!("✓ Domain {} registered successfully", domain);
                result.push(SetupStep::DomainRegistration);
                Ok(())
            }
            Ok(false) => Err(format!("Failed to register domain {}", domain)),
            Err(e) => Err(format!("Failed to register domain {}: {}", domain, e)),
        }
    }

    /// Two-step operator confirmation in front of a paid registration
    fn confirm_registration(&self, domain: &str, price: f64) -> Result<(), StageFailure> {
        let first = self.ask(&format!(
            "Type '{}' to proceed with registration of {}",
            REGISTER_TOKEN, domain
        ))?;
        if first.trim() != REGISTER_TOKEN {
            return Err(Error::UserCancelled.to_string());
        }

        let second = self.ask(&format!(
            "Are you absolutely sure you want to register {} for ${:.2}? (yes/no)",
            domain, price
        ))?;
        if !second.trim().eq_ignore_ascii_case("yes") {
            return Err(Error::UserCancelled.to_string());
        }

        Ok(())
    }

    fn ask(&self, question: &str) -> Result<String, StageFailure> {
        self.prompt.ask(question).map_err(|e| {
            warn!("Confirmation prompt failed: {}", e);
            Error::UserCancelled.to_string()
        })
    }

    /// Stage B: DNS zone
    ///
    /// Returns `None` when a dry run has no zone to continue with.
    async fn ensure_zone(
        &self,
        domain: &str,
        status: &DomainStatus,
        options: &SetupOptions,
        result: &mut SetupResult,
    ) -> Result<Option<String>, StageFailure> {
        if let Some(ref zone) = status.dns_zone {
            info!("✓ DNS zone already exists (ID: {})", zone.id);
            result.zone_id = Some(zone.id.clone());
            result.push(SetupStep::CloudflareZoneAlreadyExists);
            return Ok(Some(zone.id.clone()));
        }

        if options.dry_run {
            // Later stages need a real zone ID.
            warn!("[DRY-RUN] Would create {} zone for {}", self.dns.provider_name(), domain);
            result.push(SetupStep::CloudflareZoneCreationDryRun);
            return Ok(None);
        }

        info!("Creating {} zone for {}", self.dns.provider_name(), domain);
        let zone = self
            .dns
            .add_zone(domain)
            .await
            .map_err(|e| format!("Failed to create Cloudflare zone: {}", e))?;

        info!("✓ DNS zone created (ID: {})", zone.id);
        result.zone_id = Some(zone.id.clone());
        result.push(SetupStep::CloudflareZoneCreation);
        Ok(Some(zone.id))
    }

    /// Stage C: nameserver delegation
    async fn ensure_delegation(
        &self,
        domain: &str,
        zone_id: &str,
        status: &DomainStatus,
        options: &SetupOptions,
        result: &mut SetupResult,
    ) -> Result<(), StageFailure> {
        let nameservers = self
            .dns
            .get_zone_nameservers(zone_id)
            .await
            .map_err(|e| format!("Failed to get Cloudflare nameservers: {}", e))?;
        result.nameservers = Some(nameservers.clone());

        if nameservers.is_empty() {
            return Err(format!(
                "Cloudflare has not assigned nameservers to zone {} yet",
                zone_id
            ));
        }
        debug!("Zone nameservers: {}", nameservers.join(", "));

        if nameservers_match(&status.registrar_nameservers, &nameservers) {
            info!("✓ Nameservers already configured correctly");
            result.push(SetupStep::NameserversAlreadyConfigured);
            return Ok(());
        }

        if options.dry_run {
            warn!(
                "[DRY-RUN] Would update nameservers of {} to: {}",
                domain,
                nameservers.join(", ")
            );
            result.push(SetupStep::NameserverUpdateDryRun);
            return Ok(());
        }

        info!(
            "Updating nameservers at {} for {}",
            self.registrar.provider_name(),
            domain
        );
        match self.registrar.set_nameservers(domain, &nameservers).await {
            Ok(true) => {
                info!("✓ Nameservers updated");
                result.push(SetupStep::NameserverUpdate);
                Ok(())
            }
            Ok(false) => Err("Failed to update nameservers at the registrar".to_string()),
            Err(e) => Err(format!(
                "Failed to update nameservers at the registrar: {}",
                e
            )),
        }
    }

    /// Stage E: worker subdomain placeholder
    async fn ensure_worker_subdomain(
        &self,
        domain: &str,
        zone_id: &str,
        options: &SetupOptions,
        result: &mut SetupResult,
    ) -> Result<(), StageFailure> {
        let subdomain = format!("{}.{}", self.settings.worker_subdomain, domain);

        // Best-effort: an unreadable record list falls through to creation.
        match self.dns.get_zone_records(zone_id).await {
            Ok(records) => {
                if let Some(existing) = records
                    .into_iter()
                    .find(|r| r.supports_proxy() && r.name.eq_ignore_ascii_case(&subdomain))
                {
                    info!("✓ Worker subdomain {} already exists", subdomain);
                    result.worker_record = Some(existing);
                    result.push(SetupStep::WorkerSubdomainAlreadyExists);
                    return Ok(());
                }
            }
            Err(e) => warn!("Could not list records of zone {}: {}", zone_id, e),
        }

        if options.dry_run {
            warn!("[DRY-RUN] Would create worker subdomain {}", subdomain);
            result.push(SetupStep::WorkerSubdomainSetupDryRun);
            return Ok(());
        }

        info!("Creating worker subdomain {}", subdomain);
        let record = self
            .dns
            .create_subdomain_placeholder(
                zone_id,
                &subdomain,
                self.settings.placeholder_ip,
                self.settings.record_ttl,
            )
            .await
            .map_err(|e| format!("Failed to set up worker subdomain: {}", e))?;

        info!("✓ Worker subdomain {} created", subdomain);
        result.worker_record = Some(record);
        result.push(SetupStep::WorkerSubdomainSetup);
        Ok(())
    }
}
