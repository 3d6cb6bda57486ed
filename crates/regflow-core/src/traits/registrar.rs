// # Registrar Trait
//
// Defines the interface to the domain registrar account.
//
// ## Implementations
//
// - Namecheap: `regflow-registrar-namecheap` crate
//
// ## Error Policy
//
// Mutating operations (`register_domain`, `set_nameservers`) and the
// purchase checks (`check_availability`, `get_pricing`, `get_account_balance`)
// propagate every failure as an error.
//
// The two probes used to build a status snapshot are best-effort:
// `is_registered` degrades to `false` and `get_nameservers` to an empty list.
// They are provided on top of the fallible raw reads `list_domains` and
// `domain_nameservers`, so callers that need the failure reason (the status
// reconciler) can still get it.

use async_trait::async_trait;
use tracing::warn;

use crate::types::{Pricing, RegistrantInfo};

/// Trait for domain registrar implementations
///
/// Every method issues exactly one request to the registrar. Implementations
/// must not retry; a transport failure, timeout, or provider-reported error is
/// returned to the caller as [`crate::Error::Provider`].
#[async_trait]
pub trait Registrar: Send + Sync {
    /// Check whether the domain can be purchased
    async fn check_availability(&self, domain: &str) -> crate::Result<bool>;

    /// Get one-year registration and renewal prices for the domain's TLD
    ///
    /// # Errors
    ///
    /// - [`crate::Error::PricingNotFound`] if the TLD is not in the price list
    async fn get_pricing(&self, domain: &str) -> crate::Result<Pricing>;

    /// Get the available account balance
    ///
    /// # Errors
    ///
    /// - [`crate::Error::BalanceUnavailable`] if the response omits the balance
    async fn get_account_balance(&self) -> crate::Result<f64>;

    /// Register the domain
    ///
    /// The registrant record is submitted under all four contact roles.
    ///
    /// # Returns
    ///
    /// `true` iff the registrar confirms the registration
    async fn register_domain(
        &self,
        domain: &str,
        years: u32,
        registrant: &RegistrantInfo,
    ) -> crate::Result<bool>;

    /// Delegate the domain to the given nameservers
    ///
    /// # Returns
    ///
    /// `true` iff the registrar confirms the update
    async fn set_nameservers(&self, domain: &str, nameservers: &[String]) -> crate::Result<bool>;

    /// List every domain name in the account
    async fn list_domains(&self) -> crate::Result<Vec<String>>;

    /// Get the nameservers currently delegated at the registrar
    ///
    /// Returns an empty list when the registrar reports none.
    async fn domain_nameservers(&self, domain: &str) -> crate::Result<Vec<String>>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;

    /// Whether the domain is in the account (case-insensitive exact match)
    ///
    /// Best-effort: any error is logged and reported as `false`.
    async fn is_registered(&self, domain: &str) -> bool {
        match self.list_domains().await {
            Ok(domains) => domains.iter().any(|d| d.eq_ignore_ascii_case(domain)),
            Err(e) => {
                warn!("Could not list {} domains: {}", self.provider_name(), e);
                false
            }
        }
    }

    /// Nameservers delegated at the registrar
    ///
    /// Best-effort: any error is logged and reported as an empty list.
    async fn get_nameservers(&self, domain: &str) -> Vec<String> {
        match self.domain_nameservers(domain).await {
            Ok(nameservers) => nameservers,
            Err(e) => {
                warn!(
                    "Could not read {} nameservers for {}: {}",
                    self.provider_name(),
                    domain,
                    e
                );
                Vec::new()
            }
        }
    }
}
