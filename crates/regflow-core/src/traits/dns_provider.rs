// # DNS Provider Trait
//
// Defines the interface to the DNS host that serves the domain's zone.
//
// ## Implementations
//
// - Cloudflare: `regflow-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use regflow_core::DnsProvider;
//
// let zone = provider.add_zone("example.com").await?;
// let nameservers = provider.get_zone_nameservers(&zone.id).await?;
// ```

use async_trait::async_trait;
use std::net::Ipv4Addr;

use crate::types::{DnsRecord, RecordRequest, Zone};

/// Trait for DNS provider implementations
///
/// Every call fails with [`crate::Error::Provider`] when the transport
/// reports a non-success status or the provider payload reports failure.
/// The message carries all provider-reported error messages, comma-joined.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Create a zone for the domain
    async fn add_zone(&self, domain: &str) -> crate::Result<Zone>;

    /// Look up the zone whose name is exactly `domain`
    ///
    /// # Returns
    ///
    /// - `Ok(None)`: No such zone (not an error)
    async fn get_zone_info(&self, domain: &str) -> crate::Result<Option<Zone>>;

    /// Nameservers assigned to the zone (empty if none assigned yet)
    async fn get_zone_nameservers(&self, zone_id: &str) -> crate::Result<Vec<String>>;

    /// Create a DNS record in the zone
    async fn create_record(&self, zone_id: &str, request: RecordRequest)
    -> crate::Result<DnsRecord>;

    /// List every zone in the account
    async fn list_zones(&self) -> crate::Result<Vec<Zone>>;

    /// List every record in the zone
    async fn get_zone_records(&self, zone_id: &str) -> crate::Result<Vec<DnsRecord>>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;

    /// Whether a zone named `domain` exists
    async fn zone_exists(&self, domain: &str) -> crate::Result<bool> {
        Ok(self.get_zone_info(domain).await?.is_some())
    }

    /// Create a proxied A record that holds a subdomain until a worker route replaces it
    async fn create_subdomain_placeholder(
        &self,
        zone_id: &str,
        subdomain: &str,
        placeholder_ip: Ipv4Addr,
        ttl: u32,
    ) -> crate::Result<DnsRecord> {
        let request = RecordRequest::new("A", subdomain, placeholder_ip.to_string())
            .with_ttl(ttl)
            .with_proxied(true);
        self.create_record(zone_id, request).await
    }
}
