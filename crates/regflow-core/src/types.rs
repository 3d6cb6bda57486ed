//! Shared value types exchanged between the core and the provider clients

use serde::{Deserialize, Serialize};

/// A DNS provider zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Provider zone ID
    pub id: String,
    /// Zone apex name (e.g. "example.com")
    pub name: String,
    /// Provider-reported status ("active", "pending", ...)
    #[serde(default = "default_zone_status")]
    pub status: String,
}

impl Zone {
    pub fn new(id: impl Into<String>, name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: status.into(),
        }
    }
}

fn default_zone_status() -> String {
    "unknown".to_string()
}

/// A DNS record as stored by the DNS provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Provider record ID
    pub id: String,
    /// Record type ("A", "CNAME", ...)
    #[serde(rename = "type")]
    pub record_type: String,
    /// Fully-qualified record name
    pub name: String,
    /// Record content (address, target, text)
    pub content: String,
    /// Time-to-live in seconds (1 = automatic)
    #[serde(default)]
    pub ttl: u32,
    /// Whether traffic is proxied through the provider
    #[serde(default)]
    pub proxied: bool,
}

impl DnsRecord {
    /// Whether the record can route traffic through the provider proxy
    pub fn supports_proxy(&self) -> bool {
        is_proxiable(&self.record_type)
    }
}

/// Request to create a DNS record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRequest {
    /// Record type ("A", "AAAA", "CNAME", "TXT", ...)
    pub record_type: String,
    /// Record name
    pub name: String,
    /// Record content
    pub content: String,
    /// Time-to-live in seconds
    pub ttl: u32,
    /// Proxy flag, only meaningful for A/AAAA/CNAME
    pub proxied: bool,
}

/// Default TTL for created records
pub const DEFAULT_RECORD_TTL: u32 = 300;

impl RecordRequest {
    /// Create a record request with the default TTL and no proxying
    pub fn new(
        record_type: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            record_type: record_type.into().to_uppercase(),
            name: name.into(),
            content: content.into(),
            ttl: DEFAULT_RECORD_TTL,
            proxied: false,
        }
    }

    /// Set the TTL
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    /// Enable or disable proxying
    pub fn with_proxied(mut self, proxied: bool) -> Self {
        self.proxied = proxied;
        self
    }

    /// Whether the proxy flag applies to this record type
    pub fn supports_proxy(&self) -> bool {
        is_proxiable(&self.record_type)
    }
}

/// A/AAAA/CNAME records can be proxied, whatever the letter case
fn is_proxiable(record_type: &str) -> bool {
    ["A", "AAAA", "CNAME"]
        .iter()
        .any(|t| t.eq_ignore_ascii_case(record_type))
}

/// Registration pricing for a domain, in account currency
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pricing {
    /// One-year registration price
    pub register: f64,
    /// One-year renewal price
    pub renew: f64,
    /// `renew` was not reported separately and mirrors `register`
    ///
    /// This is an approximation: registrars often renew at a different
    /// price than the first-year promotional registration.
    pub renew_is_estimate: bool,
}

/// Registrant contact record
///
/// The same record is submitted for the Registrant, Tech, Admin and
/// AuxBilling contact roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrantInfo {
    pub first_name: String,
    pub last_name: String,
    pub address1: String,
    pub city: String,
    pub state_province: String,
    pub postal_code: String,
    pub country: String,
    /// Phone in registrar format (`+1.5551234567`)
    pub phone: String,
    pub email_address: String,
}

impl RegistrantInfo {
    /// Contact roles that receive the registrant data
    pub const CONTACT_ROLES: [&'static str; 4] = ["Registrant", "Tech", "Admin", "AuxBilling"];

    /// Field name/value pairs in registrar wire naming
    pub fn fields(&self) -> [(&'static str, &str); 9] {
        [
            ("FirstName", self.first_name.as_str()),
            ("LastName", self.last_name.as_str()),
            ("Address1", self.address1.as_str()),
            ("City", self.city.as_str()),
            ("StateProvince", self.state_province.as_str()),
            ("PostalCode", self.postal_code.as_str()),
            ("Country", self.country.as_str()),
            ("Phone", self.phone.as_str()),
            ("EmailAddress", self.email_address.as_str()),
        ]
    }

    /// Parameters for every contact role (`RegistrantFirstName`, `TechFirstName`, ...)
    pub fn contact_params(&self) -> Vec<(String, String)> {
        Self::CONTACT_ROLES
            .iter()
            .flat_map(|role| {
                self.fields()
                    .into_iter()
                    .map(move |(field, value)| (format!("{}{}", role, field), value.to_string()))
            })
            .collect()
    }
}

impl Default for RegistrantInfo {
    /// Placeholder contact used when the caller supplies none
    fn default() -> Self {
        Self {
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            address1: "123 Main St".to_string(),
            city: "Anytown".to_string(),
            state_province: "NY".to_string(),
            postal_code: "12345".to_string(),
            country: "US".to_string(),
            phone: "+1.5551234567".to_string(),
            email_address: "john.doe@example.com".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_params_cover_all_roles() {
        let params = RegistrantInfo::default().contact_params();

        assert_eq!(params.len(), 36);
        for role in RegistrantInfo::CONTACT_ROLES {
            let key = format!("{}EmailAddress", role);
            assert!(
                params
                    .iter()
                    .any(|(k, v)| *k == key && v == "john.doe@example.com"),
                "missing {}",
                key
            );
        }
    }

    #[test]
    fn test_record_request_proxy_support() {
        assert!(RecordRequest::new("a", "app.example.com", "192.0.2.1").supports_proxy());
        assert!(RecordRequest::new("CNAME", "www", "example.com").supports_proxy());
        assert!(!RecordRequest::new("TXT", "example.com", "v=spf1 -all").supports_proxy());
    }

    #[test]
    fn test_stored_record_proxy_support_ignores_case() {
        let record = |record_type: &str| DnsRecord {
            id: "r1".to_string(),
            record_type: record_type.to_string(),
            name: "app.example.com".to_string(),
            content: "192.0.2.1".to_string(),
            ttl: 300,
            proxied: false,
        };
        assert!(record("A").supports_proxy());
        assert!(record("aaaa").supports_proxy());
        assert!(!record("TXT").supports_proxy());
        assert!(!record("MX").supports_proxy());
    }

    #[test]
    fn test_zone_status_defaults_to_unknown() {
        let zone: Zone = serde_json::from_str(r#"{"id":"z1","name":"example.com"}"#).unwrap();
        assert_eq!(zone.status, "unknown");
    }
}
