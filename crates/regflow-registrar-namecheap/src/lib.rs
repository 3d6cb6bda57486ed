// # Namecheap Registrar
//
// This crate provides the Namecheap implementation of the regflow `Registrar`
// trait over the Namecheap XML API.
//
// ## Behavior
//
// - One HTTP GET per trait call (domain listing pages through the account)
// - HTTP timeout of 60 seconds
// - No retry logic: every failure is returned to the caller
// - Responses with `Status="ERROR"` fail with the first reported error text
//
// ## Security Requirements
//
// - The API key NEVER appears in logs or `Debug` output
// - Every request carries the whitelisted client IP from configuration
//
// ## API Reference
//
// - Namecheap API: https://www.namecheap.com/support/api/methods/
// - `namecheap.domains.check`, `namecheap.domains.create`,
//   `namecheap.domains.getList`, `namecheap.domains.getInfo`
// - `namecheap.domains.dns.setCustom`
// - `namecheap.users.getPricing`, `namecheap.users.getBalances`

mod xml;

use async_trait::async_trait;
use regflow_core::config::NamecheapConfig;
use regflow_core::traits::Registrar;
use regflow_core::types::{Pricing, RegistrantInfo};
use regflow_core::{Error, Result};
use std::time::Duration;
use tracing::debug;

use crate::xml::Element;

pub(crate) const PROVIDER: &str = "namecheap";

/// Default HTTP timeout for API requests (60 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Domains requested per `getList` page (the API maximum)
const DOMAIN_PAGE_SIZE: usize = 100;

/// Extracts nameservers from a `getInfo` response
type NameserverStrategy = fn(&Element) -> Vec<String>;

/// Response shapes that carry nameservers, tried in order until one yields any
const NAMESERVER_STRATEGIES: &[(&str, NameserverStrategy)] = &[
    ("DnsDetails", nameservers_in_dns_details),
    ("Nameserver elements", nameservers_anywhere),
    ("result attributes", nameservers_in_result_attributes),
];

/// Namecheap registrar client
#[derive(Debug)]
pub struct NamecheapRegistrar {
    config: NamecheapConfig,
    client: reqwest::Client,
}

impl NamecheapRegistrar {
    /// Create a new registrar client
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if a credential is empty or the HTTP client cannot be built
    pub fn new(config: &NamecheapConfig) -> Result<Self> {
        if config.api_user.is_empty() || config.api_key.is_empty() {
            return Err(Error::config("Namecheap API user and key are required"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config: config.clone(),
            client,
        })
    }

    /// Issue one API command and return the parsed response root
    async fn api_request(&self, command: &str, params: &[(&str, &str)]) -> Result<Element> {
        let mut query: Vec<(&str, &str)> = vec![
            ("ApiUser", self.config.api_user.as_str()),
            ("ApiKey", self.config.api_key.as_str()),
            ("UserName", self.config.username.as_str()),
            ("ClientIp", self.config.client_ip.as_str()),
            ("Command", command),
        ];
        query.extend_from_slice(params);

        debug!("Namecheap API request: {} ({} params)", command, params.len());

        let response = self
            .client
            .get(&self.config.api_url)
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::provider(
                        PROVIDER,
                        format!("API request timed out for command: {}", command),
                    )
                } else {
                    Error::provider(
                        PROVIDER,
                        format!("API request failed for command {}: {}", command, e),
                    )
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::provider(
                PROVIDER,
                format!("API request failed for command {}: HTTP {}", command, status),
            ));
        }

        let body = response.text().await.map_err(|e| {
            Error::provider(PROVIDER, format!("Failed to read response: {}", e))
        })?;
        let root = xml::parse(&body)?;

        if root.attr("Status") == Some("ERROR") {
            let message = root
                .find("Errors")
                .and_then(|errors| errors.find("Error"))
                .map(|error| error.text().trim())
                .filter(|text| !text.is_empty())
                .unwrap_or("API returned an error without details");
            return Err(Error::provider(PROVIDER, message));
        }

        Ok(root)
    }

    async fn domain_page(&self, page: usize) -> Result<(Vec<String>, Option<usize>)> {
        let page = page.to_string();
        let page_size = DOMAIN_PAGE_SIZE.to_string();
        let root = self
            .api_request(
                "namecheap.domains.getList",
                &[("Page", page.as_str()), ("PageSize", page_size.as_str())],
            )
            .await?;

        let domains = root
            .find_all("Domain")
            .into_iter()
            .filter_map(|d| d.attr("Name"))
            .map(str::to_string)
            .collect();
        let total = root
            .find("Paging")
            .and_then(|paging| paging.find("TotalItems"))
            .and_then(|total| total.text().trim().parse().ok());

        Ok((domains, total))
    }
}

#[async_trait]
impl Registrar for NamecheapRegistrar {
    async fn check_availability(&self, domain: &str) -> Result<bool> {
        let root = self
            .api_request("namecheap.domains.check", &[("DomainList", domain)])
            .await?;
        let result = require(&root, "DomainCheckResult", "domain check", domain)?;
        Ok(result.attr("Available") == Some("true"))
    }

    async fn get_pricing(&self, domain: &str) -> Result<Pricing> {
        let tld = pricing_tld(domain);
        let root = self
            .api_request(
                "namecheap.users.getPricing",
                &[
                    ("ProductType", "DOMAIN"),
                    ("ProductCategory", "DOMAINS"),
                    ("ActionName", "REGISTER"),
                    ("ProductName", tld.as_str()),
                ],
            )
            .await?;

        let pricing = parse_pricing(&root, &tld).ok_or_else(|| Error::pricing_not_found(&tld))?;
        debug!(
            "Pricing for .{}: register ${:.2}, renew ${:.2}{}",
            tld,
            pricing.register,
            pricing.renew,
            if pricing.renew_is_estimate { " (estimated)" } else { "" }
        );
        Ok(pricing)
    }

    async fn get_account_balance(&self) -> Result<f64> {
        let root = self.api_request("namecheap.users.getBalances", &[]).await?;
        root.find("UserGetBalancesResult")
            .and_then(|result| result.attr("AvailableBalance"))
            .and_then(|balance| balance.trim().parse().ok())
            .ok_or(Error::BalanceUnavailable)
    }

    async fn register_domain(
        &self,
        domain: &str,
        years: u32,
        registrant: &RegistrantInfo,
    ) -> Result<bool> {
        let years = years.to_string();
        let contacts = registrant.contact_params();

        let mut params: Vec<(&str, &str)> = vec![("DomainName", domain), ("Years", years.as_str())];
        params.extend(contacts.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        let root = self.api_request("namecheap.domains.create", &params).await?;
        let result = require(&root, "DomainCreateResult", "domain creation", domain)?;
        Ok(result.attr("Registered") == Some("true"))
    }

    async fn set_nameservers(&self, domain: &str, nameservers: &[String]) -> Result<bool> {
        let (sld, tld) = split_domain(domain)?;
        let joined = nameservers.join(",");

        let root = self
            .api_request(
                "namecheap.domains.dns.setCustom",
                &[("SLD", sld), ("TLD", tld), ("Nameservers", joined.as_str())],
            )
            .await?;
        let result = require(&root, "DomainDNSSetCustomResult", "DNS update", domain)?;
        Ok(result.attr("Updated") == Some("true"))
    }

    async fn list_domains(&self) -> Result<Vec<String>> {
        let mut domains = Vec::new();
        let mut page = 1;

        loop {
            let (batch, total) = self.domain_page(page).await?;
            let fetched = batch.len();
            domains.extend(batch);

            match total {
                Some(total) if fetched > 0 && domains.len() < total => page += 1,
                _ => break,
            }
        }

        debug!("Namecheap account holds {} domains", domains.len());
        Ok(domains)
    }

    async fn domain_nameservers(&self, domain: &str) -> Result<Vec<String>> {
        let root = self
            .api_request("namecheap.domains.getInfo", &[("DomainName", domain)])
            .await?;
        Ok(extract_nameservers(&root))
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

fn require<'a>(root: &'a Element, name: &str, what: &str, domain: &str) -> Result<&'a Element> {
    root.find(name).ok_or_else(|| {
        Error::provider(
            PROVIDER,
            format!("Could not find {} result for {}", what, domain),
        )
    })
}

/// Split a domain at its first dot into the `SLD`/`TLD` pair
fn split_domain(domain: &str) -> Result<(&str, &str)> {
    match domain.split_once('.') {
        Some((sld, tld)) if !sld.is_empty() && !tld.is_empty() => Ok((sld, tld)),
        _ => Err(Error::invalid_input(format!(
            "Domain '{}' has no second-level label",
            domain
        ))),
    }
}

/// Price-list product name for a domain: its final label, uppercased
fn pricing_tld(domain: &str) -> String {
    domain
        .trim_end_matches('.')
        .rsplit('.')
        .next()
        .unwrap_or(domain)
        .to_ascii_uppercase()
}

fn parse_pricing(root: &Element, tld: &str) -> Option<Pricing> {
    let categories = root.find_all("ProductCategory");

    let (register, renew) = if categories.is_empty() {
        (one_year_price(root, tld), None)
    } else {
        let mut register = None;
        let mut renew = None;
        for category in categories {
            let slot = match category.attr("Name").map(str::to_ascii_lowercase).as_deref() {
                Some("renew") => &mut renew,
                Some("register") | None => &mut register,
                _ => continue,
            };
            if slot.is_none() {
                *slot = one_year_price(category, tld);
            }
        }
        (register, renew)
    };

    let register = register?;
    Some(match renew {
        Some(renew) => Pricing {
            register,
            renew,
            renew_is_estimate: false,
        },
        None => Pricing {
            register,
            renew: register,
            renew_is_estimate: true,
        },
    })
}

fn one_year_price(scope: &Element, tld: &str) -> Option<f64> {
    scope
        .find_all("Product")
        .into_iter()
        .filter(|product| product.attr("Name").is_some_and(|n| n.eq_ignore_ascii_case(tld)))
        .flat_map(|product| product.find_all("Price"))
        .find(|price| price.attr("Duration") == Some("1"))
        .and_then(|price| price.attr("Price"))
        .and_then(|price| price.trim().parse().ok())
}

fn extract_nameservers(root: &Element) -> Vec<String> {
    NAMESERVER_STRATEGIES
        .iter()
        .find_map(|(shape, strategy)| {
            let nameservers = strategy(root);
            if nameservers.is_empty() {
                None
            } else {
                debug!("Nameservers read from {}", shape);
                Some(nameservers)
            }
        })
        .unwrap_or_default()
}

fn nameservers_in_dns_details(root: &Element) -> Vec<String> {
    root.find("DnsDetails")
        .map(nameserver_texts)
        .unwrap_or_default()
}

fn nameservers_anywhere(root: &Element) -> Vec<String> {
    nameserver_texts(root)
}

fn nameservers_in_result_attributes(root: &Element) -> Vec<String> {
    let Some(result) = root.find("DomainGetInfoResult") else {
        return Vec::new();
    };
    (1..=4)
        .filter_map(|i| result.attr(&format!("Nameserver{}", i)))
        .map(str::trim)
        .filter(|ns| !ns.is_empty())
        .map(str::to_string)
        .collect()
}

fn nameserver_texts(scope: &Element) -> Vec<String> {
    scope
        .find_all("Nameserver")
        .into_iter()
        .map(|ns| ns.text().trim())
        .filter(|ns| !ns.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok_response(body: &str) -> Element {
        xml::parse(&format!(
            r#"<ApiResponse Status="OK" xmlns="http://api.namecheap.com/xml.response"><Errors/><CommandResponse>{}</CommandResponse></ApiResponse>"#,
            body
        ))
        .unwrap()
    }

    #[test]
    fn test_split_domain_at_first_dot() {
        assert_eq!(split_domain("example.com").unwrap(), ("example", "com"));
        assert_eq!(split_domain("example.co.uk").unwrap(), ("example", "co.uk"));
        assert!(split_domain("localhost").is_err());
        assert!(split_domain(".com").is_err());
    }

    #[test]
    fn test_pricing_tld_is_final_label() {
        assert_eq!(pricing_tld("example.com"), "COM");
        assert_eq!(pricing_tld("example.co.uk"), "UK");
        assert_eq!(pricing_tld("Example.XYZ."), "XYZ");
    }

    #[test]
    fn test_renew_price_falls_back_to_register_as_estimate() {
        let root = ok_response(
            r#"<UserGetPricingResult><ProductType Name="domains">
                 <ProductCategory Name="register">
                   <Product Name="com">
                     <Price Duration="2" Price="21.96"/>
                     <Price Duration="1" Price="10.98"/>
                   </Product>
                 </ProductCategory>
               </ProductType></UserGetPricingResult>"#,
        );

        let pricing = parse_pricing(&root, "COM").unwrap();
        assert_eq!(pricing.register, 10.98);
        assert_eq!(pricing.renew, 10.98);
        assert!(pricing.renew_is_estimate);
    }

    #[test]
    fn test_reported_renew_price_is_used() {
        let root = ok_response(
            r#"<UserGetPricingResult><ProductType Name="domains">
                 <ProductCategory Name="renew">
                   <Product Name="xyz"><Price Duration="1" Price="13.48"/></Product>
                 </ProductCategory>
                 <ProductCategory Name="register">
                   <Product Name="xyz"><Price Duration="1" Price="1.98"/></Product>
                 </ProductCategory>
               </ProductType></UserGetPricingResult>"#,
        );

        let pricing = parse_pricing(&root, "XYZ").unwrap();
        assert_eq!(pricing.register, 1.98);
        assert_eq!(pricing.renew, 13.48);
        assert!(!pricing.renew_is_estimate);
    }

    #[test]
    fn test_pricing_missing_tld() {
        let root = ok_response(
            r#"<UserGetPricingResult><ProductCategory Name="register">
                 <Product Name="net"><Price Duration="1" Price="12.98"/></Product>
               </ProductCategory></UserGetPricingResult>"#,
        );
        assert!(parse_pricing(&root, "COM").is_none());
    }

    #[test]
    fn test_nameservers_prefer_dns_details() {
        let root = ok_response(
            r#"<DomainGetInfoResult Nameserver1="attr.example.net">
                 <Extra><Nameserver>stray.example.net</Nameserver></Extra>
                 <DnsDetails ProviderType="CUSTOM">
                   <Nameserver>ada.ns.cloudflare.com</Nameserver>
                   <Nameserver>bob.ns.cloudflare.com</Nameserver>
                 </DnsDetails>
               </DomainGetInfoResult>"#,
        );
        assert_eq!(
            extract_nameservers(&root),
            vec!["ada.ns.cloudflare.com", "bob.ns.cloudflare.com"]
        );
    }

    #[test]
    fn test_nameservers_fall_back_to_any_element() {
        let root = ok_response(
            r#"<DomainGetInfoResult><DnsDetails/><Other><Nameserver>ns1.example.net</Nameserver></Other></DomainGetInfoResult>"#,
        );
        assert_eq!(extract_nameservers(&root), vec!["ns1.example.net"]);
    }

    #[test]
    fn test_nameservers_fall_back_to_attributes() {
        let root = ok_response(
            r#"<DomainGetInfoResult Nameserver1="ns1.example.net" Nameserver2="ns2.example.net" Nameserver3=""/>"#,
        );
        assert_eq!(
            extract_nameservers(&root),
            vec!["ns1.example.net", "ns2.example.net"]
        );
    }

    #[test]
    fn test_no_nameservers_is_empty() {
        let root = ok_response(r#"<DomainGetInfoResult DomainName="example.com"/>"#);
        assert!(extract_nameservers(&root).is_empty());
    }

    #[test]
    fn test_new_rejects_empty_credentials() {
        let config = NamecheapConfig::new("", "", "user", "203.0.113.7", false);
        assert!(NamecheapRegistrar::new(&config).is_err());
    }

    #[test]
    fn test_api_key_not_exposed_in_debug() {
        let config = NamecheapConfig::new("user", "secret_key_12345", "user", "203.0.113.7", true);
        let registrar = NamecheapRegistrar::new(&config).unwrap();

        let debug_str = format!("{:?}", registrar);
        assert!(!debug_str.contains("secret_key_12345"));
        assert!(debug_str.contains("sandbox"));
        assert_eq!(registrar.provider_name(), "namecheap");
    }
}
