// # Cloudflare DNS Provider
//
// This crate provides the Cloudflare implementation of the regflow
// `DnsProvider` trait over the Cloudflare API v4.
//
// ## Behavior
//
// - One HTTP request per trait call (listings page through `result_info`)
// - HTTP timeout of 30 seconds
// - No retry logic: every failure is returned to the caller
// - Provider-reported `errors[].message` values are joined into the error
//
// ## Security Requirements
//
// - API token NEVER appears in logs or `Debug` output
// - Provider fails fast if the token is empty
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - Create Zone: POST `/zones`
// - List Zones: GET `/zones?name=...`
// - Zone Details: GET `/zones/:zone_id`
// - Create DNS Record: POST `/zones/:zone_id/dns_records`
// - List DNS Records: GET `/zones/:zone_id/dns_records`

use async_trait::async_trait;
use regflow_core::config::CloudflareConfig;
use regflow_core::traits::DnsProvider;
use regflow_core::types::{DnsRecord, RecordRequest, Zone};
use regflow_core::{Error, Result};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, info};

const PROVIDER: &str = "cloudflare";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Items requested per page on list endpoints
const PAGE_SIZE: u32 = 50;

/// Response envelope shared by every v4 endpoint
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    result: Option<T>,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result_info: Option<ResultInfo>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResultInfo {
    total_pages: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ZoneDetails {
    #[serde(default)]
    name_servers: Vec<String>,
}

/// Cloudflare DNS provider
///
/// Stateless apart from its HTTP client; safe to share across tasks.
///
/// # Security
///
/// The Debug implementation does NOT expose the API token.
pub struct CloudflareProvider {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// API base URL
    api_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_token", &"<REDACTED>")
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the token is empty or the HTTP client cannot be built
    pub fn new(config: &CloudflareConfig) -> Result<Self> {
        if config.api_token.is_empty() {
            return Err(Error::config("Cloudflare API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_token: config.api_token.clone(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Send one request and unwrap the envelope
    ///
    /// # Errors
    ///
    /// - Transport failure or timeout
    /// - Non-2xx status: reported messages, else `<status> - <body>`
    /// - `success: false`: reported messages
    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<Envelope<T>> {
        let url = format!("{}{}", self.api_url, path);
        debug!("Cloudflare API request: {} {}", method, path);

        let mut request = self
            .client
            .request(method, &url)
            .bearer_auth(&self.api_token);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(ref body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::provider(PROVIDER, format!("Request to {} timed out", path))
            } else {
                Error::provider(PROVIDER, format!("HTTP request failed: {}", e))
            }
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::provider(PROVIDER, format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(http_error(status, &text));
        }

        let envelope: Envelope<T> = serde_json::from_str(&text)
            .map_err(|e| Error::provider(PROVIDER, format!("Failed to parse response: {}", e)))?;

        if !envelope.success {
            let message = join_messages(&envelope.errors)
                .unwrap_or_else(|| "Request failed but no error details provided".to_string());
            return Err(Error::provider(PROVIDER, message));
        }

        Ok(envelope)
    }

    /// Send one request and return its `result`
    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T> {
        self.send(method, path, &[], body)
            .await?
            .result
            .ok_or_else(|| Error::provider(PROVIDER, format!("Response from {} has no result", path)))
    }

    /// Collect every page of a list endpoint
    async fn list_all<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            let mut params = query.to_vec();
            params.push(("page", page.to_string()));
            params.push(("per_page", PAGE_SIZE.to_string()));

            let envelope: Envelope<Vec<T>> = self.send(Method::GET, path, &params, None).await?;
            let batch = envelope.result.unwrap_or_default();
            let fetched = batch.len();
            items.extend(batch);

            let total_pages = envelope
                .result_info
                .and_then(|info| info.total_pages)
                .unwrap_or(1);
            if fetched == 0 || page >= total_pages {
                break;
            }
            page += 1;
        }

        Ok(items)
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    async fn add_zone(&self, domain: &str) -> Result<Zone> {
        info!("Creating Cloudflare zone for {}", domain);
        let zone: Zone = self
            .call(
                Method::POST,
                "/zones",
                Some(json!({ "name": domain, "type": "full" })),
            )
            .await?;
        debug!("Created zone {} ({})", zone.id, zone.status);
        Ok(zone)
    }

    async fn get_zone_info(&self, domain: &str) -> Result<Option<Zone>> {
        let zones: Vec<Zone> = self
            .list_all("/zones", &[("name", domain.to_string())])
            .await?;
        Ok(zones
            .into_iter()
            .find(|zone| zone.name.eq_ignore_ascii_case(domain)))
    }

    async fn get_zone_nameservers(&self, zone_id: &str) -> Result<Vec<String>> {
        let details: ZoneDetails = self
            .call(Method::GET, &format!("/zones/{}", zone_id), None)
            .await?;
        Ok(details.name_servers)
    }

    async fn create_record(&self, zone_id: &str, request: RecordRequest) -> Result<DnsRecord> {
        info!(
            "Creating {} record {} -> {}",
            request.record_type, request.name, request.content
        );
        self.call(
            Method::POST,
            &format!("/zones/{}/dns_records", zone_id),
            Some(record_body(&request)),
        )
        .await
    }

    async fn list_zones(&self) -> Result<Vec<Zone>> {
        self.list_all("/zones", &[]).await
    }

    async fn get_zone_records(&self, zone_id: &str) -> Result<Vec<DnsRecord>> {
        self.list_all(&format!("/zones/{}/dns_records", zone_id), &[])
            .await
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

/// JSON body for record creation; `proxied` only for proxiable types
fn record_body(request: &RecordRequest) -> Value {
    let mut body = json!({
        "type": request.record_type,
        "name": request.name,
        "content": request.content,
        "ttl": request.ttl,
    });
    if request.supports_proxy() {
        body["proxied"] = json!(request.proxied);
    }
    body
}

fn join_messages(errors: &[ApiMessage]) -> Option<String> {
    if errors.is_empty() {
        return None;
    }
    Some(
        errors
            .iter()
            .map(|e| e.message.as_deref().unwrap_or("Unknown error"))
            .collect::<Vec<_>>()
            .join(", "),
    )
}

fn http_error(status: StatusCode, body: &str) -> Error {
    let reported = serde_json::from_str::<Envelope<Value>>(body)
        .ok()
        .and_then(|envelope| join_messages(&envelope.errors));

    let message = match reported {
        Some(message) => message,
        None => match status.as_u16() {
            401 | 403 => format!(
                "Authentication failed: invalid API token or insufficient permissions ({} - {})",
                status.as_u16(),
                body
            ),
            _ => format!("{} - {}", status.as_u16(), body),
        },
    };
    Error::provider(PROVIDER, message)
}
