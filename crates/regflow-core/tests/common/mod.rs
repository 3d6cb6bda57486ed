//! Test doubles and common utilities for workflow contract tests
//!
//! The doubles keep just enough in-memory state to behave like a registrar
//! account and a DNS host, and count every mutating call so tests can assert
//! on side effects.

#![allow(dead_code)]

use regflow_core::error::{Error, Result};
use regflow_core::traits::{DnsProvider, Prompt, Registrar};
use regflow_core::types::{DnsRecord, Pricing, RecordRequest, RegistrantInfo, Zone};
use regflow_core::{SetupConfig, SetupOrchestrator};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const DOMAIN: &str = "example.com";

/// Nameservers the mock DNS host assigns to every zone
pub fn cloudflare_nameservers() -> Vec<String> {
    vec![
        "ada.ns.cloudflare.com".to_string(),
        "bob.ns.cloudflare.com".to_string(),
    ]
}

/// Nameservers of a domain still parked at the registrar
pub fn parking_nameservers() -> Vec<String> {
    vec![
        "dns1.registrar-servers.com".to_string(),
        "dns2.registrar-servers.com".to_string(),
    ]
}

#[derive(Default)]
struct RegistrarState {
    domains: Vec<String>,
    nameservers: HashMap<String, Vec<String>>,
    available: bool,
    pricing: Option<Pricing>,
    balance: Option<f64>,
    fail_list: bool,
    fail_nameservers: bool,
    fail_register: bool,
    last_registrant: Option<RegistrantInfo>,
}

/// In-memory registrar account
pub struct MockRegistrar {
    state: Mutex<RegistrarState>,
    register_calls: AtomicUsize,
    set_nameserver_calls: AtomicUsize,
    availability_calls: AtomicUsize,
}

impl MockRegistrar {
    /// An empty account where every domain is available at $12.98 with $100 balance
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RegistrarState {
                available: true,
                pricing: Some(Pricing {
                    register: 12.98,
                    renew: 14.98,
                    renew_is_estimate: false,
                }),
                balance: Some(100.0),
                ..Default::default()
            }),
            register_calls: AtomicUsize::new(0),
            set_nameserver_calls: AtomicUsize::new(0),
            availability_calls: AtomicUsize::new(0),
        }
    }

    /// Put `domain` in the account, delegated to `nameservers`
    pub fn with_registered(self, domain: &str, nameservers: Vec<String>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.domains.push(domain.to_string());
            state.nameservers.insert(domain.to_string(), nameservers);
        }
        self
    }

    pub fn with_available(self, available: bool) -> Self {
        self.state.lock().unwrap().available = available;
        self
    }

    pub fn with_price(self, register: f64) -> Self {
        self.state.lock().unwrap().pricing = Some(Pricing {
            register,
            renew: register,
            renew_is_estimate: true,
        });
        self
    }

    pub fn with_balance(self, balance: f64) -> Self {
        self.state.lock().unwrap().balance = Some(balance);
        self
    }

    /// Make `list_domains` fail
    pub fn failing_list(self) -> Self {
        self.state.lock().unwrap().fail_list = true;
        self
    }

    /// Make `domain_nameservers` fail
    pub fn failing_nameservers(self) -> Self {
        self.state.lock().unwrap().fail_nameservers = true;
        self
    }

    /// Make `register_domain` report an unsuccessful registration
    pub fn failing_register(self) -> Self {
        self.state.lock().unwrap().fail_register = true;
        self
    }

    pub fn register_call_count(&self) -> usize {
        self.register_calls.load(Ordering::SeqCst)
    }

    pub fn set_nameserver_call_count(&self) -> usize {
        self.set_nameserver_calls.load(Ordering::SeqCst)
    }

    pub fn availability_call_count(&self) -> usize {
        self.availability_calls.load(Ordering::SeqCst)
    }

    /// Every mutating call issued against the account
    pub fn mutation_count(&self) -> usize {
        self.register_call_count() + self.set_nameserver_call_count()
    }

    pub fn delegated_nameservers(&self, domain: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .nameservers
            .get(domain)
            .cloned()
            .unwrap_or_default()
    }

    pub fn last_registrant(&self) -> Option<RegistrantInfo> {
        self.state.lock().unwrap().last_registrant.clone()
    }
}

#[async_trait::async_trait]
impl Registrar for MockRegistrar {
    async fn check_availability(&self, _domain: &str) -> Result<bool> {
        self.availability_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.state.lock().unwrap().available)
    }

    async fn get_pricing(&self, domain: &str) -> Result<Pricing> {
        let tld = domain.split_once('.').map(|(_, tld)| tld).unwrap_or(domain);
        self.state
            .lock()
            .unwrap()
            .pricing
            .ok_or_else(|| Error::pricing_not_found(tld))
    }

    async fn get_account_balance(&self) -> Result<f64> {
        self.state
            .lock()
            .unwrap()
            .balance
            .ok_or(Error::BalanceUnavailable)
    }

    async fn register_domain(
        &self,
        domain: &str,
        _years: u32,
        registrant: &RegistrantInfo,
    ) -> Result<bool> {
        self.register_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        state.last_registrant = Some(registrant.clone());
        if state.fail_register {
            return Ok(false);
        }
        state.domains.push(domain.to_string());
        Ok(true)
    }

    async fn set_nameservers(&self, domain: &str, nameservers: &[String]) -> Result<bool> {
        self.set_nameserver_calls.fetch_add(1, Ordering::SeqCst);
        self.state
            .lock()
            .unwrap()
            .nameservers
            .insert(domain.to_string(), nameservers.to_vec());
        Ok(true)
    }

    async fn list_domains(&self) -> Result<Vec<String>> {
        let state = self.state.lock().unwrap();
        if state.fail_list {
            return Err(Error::provider("mock-registrar", "account listing unavailable"));
        }
        Ok(state.domains.clone())
    }

    async fn domain_nameservers(&self, domain: &str) -> Result<Vec<String>> {
        let state = self.state.lock().unwrap();
        if state.fail_nameservers {
            return Err(Error::provider("mock-registrar", "getInfo unavailable"));
        }
        Ok(state.nameservers.get(domain).cloned().unwrap_or_default())
    }

    fn provider_name(&self) -> &'static str {
        "mock-registrar"
    }
}

#[derive(Default)]
struct DnsState {
    zones: Vec<Zone>,
    nameservers: HashMap<String, Vec<String>>,
    records: HashMap<String, Vec<DnsRecord>>,
    assigned_nameservers: Vec<String>,
    fail_lookup: bool,
    fail_add_zone: bool,
    fail_create_record: bool,
    fail_list_records: bool,
}

/// In-memory DNS host
pub struct MockDnsProvider {
    state: Mutex<DnsState>,
    add_zone_calls: AtomicUsize,
    create_record_calls: AtomicUsize,
}

impl MockDnsProvider {
    /// A host with no zones that assigns [`cloudflare_nameservers`] to new zones
    pub fn new() -> Self {
        Self {
            state: Mutex::new(DnsState {
                assigned_nameservers: cloudflare_nameservers(),
                ..Default::default()
            }),
            add_zone_calls: AtomicUsize::new(0),
            create_record_calls: AtomicUsize::new(0),
        }
    }

    /// Pre-create a zone for `domain` with the given nameservers
    pub fn with_zone(self, domain: &str, zone_id: &str, nameservers: Vec<String>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.zones.push(Zone::new(zone_id, domain, "active"));
            state.nameservers.insert(zone_id.to_string(), nameservers);
        }
        self
    }

    /// Pre-create a record in an existing zone
    pub fn with_record(self, zone_id: &str, record_type: &str, name: &str, content: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let records = state.records.entry(zone_id.to_string()).or_default();
            let id = format!("rec-{}", records.len() + 1);
            records.push(DnsRecord {
                id,
                record_type: record_type.to_string(),
                name: name.to_string(),
                content: content.to_string(),
                ttl: 300,
                proxied: true,
            });
        }
        self
    }

    /// Nameservers assigned to zones created from now on
    pub fn assigning_nameservers(self, nameservers: Vec<String>) -> Self {
        self.state.lock().unwrap().assigned_nameservers = nameservers;
        self
    }

    /// Make `get_zone_info` fail
    pub fn failing_lookup(self) -> Self {
        self.state.lock().unwrap().fail_lookup = true;
        self
    }

    /// Make `add_zone` fail
    pub fn failing_add_zone(self) -> Self {
        self.state.lock().unwrap().fail_add_zone = true;
        self
    }

    /// Make `create_record` fail
    pub fn failing_create_record(self) -> Self {
        self.state.lock().unwrap().fail_create_record = true;
        self
    }

    /// Make `get_zone_records` fail
    pub fn failing_list_records(self) -> Self {
        self.state.lock().unwrap().fail_list_records = true;
        self
    }

    pub fn add_zone_call_count(&self) -> usize {
        self.add_zone_calls.load(Ordering::SeqCst)
    }

    pub fn create_record_call_count(&self) -> usize {
        self.create_record_calls.load(Ordering::SeqCst)
    }

    /// Every mutating call issued against the host
    pub fn mutation_count(&self) -> usize {
        self.add_zone_call_count() + self.create_record_call_count()
    }

    pub fn records(&self, zone_id: &str) -> Vec<DnsRecord> {
        self.state
            .lock()
            .unwrap()
            .records
            .get(zone_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn add_zone(&self, domain: &str) -> Result<Zone> {
        self.add_zone_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        if state.fail_add_zone {
            return Err(Error::provider("mock-dns", "Invalid zone name"));
        }
        let zone = Zone::new(format!("zone-{}", state.zones.len() + 1), domain, "pending");
        let assigned = state.assigned_nameservers.clone();
        state.nameservers.insert(zone.id.clone(), assigned);
        state.zones.push(zone.clone());
        Ok(zone)
    }

    async fn get_zone_info(&self, domain: &str) -> Result<Option<Zone>> {
        let state = self.state.lock().unwrap();
        if state.fail_lookup {
            return Err(Error::provider("mock-dns", "Authentication error"));
        }
        Ok(state.zones.iter().find(|z| z.name == domain).cloned())
    }

    async fn get_zone_nameservers(&self, zone_id: &str) -> Result<Vec<String>> {
        let state = self.state.lock().unwrap();
        state
            .nameservers
            .get(zone_id)
            .cloned()
            .ok_or_else(|| Error::provider("mock-dns", "Invalid zone identifier"))
    }

    async fn create_record(&self, zone_id: &str, request: RecordRequest) -> Result<DnsRecord> {
        self.create_record_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        if state.fail_create_record {
            return Err(Error::provider("mock-dns", "Record already exists"));
        }
        let records = state.records.entry(zone_id.to_string()).or_default();
        let record = DnsRecord {
            id: format!("rec-{}", records.len() + 1),
            proxied: request.proxied && request.supports_proxy(),
            record_type: request.record_type,
            name: request.name,
            content: request.content,
            ttl: request.ttl,
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn list_zones(&self) -> Result<Vec<Zone>> {
        Ok(self.state.lock().unwrap().zones.clone())
    }

    async fn get_zone_records(&self, zone_id: &str) -> Result<Vec<DnsRecord>> {
        let state = self.state.lock().unwrap();
        if state.fail_list_records {
            return Err(Error::provider("mock-dns", "records unavailable"));
        }
        Ok(state.records.get(zone_id).cloned().unwrap_or_default())
    }

    fn provider_name(&self) -> &'static str {
        "mock-dns"
    }
}

/// Prompt that replays scripted answers and records the questions asked
pub struct ScriptedPrompt {
    answers: Mutex<VecDeque<String>>,
    questions: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().map(|a| a.to_string()).collect()),
            questions: Mutex::new(Vec::new()),
        }
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }
}

impl Prompt for ScriptedPrompt {
    fn ask(&self, question: &str) -> Result<String> {
        self.questions.lock().unwrap().push(question.to_string());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::prompt("input stream closed"))
    }
}

/// Build an orchestrator over shared doubles
pub fn orchestrator(
    registrar: &Arc<MockRegistrar>,
    dns: &Arc<MockDnsProvider>,
    prompt: &Arc<ScriptedPrompt>,
) -> SetupOrchestrator {
    SetupOrchestrator::new(
        registrar.clone(),
        dns.clone(),
        prompt.clone(),
        &SetupConfig::default(),
    )
}

/// A domain that is registered, has a zone, and is delegated to it
pub fn converged() -> (Arc<MockRegistrar>, Arc<MockDnsProvider>) {
    let registrar = MockRegistrar::new().with_registered(DOMAIN, cloudflare_nameservers());
    let dns = MockDnsProvider::new()
        .with_zone(DOMAIN, "zone-1", cloudflare_nameservers())
        .with_record("zone-1", "A", "app.example.com", "192.0.2.1");
    (Arc::new(registrar), Arc::new(dns))
}
