// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for cim-infrastructure-bmc
//!
//! In-memory fakes for the inventory service, the BMC control library and the
//! metrics sink. Every fake records its calls so tests can assert on what was
//! (and was not) sent upstream.
//!
//! # Design Principles
//! - All identifiers are fixed constants
//! - Fakes never touch the network
//! - Hanging calls are modelled with `std::future::pending` and driven by
//!   paused tokio time

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use cim_infrastructure_bmc::bmc::{BmcClient, BmcConnector, BmcEndpoint, ClientError};
use cim_infrastructure_bmc::domain::{Asset, PowerAction};
use cim_infrastructure_bmc::metrics::MetricsSink;
use cim_infrastructure_bmc::store::{
    InventoryClient, InventoryError, ServerAttribute, ServerCredential, ServerRecord,
    NS_BMC_ADDRESS, NS_VENDOR,
};

pub const ASSET_ID_1: &str = "11111111-1111-1111-1111-111111111111";
pub const ASSET_ID_2: &str = "22222222-2222-2222-2222-222222222222";

pub const BMC_IP_1: &str = "10.0.0.5";

pub const FACILITY: &str = "sandbox";

/// Parse a fixed UUID from a constant string
pub fn parse_uuid(s: &str) -> Uuid {
    Uuid::parse_str(s).expect("Invalid UUID in test fixture")
}

pub fn bmc_attribute(address: &str) -> ServerAttribute {
    ServerAttribute::new(NS_BMC_ADDRESS, json!({ "address": address }))
}

pub fn vendor_attribute(vendor: &str, model: &str, serial: &str) -> ServerAttribute {
    ServerAttribute::new(
        NS_VENDOR,
        json!({ "vendor": vendor, "model": model, "serial": serial }),
    )
}

/// A resolvable asset with a BMC at `BMC_IP_1`
pub fn asset() -> Asset {
    Asset::builder(parse_uuid(ASSET_ID_1))
        .bmc_address(BMC_IP_1.parse().expect("fixture address"))
        .credentials("root", "calvin")
        .hardware("Dell", "PowerEdge R640", "ABC123")
        .facility_code(FACILITY)
        .build()
        .expect("fixture asset")
}

// ============================================================================
// Inventory
// ============================================================================

/// Inventory fake answering from fixed responses
pub struct FakeInventory {
    pub credential: Result<ServerCredential, InventoryError>,
    pub server: Result<ServerRecord, InventoryError>,
    pub attributes: Result<Vec<ServerAttribute>, InventoryError>,
    /// When set, every call hangs until the test cancels
    pub hang: bool,
    pub calls: AtomicUsize,
}

impl FakeInventory {
    /// The "Dell R640 at 10.0.0.5" server
    pub fn dell() -> Self {
        Self {
            credential: Ok(ServerCredential {
                username: "root".to_string(),
                password: "calvin".to_string(),
            }),
            server: Ok(ServerRecord {
                uuid: parse_uuid(ASSET_ID_1),
                name: "r640-1".to_string(),
                facility_code: FACILITY.to_string(),
            }),
            attributes: Ok(vec![
                bmc_attribute(BMC_IP_1),
                vendor_attribute("Dell Inc.", "PowerEdge R640", "ABC123"),
            ]),
            hang: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_attributes(mut self, attributes: Vec<ServerAttribute>) -> Self {
        self.attributes = Ok(attributes);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn answer<T: Clone>(&self, response: &Result<T, InventoryError>) -> Result<T, InventoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.hang {
            std::future::pending::<()>().await;
        }
        response.clone()
    }
}

#[async_trait]
impl InventoryClient for FakeInventory {
    fn kind(&self) -> &'static str {
        "fake"
    }

    async fn get_credential(&self, _id: Uuid) -> Result<ServerCredential, InventoryError> {
        self.answer(&self.credential).await
    }

    async fn get_server(&self, _id: Uuid) -> Result<ServerRecord, InventoryError> {
        self.answer(&self.server).await
    }

    async fn get_attributes(&self, _id: Uuid) -> Result<Vec<ServerAttribute>, InventoryError> {
        self.answer(&self.attributes).await
    }
}

// ============================================================================
// BMC
// ============================================================================

/// Scripted behaviour of one BMC call
#[derive(Debug, Clone)]
pub enum Step {
    Ok,
    Fail(ClientError),
    Hang,
}

/// Shared script and call log behind every client a [`FakeConnector`] hands out
#[derive(Default)]
pub struct BmcState {
    /// Consumed front to back; empty means success
    pub logins: VecDeque<Step>,
    pub logout: Option<Step>,
    pub power_state: Option<Result<String, ClientError>>,
    pub set_accepted: Option<Result<bool, ClientError>>,
    pub query_hangs: bool,

    pub connects: usize,
    pub login_calls: usize,
    pub logout_calls: usize,
    pub get_calls: usize,
    pub set_calls: Vec<PowerAction>,
}

#[derive(Clone, Default)]
pub struct FakeConnector {
    pub state: Arc<Mutex<BmcState>>,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, f: impl FnOnce(&mut BmcState)) {
        f(&mut self.state.lock().unwrap());
    }

    pub fn with<T>(&self, f: impl FnOnce(&BmcState) -> T) -> T {
        f(&self.state.lock().unwrap())
    }

    pub fn login_calls(&self) -> usize {
        self.with(|s| s.login_calls)
    }

    pub fn logout_calls(&self) -> usize {
        self.with(|s| s.logout_calls)
    }
}

impl BmcConnector for FakeConnector {
    type Client = FakeBmc;

    fn connect(&self, _endpoint: &BmcEndpoint) -> FakeBmc {
        self.state.lock().unwrap().connects += 1;
        FakeBmc {
            state: self.state.clone(),
        }
    }
}

pub struct FakeBmc {
    state: Arc<Mutex<BmcState>>,
}

async fn run(step: Step) -> Result<(), ClientError> {
    match step {
        Step::Ok => Ok(()),
        Step::Fail(e) => Err(e),
        Step::Hang => std::future::pending().await,
    }
}

#[async_trait]
impl BmcClient for FakeBmc {
    async fn login(&mut self) -> Result<(), ClientError> {
        let step = {
            let mut state = self.state.lock().unwrap();
            state.login_calls += 1;
            state.logins.pop_front().unwrap_or(Step::Ok)
        };
        run(step).await
    }

    async fn logout(&mut self) -> Result<(), ClientError> {
        let step = {
            let mut state = self.state.lock().unwrap();
            state.logout_calls += 1;
            state.logout.clone().unwrap_or(Step::Ok)
        };
        run(step).await
    }

    async fn get_power_state(&mut self) -> Result<String, ClientError> {
        let (hang, answer) = {
            let mut state = self.state.lock().unwrap();
            state.get_calls += 1;
            (
                state.query_hangs,
                state.power_state.clone().unwrap_or_else(|| Ok("On".to_string())),
            )
        };
        if hang {
            std::future::pending::<()>().await;
        }
        answer
    }

    async fn set_power_state(&mut self, action: PowerAction) -> Result<bool, ClientError> {
        let (hang, answer) = {
            let mut state = self.state.lock().unwrap();
            state.set_calls.push(action);
            (state.query_hangs, state.set_accepted.clone().unwrap_or(Ok(true)))
        };
        if hang {
            std::future::pending::<()>().await;
        }
        answer
    }
}

// ============================================================================
// Metrics
// ============================================================================

/// Metrics sink recording every emission as a flat string
#[derive(Default)]
pub struct RecordingMetrics {
    pub entries: Mutex<Vec<String>>,
}

impl RecordingMetrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.entries().iter().filter(|e| e.starts_with(prefix)).count()
    }

    fn push(&self, entry: String) {
        self.entries.lock().unwrap().push(entry);
    }
}

impl MetricsSink for RecordingMetrics {
    fn store_query_error(&self, store_kind: &str, query_kind: &str) {
        self.push(format!("store_query_error:{}:{}", store_kind, query_kind));
    }

    fn bmc_query_error(&self, operation: &str, kind: &str) {
        self.push(format!("bmc_query_error:{}:{}", operation, kind));
    }

    fn event_received(&self, valid: bool, response: &str) {
        self.push(format!("event_received:{}:{}", valid, response));
    }

    fn observe_duration(&self, label: &str, state: &str, _seconds: f64) {
        self.push(format!("observe_duration:{}:{}", label, state));
    }
}

/// Let spawned background tasks (detached logouts) run to completion
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

/// Short timeouts for paused-clock tests
pub fn fast_session_config(attempts: u32) -> cim_infrastructure_bmc::SessionConfig {
    cim_infrastructure_bmc::SessionConfig {
        login_attempts: attempts,
        login_timeout: Duration::from_secs(5),
        logout_timeout: Duration::from_secs(2),
    }
}
