// Copyright (c) 2025 - Cowboy AI, Inc.
//! Tests for power work items aligned with user stories

mod fixtures;

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use cim_infrastructure_bmc::bmc::{BmcError, PowerRequest};
use cim_infrastructure_bmc::domain::{PowerAction, PowerState};
use cim_infrastructure_bmc::nats::{dispatch, MessageHandler, MessageProcessor};
use cim_infrastructure_bmc::store::{InventoryRepository, StoreError};
use cim_infrastructure_bmc::{InfrastructureError, PowerWorker, WorkItem};

use fixtures::*;

struct Harness {
    inventory: Arc<FakeInventory>,
    connector: FakeConnector,
    metrics: Arc<RecordingMetrics>,
    worker: PowerWorker<InventoryRepository<FakeInventory>, FakeConnector>,
}

fn harness(inventory: FakeInventory, facility: Option<&str>) -> Harness {
    let inventory = Arc::new(inventory);
    let connector = FakeConnector::new();
    let metrics = RecordingMetrics::new();
    let repository = Arc::new(InventoryRepository::new(inventory.clone(), metrics.clone()));

    let worker = PowerWorker::new(
        repository,
        Arc::new(connector.clone()),
        fast_session_config(3),
        metrics.clone(),
    )
    .with_facility_code(facility.map(str::to_string));

    Harness {
        inventory,
        connector,
        metrics,
        worker,
    }
}

fn item(action: PowerRequest) -> WorkItem {
    WorkItem {
        asset_id: ASSET_ID_1.to_string(),
        action,
        facility_code: None,
    }
}

/// User Story: Handle a power work item
///
/// As the fleet dispatcher
/// I want a worker to resolve, act and release in one call
/// So that each unit of work is self-contained
///
/// Acceptance Criteria:
/// - The session is opened and closed exactly once
/// - Status requests report the power state
/// - Runtime is observed per action and outcome
#[tokio::test]
async fn test_status_work_item() -> anyhow::Result<()> {
    // Given a worker for the Dell server
    let h = harness(FakeInventory::dell(), None);

    // When a status item is handled
    let outcome = h
        .worker
        .handle(item(PowerRequest::Status), &CancellationToken::new())
        .await?;

    // Then the power state is reported
    assert_eq!(outcome.asset_id, parse_uuid(ASSET_ID_1));
    assert_eq!(outcome.power_state, Some(PowerState::On));

    // And the session was released
    assert_eq!(h.connector.login_calls(), 1);
    assert_eq!(h.connector.logout_calls(), 1);
    assert_eq!(
        h.metrics.entries(),
        vec!["observe_duration:power_status:succeeded".to_string()]
    );
    Ok(())
}

#[tokio::test]
async fn test_set_work_item_on_degraded_asset() -> anyhow::Result<()> {
    // Given a server without vendor attributes
    let h = harness(
        FakeInventory::dell().with_attributes(vec![bmc_attribute(BMC_IP_1)]),
        None,
    );

    // When a power change is handled
    let outcome = h
        .worker
        .handle(
            item(PowerRequest::Set(PowerAction::Reset)),
            &CancellationToken::new(),
        )
        .await?;

    // Then it succeeds without hardware identity
    assert_eq!(outcome.power_state, None);
    assert_eq!(
        h.connector.with(|s| s.set_calls.clone()),
        vec![PowerAction::Reset]
    );
    assert_eq!(h.connector.logout_calls(), 1);
    Ok(())
}

#[tokio::test]
async fn test_resolution_failure_skips_bmc() {
    // Given an unknown asset identifier
    let h = harness(FakeInventory::dell(), None);
    let mut work = item(PowerRequest::Status);
    work.asset_id = "bogus".to_string();

    // When it is handled
    let err = h
        .worker
        .handle(work, &CancellationToken::new())
        .await
        .unwrap_err();

    // Then no BMC was contacted and the failure observed
    assert!(matches!(
        err,
        InfrastructureError::Store(StoreError::InvalidIdentifier { .. })
    ));
    assert_eq!(h.connector.with(|s| s.connects), 0);
    assert_eq!(
        h.metrics.entries(),
        vec!["observe_duration:power_status:failed".to_string()]
    );
}

#[tokio::test(start_paused = true)]
async fn test_cancel_mid_query_releases_session() {
    // Given a BMC whose power query never answers
    let h = harness(FakeInventory::dell(), None);
    h.connector.script(|s| s.query_hangs = true);
    let cancel = CancellationToken::new();

    // When the work item is cancelled while the query is in flight
    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        canceller.cancel();
    });

    let err = h
        .worker
        .handle(item(PowerRequest::Status), &cancel)
        .await
        .unwrap_err();

    // Then the item fails as cancelled and the session was still released
    assert!(matches!(err, InfrastructureError::Bmc(BmcError::Cancelled)));
    assert_eq!(h.connector.with(|s| s.get_calls), 1);
    assert_eq!(h.connector.logout_calls(), 1);
    assert_eq!(
        h.metrics.entries(),
        vec!["observe_duration:power_status:failed".to_string()]
    );
}

/// User Story: Facility-bound workers
///
/// As a site operator
/// I want a worker to act only on servers in its facility
/// So that one site's worker never power-cycles another site's machines
#[tokio::test]
async fn test_foreign_facility_item_rejected() {
    let h = harness(FakeInventory::dell(), Some(FACILITY));
    let mut work = item(PowerRequest::Status);
    work.facility_code = Some("ams1".to_string());

    let err = h
        .worker
        .handle(work, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, InfrastructureError::WorkItemRejected(_)));
    assert_eq!(h.inventory.calls(), 0);
}

#[tokio::test]
async fn test_foreign_facility_asset_rejected() {
    // Given a worker bound to another facility
    let h = harness(FakeInventory::dell(), Some("ams1"));

    // When an item without facility hint arrives for a sandbox asset
    let err = h
        .worker
        .handle(item(PowerRequest::Status), &CancellationToken::new())
        .await
        .unwrap_err();

    // Then it is rejected before any BMC login
    assert!(matches!(err, InfrastructureError::WorkItemRejected(_)));
    assert_eq!(h.connector.login_calls(), 0);
}

#[test]
fn test_facility_match_is_case_insensitive() {
    let h = harness(FakeInventory::dell(), Some("Sandbox"));
    assert!(h.worker.accepts("sandbox"));
    assert!(!h.worker.accepts("ams1"));

    let open = harness(FakeInventory::dell(), None);
    assert!(open.worker.accepts("anything"));
}

#[tokio::test]
async fn test_dispatch_counts_events() {
    let h = harness(FakeInventory::dell(), Some(FACILITY));
    let cancel = CancellationToken::new();
    assert_eq!(h.worker.subject(), "bmc.power.>");

    // Valid item
    let payload = serde_json::to_vec(&json!({
        "asset_id": ASSET_ID_1,
        "action": {"set": "on"},
    }))
    .unwrap();
    let outcome = dispatch(&h.worker, h.metrics.as_ref(), &payload, &cancel)
        .await
        .unwrap();
    assert_eq!(outcome.action, PowerRequest::Set(PowerAction::On));

    // Foreign facility
    let payload = serde_json::to_vec(&json!({
        "asset_id": ASSET_ID_2,
        "action": "status",
        "facility_code": "ams1",
    }))
    .unwrap();
    assert!(dispatch(&h.worker, h.metrics.as_ref(), &payload, &cancel)
        .await
        .is_err());

    // Undecodable
    assert!(dispatch(&h.worker, h.metrics.as_ref(), b"{}", &cancel)
        .await
        .is_err());

    assert_eq!(
        h.metrics
            .entries()
            .into_iter()
            .filter(|e| e.starts_with("event_received"))
            .collect::<Vec<_>>(),
        vec![
            "event_received:true:ack".to_string(),
            "event_received:false:nack".to_string(),
            "event_received:false:nack".to_string(),
        ]
    );
}

#[test]
fn test_power_worker_runs_under_message_processor() {
    let _ = MessageProcessor::run_handler::<
        PowerWorker<InventoryRepository<FakeInventory>, FakeConnector>,
    >;
}
