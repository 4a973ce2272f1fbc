// Copyright (c) 2025 - Cowboy AI, Inc.
//! Power worker
//!
//! Drives one unit of work end to end: resolve the asset, open a BMC session,
//! perform the requested power operation and close the session on every exit
//! path.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::bmc::{execute_scoped, BmcConnector, BmcSession, PowerRequest, SessionConfig};
use crate::domain::PowerState;
use crate::errors::{InfrastructureError, InfrastructureResult};
use crate::metrics::MetricsSink;
use crate::nats::MessageHandler;
use crate::store::AssetRepository;

/// Default subject for power work items
pub const DEFAULT_SUBJECT: &str = "bmc.power.>";

/// A power request for one asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Inventory identifier, validated during resolution
    pub asset_id: String,
    pub action: PowerRequest,
    /// Facility the sender expects the asset in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facility_code: Option<String>,
}

/// Result of a completed work item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkOutcome {
    pub asset_id: Uuid,
    pub action: PowerRequest,
    /// Present for status queries
    pub power_state: Option<PowerState>,
    pub completed_at: DateTime<Utc>,
}

/// Executes power work items against resolved assets
pub struct PowerWorker<R, K> {
    repository: Arc<R>,
    connector: Arc<K>,
    session_config: SessionConfig,
    facility_code: Option<String>,
    subject: String,
    metrics: Arc<dyn MetricsSink>,
}

impl<R, K> PowerWorker<R, K>
where
    R: AssetRepository,
    K: BmcConnector,
{
    pub fn new(
        repository: Arc<R>,
        connector: Arc<K>,
        session_config: SessionConfig,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            repository,
            connector,
            session_config,
            facility_code: None,
            subject: DEFAULT_SUBJECT.to_string(),
            metrics,
        }
    }

    /// Only accept work for this facility
    pub fn with_facility_code(mut self, facility_code: Option<String>) -> Self {
        self.facility_code = facility_code;
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// True when this worker serves `facility_code`
    pub fn accepts(&self, facility_code: &str) -> bool {
        match &self.facility_code {
            Some(own) => own.eq_ignore_ascii_case(facility_code),
            None => true,
        }
    }

    /// Run one work item to completion
    #[tracing::instrument(
        name = "worker.handle",
        skip_all,
        fields(asset_id = %item.asset_id, action = item.action.label())
    )]
    pub async fn handle(
        &self,
        item: WorkItem,
        cancel: &CancellationToken,
    ) -> InfrastructureResult<WorkOutcome> {
        if let Some(facility) = item.facility_code.as_deref() {
            if !self.accepts(facility) {
                return Err(InfrastructureError::WorkItemRejected(format!(
                    "facility {} not served by this worker",
                    facility
                )));
            }
        }

        let started = Instant::now();
        let result = self.execute(&item, cancel).await;

        let state = if result.is_ok() { "succeeded" } else { "failed" };
        self.metrics
            .observe_duration(item.action.label(), state, started.elapsed().as_secs_f64());

        result
    }

    async fn execute(
        &self,
        item: &WorkItem,
        cancel: &CancellationToken,
    ) -> InfrastructureResult<WorkOutcome> {
        let resolution = self.repository.asset_by_id(cancel, &item.asset_id).await?;

        for warning in &resolution.warnings {
            warn!(kind = warning.kind(), warning = %warning, "asset resolved with missing attributes");
        }

        let asset = resolution.into_asset();

        if !asset.facility_code().is_empty() && !self.accepts(asset.facility_code()) {
            return Err(InfrastructureError::WorkItemRejected(format!(
                "asset {} is in facility {}",
                asset.id(),
                asset.facility_code()
            )));
        }

        let mut session = BmcSession::new(
            &asset,
            self.connector.clone(),
            self.session_config,
            self.metrics.clone(),
        );

        let power_state = execute_scoped(&mut session, cancel, item.action).await?;

        info!(bmc_ip = %asset.bmc_address(), power_state = ?power_state, "work item completed");

        Ok(WorkOutcome {
            asset_id: asset.id(),
            action: item.action,
            power_state,
            completed_at: Utc::now(),
        })
    }
}

#[async_trait::async_trait]
impl<R, K> MessageHandler for PowerWorker<R, K>
where
    R: AssetRepository + 'static,
    K: BmcConnector + 'static,
{
    type Message = WorkItem;
    type Reply = WorkOutcome;

    async fn handle(
        &self,
        message: WorkItem,
        cancel: &CancellationToken,
    ) -> InfrastructureResult<WorkOutcome> {
        PowerWorker::handle(self, message, cancel).await
    }

    fn subject(&self) -> &str {
        &self.subject
    }
}
