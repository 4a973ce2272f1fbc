// Copyright (c) 2025 - Cowboy AI, Inc.
//! BMC Power Worker (dry run)
//!
//! Subscribes to power work items on NATS, resolves each asset through
//! serverservice and runs the request against a logging BMC client that
//! never touches real hardware. Swap `DryRunConnector` for a real
//! `BmcConnector` to drive controllers.
//!
//! Run with: cargo run --example bmc-worker --features serverservice
//!
//! Prerequisites:
//! 1. NATS server running (NATS_URL, default: nats://localhost:4222)
//! 2. Serverservice reachable (SERVERSERVICE_URL, SERVERSERVICE_TOKEN)

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

use cim_infrastructure_bmc::bmc::{BmcClient, BmcConnector, BmcEndpoint, ClientError};
use cim_infrastructure_bmc::domain::PowerAction;
use cim_infrastructure_bmc::logging;
use cim_infrastructure_bmc::store::ServerserviceClient;
use cim_infrastructure_bmc::{
    InventoryRepository, MessageProcessor, MetricsSink, NatsClient, PowerWorker,
    PrometheusMetrics, WorkerConfig,
};

/// Hands out clients that only log what they would do
struct DryRunConnector;

impl BmcConnector for DryRunConnector {
    type Client = DryRunClient;

    fn connect(&self, endpoint: &BmcEndpoint) -> DryRunClient {
        DryRunClient {
            endpoint: endpoint.clone(),
        }
    }
}

struct DryRunClient {
    endpoint: BmcEndpoint,
}

#[async_trait]
impl BmcClient for DryRunClient {
    async fn login(&mut self) -> Result<(), ClientError> {
        info!(bmc_ip = %self.endpoint.address, user = %self.endpoint.username, "dry-run login");
        Ok(())
    }

    async fn logout(&mut self) -> Result<(), ClientError> {
        info!(bmc_ip = %self.endpoint.address, "dry-run logout");
        Ok(())
    }

    async fn get_power_state(&mut self) -> Result<String, ClientError> {
        Ok("On".to_string())
    }

    async fn set_power_state(&mut self, action: PowerAction) -> Result<bool, ClientError> {
        info!(bmc_ip = %self.endpoint.address, %action, "dry-run power change");
        Ok(true)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = WorkerConfig::from_env().context("invalid worker configuration")?;
    logging::init(&config.log_level, config.log_format)?;

    info!(
        subject = %config.subject,
        facility = ?config.facility_code,
        inventory = %config.inventory.endpoint,
        "starting bmc worker"
    );

    let metrics: Arc<dyn MetricsSink> = Arc::new(PrometheusMetrics::new());

    let inventory = ServerserviceClient::new(&config.inventory)
        .context("failed to build serverservice client")?;
    let repository = Arc::new(InventoryRepository::new(Arc::new(inventory), metrics.clone()));

    let worker = PowerWorker::new(
        repository,
        Arc::new(DryRunConnector),
        config.session,
        metrics.clone(),
    )
    .with_facility_code(config.facility_code.clone())
    .with_subject(config.subject.clone());

    let client = NatsClient::new(config.nats.clone())
        .await
        .context("failed to connect to NATS")?;
    let processor = MessageProcessor::new(client, metrics);

    let cancel = tokio_util::sync::CancellationToken::new();
    let task = processor.run_handler(Arc::new(worker), cancel.clone()).await?;

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("shutdown requested, draining in-flight work");

    cancel.cancel();
    task.await.context("message processor panicked")?;

    info!("bmc worker stopped");
    Ok(())
}
