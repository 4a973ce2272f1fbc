// Copyright (c) 2025 - Cowboy AI, Inc.
//! BMC fleet worker core
//!
//! Resolves server assets from an inventory service and manages the
//! lifecycle of management-controller sessions used to query and change
//! their power state.
//!
//! - [`store`]: asset resolution (attribute decoding, repository adapter)
//! - [`bmc`]: session manager and the [`DeviceQueryor`](bmc::DeviceQueryor) capability
//! - [`worker`]: one unit of work end to end, served over [`nats`]

pub mod bmc;
pub mod config;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod metrics;
pub mod nats;
pub mod store;
pub mod worker;

// Re-export commonly used types
pub use bmc::{BmcError, BmcSession, DeviceQueryor, PowerRequest, SessionConfig};
pub use config::{InventoryConfig, WorkerConfig};
pub use domain::{Asset, PowerAction, PowerState};
pub use errors::{InfrastructureError, InfrastructureResult};
pub use metrics::{MetricsSink, NoopMetrics, PrometheusMetrics};
pub use nats::{MessageHandler, MessageProcessor, NatsClient, NatsConfig};
pub use store::{AssetRepository, AssetResolution, InventoryRepository, StoreError};
pub use worker::{PowerWorker, WorkItem, WorkOutcome};
