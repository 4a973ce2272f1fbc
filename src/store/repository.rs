// Copyright (c) 2025 - Cowboy AI, Inc.
//! Asset Repository Adapter
//!
//! Issues the credential, server and attribute lookups for one identifier,
//! classifies failures as fatal or best-effort, and composes the result into
//! an [`Asset`].

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::Asset;
use crate::metrics::MetricsSink;
use crate::store::attributes::{decode_bmc_address, decode_vendor_model, VendorIdentity};
use crate::store::inventory::{InventoryClient, InventoryError};
use crate::store::{QueryKind, StoreError, StoreResult};

/// Resolves asset identifiers into [`Asset`] records
#[async_trait]
pub trait AssetRepository: Send + Sync {
    /// Resolve `id`, aborting promptly if `cancel` fires
    async fn asset_by_id(&self, cancel: &CancellationToken, id: &str)
        -> StoreResult<AssetResolution>;
}

/// A resolved asset plus any non-fatal problems met on the way
#[derive(Debug, Clone)]
pub struct AssetResolution {
    pub asset: Asset,

    /// Best-effort fields that could not be resolved
    pub warnings: Vec<StoreError>,
}

impl AssetResolution {
    /// True when some best-effort field could not be resolved
    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn into_asset(self) -> Asset {
        self.asset
    }
}

/// [`AssetRepository`] backed by an [`InventoryClient`]
pub struct InventoryRepository<C> {
    client: Arc<C>,
    metrics: Arc<dyn MetricsSink>,
}

impl<C: InventoryClient> InventoryRepository<C> {
    pub fn new(client: Arc<C>, metrics: Arc<dyn MetricsSink>) -> Self {
        Self { client, metrics }
    }

    /// Resolve an asset identifier
    ///
    /// The three lookups run concurrently. Every failed lookup is counted,
    /// whichever one ends up aborting the resolution.
    #[tracing::instrument(name = "inventory.asset_by_id", skip(self, cancel), fields(asset_id = %id))]
    pub async fn resolve(&self, cancel: &CancellationToken, id: &str) -> StoreResult<AssetResolution> {
        let asset_id = Uuid::parse_str(id.trim()).map_err(|e| StoreError::InvalidIdentifier {
            id: id.to_string(),
            reason: e.to_string(),
        })?;

        let lookups = async {
            tokio::join!(
                self.client.get_credential(asset_id),
                self.client.get_server(asset_id),
                self.client.get_attributes(asset_id),
            )
        };

        let (credential, server, attributes) = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(StoreError::Cancelled),
            results = lookups => results,
        };

        let credential = self.checked(QueryKind::GetCredential, credential);
        let server = self.checked(QueryKind::GetServer, server);
        let attributes = self.checked(QueryKind::GetAttributes, attributes);

        let credential = credential?;
        let server = server?;
        let attributes = attributes?;

        let bmc_address = decode_bmc_address(&attributes).map_err(|e| {
            warn!(asset_id = %asset_id, error = %e, "BMC address unresolved");
            StoreError::BmcAddressUnresolved(e)
        })?;

        let mut warnings = Vec::new();

        let identity = decode_vendor_model(&attributes).unwrap_or_else(|e| {
            warn!(asset_id = %asset_id, error = %e, "device vendor, model attributes not resolved");
            warnings.push(StoreError::VendorModelUnresolved(e));
            VendorIdentity::default()
        });

        let asset = Asset::builder(asset_id)
            .bmc_address(bmc_address)
            .credentials(credential.username, credential.password)
            .hardware(identity.vendor, identity.model, identity.serial)
            .facility_code(server.facility_code)
            .build()?;

        debug!(
            asset_id = %asset_id,
            bmc_ip = %asset.bmc_address(),
            vendor = asset.vendor(),
            facility = asset.facility_code(),
            "asset resolved"
        );

        Ok(AssetResolution { asset, warnings })
    }

    fn checked<T>(&self, query: QueryKind, result: Result<T, InventoryError>) -> StoreResult<T> {
        result.map_err(|cause| {
            self.metrics.store_query_error(self.client.kind(), query.as_str());
            warn!(query = %query, error = %cause, "inventory query failed");
            StoreError::InventoryQueryFailed { query, cause }
        })
    }
}

#[async_trait]
impl<C: InventoryClient> AssetRepository for InventoryRepository<C> {
    async fn asset_by_id(
        &self,
        cancel: &CancellationToken,
        id: &str,
    ) -> StoreResult<AssetResolution> {
        self.resolve(cancel, id).await
    }
}
