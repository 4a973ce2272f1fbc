// Copyright (c) 2025 - Cowboy AI, Inc.
//! Serverservice inventory client
//!
//! Talks to a serverservice-style REST inventory:
//!
//! ```text
//! GET {endpoint}/api/v1/servers/{id}                  → ServerRecord
//! GET {endpoint}/api/v1/servers/{id}/credentials/bmc  → ServerCredential
//! GET {endpoint}/api/v1/servers/{id}/attributes       → [ServerAttribute]
//! ```
//!
//! Every response body wraps its payload in a `record` field.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use crate::config::InventoryConfig;
use crate::store::inventory::{
    InventoryClient, InventoryError, ServerAttribute, ServerCredential, ServerRecord,
};

const STORE_KIND: &str = "serverservice";

#[derive(Debug, Deserialize)]
struct ServerResponse<T> {
    record: T,
}

/// HTTP client for a serverservice inventory
pub struct ServerserviceClient {
    endpoint: String,
    client: Client,
}

impl ServerserviceClient {
    /// Create a client with bearer-token authentication and a request timeout
    pub fn new(config: &InventoryConfig) -> Result<Self, InventoryError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::AUTHORIZATION,
            format!("Bearer {}", config.token)
                .parse()
                .map_err(|e| InventoryError::Transport(format!("Invalid API token: {}", e)))?,
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| {
                InventoryError::Transport(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn server_url(&self, id: Uuid, suffix: &str) -> String {
        format!("{}/api/v1/servers/{}{}", self.endpoint, id, suffix)
    }

    async fn get_record<T: DeserializeOwned>(&self, url: String) -> Result<T, InventoryError> {
        debug!(url = %url, "querying serverservice");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| InventoryError::Transport(format!("serverservice API error: {}", e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(InventoryError::NotFound(url));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InventoryError::Transport(format!(
                "serverservice returned {}: {}",
                status, body
            )));
        }

        let body: ServerResponse<T> = response
            .json()
            .await
            .map_err(|e| InventoryError::Decode(e.to_string()))?;

        Ok(body.record)
    }
}

#[async_trait]
impl InventoryClient for ServerserviceClient {
    fn kind(&self) -> &'static str {
        STORE_KIND
    }

    async fn get_credential(&self, id: Uuid) -> Result<ServerCredential, InventoryError> {
        self.get_record(self.server_url(id, "/credentials/bmc")).await
    }

    async fn get_server(&self, id: Uuid) -> Result<ServerRecord, InventoryError> {
        self.get_record(self.server_url(id, "")).await
    }

    async fn get_attributes(&self, id: Uuid) -> Result<Vec<ServerAttribute>, InventoryError> {
        self.get_record(self.server_url(id, "/attributes")).await
    }
}
