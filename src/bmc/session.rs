// Copyright (c) 2025 - Cowboy AI, Inc.
//! BMC Session Manager
//!
//! One [`BmcSession`] owns the connection handle for one asset. It is
//! single-owner: every state-changing operation takes `&mut self`.
//!
//! # Lifecycle
//!
//! - `open` performs up to `login_attempts` logins, each bounded by
//!   `login_timeout`, with no delay between attempts. Unauthorized responses
//!   abort immediately. Opening an open session is a no-op. A login cut short
//!   by its timeout or by cancellation gets a best-effort logout.
//! - `power_status` / `set_power_state` open implicitly and never retry.
//! - `close` logs out on a detached task under `logout_timeout`, so neither
//!   the caller's cancellation token nor dropping the caller's future can cut
//!   the logout short. The handle is discarded even when logout fails.
//! - Dropping a session that is still open schedules the same logout.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::bmc::client::{BmcClient, BmcConnector, BmcEndpoint, ClientError};
use crate::bmc::{BmcError, BmcResult, DeviceQueryor, QueryFailure};
use crate::domain::{Asset, PowerAction, PowerState};
use crate::metrics::MetricsSink;

/// Timeouts and retry budget for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Login attempts before giving up
    pub login_attempts: u32,
    /// Deadline for each login attempt
    pub login_timeout: Duration,
    /// Deadline for logout, independent of the caller
    pub logout_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            login_attempts: 3,
            login_timeout: Duration::from_secs(3 * 60),
            logout_timeout: Duration::from_secs(60),
        }
    }
}

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    Opening,
    Open,
}

/// Power operation requested by a unit of work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerRequest {
    /// Query the current power state
    Status,
    /// Request a power change
    Set(PowerAction),
}

impl PowerRequest {
    /// Operation label used in metrics
    pub fn label(&self) -> &'static str {
        match self {
            Self::Status => "power_status",
            Self::Set(_) => "set_power_state",
        }
    }
}

/// Session Manager for one asset's BMC
pub struct BmcSession<K: BmcConnector> {
    endpoint: BmcEndpoint,
    connector: Arc<K>,
    client: Option<K::Client>,
    state: SessionState,
    config: SessionConfig,
    metrics: Arc<dyn MetricsSink>,
}

impl<K: BmcConnector> BmcSession<K> {
    pub fn new(
        asset: &Asset,
        connector: Arc<K>,
        config: SessionConfig,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            endpoint: BmcEndpoint::from(asset),
            connector,
            client: None,
            state: SessionState::Closed,
            config,
            metrics,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == SessionState::Open && self.client.is_some()
    }

    /// BMC address this session talks to
    pub fn address(&self) -> IpAddr {
        self.endpoint.address
    }

    #[tracing::instrument(name = "bmc.open", skip_all, fields(bmc_ip = %self.endpoint.address))]
    pub async fn open(&mut self, cancel: &CancellationToken) -> BmcResult<()> {
        if self.is_open() {
            return Ok(());
        }

        self.state = SessionState::Opening;

        match self.login_with_retries(cancel).await {
            Ok(client) => {
                self.client = Some(client);
                self.state = SessionState::Open;
                debug!("bmc login successful");
                Ok(())
            }
            Err(e) => {
                self.state = SessionState::Closed;
                Err(e)
            }
        }
    }

    async fn login_with_retries(&mut self, cancel: &CancellationToken) -> BmcResult<K::Client> {
        let attempts = self.config.login_attempts.max(1);
        let mut client = self.connector.connect(&self.endpoint);
        let mut last_error = None;
        let mut interrupted = false;

        for attempt in 1..=attempts {
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                outcome = tokio::time::timeout(self.config.login_timeout, client.login()) => Some(outcome),
            };

            let Some(outcome) = outcome else {
                self.discard(client);
                return Err(BmcError::Cancelled);
            };

            let error = match outcome {
                Ok(Ok(())) => return Ok(client),
                Ok(Err(ClientError::Unauthorized(reason))) => {
                    let error = BmcError::LoginUnauthorized(reason);
                    self.metrics.bmc_query_error("login", error.kind());
                    warn!(attempt, error = %error, "bmc rejected credentials");
                    return Err(error);
                }
                Ok(Err(e)) => BmcError::Session(e.to_string()),
                Err(_) => {
                    interrupted = true;
                    BmcError::LoginTimeout(self.config.login_timeout)
                }
            };

            self.metrics.bmc_query_error("login", error.kind());
            warn!(attempt, attempts, error = %error, "bmc login attempt failed");
            last_error = Some(error);
        }

        if interrupted {
            self.discard(client);
        }

        Err(BmcError::MaxLoginAttemptsReached {
            attempts,
            last_error: Box::new(
                last_error.unwrap_or_else(|| BmcError::Session("no login attempted".to_string())),
            ),
        })
    }

    /// Best-effort logout of a client whose login was cut short
    ///
    /// The BMC may have created a session for an attempt that timed out or
    /// was cancelled mid-flight.
    fn discard(&self, client: K::Client) {
        let timeout = self.config.logout_timeout;
        tokio::spawn(async move {
            if let Err(e) = logout_with_timeout(client, timeout).await {
                debug!(error = %e, "logout of abandoned login failed");
            }
        });
    }

    #[tracing::instrument(name = "bmc.close", skip_all, fields(bmc_ip = %self.endpoint.address))]
    pub async fn close(&mut self) -> BmcResult<()> {
        self.state = SessionState::Closed;

        let Some(client) = self.client.take() else {
            return Ok(());
        };

        let logout = tokio::spawn(logout_with_timeout(client, self.config.logout_timeout));

        let result = match logout.await {
            Ok(result) => result,
            Err(e) => Err(BmcError::Logout(e.to_string())),
        };

        match &result {
            Ok(()) => debug!("bmc logout successful"),
            Err(e) => {
                self.metrics.bmc_query_error("logout", e.kind());
                warn!(error = %e, "bmc logout failed, session handle discarded");
            }
        }

        result
    }

    #[tracing::instrument(name = "bmc.power_status", skip_all, fields(bmc_ip = %self.endpoint.address))]
    pub async fn power_status(&mut self, cancel: &CancellationToken) -> BmcResult<PowerState> {
        self.open(cancel).await?;

        let client = self.open_client()?;
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(BmcError::Cancelled),
            result = client.get_power_state() => result,
        };

        match result {
            Ok(raw) => raw
                .parse::<PowerState>()
                .map_err(|e| self.query_failed("power_status", e.into())),
            Err(e) => Err(self.query_failed("power_status", e.into())),
        }
    }

    #[tracing::instrument(
        name = "bmc.set_power_state",
        skip_all,
        fields(bmc_ip = %self.endpoint.address, action = %action)
    )]
    pub async fn set_power_state(
        &mut self,
        cancel: &CancellationToken,
        action: PowerAction,
    ) -> BmcResult<()> {
        self.open(cancel).await?;

        let client = self.open_client()?;
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(BmcError::Cancelled),
            result = client.set_power_state(action) => result,
        };

        match result {
            Ok(true) => {
                debug!("power state change accepted");
                Ok(())
            }
            Ok(false) => Err(self.query_failed("set_power_state", QueryFailure::Rejected(action))),
            Err(e) => Err(self.query_failed("set_power_state", e.into())),
        }
    }

    fn open_client(&mut self) -> BmcResult<&mut K::Client> {
        self.client
            .as_mut()
            .ok_or_else(|| BmcError::Session("session not open".to_string()))
    }

    fn query_failed(&self, operation: &'static str, cause: QueryFailure) -> BmcError {
        self.metrics.bmc_query_error(operation, cause.kind());
        warn!(operation, kind = cause.kind(), cause = %cause, "bmc query failed");
        BmcError::Query { operation, cause }
    }
}

async fn logout_with_timeout<C: BmcClient>(mut client: C, timeout: Duration) -> BmcResult<()> {
    match tokio::time::timeout(timeout, client.logout()).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(BmcError::Logout(e.to_string())),
        Err(_) => Err(BmcError::Logout(format!("timed out after {:?}", timeout))),
    }
}

impl<K: BmcConnector> Drop for BmcSession<K> {
    fn drop(&mut self) {
        let Some(client) = self.client.take() else {
            return;
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                warn!(bmc_ip = %self.endpoint.address, "bmc session dropped while open, logging out");
                handle.spawn(logout_with_timeout(client, self.config.logout_timeout));
            }
            Err(_) => {
                warn!(bmc_ip = %self.endpoint.address, "bmc session dropped outside a runtime, session leaked");
            }
        }
    }
}

#[async_trait]
impl<K: BmcConnector> DeviceQueryor for BmcSession<K> {
    async fn open(&mut self, cancel: &CancellationToken) -> BmcResult<()> {
        BmcSession::open(self, cancel).await
    }

    async fn close(&mut self) -> BmcResult<()> {
        BmcSession::close(self).await
    }

    async fn power_status(&mut self, cancel: &CancellationToken) -> BmcResult<PowerState> {
        BmcSession::power_status(self, cancel).await
    }

    async fn set_power_state(
        &mut self,
        cancel: &CancellationToken,
        action: PowerAction,
    ) -> BmcResult<()> {
        BmcSession::set_power_state(self, cancel, action).await
    }
}

/// Run one power request inside an open session and always close it
///
/// The session is opened (if needed), the request performed, then closed on
/// every exit path. A logout failure is logged and never replaces the
/// request's own result.
pub async fn execute_scoped<Q: DeviceQueryor + ?Sized>(
    queryor: &mut Q,
    cancel: &CancellationToken,
    request: PowerRequest,
) -> BmcResult<Option<PowerState>> {
    let result = perform(queryor, cancel, request).await;

    if let Err(e) = queryor.close().await {
        warn!(error = %e, "bmc close failed");
    }

    result
}

async fn perform<Q: DeviceQueryor + ?Sized>(
    queryor: &mut Q,
    cancel: &CancellationToken,
    request: PowerRequest,
) -> BmcResult<Option<PowerState>> {
    queryor.open(cancel).await?;

    match request {
        PowerRequest::Status => queryor.power_status(cancel).await.map(Some),
        PowerRequest::Set(action) => queryor.set_power_state(cancel, action).await.map(|()| None),
    }
}
