// Copyright (c) 2025 - Cowboy AI, Inc.
//! BMC Session Lifecycle
//!
//! Turns a stateful, timeout-prone management session into four retried,
//! always-released operations.
//!
//! ```text
//!            open (≤ N logins)          close (own timeout)
//! Closed ──▶ Opening ──▶ Open ──────────────────────────▶ Closed
//!               │                 power_status / set_power_state
//!               └── unauthorized / attempts exhausted ──▶ Closed
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use cim_infrastructure_bmc::bmc::{BmcSession, DeviceQueryor, SessionConfig};
//!
//! let mut session = BmcSession::new(&asset, connector, SessionConfig::default(), metrics);
//! let state = session.power_status(&cancel).await;
//! session.close().await?;
//! ```

pub mod client;
pub mod session;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::domain::{PowerAction, PowerState, UnknownPowerState};

pub use client::{BmcClient, BmcConnector, BmcEndpoint, ClientError};
pub use session::{execute_scoped, BmcSession, PowerRequest, SessionConfig, SessionState};

/// Result type for BMC operations
pub type BmcResult<T> = Result<T, BmcError>;

/// Error type for BMC operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BmcError {
    /// A login attempt exceeded its deadline
    #[error("bmc login timeout after {0:?}")]
    LoginTimeout(Duration),

    /// Credentials rejected; never retried
    #[error("bmc login unauthorized: {0}")]
    LoginUnauthorized(String),

    /// Transient session failure
    #[error("bmc session error: {0}")]
    Session(String),

    /// Every login attempt failed; `last_error` is the final attempt's failure
    #[error("reached maximum BMC login attempts ({attempts}): {last_error}")]
    MaxLoginAttemptsReached {
        attempts: u32,
        #[source]
        last_error: Box<BmcError>,
    },

    /// Logout failed; the local handle was discarded regardless
    #[error("bmc logout error: {0}")]
    Logout(String),

    /// A power query or change failed
    #[error("error occurred in bmc query {operation}: {cause}")]
    Query {
        operation: &'static str,
        #[source]
        cause: QueryFailure,
    },

    /// The caller cancelled the operation
    #[error("bmc operation cancelled")]
    Cancelled,
}

impl BmcError {
    /// Stable label for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::LoginTimeout(_) => "login_timeout",
            Self::LoginUnauthorized(_) => "login_unauthorized",
            Self::Session(_) => "session",
            Self::MaxLoginAttemptsReached { .. } => "max_login_attempts",
            Self::Logout(_) => "logout",
            Self::Query { .. } => "query",
            Self::Cancelled => "cancelled",
        }
    }
}

impl BmcError {
    /// Failure kind of the underlying cause
    ///
    /// Exhausted logins report the last attempt's kind and failed queries
    /// report the query failure's kind; everything else reports [`kind`](Self::kind).
    pub fn cause_kind(&self) -> &'static str {
        match self {
            Self::MaxLoginAttemptsReached { last_error, .. } => last_error.cause_kind(),
            Self::Query { cause, .. } => cause.kind(),
            other => other.kind(),
        }
    }
}

/// Why a power query or change failed
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryFailure {
    /// The control library reported an error
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The BMC answered with a state outside the known vocabulary
    #[error(transparent)]
    UnexpectedState(#[from] UnknownPowerState),

    /// The BMC refused the power change
    #[error("power {0} request not accepted")]
    Rejected(PowerAction),
}

impl QueryFailure {
    /// Stable label for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Client(e) => e.kind(),
            Self::UnexpectedState(_) => "unexpected_state",
            Self::Rejected(_) => "rejected",
        }
    }
}

/// Capability surface the dispatcher drives once per unit of work
///
/// `close` takes no cancellation token: it always runs to completion under
/// its own deadline so a cancelled unit of work never leaks a BMC session.
#[async_trait]
pub trait DeviceQueryor: Send {
    /// Log in, retrying transient failures
    async fn open(&mut self, cancel: &CancellationToken) -> BmcResult<()>;

    /// Log out and release the connection handle
    async fn close(&mut self) -> BmcResult<()>;

    /// Current power state, opening the session first if needed
    async fn power_status(&mut self, cancel: &CancellationToken) -> BmcResult<PowerState>;

    /// Request a power change, opening the session first if needed
    ///
    /// Returns once the BMC accepts the request, not once the change completes.
    async fn set_power_state(
        &mut self,
        cancel: &CancellationToken,
        action: PowerAction,
    ) -> BmcResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BmcError::LoginUnauthorized("bad credentials".to_string());
        assert_eq!(err.to_string(), "bmc login unauthorized: bad credentials");

        let err = BmcError::MaxLoginAttemptsReached {
            attempts: 3,
            last_error: Box::new(BmcError::Session("reset".to_string())),
        };
        assert_eq!(
            err.to_string(),
            "reached maximum BMC login attempts (3): bmc session error: reset"
        );
        assert_eq!(err.kind(), "max_login_attempts");
        assert_eq!(err.cause_kind(), "session");
    }

    #[test]
    fn test_causes_are_chained() {
        use std::error::Error as _;

        let err = BmcError::MaxLoginAttemptsReached {
            attempts: 2,
            last_error: Box::new(BmcError::LoginTimeout(Duration::from_secs(5))),
        };
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("bmc login timeout after 5s"));
        assert_eq!(err.cause_kind(), "login_timeout");

        let err = BmcError::Query {
            operation: "set_power_state",
            cause: QueryFailure::Rejected(PowerAction::Off),
        };
        assert!(err.source().is_some());
        assert_eq!(err.cause_kind(), "rejected");

        let err = BmcError::Query {
            operation: "power_status",
            cause: ClientError::Request("503".to_string()).into(),
        };
        assert_eq!(err.cause_kind(), "request");
    }
}
