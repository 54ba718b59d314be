use crate::error::FnotifierError;
use crate::service::submission::RowAppender;
use serde::Serialize;
use std::{fmt, sync::Arc};
use tokio::sync::RwLock;

/// Authorization phase of the spreadsheet client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthPhase {
    Unauthorized,
    Authorizing,
    Ready,
}

enum GateState {
    Unauthorized,
    Authorizing,
    Ready(Arc<dyn RowAppender>),
}

impl fmt::Debug for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateState::Unauthorized => f.write_str("Unauthorized"),
            GateState::Authorizing => f.write_str("Authorizing"),
            GateState::Ready(_) => f.write_str("Ready"),
        }
    }
}

/// Point-in-time view of the gate for status reporting.
#[derive(Debug, Clone, Serialize)]
pub struct GateSnapshot {
    pub phase: AuthPhase,
}

impl GateSnapshot {
    pub fn is_ready(&self) -> bool {
        self.phase == AuthPhase::Ready
    }
}

/// Readiness gate for the spreadsheet client.
///
/// The handle only exists inside the `Ready` state, so a reader can never observe a client
/// without also observing readiness. The transition to `Ready` happens at most once.
#[derive(Debug, Clone)]
pub struct ReadinessGate {
    state: Arc<RwLock<GateState>>,
}

impl Default for ReadinessGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadinessGate {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(GateState::Unauthorized)),
        }
    }

    /// The published client, or `None` while authorization is still pending.
    pub async fn appender(&self) -> Option<Arc<dyn RowAppender>> {
        match &*self.state.read().await {
            GateState::Ready(appender) => Some(appender.clone()),
            _ => None,
        }
    }

    pub async fn snapshot(&self) -> GateSnapshot {
        let phase = match &*self.state.read().await {
            GateState::Unauthorized => AuthPhase::Unauthorized,
            GateState::Authorizing => AuthPhase::Authorizing,
            GateState::Ready(_) => AuthPhase::Ready,
        };
        GateSnapshot { phase }
    }

    /// Note that a consent URL is out with the operator. Fails once ready.
    pub async fn mark_authorizing(&self) -> Result<(), FnotifierError> {
        let mut state = self.state.write().await;
        if matches!(*state, GateState::Ready(_)) {
            return Err(FnotifierError::AlreadyAuthorized);
        }
        *state = GateState::Authorizing;
        Ok(())
    }

    /// Publish the client and flip to `Ready` in one write.
    pub async fn publish(&self, appender: Arc<dyn RowAppender>) -> Result<(), FnotifierError> {
        let mut state = self.state.write().await;
        if matches!(*state, GateState::Ready(_)) {
            return Err(FnotifierError::AlreadyAuthorized);
        }
        *state = GateState::Ready(appender);
        Ok(())
    }
}
