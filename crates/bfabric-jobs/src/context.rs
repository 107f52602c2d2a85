// SPDX-FileCopyrightText: 2026 B-Fabric Web Apps Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-run state shared by the pipeline steps.

use std::sync::Arc;

use bfabric_core::{BfabricError, LimsClient, LimsConnector, OperationLogger, SessionContext};
use tracing::warn;

/// LIMS access for a decoded session.
pub(crate) struct SessionLims {
    pub session: SessionContext,
    /// Client authenticated as the session user.
    pub user: Arc<dyn LimsClient>,
    /// Service account client used for job linking and uploads. `None` when
    /// no power-user credentials exist for the session's environment.
    power_user: Option<Arc<dyn LimsClient>>,
}

impl SessionLims {
    pub fn power(&self) -> Result<&dyn LimsClient, BfabricError> {
        self.power_user.as_deref().ok_or_else(|| {
            BfabricError::Config(format!(
                "no power-user client for the {} environment",
                self.session.environment
            ))
        })
    }
}

/// The operation log of a run, plus LIMS access when a session was decoded.
pub struct JobContext {
    logger: OperationLogger,
    lims: Option<SessionLims>,
}

impl JobContext {
    /// Context for runs without a session. Steps touching the LIMS fail.
    pub fn detached() -> Self {
        Self {
            logger: OperationLogger::detached(),
            lims: None,
        }
    }

    /// Opens user and power-user clients for `session`.
    ///
    /// Only the user client is required. Without a power user the operation
    /// log stays local, and job linking and uploads fail.
    pub fn open(connector: &dyn LimsConnector, session: SessionContext) -> Result<Self, BfabricError> {
        let user = connector.connect(&session)?;
        let power_user = match connector.power_user(session.environment) {
            Ok(client) => Some(client),
            Err(e) => {
                warn!(error = %e, "power user unavailable, job log stays local");
                None
            }
        };

        let mut logger = OperationLogger::for_session(&session);
        if let Some(power) = &power_user {
            logger = logger.with_sink(Arc::clone(power));
        }
        Ok(Self {
            logger,
            lims: Some(SessionLims {
                session,
                user,
                power_user,
            }),
        })
    }

    pub fn logger(&self) -> &OperationLogger {
        &self.logger
    }

    pub fn session(&self) -> Option<&SessionContext> {
        self.lims.as_ref().map(|lims| &lims.session)
    }

    /// Whether job linking and uploads can run.
    pub fn has_power_user(&self) -> bool {
        self.lims.as_ref().is_some_and(|lims| lims.power_user.is_some())
    }

    pub(crate) fn lims(&self) -> Result<&SessionLims, BfabricError> {
        self.lims
            .as_ref()
            .ok_or_else(|| BfabricError::Internal("no authenticated session for this run".to_string()))
    }
}
