// SPDX-FileCopyrightText: 2026 B-Fabric Web Apps Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Factory for user-scoped and power-user LIMS clients.

use std::sync::Arc;

use crate::error::BfabricError;
use crate::traits::lims::LimsClient;
use crate::types::{Environment, SessionContext};

/// Opens LIMS clients on behalf of a session or of the configured power user.
pub trait LimsConnector: Send + Sync {
    /// Client authenticated with the session's user and web-service password.
    fn connect(&self, session: &SessionContext) -> Result<Arc<dyn LimsClient>, BfabricError>;

    /// Client authenticated as the power user of `environment`.
    ///
    /// Used for job linking, resource upload and log flushing.
    fn power_user(&self, environment: Environment) -> Result<Arc<dyn LimsClient>, BfabricError>;
}
