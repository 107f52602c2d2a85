// SPDX-FileCopyrightText: 2026 B-Fabric Web Apps Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resolves a session token into one of four outcomes.

use std::sync::Arc;

use bfabric_core::{
    ApplicationSummary, EntitySummary, LimsConnector, OperationLogger, SessionContext,
};
use chrono::{Local, NaiveDateTime};
use serde_json::json;
use tracing::{debug, warn};

use crate::auth::AuthClient;
use crate::token::parse_session;

/// Result of resolving a token. Resolution never fails; every error
/// collapses into one of these.
#[derive(Debug, Clone)]
pub enum SessionOutcome {
    /// No token, or the token could not be validated or decoded.
    NoSession,
    /// The token is valid but expires within the safety margin.
    Expired,
    /// The session is valid but its entity could not be resolved.
    NoEntity(SessionContext),
    Authenticated(SessionContext, EntitySummary),
}

/// What the presentation layer shows for an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    NoAuth,
    Expired,
    NoEntity,
    Authenticated,
}

impl SessionOutcome {
    pub fn page_state(&self) -> PageState {
        match self {
            SessionOutcome::NoSession => PageState::NoAuth,
            SessionOutcome::Expired => PageState::Expired,
            SessionOutcome::NoEntity(_) => PageState::NoEntity,
            SessionOutcome::Authenticated(..) => PageState::Authenticated,
        }
    }

    /// The decoded session, when there is one.
    pub fn session(&self) -> Option<&SessionContext> {
        match self {
            SessionOutcome::NoEntity(session) | SessionOutcome::Authenticated(session, _) => {
                Some(session)
            }
            _ => None,
        }
    }

    pub fn entity(&self) -> Option<&EntitySummary> {
        match self {
            SessionOutcome::Authenticated(_, entity) => Some(entity),
            _ => None,
        }
    }

    /// Page title: `"<base> - <class> - <id> (<environment> System)"` for
    /// decoded sessions, `base` otherwise.
    pub fn page_title(&self, base: &str) -> String {
        let Some(session) = self.session() else {
            return base.to_string();
        };
        let class = session.entity_class_name.as_deref().unwrap_or("None");
        let id = session
            .entity_id
            .map_or_else(|| "None".to_string(), |id| id.to_string());
        format!("{base} - {class} - {id} ({} System)", session.environment)
    }
}

/// Validates tokens and looks up the entity they point at.
pub struct SessionResolver {
    auth: AuthClient,
    connector: Arc<dyn LimsConnector>,
}

impl SessionResolver {
    pub fn new(auth: AuthClient, connector: Arc<dyn LimsConnector>) -> Self {
        Self { auth, connector }
    }

    /// Resolves `token` against the current local time.
    pub async fn resolve(&self, token: &str) -> SessionOutcome {
        self.resolve_at(token, Local::now().naive_local()).await
    }

    /// Resolves `token` as if the current local time were `now`.
    pub async fn resolve_at(&self, token: &str, now: NaiveDateTime) -> SessionOutcome {
        if token.is_empty() {
            debug!("no token supplied");
            return SessionOutcome::NoSession;
        }

        let body = match self.auth.validate(token).await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "token validation failed");
                return SessionOutcome::NoSession;
            }
        };
        let session = match parse_session(&body) {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "token validation response rejected");
                return SessionOutcome::NoSession;
            }
        };

        let logger = self.logger_for(&session);

        if session.is_expired_at(now) {
            logger
                .log_operation(
                    "Info",
                    format!("Session token for {} expired at {}", session.user, session.expiry),
                    true,
                )
                .await;
            return SessionOutcome::Expired;
        }

        let (Some(endpoint), Some(entity_id), Some(_)) =
            (session.entity_endpoint(), session.entity_id, session.job_id)
        else {
            logger
                .log_operation(
                    "entity_data",
                    format!(
                        "Invalid entity information: class {:?}, id {:?}, job {:?}",
                        session.entity_class_name, session.entity_id, session.job_id
                    ),
                    true,
                )
                .await;
            return SessionOutcome::NoEntity(session);
        };

        let query = json!({"id": entity_id});
        let records = match self.connector.connect(&session) {
            Ok(client) => client.read(endpoint, query.clone()).await,
            Err(e) => Err(e),
        };

        match records {
            Ok(records) if !records.is_empty() => {
                logger
                    .log_operation("read", format!("read `{endpoint}` with {query}"), true)
                    .await;
                let entity = EntitySummary::from_record(&records[0]);
                SessionOutcome::Authenticated(session, entity)
            }
            Ok(_) => {
                logger
                    .log_operation(
                        "Error",
                        format!("Entity data retrieval for {endpoint} {entity_id} returned no record"),
                        true,
                    )
                    .await;
                SessionOutcome::NoEntity(session)
            }
            Err(e) => {
                logger
                    .log_operation(
                        "Error",
                        format!("read `{endpoint}` with {query} failed: {e}"),
                        true,
                    )
                    .await;
                SessionOutcome::NoEntity(session)
            }
        }
    }

    /// Reads the application the session was launched from.
    ///
    /// Missing IDs, failed reads and empty results yield the default summary.
    pub async fn application(&self, session: &SessionContext) -> ApplicationSummary {
        let Some(app_id) = session.application_id else {
            debug!("session has no application id");
            return ApplicationSummary::default();
        };

        let client = match self.connector.connect(session) {
            Ok(client) => client,
            Err(e) => {
                warn!(error = %e, "cannot open LIMS client for application lookup");
                return ApplicationSummary::default();
            }
        };

        let logger = self.logger_for(session);
        let query = json!({"id": app_id});
        let records = logger
            .log_call("read", "application", &query, client.read("application", query.clone()))
            .await;

        match records {
            Ok(records) => match records.first() {
                Some(record) => ApplicationSummary::from_record(record),
                None => {
                    logger
                        .log_operation(
                            "app_data",
                            format!("Failed to retrieve application data for App ID {app_id}"),
                            true,
                        )
                        .await;
                    ApplicationSummary::default()
                }
            },
            Err(_) => ApplicationSummary::default(),
        }
    }

    /// Logger for `session`, flushing through the power user when one is configured.
    fn logger_for(&self, session: &SessionContext) -> OperationLogger {
        let logger = OperationLogger::for_session(session);
        match self.connector.power_user(session.environment) {
            Ok(sink) => logger.with_sink(sink),
            Err(e) => {
                debug!(error = %e, "operation log stays local");
                logger
            }
        }
    }
}
