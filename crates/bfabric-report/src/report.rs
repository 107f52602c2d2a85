// SPDX-FileCopyrightText: 2026 B-Fabric Web Apps Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plain-text bug report.

use bfabric_core::{EntitySummary, SessionContext};
use chrono::{DateTime, Local};
use serde_json::{Value, json};

/// A user-submitted bug report with the session it was filed from.
#[derive(Debug, Clone)]
pub struct BugReport {
    /// Session fields without the password. `Null` when there was no session.
    pub token_data: Value,
    pub entity_data: Value,
    pub description: String,
    pub sent_at: DateTime<Local>,
}

impl BugReport {
    pub fn compose(
        session: Option<&SessionContext>,
        entity: Option<&EntitySummary>,
        description: impl Into<String>,
    ) -> Self {
        Self::compose_at(session, entity, description, Local::now())
    }

    pub fn compose_at(
        session: Option<&SessionContext>,
        entity: Option<&EntitySummary>,
        description: impl Into<String>,
        sent_at: DateTime<Local>,
    ) -> Self {
        let token_data = session.map_or(Value::Null, |s| {
            json!({
                "environment": s.environment.to_string(),
                "user": s.user,
                "expiry": s.expiry.to_string(),
                "entity_class": s.entity_class_name,
                "entity_id": s.entity_id,
                "job_id": s.job_id,
                "application_id": s.application_id,
            })
        });
        let entity_data = entity.map_or(Value::Null, |e| {
            json!({
                "name": e.name,
                "createdby": e.created_by,
                "created": e.created_at,
                "modified": e.modified_at,
            })
        });

        Self {
            token_data,
            entity_data,
            description: description.into(),
            sent_at,
        }
    }

    /// Mail body.
    pub fn render(&self) -> String {
        format!(
            "BUG REPORT\n\n\
             token_data: {}\n\n\
             entity_data: {}\n\n\
             description: {}\n\n\
             sent_at: {}\n",
            self.token_data,
            self.entity_data,
            self.description,
            self.sent_at.format("%Y-%m-%d %H:%M:%S"),
        )
    }
}
