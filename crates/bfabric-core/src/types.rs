// SPDX-FileCopyrightText: 2026 B-Fabric Web Apps Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types: session context, entity summaries and job step results.

use chrono::{Duration, NaiveDateTime};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

/// Sessions closer than this many minutes to their expiry count as expired.
pub const EXPIRY_MARGIN_MINUTES: i64 = 5;

/// Timestamp format used by the authentication endpoint (`expiryDateTime`).
pub const EXPIRY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The B-Fabric installation a session belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum Environment {
    Production,
    Test,
}

/// Entity classes a session can point at.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum EntityClass {
    Run,
    Sample,
    Project,
    Order,
    Container,
    Plate,
}

impl EntityClass {
    /// LIMS endpoint that stores records of this class.
    ///
    /// Projects and orders are both containers in B-Fabric.
    pub fn endpoint(&self) -> &'static str {
        match self {
            EntityClass::Run => "run",
            EntityClass::Sample => "sample",
            EntityClass::Project | EntityClass::Order | EntityClass::Container => "container",
            EntityClass::Plate => "plate",
        }
    }
}

/// A decoded, validated session token.
///
/// Built per request from the authentication response and never persisted.
/// `entity_id`, `entity_class` and `job_id` stay optional: a session can be
/// valid while its entity cannot be resolved.
#[derive(Debug)]
pub struct SessionContext {
    pub environment: Environment,
    pub user: String,
    /// Web-service password returned by the authentication endpoint.
    pub password_secret: SecretString,
    pub expiry: NaiveDateTime,
    pub entity_id: Option<i64>,
    /// `None` when the class name is missing or not one of the known classes.
    pub entity_class: Option<EntityClass>,
    /// Raw `entityClassName` as sent by the endpoint, kept for display.
    pub entity_class_name: Option<String>,
    pub job_id: Option<i64>,
    pub application_id: Option<i64>,
}

impl SessionContext {
    /// Returns true once `now + 5 minutes` has passed the expiry time.
    pub fn is_expired_at(&self, now: NaiveDateTime) -> bool {
        now + Duration::minutes(EXPIRY_MARGIN_MINUTES) > self.expiry
    }

    /// LIMS endpoint of the session entity, if the class is known.
    pub fn entity_endpoint(&self) -> Option<&'static str> {
        self.entity_class.map(|class| class.endpoint())
    }
}

impl Clone for SessionContext {
    fn clone(&self) -> Self {
        Self {
            environment: self.environment,
            user: self.user.clone(),
            password_secret: SecretString::from(self.password_secret.expose_secret().to_owned()),
            expiry: self.expiry,
            entity_id: self.entity_id,
            entity_class: self.entity_class,
            entity_class_name: self.entity_class_name.clone(),
            job_id: self.job_id,
            application_id: self.application_id,
        }
    }
}

/// Metadata of the LIMS entity a session refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySummary {
    pub name: String,
    pub created_by: Option<String>,
    pub created_at: Option<String>,
    pub modified_at: Option<String>,
}

impl EntitySummary {
    /// Builds a summary from a LIMS record (`name`, `createdby`, `created`, `modified`).
    pub fn from_record(record: &Value) -> Self {
        Self {
            name: field_text(record, "name").unwrap_or_default(),
            created_by: field_text(record, "createdby"),
            created_at: field_text(record, "created"),
            modified_at: field_text(record, "modified"),
        }
    }
}

/// Name and description of the application a session was launched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSummary {
    pub name: String,
    pub description: String,
}

impl ApplicationSummary {
    pub fn from_record(record: &Value) -> Self {
        Self {
            name: field_text(record, "name").unwrap_or_else(|| "Unknown".to_string()),
            description: field_text(record, "description")
                .unwrap_or_else(|| "No description available".to_string()),
        }
    }
}

impl Default for ApplicationSummary {
    fn default() -> Self {
        Self::from_record(&Value::Null)
    }
}

/// Outcome of a single orchestrator step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum StepStatus {
    Success,
    Failure,
}

/// Result record for one step of a job run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStepResult {
    pub step_name: String,
    pub status: StepStatus,
    pub detail: String,
}

impl JobStepResult {
    pub fn success(step_name: &str, detail: impl Into<String>) -> Self {
        Self {
            step_name: step_name.to_string(),
            status: StepStatus::Success,
            detail: detail.into(),
        }
    }

    pub fn failure(step_name: &str, detail: impl Into<String>) -> Self {
        Self {
            step_name: step_name.to_string(),
            status: StepStatus::Failure,
            detail: detail.into(),
        }
    }

    /// A successful step that had nothing to do.
    pub fn noop(step_name: &str, reason: &str) -> Self {
        Self::success(step_name, format!("no-op: {reason}"))
    }

    pub fn is_success(&self) -> bool {
        self.status == StepStatus::Success
    }

    pub fn is_noop(&self) -> bool {
        self.is_success() && self.detail.starts_with("no-op")
    }
}

/// Reads a record field as text, stringifying non-string scalars.
pub fn field_text(record: &Value, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Reads a record field as an integer ID, accepting numbers and digit strings.
pub fn field_id(record: &Value, key: &str) -> Option<i64> {
    match record.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn session(expiry: &str) -> SessionContext {
        SessionContext {
            environment: Environment::Test,
            user: "alice".into(),
            password_secret: SecretString::from("pw".to_string()),
            expiry: NaiveDateTime::parse_from_str(expiry, EXPIRY_FORMAT).unwrap(),
            entity_id: Some(1),
            entity_class: Some(EntityClass::Run),
            entity_class_name: Some("Run".into()),
            job_id: Some(2),
            application_id: None,
        }
    }

    #[test]
    fn entity_class_endpoint_table() {
        let table = [
            ("Run", "run"),
            ("Sample", "sample"),
            ("Project", "container"),
            ("Order", "container"),
            ("Container", "container"),
            ("Plate", "plate"),
        ];
        for (name, endpoint) in table {
            let class = EntityClass::from_str(name).expect("known class");
            assert_eq!(class.endpoint(), endpoint, "{name}");
        }
        assert!(EntityClass::from_str("Workunit").is_err());
        assert!(EntityClass::from_str("run").is_err());
    }

    #[test]
    fn expiry_margin_is_five_minutes() {
        let s = session("2030-01-01 12:00:00");
        let at = |t: &str| NaiveDateTime::parse_from_str(t, EXPIRY_FORMAT).unwrap();
        assert!(!s.is_expired_at(at("2030-01-01 11:55:00")));
        assert!(s.is_expired_at(at("2030-01-01 11:55:01")));
        assert!(s.is_expired_at(at("2030-01-01 12:30:00")));
    }

    #[test]
    fn entity_summary_reads_record_fields() {
        let record = serde_json::json!({
            "id": 5,
            "name": "Run 5",
            "createdby": "bob",
            "created": "2024-01-01 10:00:00",
            "modified": "2024-02-01 10:00:00"
        });
        let summary = EntitySummary::from_record(&record);
        assert_eq!(summary.name, "Run 5");
        assert_eq!(summary.created_by.as_deref(), Some("bob"));
        assert_eq!(summary.created_at.as_deref(), Some("2024-01-01 10:00:00"));
        assert_eq!(summary.modified_at.as_deref(), Some("2024-02-01 10:00:00"));
    }

    #[test]
    fn application_summary_defaults() {
        let summary = ApplicationSummary::from_record(&serde_json::json!({"id": 3}));
        assert_eq!(summary.name, "Unknown");
        assert_eq!(summary.description, "No description available");
    }

    #[test]
    fn field_id_accepts_digit_strings() {
        let record = serde_json::json!({"a": 7, "b": "42", "c": "x", "d": null});
        assert_eq!(field_id(&record, "a"), Some(7));
        assert_eq!(field_id(&record, "b"), Some(42));
        assert_eq!(field_id(&record, "c"), None);
        assert_eq!(field_id(&record, "d"), None);
        assert_eq!(field_id(&record, "missing"), None);
    }

    #[test]
    fn cloned_session_keeps_secret() {
        let s = session("2030-01-01 12:00:00");
        let c = s.clone();
        assert_eq!(c.password_secret.expose_secret(), "pw");
        assert_eq!(c.user, "alice");
    }

    #[test]
    fn noop_results_are_successes() {
        let r = JobStepResult::noop("copy_files", "no files to copy");
        assert!(r.is_success());
        assert!(r.is_noop());
        assert!(!JobStepResult::success("x", "done").is_noop());
        assert!(!JobStepResult::failure("x", "no-op?").is_noop());
    }
}
