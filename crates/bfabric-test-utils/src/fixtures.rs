// SPDX-FileCopyrightText: 2026 B-Fabric Web Apps Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canned authentication responses and sessions.

use bfabric_core::{EntityClass, Environment, SessionContext};
use chrono::{NaiveDate, NaiveDateTime};
use secrecy::SecretString;
use serde_json::{Value, json};

/// Expiry timestamp far enough ahead to never trip the expiry check.
pub const FAR_FUTURE_EXPIRY: &str = "2999-12-31 23:59:59";

/// Expiry timestamp that is always in the past.
pub const PAST_EXPIRY: &str = "2000-01-01 00:00:00";

/// A complete token validation response for a run in the test environment.
pub fn auth_response(expiry: &str) -> Value {
    json!({
        "environment": "Test",
        "user": "alice",
        "userWsPassword": "ws-secret",
        "expiryDateTime": expiry,
        "entityId": 42,
        "entityClassName": "Run",
        "applicationId": 7,
        "jobId": 99
    })
}

/// Same as [`auth_response`] with one field replaced.
pub fn auth_response_with(expiry: &str, field: &str, value: Value) -> Value {
    let mut response = auth_response(expiry);
    if let Some(obj) = response.as_object_mut() {
        obj.insert(field.to_string(), value);
    }
    response
}

fn far_future() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2999, 12, 31)
        .and_then(|d| d.and_hms_opt(23, 59, 59))
        .unwrap_or_default()
}

/// A session matching [`auth_response`].
pub fn session_context() -> SessionContext {
    SessionContext {
        environment: Environment::Test,
        user: "alice".to_string(),
        password_secret: SecretString::from("ws-secret".to_string()),
        expiry: far_future(),
        entity_id: Some(42),
        entity_class: Some(EntityClass::Run),
        entity_class_name: Some("Run".to_string()),
        job_id: Some(99),
        application_id: Some(7),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bfabric_core::types::EXPIRY_FORMAT;

    #[test]
    fn fixture_expiries_parse() {
        assert!(NaiveDateTime::parse_from_str(FAR_FUTURE_EXPIRY, EXPIRY_FORMAT).is_ok());
        assert!(NaiveDateTime::parse_from_str(PAST_EXPIRY, EXPIRY_FORMAT).is_ok());
    }

    #[test]
    fn session_matches_response() {
        let session = session_context();
        let response = auth_response(FAR_FUTURE_EXPIRY);
        assert_eq!(response["user"], session.user.as_str());
        assert_eq!(response["jobId"], session.job_id.unwrap_or_default());
    }
}
