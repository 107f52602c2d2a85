// SPDX-FileCopyrightText: 2026 B-Fabric Web Apps Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Token extraction and decoding of the validation response.

use std::str::FromStr;

use bfabric_core::types::{EXPIRY_FORMAT, field_id, field_text};
use bfabric_core::{BfabricError, EntityClass, Environment, SessionContext};
use chrono::NaiveDateTime;
use secrecy::SecretString;
use serde_json::Value;

/// Extracts the session token from a URL or query string.
///
/// Everything after the first `token=` marker is the token; later markers
/// are dropped and the text is not URL-decoded. No marker yields an empty
/// string.
pub fn token_from_query(query: &str) -> String {
    query.split("token=").skip(1).collect()
}

fn required_text(body: &Value, key: &str) -> Result<String, BfabricError> {
    field_text(body, key).ok_or_else(|| BfabricError::Auth {
        message: format!("validation response lacks `{key}`"),
        source: None,
    })
}

/// Decodes a validation response into a [`SessionContext`].
///
/// `expiryDateTime`, `environment`, `user` and `userWsPassword` are
/// required. Entity, job and application fields are optional; an entity
/// class outside the known set leaves `entity_class` empty but keeps the
/// raw name.
pub fn parse_session(body: &Value) -> Result<SessionContext, BfabricError> {
    let expiry_raw = required_text(body, "expiryDateTime")?;
    let expiry = NaiveDateTime::parse_from_str(&expiry_raw, EXPIRY_FORMAT).map_err(|e| {
        BfabricError::Auth {
            message: format!("malformed expiryDateTime `{expiry_raw}`"),
            source: Some(Box::new(e)),
        }
    })?;

    let environment_raw = required_text(body, "environment")?;
    let environment = Environment::from_str(&environment_raw).map_err(|e| BfabricError::Auth {
        message: format!("unknown environment `{environment_raw}`"),
        source: Some(Box::new(e)),
    })?;

    let entity_class_name = field_text(body, "entityClassName");
    let entity_class = entity_class_name
        .as_deref()
        .and_then(|name| EntityClass::from_str(name).ok());

    Ok(SessionContext {
        environment,
        user: required_text(body, "user")?,
        password_secret: SecretString::from(required_text(body, "userWsPassword")?),
        expiry,
        entity_id: field_id(body, "entityId"),
        entity_class,
        entity_class_name,
        job_id: field_id(body, "jobId"),
        application_id: field_id(body, "applicationId"),
    })
}
