// SPDX-FileCopyrightText: 2026 B-Fabric Web Apps Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the LIMS JSON gateway.
//!
//! Every call is a `POST` to `<base_url>/rest/<endpoint>/<operation>` whose
//! body carries the account credentials next to the payload. The gateway
//! answers either with a bare JSON array or with `{"res": [...]}`.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bfabric_core::{BfabricError, LimsClient};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Request body shared by all gateway operations.
#[derive(Serialize)]
struct GatewayRequest<'a> {
    login: &'a str,
    password: &'a str,
    #[serde(flatten)]
    payload: Value,
}

/// LIMS client bound to one account.
pub struct HttpLimsClient {
    client: reqwest::Client,
    base_url: String,
    login: String,
    password: SecretString,
}

impl std::fmt::Debug for HttpLimsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpLimsClient")
            .field("base_url", &self.base_url)
            .field("login", &self.login)
            .field("password", &"[redacted]")
            .finish()
    }
}

impl HttpLimsClient {
    /// Creates a client with its own connection pool.
    pub fn new(
        base_url: &str,
        login: impl Into<String>,
        password: SecretString,
        timeout: Option<Duration>,
    ) -> Result<Self, BfabricError> {
        Ok(Self::with_http_client(
            build_http_client(timeout)?,
            base_url,
            login,
            password,
        ))
    }

    /// Creates a client reusing an existing connection pool.
    pub fn with_http_client(
        client: reqwest::Client,
        base_url: &str,
        login: impl Into<String>,
        password: SecretString,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            login: login.into(),
            password,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    async fn call(
        &self,
        endpoint: &str,
        operation: &str,
        payload: Value,
    ) -> Result<Vec<Value>, BfabricError> {
        let url = format!("{}/rest/{endpoint}/{operation}", self.base_url);
        let body = GatewayRequest {
            login: &self.login,
            password: self.password.expose_secret(),
            payload,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| BfabricError::Lims {
                endpoint: endpoint.to_string(),
                message: format!("{operation} request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(endpoint, operation, status = %status, "LIMS response received");

        let text = response.text().await.map_err(|e| BfabricError::Lims {
            endpoint: endpoint.to_string(),
            message: format!("failed to read {operation} response body: {e}"),
            source: Some(Box::new(e)),
        })?;

        if !status.is_success() {
            return Err(BfabricError::lims(
                endpoint,
                format!("{operation} returned {status}: {text}"),
            ));
        }

        let body: Value = serde_json::from_str(&text).map_err(|e| BfabricError::Lims {
            endpoint: endpoint.to_string(),
            message: format!("{operation} response is not JSON: {e}"),
            source: Some(Box::new(e)),
        })?;

        records_from_body(body).ok_or_else(|| {
            BfabricError::lims(endpoint, format!("{operation} response has no record list"))
        })
    }
}

#[async_trait]
impl LimsClient for HttpLimsClient {
    async fn read(&self, endpoint: &str, query: Value) -> Result<Vec<Value>, BfabricError> {
        self.call(endpoint, "read", serde_json::json!({ "query": query }))
            .await
    }

    async fn save(&self, endpoint: &str, object: Value) -> Result<Vec<Value>, BfabricError> {
        self.call(endpoint, "save", serde_json::json!({ "object": object }))
            .await
    }

    async fn upload_resource(
        &self,
        name: &str,
        content: &[u8],
        workunit_id: i64,
    ) -> Result<Vec<Value>, BfabricError> {
        let payload = serde_json::json!({
            "name": name,
            "workunitid": workunit_id,
            "content": STANDARD.encode(content),
        });
        self.call("resource", "upload", payload).await
    }
}

/// Builds the shared `reqwest` client.
pub fn build_http_client(timeout: Option<Duration>) -> Result<reqwest::Client, BfabricError> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().map_err(|e| BfabricError::Config(format!(
        "failed to build HTTP client: {e}"
    )))
}

/// Extracts the record list from `[...]`, `{"res": [...]}` or `{"res": {...}}`.
fn records_from_body(body: Value) -> Option<Vec<Value>> {
    match body {
        Value::Array(records) => Some(records),
        Value::Object(mut map) => match map.remove("res") {
            Some(Value::Array(records)) => Some(records),
            Some(Value::Null) => Some(Vec::new()),
            Some(record @ Value::Object(_)) => Some(vec![record]),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> HttpLimsClient {
        HttpLimsClient::new(base_url, "alice", SecretString::from("pw".to_string()), None).unwrap()
    }

    #[test]
    fn record_list_shapes() {
        assert_eq!(records_from_body(json!([{"id": 1}])).unwrap().len(), 1);
        assert_eq!(records_from_body(json!({"res": [{"id": 1}, {"id": 2}]})).unwrap().len(), 2);
        assert_eq!(records_from_body(json!({"res": {"id": 1}})).unwrap().len(), 1);
        assert!(records_from_body(json!({"res": null})).unwrap().is_empty());
        assert!(records_from_body(json!({"other": 1})).is_none());
        assert!(records_from_body(json!("text")).is_none());
    }

    #[test]
    fn debug_redacts_password() {
        let client = test_client("http://localhost");
        let rendered = format!("{client:?}");
        assert!(rendered.contains("[redacted]"));
        assert!(!rendered.contains("pw\""));
    }

    #[tokio::test]
    async fn read_posts_credentials_and_query() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/run/read"))
            .and(body_partial_json(json!({
                "login": "alice",
                "password": "pw",
                "query": {"id": 5}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "res": [{"id": 5, "name": "Run 5"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let records = test_client(&server.uri())
            .read("run", json!({"id": 5}))
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["name"], "Run 5");
    }

    #[tokio::test]
    async fn save_posts_object() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/workunit/save"))
            .and(body_partial_json(json!({"object": {"containerid": 101}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 900}])))
            .mount(&server)
            .await;

        let records = test_client(&server.uri())
            .save("workunit", json!({"containerid": 101}))
            .await
            .unwrap();
        assert_eq!(records[0]["id"], 900);
    }

    #[tokio::test]
    async fn upload_encodes_content() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/resource/upload"))
            .and(body_partial_json(json!({
                "name": "report.txt",
                "workunitid": 900,
                "content": STANDARD.encode(b"hello")
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 77}])))
            .mount(&server)
            .await;

        let records = test_client(&server.uri())
            .upload_resource("report.txt", b"hello", 900)
            .await
            .unwrap();
        assert_eq!(records[0]["id"], 77);
    }

    #[tokio::test]
    async fn error_status_becomes_lims_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .read("sample", json!({"id": 1}))
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("sample"), "got: {msg}");
        assert!(msg.contains("403"), "got: {msg}");
    }

    #[tokio::test]
    async fn non_json_body_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let result = test_client(&server.uri()).read("run", json!({"id": 1})).await;
        assert!(matches!(result, Err(BfabricError::Lims { .. })));
    }
}
