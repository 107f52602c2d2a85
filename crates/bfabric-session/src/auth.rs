// SPDX-FileCopyrightText: 2026 B-Fabric Web Apps Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client for the LIMS token validation endpoint.

use std::time::Duration;

use bfabric_config::model::BfabricConfig;
use bfabric_core::BfabricError;
use reqwest::header::HOST;
use serde_json::Value;
use tracing::{debug, warn};

/// Validates session tokens with `GET <validation_url><token>`.
///
/// The first attempt carries an explicit `Host` header; a failed first
/// attempt is retried once without it.
#[derive(Debug, Clone)]
pub struct AuthClient {
    client: reqwest::Client,
    validation_url: String,
    auth_host: String,
}

impl AuthClient {
    pub fn new(config: &BfabricConfig) -> Result<Self, BfabricError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(|e| BfabricError::Config(format!(
            "failed to build HTTP client: {e}"
        )))?;
        Ok(Self::with_http_client(
            client,
            &config.validation_url,
            &config.auth_host,
        ))
    }

    pub fn with_http_client(client: reqwest::Client, validation_url: &str, auth_host: &str) -> Self {
        Self {
            client,
            validation_url: validation_url.to_string(),
            auth_host: auth_host.to_string(),
        }
    }

    /// Returns the decoded JSON body of a successful validation.
    pub async fn validate(&self, token: &str) -> Result<Value, BfabricError> {
        let url = format!("{}{token}", self.validation_url);

        let text = match self.fetch(&url, true).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "token validation with Host header failed, retrying without");
                self.fetch(&url, false).await?
            }
        };

        serde_json::from_str(&text).map_err(|e| BfabricError::Auth {
            message: "validation response is not JSON".to_string(),
            source: Some(Box::new(e)),
        })
    }

    async fn fetch(&self, url: &str, with_host: bool) -> Result<String, BfabricError> {
        let mut request = self.client.get(url);
        if with_host {
            request = request.header(HOST, &self.auth_host);
        }

        let response = request.send().await.map_err(|e| BfabricError::Auth {
            message: format!("validation request failed: {e}"),
            source: Some(Box::new(e)),
        })?;

        let status = response.status();
        debug!(status = %status, with_host, "token validation response received");
        if !status.is_success() {
            return Err(BfabricError::Auth {
                message: format!("validation endpoint returned {status}"),
                source: None,
            });
        }

        response.text().await.map_err(|e| BfabricError::Auth {
            message: format!("failed to read validation response: {e}"),
            source: Some(Box::new(e)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> AuthClient {
        AuthClient::with_http_client(
            reqwest::Client::new(),
            &format!("{}/rest/token/validate?token=", server.uri()),
            "lims.example.org",
        )
    }

    #[tokio::test]
    async fn first_attempt_sends_host_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/token/validate"))
            .and(query_param("token", "abc"))
            .and(header("host", "lims.example.org"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": "alice"})))
            .expect(1)
            .mount(&server)
            .await;

        let body = client(&server).validate("abc").await.unwrap();
        assert_eq!(body["user"], "alice");
    }

    #[tokio::test]
    async fn failed_first_attempt_is_retried_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": "alice"})))
            .expect(1)
            .mount(&server)
            .await;

        let body = client(&server).validate("abc").await.unwrap();
        assert_eq!(body["user"], "alice");
    }

    #[tokio::test]
    async fn both_attempts_failing_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .expect(2)
            .mount(&server)
            .await;

        let result = client(&server).validate("abc").await;
        assert!(matches!(result, Err(BfabricError::Auth { .. })));
    }

    #[tokio::test]
    async fn non_json_body_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        assert!(client(&server).validate("abc").await.is_err());
    }
}
