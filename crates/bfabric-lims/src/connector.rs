// SPDX-FileCopyrightText: 2026 B-Fabric Web Apps Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`LimsConnector`] backed by [`HttpLimsClient`].

use std::sync::Arc;
use std::time::Duration;

use bfabric_config::model::{BfabricConfig, Credentials, PowerUserConfig};
use bfabric_core::{BfabricError, Environment, LimsClient, LimsConnector, SessionContext};
use secrecy::{ExposeSecret, SecretString};

use crate::client::{HttpLimsClient, build_http_client};

/// Opens HTTP clients against the installation matching a session's environment.
///
/// Built once at startup; all clients share one connection pool.
pub struct HttpLimsConnector {
    http: reqwest::Client,
    production_url: String,
    test_url: String,
    power_users: PowerUserConfig,
}

impl HttpLimsConnector {
    pub fn new(bfabric: &BfabricConfig, power_users: &PowerUserConfig) -> Result<Self, BfabricError> {
        let http = build_http_client(bfabric.request_timeout_secs.map(Duration::from_secs))?;
        Ok(Self {
            http,
            production_url: bfabric.production_url.clone(),
            test_url: bfabric.test_url.clone(),
            power_users: power_users.clone(),
        })
    }

    /// Base URL of the installation for `environment`.
    pub fn base_url(&self, environment: Environment) -> &str {
        match environment {
            Environment::Production => &self.production_url,
            Environment::Test => &self.test_url,
        }
    }

    fn credentials(&self, environment: Environment) -> Option<&Credentials> {
        match environment {
            Environment::Production => self.power_users.production.as_ref(),
            Environment::Test => self.power_users.test.as_ref(),
        }
    }
}

impl LimsConnector for HttpLimsConnector {
    fn connect(&self, session: &SessionContext) -> Result<Arc<dyn LimsClient>, BfabricError> {
        Ok(Arc::new(HttpLimsClient::with_http_client(
            self.http.clone(),
            self.base_url(session.environment),
            session.user.clone(),
            SecretString::from(session.password_secret.expose_secret().to_owned()),
        )))
    }

    fn power_user(&self, environment: Environment) -> Result<Arc<dyn LimsClient>, BfabricError> {
        let creds = self.credentials(environment).ok_or_else(|| {
            BfabricError::Config(format!(
                "no power-user credentials configured for the {environment} environment"
            ))
        })?;
        Ok(Arc::new(HttpLimsClient::with_http_client(
            self.http.clone(),
            self.base_url(environment),
            creds.login.clone(),
            SecretString::from(creds.password.clone()),
        )))
    }
}
