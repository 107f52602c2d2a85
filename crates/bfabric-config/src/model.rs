// SPDX-FileCopyrightText: 2026 B-Fabric Web Apps Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so that misspelled keys
//! are reported at startup instead of silently ignored.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
///
/// Every section is optional and falls back to the defaults below.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Where the web app listens and whether it runs in development mode.
    #[serde(default)]
    pub server: ServerConfig,

    /// B-Fabric endpoints.
    #[serde(default)]
    pub bfabric: BfabricConfig,

    /// Power-user credentials per environment.
    #[serde(default)]
    pub power_user: PowerUserConfig,

    /// Bug report and developer contact settings.
    #[serde(default)]
    pub mail: MailConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Web server settings consumed by the hosting app.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Development mode: authenticated sessions render the "under development" page.
    #[serde(default)]
    pub dev: bool,

    #[serde(default)]
    pub debug: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            dev: false,
            debug: false,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8050
}

/// B-Fabric endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BfabricConfig {
    /// Token validation URL; the token is appended verbatim.
    #[serde(default = "default_validation_url")]
    pub validation_url: String,

    /// Value of the explicit `Host` header sent on the first validation attempt.
    #[serde(default = "default_auth_host")]
    pub auth_host: String,

    /// Base URL of the production installation.
    #[serde(default = "default_production_url")]
    pub production_url: String,

    /// Base URL of the test installation.
    #[serde(default = "default_test_url")]
    pub test_url: String,

    /// Optional HTTP timeout for LIMS calls. `None` waits indefinitely.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for BfabricConfig {
    fn default() -> Self {
        Self {
            validation_url: default_validation_url(),
            auth_host: default_auth_host(),
            production_url: default_production_url(),
            test_url: default_test_url(),
            request_timeout_secs: None,
        }
    }
}

fn default_validation_url() -> String {
    "https://fgcz-bfabric.uzh.ch/bfabric/rest/token/validate?token=".to_string()
}

fn default_auth_host() -> String {
    "fgcz-bfabric.uzh.ch".to_string()
}

fn default_production_url() -> String {
    "https://fgcz-bfabric.uzh.ch/bfabric".to_string()
}

fn default_test_url() -> String {
    "https://fgcz-bfabric-test.uzh.ch/bfabric".to_string()
}

/// Power-user credentials, one optional entry per environment.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PowerUserConfig {
    #[serde(default)]
    pub production: Option<Credentials>,

    #[serde(default)]
    pub test: Option<Credentials>,
}

/// Login and web-service password of a LIMS account.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// Mail settings for bug reports.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MailConfig {
    /// Shown on the "under development" page.
    #[serde(default = "default_developer_email")]
    pub developer_email: String,

    /// Recipient of bug reports.
    #[serde(default = "default_bug_report_email")]
    pub bug_report_email: String,

    /// Sender address of bug reports.
    #[serde(default = "default_from_address")]
    pub from_address: String,

    /// Sendmail binary. `None` uses the `sendmail` found on `PATH`.
    #[serde(default)]
    pub sendmail_command: Option<String>,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            developer_email: default_developer_email(),
            bug_report_email: default_bug_report_email(),
            from_address: default_from_address(),
            sendmail_command: None,
        }
    }
}

fn default_developer_email() -> String {
    "developer@localhost".to_string()
}

fn default_bug_report_email() -> String {
    "gwtools@fgcz.system".to_string()
}

fn default_from_address() -> String {
    "bfabric-web-apps@localhost".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
