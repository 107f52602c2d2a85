// SPDX-FileCopyrightText: 2026 B-Fabric Web Apps Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation.
//!
//! Checks the constraints serde cannot express: non-empty endpoints, a
//! usable port, plausible mail addresses and a known log level.

use crate::diagnostic::ConfigError;
use crate::model::{AppConfig, Credentials};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration.
///
/// Collects every violation instead of stopping at the first one.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.server.host.trim().is_empty() {
        fail("server.host must not be empty".to_string());
    }
    if config.server.port == 0 {
        fail("server.port must be between 1 and 65535".to_string());
    }

    for (key, url) in [
        ("bfabric.validation_url", &config.bfabric.validation_url),
        ("bfabric.production_url", &config.bfabric.production_url),
        ("bfabric.test_url", &config.bfabric.test_url),
    ] {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            fail(format!("{key} must be an http(s) URL, got `{url}`"));
        }
    }

    if config.bfabric.auth_host.trim().is_empty() {
        fail("bfabric.auth_host must not be empty".to_string());
    }

    if config.bfabric.request_timeout_secs == Some(0) {
        fail("bfabric.request_timeout_secs must be positive when set".to_string());
    }

    for (env, creds) in [
        ("production", &config.power_user.production),
        ("test", &config.power_user.test),
    ] {
        if let Some(Credentials { login, password }) = creds {
            if login.trim().is_empty() {
                fail(format!("power_user.{env}.login must not be empty"));
            }
            if password.is_empty() {
                fail(format!("power_user.{env}.password must not be empty"));
            }
        }
    }

    for (key, address) in [
        ("mail.developer_email", &config.mail.developer_email),
        ("mail.bug_report_email", &config.mail.bug_report_email),
        ("mail.from_address", &config.mail.from_address),
    ] {
        if !is_plausible_address(address) {
            fail(format!("{key} `{address}` is not an e-mail address"));
        }
    }

    let level = config.logging.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        fail(format!(
            "logging.level `{}` must be one of {}",
            config.logging.level,
            LOG_LEVELS.join(", ")
        ));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// `local@domain` with both parts non-empty and no whitespace.
fn is_plausible_address(address: &str) -> bool {
    match address.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !address.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(config: &AppConfig) -> Vec<String> {
        validate_config(config)
            .unwrap_err()
            .into_iter()
            .map(|e| e.to_string())
            .collect()
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn zero_port_fails() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(messages(&config).iter().any(|m| m.contains("server.port")));
    }

    #[test]
    fn non_http_url_fails() {
        let mut config = AppConfig::default();
        config.bfabric.test_url = "fgcz-bfabric-test".to_string();
        assert!(messages(&config).iter().any(|m| m.contains("bfabric.test_url")));
    }

    #[test]
    fn bad_address_fails() {
        let mut config = AppConfig::default();
        config.mail.bug_report_email = "nobody".to_string();
        assert!(messages(&config).iter().any(|m| m.contains("mail.bug_report_email")));
    }

    #[test]
    fn empty_power_user_login_fails() {
        let mut config = AppConfig::default();
        config.power_user.test = Some(Credentials {
            login: " ".to_string(),
            password: "pw".to_string(),
        });
        assert!(messages(&config).iter().any(|m| m.contains("power_user.test.login")));
    }

    #[test]
    fn collects_all_errors() {
        let mut config = AppConfig::default();
        config.server.host = String::new();
        config.logging.level = "loud".to_string();
        assert_eq!(messages(&config).len(), 2);
    }

    #[test]
    fn log_level_is_case_insensitive() {
        let mut config = AppConfig::default();
        config.logging.level = "DEBUG".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
