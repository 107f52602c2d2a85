// SPDX-FileCopyrightText: 2026 B-Fabric Web Apps Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the configuration system.

use bfabric_config::diagnostic::ConfigError;
use bfabric_config::{
    load_and_validate_path, load_and_validate_str, load_config, load_config_from_str,
};

/// A complete config file deserializes into the model.
#[test]
fn full_toml_deserializes() {
    let toml = r#"
[server]
host = "0.0.0.0"
port = 8080
dev = true

[bfabric]
validation_url = "https://lims.example.org/rest/token/validate?token="
auth_host = "lims.example.org"
production_url = "https://lims.example.org/bfabric"
test_url = "https://lims-test.example.org/bfabric"
request_timeout_secs = 30

[power_user.test]
login = "svc"
password = "secret"

[mail]
bug_report_email = "bugs@example.org"
sendmail_command = "/usr/sbin/sendmail"

[logging]
level = "debug"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 8080);
    assert!(config.server.dev);
    assert!(!config.server.debug);
    assert_eq!(config.bfabric.auth_host, "lims.example.org");
    assert_eq!(config.bfabric.request_timeout_secs, Some(30));
    let creds = config.power_user.test.expect("test credentials");
    assert_eq!(creds.login, "svc");
    assert_eq!(creds.password, "secret");
    assert!(config.power_user.production.is_none());
    assert_eq!(config.mail.bug_report_email, "bugs@example.org");
    assert_eq!(config.mail.developer_email, "developer@localhost");
    assert_eq!(config.mail.sendmail_command.as_deref(), Some("/usr/sbin/sendmail"));
    assert_eq!(config.logging.level, "debug");
}

/// Empty input yields the compiled defaults.
#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("empty config is valid");
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8050);
    assert_eq!(
        config.bfabric.validation_url,
        "https://fgcz-bfabric.uzh.ch/bfabric/rest/token/validate?token="
    );
    assert_eq!(config.bfabric.auth_host, "fgcz-bfabric.uzh.ch");
    assert_eq!(config.mail.bug_report_email, "gwtools@fgcz.system");
    assert!(config.bfabric.request_timeout_secs.is_none());
}

/// A misspelled key becomes an UnknownKey diagnostic with a suggestion.
#[test]
fn unknown_key_suggests_correction() {
    let toml = r#"
[server]
prot = 9000
"#;

    let errors = load_and_validate_str(toml).expect_err("unknown key should be rejected");
    let unknown = errors
        .iter()
        .find_map(|e| match e {
            ConfigError::UnknownKey {
                key, suggestion, ..
            } => Some((key.clone(), suggestion.clone())),
            _ => None,
        })
        .expect("an UnknownKey error");
    assert_eq!(unknown.0, "prot");
    assert_eq!(unknown.1.as_deref(), Some("port"));
}

/// Unknown top-level sections are rejected too.
#[test]
fn unknown_section_rejected() {
    let toml = r#"
[redis]
host = "localhost"
"#;
    assert!(load_config_from_str(toml).is_err());
}

/// Wrong value types produce an error.
#[test]
fn wrong_type_rejected() {
    let toml = r#"
[server]
port = "eighty"
"#;
    let errors = load_and_validate_str(toml).expect_err("string port should fail");
    assert!(!errors.is_empty());
}

/// Semantic validation runs after a successful parse.
#[test]
fn validation_errors_are_reported() {
    let toml = r#"
[mail]
bug_report_email = "not-an-address"
"#;
    let errors = load_and_validate_str(toml).expect_err("bad address should fail");
    assert!(errors.iter().any(|e| matches!(
        e,
        ConfigError::Validation { message } if message.contains("bug_report_email")
    )));
}

/// Explicit config paths are honored.
#[test]
fn load_from_explicit_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("apps.toml");
    std::fs::write(&path, "[server]\nport = 8123\n").unwrap();

    let config = load_and_validate_path(&path).expect("file config is valid");
    assert_eq!(config.server.port, 8123);
}

/// Local file and env overrides are layered over the defaults.
#[test]
fn env_overrides_local_file() {
    figment::Jail::expect_with(|jail| {
        jail.create_file(
            "bfabric-web-apps.toml",
            r#"
[server]
port = 8100

[mail]
bug_report_email = "file@example.org"
"#,
        )?;
        jail.set_env("BFABRIC_APPS_SERVER_PORT", "9100");
        jail.set_env("BFABRIC_APPS_POWER_USER_TEST_LOGIN", "svc");
        jail.set_env("BFABRIC_APPS_POWER_USER_TEST_PASSWORD", "pw");

        let config = load_config()?;
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.mail.bug_report_email, "file@example.org");
        let creds = config.power_user.test.expect("env credentials");
        assert_eq!(creds.login, "svc");
        Ok(())
    });
}
