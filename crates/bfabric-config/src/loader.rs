// SPDX-FileCopyrightText: 2026 B-Fabric Web Apps Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Lookup order: `./bfabric-web-apps.toml` > `~/.config/bfabric-web-apps/config.toml`
//! > `/etc/bfabric-web-apps/config.toml`, with `BFABRIC_APPS_*` environment
//! overrides on top.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::AppConfig;

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "BFABRIC_APPS_";

/// Local config file name, looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "bfabric-web-apps.toml";

/// System-wide config file.
pub const SYSTEM_CONFIG_FILE: &str = "/etc/bfabric-web-apps/config.toml";

/// Sections in the order their env prefixes are tried. Longer prefixes first.
const ENV_SECTIONS: &[&str] = &[
    "power_user_production",
    "power_user_test",
    "server",
    "bfabric",
    "mail",
    "logging",
];

/// User config file under the XDG config directory, if one can be determined.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("bfabric-web-apps/config.toml"))
}

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/bfabric-web-apps/config.toml`
/// 3. `~/.config/bfabric-web-apps/config.toml`
/// 4. `./bfabric-web-apps.toml`
/// 5. `BFABRIC_APPS_*` environment variables
pub fn load_config() -> Result<AppConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only. Used by tests.
pub fn load_config_from_str(toml_content: &str) -> Result<AppConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AppConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<AppConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AppConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment behind [`load_config`], before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(AppConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_FILE))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Environment provider with explicit section mapping.
///
/// `Env::split("_")` would turn `BFABRIC_APPS_MAIL_BUG_REPORT_EMAIL` into
/// `mail.bug.report.email`; the section table keeps it `mail.bug_report_email`.
fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX).map(|key| map_env_key(key.as_str()).into())
}

/// Map a lowercased, prefix-stripped env key to its dotted config path.
pub fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            let dotted = section.replacen("power_user_", "power_user.", 1);
            return format!("{dotted}.{rest}");
        }
    }
    key.to_string()
}
