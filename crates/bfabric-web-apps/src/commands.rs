// SPDX-FileCopyrightText: 2026 B-Fabric Web Apps Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subcommand handlers.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use bfabric_config::AppConfig;
use bfabric_core::{BfabricError, LimsConnector};
use bfabric_jobs::{JobOrchestrator, JobRequest};
use bfabric_lims::HttpLimsConnector;
use bfabric_report::{BugReport, BugReporter};
use bfabric_session::{AuthClient, SessionOutcome, SessionResolver, token_from_query};
use serde_json::json;
use tracing::info;

const REDACTED: &str = "[redacted]";

/// Long-lived collaborators, built once per invocation.
struct Services {
    resolver: Arc<SessionResolver>,
    connector: Arc<dyn LimsConnector>,
}

impl Services {
    fn new(config: &AppConfig) -> Result<Self, BfabricError> {
        let connector: Arc<dyn LimsConnector> =
            Arc::new(HttpLimsConnector::new(&config.bfabric, &config.power_user)?);
        let auth = AuthClient::new(&config.bfabric)?;
        Ok(Self {
            resolver: Arc::new(SessionResolver::new(auth, Arc::clone(&connector))),
            connector,
        })
    }
}

/// Accepts either a bare token or a URL/query string carrying `token=`.
fn extract_token(input: &str) -> String {
    if input.contains("token=") {
        token_from_query(input)
    } else {
        input.to_string()
    }
}

fn print_json(value: &serde_json::Value) -> Result<(), BfabricError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| BfabricError::Internal(format!("failed to render output: {e}")))?;
    println!("{text}");
    Ok(())
}

pub async fn resolve(config: &AppConfig, token: &str, title: &str) -> Result<ExitCode, BfabricError> {
    let services = Services::new(config)?;
    let outcome = services.resolver.resolve(&extract_token(token)).await;

    let application = match outcome.session() {
        Some(session) => Some(services.resolver.application(session).await),
        None => None,
    };

    print_json(&json!({
        "state": format!("{:?}", outcome.page_state()),
        "title": outcome.page_title(title),
        "dev_mode": config.server.dev,
        "user": outcome.session().map(|s| s.user.clone()),
        "job_id": outcome.session().and_then(|s| s.job_id),
        "entity": outcome.entity(),
        "application": application,
    }))?;

    Ok(match outcome {
        SessionOutcome::Authenticated(..) => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}

pub async fn run(config: &AppConfig, job: &Path, token: &str) -> Result<ExitCode, BfabricError> {
    let content = tokio::fs::read_to_string(job)
        .await
        .map_err(|e| BfabricError::io(format!("read job file {}", job.display()), e))?;
    let request = JobRequest::from_toml_str(&content)?;

    let services = Services::new(config)?;
    let orchestrator = JobOrchestrator::new(services.resolver, services.connector);
    let results = orchestrator.run(&request, &extract_token(token)).await;

    let failed = results.iter().filter(|r| !r.is_success()).count();
    info!(job = %job.display(), failed, "job file processed");
    print_json(&json!(results))?;

    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

pub async fn bug_report(
    config: &AppConfig,
    description: &str,
    token: Option<&str>,
) -> Result<ExitCode, BfabricError> {
    let outcome = match token {
        Some(token) => {
            let services = Services::new(config)?;
            services.resolver.resolve(&extract_token(token)).await
        }
        None => SessionOutcome::NoSession,
    };

    let report = BugReport::compose(outcome.session(), outcome.entity(), description);
    let reporter = BugReporter::sendmail(&config.mail)?;

    if reporter.send(&report).await {
        println!("Bug report sent to {}", config.mail.bug_report_email);
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("Bug report could not be sent");
        Ok(ExitCode::FAILURE)
    }
}

/// Copy of `config` with power-user passwords replaced.
fn redacted(config: &AppConfig) -> AppConfig {
    let mut config = config.clone();
    for creds in [&mut config.power_user.production, &mut config.power_user.test]
        .into_iter()
        .flatten()
    {
        creds.password = REDACTED.to_string();
    }
    config
}

pub fn show_config(config: &AppConfig) -> Result<ExitCode, BfabricError> {
    let text = toml::to_string_pretty(&redacted(config))
        .map_err(|e| BfabricError::Internal(format!("failed to render config: {e}")))?;
    print!("{text}");
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bfabric_config::model::Credentials;

    #[test]
    fn token_from_url_or_bare() {
        assert_eq!(extract_token("https://app.example.org/?token=abc"), "abc");
        assert_eq!(extract_token("abc"), "abc");
    }

    #[test]
    fn redaction_hides_passwords() {
        let mut config = AppConfig::default();
        config.power_user.test = Some(Credentials {
            login: "svc".into(),
            password: "hunter2".into(),
        });

        let shown = redacted(&config);
        let creds = shown.power_user.test.expect("credentials kept");
        assert_eq!(creds.login, "svc");
        assert_eq!(creds.password, REDACTED);
        assert!(shown.power_user.production.is_none());
    }

    #[test]
    fn redacted_config_renders_as_toml() {
        let text = toml::to_string_pretty(&redacted(&AppConfig::default())).unwrap();
        assert!(text.contains("[server]"));
        assert!(text.contains("port = 8050"));
    }
}
