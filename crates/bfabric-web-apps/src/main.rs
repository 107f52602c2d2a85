// SPDX-FileCopyrightText: 2026 B-Fabric Web Apps Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! bfabric-web-apps - command-line front end.
//!
//! Checks session tokens, runs job files and files bug reports with the
//! same configuration the web apps use.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

/// Tools for apps integrating with the B-Fabric LIMS.
#[derive(Parser, Debug)]
#[command(name = "bfabric-web-apps", version, about, long_about = None)]
struct Cli {
    /// Configuration file to use instead of the standard search path.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a token (or a URL carrying one) and show what the app would display.
    Resolve {
        token: String,
        /// Base page title.
        #[arg(long, default_value = "Bfabric App Interface")]
        title: String,
    },
    /// Run a job file on behalf of a session.
    Run {
        /// TOML job file.
        job: PathBuf,
        /// Session token or URL carrying one.
        #[arg(long)]
        token: String,
    },
    /// Mail a bug report to the configured address.
    BugReport {
        #[arg(long)]
        description: String,
        /// Session token or URL to include session and entity details.
        #[arg(long)]
        token: Option<String>,
    },
    /// Print the effective configuration with secrets redacted.
    Config,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => bfabric_config::load_and_validate_path(path),
        None => bfabric_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            bfabric_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.logging.level);

    let result = match cli.command {
        Commands::Resolve { token, title } => commands::resolve(&config, &token, &title).await,
        Commands::Run { job, token } => commands::run(&config, &job, &token).await,
        Commands::BugReport { description, token } => {
            commands::bug_report(&config, &description, token.as_deref()).await
        }
        Commands::Config => commands::show_config(&config),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Installs the fmt subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("bfabric={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_command() {
        let cli = Cli::try_parse_from([
            "bfabric-web-apps",
            "run",
            "job.toml",
            "--token",
            "abc",
            "--config",
            "apps.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("apps.toml")));
        assert!(matches!(cli.command, Commands::Run { ref token, .. } if token == "abc"));
    }

    #[test]
    fn resolve_has_default_title() {
        let cli = Cli::try_parse_from(["bfabric-web-apps", "resolve", "?token=xyz"]).unwrap();
        let Commands::Resolve { token, title } = cli.command else {
            panic!("expected resolve");
        };
        assert_eq!(token, "?token=xyz");
        assert_eq!(title, "Bfabric App Interface");
    }

    #[test]
    fn bug_report_requires_description() {
        assert!(Cli::try_parse_from(["bfabric-web-apps", "bug-report"]).is_err());
    }
}
