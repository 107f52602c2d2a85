// SPDX-FileCopyrightText: 2026 B-Fabric Web Apps Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shell command step.
//!
//! Commands run one after another through `sh -c` with stderr folded into
//! stdout, so the captured text keeps the order the command wrote it in.
//! There is no timeout and a non-zero exit status is not an error.

use bfabric_core::{BfabricError, OperationLogger};
use tracing::debug;

/// Separator written before every command block of the report.
pub const REPORT_SEPARATOR: &str = "---------------------------------------------------------\n";

/// Runs `command` and returns its combined stdout and stderr.
pub async fn run_command(command: &str) -> Result<String, BfabricError> {
    let output = tokio::process::Command::new("sh")
        .arg("-c")
        .arg(format!("{{ {command}\n}} 2>&1"))
        .output()
        .await
        .map_err(|e| BfabricError::io(format!("failed to spawn `sh` for `{command}`"), e))?;

    debug!(command, status = ?output.status.code(), "command finished");
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Runs every command in order and returns the concatenated report.
pub async fn execute_commands(
    commands: &[String],
    logger: &OperationLogger,
) -> Result<String, BfabricError> {
    let mut report = String::new();

    for command in commands {
        let output = run_command(command).await?;
        report.push_str(REPORT_SEPARATOR);
        report.push_str(&format!("Command: {command}\n\nOutput:\n{output}\n"));
        logger
            .log_operation("Info", format!("Executed command: {command}\nOutput:\n{output}"), true)
            .await;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_stdout_and_stderr_in_order() {
        let output = run_command("echo out; echo err >&2; echo done").await.unwrap();
        assert_eq!(output, "out\nerr\ndone\n");
    }

    #[tokio::test]
    async fn nonzero_exit_still_reports_output() {
        let output = run_command("echo failing; exit 3").await.unwrap();
        assert_eq!(output, "failing\n");
    }

    #[tokio::test]
    async fn report_has_one_block_per_command() {
        let logger = OperationLogger::detached();
        let commands = vec!["echo hello".to_string(), "printf ''".to_string()];
        let report = execute_commands(&commands, &logger).await.unwrap();

        assert_eq!(
            report,
            format!(
                "{REPORT_SEPARATOR}Command: echo hello\n\nOutput:\nhello\n\n\
                 {REPORT_SEPARATOR}Command: printf ''\n\nOutput:\n\n"
            )
        );
        assert_eq!(logger.entries().await.len(), 2);
    }

    #[tokio::test]
    async fn no_commands_empty_report() {
        let report = execute_commands(&[], &OperationLogger::detached()).await.unwrap();
        assert!(report.is_empty());
    }
}
