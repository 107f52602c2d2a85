// SPDX-FileCopyrightText: 2026 B-Fabric Web Apps Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! File copy step.

use std::fmt;
use std::path::{Path, PathBuf};

use bfabric_core::{BfabricError, OperationLogger};

use crate::request::FileCopy;

/// Counts of a copy step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopySummary {
    pub succeeded: usize,
    pub total: usize,
}

impl CopySummary {
    pub fn failed(&self) -> usize {
        self.total - self.succeeded
    }

    pub fn all_succeeded(&self) -> bool {
        self.succeeded == self.total
    }
}

impl fmt::Display for CopySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.all_succeeded() {
            write!(f, "All files copied successfully.")
        } else {
            write!(
                f,
                "{}/{} files copied successfully, {} failed.",
                self.succeeded,
                self.total,
                self.failed()
            )
        }
    }
}

/// Resolves the final target path: directories receive the source file name.
async fn target_path(source: &Path, destination: &Path) -> Result<PathBuf, BfabricError> {
    let is_dir = tokio::fs::metadata(destination)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);
    if !is_dir {
        return Ok(destination.to_path_buf());
    }
    let name = source.file_name().ok_or_else(|| {
        BfabricError::Internal(format!("source `{}` has no file name", source.display()))
    })?;
    Ok(destination.join(name))
}

async fn copy_one(copy: &FileCopy) -> Result<u64, BfabricError> {
    let target = target_path(&copy.source, &copy.destination).await?;
    tokio::fs::copy(&copy.source, &target)
        .await
        .map_err(|e| BfabricError::io(format!("copy to {}", target.display()), e))
}

/// Copies every pair in order and logs one entry per pair.
pub async fn copy_files(copies: &[FileCopy], logger: &OperationLogger) -> CopySummary {
    let mut succeeded = 0;

    for copy in copies {
        let source = copy.source.display();
        let destination = copy.destination.display();
        match copy_one(copy).await {
            Ok(_) => {
                succeeded += 1;
                logger
                    .log_operation("Info", format!("Copied file: {source} -> {destination}"), false)
                    .await;
            }
            Err(e) => {
                let reason = match &e {
                    BfabricError::Io {
                        source: Some(cause), ..
                    } => cause.to_string(),
                    other => other.to_string(),
                };
                logger
                    .log_operation(
                        "Error",
                        format!("Error copying file: {source} -> {destination}, Error: {reason}"),
                        false,
                    )
                    .await;
            }
        }
    }

    CopySummary {
        succeeded,
        total: copies.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_wording() {
        let all = CopySummary { succeeded: 2, total: 2 };
        assert_eq!(all.to_string(), "All files copied successfully.");
        let some = CopySummary { succeeded: 1, total: 3 };
        assert_eq!(some.to_string(), "1/3 files copied successfully, 2 failed.");
    }

    #[tokio::test]
    async fn copies_into_directory_under_source_name() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("data.txt");
        std::fs::write(&source, "payload").unwrap();
        let out = dir.path().join("out");
        std::fs::create_dir(&out).unwrap();

        let logger = OperationLogger::detached();
        let summary = copy_files(&[FileCopy::new(&source, &out)], &logger).await;

        assert!(summary.all_succeeded());
        assert_eq!(std::fs::read_to_string(out.join("data.txt")).unwrap(), "payload");
        let entries = logger.entries().await;
        assert_eq!(entries.len(), 1);
        assert!(entries[0].message.starts_with("Copied file: "));
    }

    #[tokio::test]
    async fn copies_to_explicit_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("a.txt");
        std::fs::write(&source, "x").unwrap();
        let target = dir.path().join("b.txt");

        let summary = copy_files(&[FileCopy::new(&source, &target)], &OperationLogger::detached()).await;
        assert!(summary.all_succeeded());
        assert!(target.exists());
    }

    #[tokio::test]
    async fn unwritable_destination_is_counted_and_logged() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("a.txt");
        std::fs::write(&source, "x").unwrap();
        let target = dir.path().join("missing").join("a.txt");

        let logger = OperationLogger::detached();
        let summary = copy_files(&[FileCopy::new(&source, &target)], &logger).await;

        assert_eq!(summary.to_string(), "0/1 files copied successfully, 1 failed.");
        let errors = logger.errors().await;
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.starts_with("Error copying file: "));
    }
}
