// SPDX-FileCopyrightText: 2026 B-Fabric Web Apps Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resource upload and file attachment.

use std::path::Path;

use bfabric_core::types::field_id;
use bfabric_core::{BfabricError, LimsClient};

use crate::context::JobContext;
use crate::request::AttachmentSpec;

/// How many uploads an attachment pass attempted and how many failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttachReport {
    pub attempted: usize,
    pub failed: usize,
}

impl AttachReport {
    pub fn succeeded(&self) -> usize {
        self.attempted - self.failed
    }
}

impl std::ops::Add for AttachReport {
    type Output = AttachReport;

    fn add(self, other: AttachReport) -> AttachReport {
        AttachReport {
            attempted: self.attempted + other.attempted,
            failed: self.failed + other.failed,
        }
    }
}

/// Reads `path` and uploads it to `workunit_id` under `name`, returning the resource ID.
async fn upload_file(
    client: &dyn LimsClient,
    name: &str,
    path: &Path,
    workunit_id: i64,
) -> Result<i64, BfabricError> {
    let content = tokio::fs::read(path)
        .await
        .map_err(|e| BfabricError::io(format!("read {}", path.display()), e))?;
    let records = client.upload_resource(name, &content, workunit_id).await?;
    records
        .first()
        .and_then(|record| field_id(record, "id"))
        .ok_or_else(|| BfabricError::lims("resource", format!("upload of {name} returned no id")))
}

/// Uploads every resource path to every workunit through the power user.
pub async fn attach_resources(
    ctx: &JobContext,
    workunit_ids: &[i64],
    resource_paths: &[impl AsRef<Path>],
) -> AttachReport {
    let logger = ctx.logger();
    if workunit_ids.is_empty() {
        logger
            .log_operation("Info", "No workunits found, skipping resource registration.", true)
            .await;
        return AttachReport::default();
    }
    if resource_paths.is_empty() {
        logger
            .log_operation("Info", "No resource paths provided, skipping resource registration.", true)
            .await;
        return AttachReport::default();
    }

    let attempted = workunit_ids.len() * resource_paths.len();
    let power = match ctx.lims().and_then(|lims| lims.power()) {
        Ok(power) => power,
        Err(e) => {
            logger
                .log_operation("Error", format!("Cannot register resources: {e}"), true)
                .await;
            return AttachReport {
                attempted,
                failed: attempted,
            };
        }
    };

    let mut failed = 0;
    for &workunit_id in workunit_ids {
        let mut resource_ids = Vec::new();
        for path in resource_paths {
            let path = path.as_ref();
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            match upload_file(power, &name, path, workunit_id).await {
                Ok(resource_id) => {
                    logger
                        .log_operation("upload_resource", format!("Resource uploaded successfully: {name}"), true)
                        .await;
                    resource_ids.push(resource_id);
                }
                Err(e) => {
                    failed += 1;
                    logger
                        .log_operation("Error", format!("Failed to upload resource {name}: {e}"), true)
                        .await;
                }
            }
        }

        if resource_ids.is_empty() {
            logger
                .log_operation("Error", format!("Failed to attach resources for Workunit {workunit_id}"), true)
                .await;
        } else {
            logger
                .log_operation(
                    "Success",
                    format!("Resources {resource_ids:?} attached to Workunit {workunit_id}"),
                    true,
                )
                .await;
        }
    }

    AttachReport { attempted, failed }
}

/// Attaches individual files to the entities named in `specs`.
///
/// Incomplete specs are logged and skipped. Only `workunit` targets are
/// supported; they become resources of that workunit.
pub async fn attach_files(ctx: &JobContext, specs: &[AttachmentSpec]) -> AttachReport {
    let logger = ctx.logger();
    let mut report = AttachReport::default();

    for spec in specs {
        report.attempted += 1;
        let (Some(file_name), Some(file_path), Some(entity_class), Some(entity_id)) = (
            spec.file_name.as_deref(),
            spec.file_path.as_deref(),
            spec.entity_class.as_deref(),
            spec.entity_id,
        ) else {
            report.failed += 1;
            logger
                .log_operation(
                    "Error",
                    format!("Missing one or more required fields in attachment: {spec:?}"),
                    true,
                )
                .await;
            continue;
        };

        if !entity_class.eq_ignore_ascii_case("workunit") {
            report.failed += 1;
            logger
                .log_operation(
                    "Error",
                    format!("Attaching '{file_name}' to {entity_class} {entity_id} is not supported"),
                    true,
                )
                .await;
            continue;
        }

        let uploaded = match ctx.lims().and_then(|lims| lims.power()) {
            Ok(power) => upload_file(power, file_name, file_path, entity_id).await,
            Err(e) => Err(e),
        };
        match uploaded {
            Ok(_) => {
                logger
                    .log_operation(
                        "Success",
                        format!(
                            "Successfully attached '{file_name}' ({}) to {entity_class} with ID={entity_id}",
                            file_path.display()
                        ),
                        true,
                    )
                    .await;
            }
            Err(e) => {
                report.failed += 1;
                logger
                    .log_operation(
                        "Error",
                        format!("Exception while attaching '{file_name}' to {entity_class} {entity_id}: {e}"),
                        true,
                    )
                    .await;
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn nothing_to_do_logs_skip() {
        let ctx = JobContext::detached();
        let report = attach_resources(&ctx, &[], &[PathBuf::from("a.txt")]).await;
        assert_eq!(report, AttachReport::default());
        let entries = ctx.logger().entries().await;
        assert_eq!(entries[0].message, "No workunits found, skipping resource registration.");

        let report = attach_resources(&ctx, &[1], &Vec::<PathBuf>::new()).await;
        assert_eq!(report.attempted, 0);
    }

    #[tokio::test]
    async fn incomplete_and_unsupported_specs_fail() {
        let ctx = JobContext::detached();
        let specs = vec![
            AttachmentSpec {
                file_name: Some("a.log".into()),
                ..AttachmentSpec::default()
            },
            AttachmentSpec {
                file_name: Some("a.log".into()),
                file_path: Some("a.log".into()),
                entity_class: Some("order".into()),
                entity_id: Some(3),
            },
        ];
        let report = attach_files(&ctx, &specs).await;
        assert_eq!(report, AttachReport { attempted: 2, failed: 2 });
        assert_eq!(ctx.logger().errors().await.len(), 2);
    }

    #[test]
    fn reports_add_up() {
        let total = AttachReport { attempted: 2, failed: 1 } + AttachReport { attempted: 3, failed: 0 };
        assert_eq!(total, AttachReport { attempted: 5, failed: 1 });
        assert_eq!(total.succeeded(), 4);
    }
}
