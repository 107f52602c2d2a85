// SPDX-FileCopyrightText: 2026 B-Fabric Web Apps Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Container lookup and workunit creation.

use std::collections::BTreeSet;

use bfabric_core::BfabricError;
use bfabric_core::types::field_id;
use serde_json::{Value, json};
use tracing::debug;

use crate::context::{JobContext, SessionLims};

/// Unique container IDs of the samples in the session's run, ascending.
pub async fn get_container_ids(ctx: &JobContext) -> Result<Vec<i64>, BfabricError> {
    let lims = ctx.lims()?;
    let Some(entity_id) = lims.session.entity_id else {
        return Ok(Vec::new());
    };

    let query = json!({"runid": entity_id});
    let samples = ctx
        .logger()
        .log_call("read", "sample", &query, lims.user.read("sample", query.clone()))
        .await?;

    let ids: BTreeSet<i64> = samples
        .iter()
        .filter_map(|sample| sample.get("container"))
        .filter_map(|container| field_id(container, "id"))
        .collect();
    Ok(ids.into_iter().collect())
}

/// IDs of the workunits already linked to `job`, from its `workunit` list.
fn linked_workunits(job: Option<&Value>) -> Vec<Value> {
    job.and_then(|j| j.get("workunit"))
        .and_then(Value::as_array)
        .map(|wus| wus.iter().filter_map(|wu| wu.get("id").cloned()).collect())
        .unwrap_or_default()
}

async fn create_workunit(
    lims: &SessionLims,
    app_name: &str,
    app_desc: &str,
    app_id: i64,
    container_id: i64,
) -> Result<i64, BfabricError> {
    let workunit = json!({
        "name": format!("{app_name} - Order {container_id}"),
        "description": format!("{app_desc} for Order {container_id}"),
        "applicationid": app_id,
        "containerid": container_id,
    });
    let saved = lims.user.save("workunit", workunit).await?;
    saved
        .first()
        .and_then(|record| field_id(record, "id"))
        .ok_or_else(|| BfabricError::lims("workunit", "save returned no workunit id"))
}

/// Prepends `workunit_id` to the workunits of `job_id` through the power user.
async fn link_to_job(lims: &SessionLims, job_id: i64, workunit_id: i64) -> Result<(), BfabricError> {
    let power = lims.power()?;
    let jobs = lims.user.read("job", json!({"id": job_id})).await?;
    let mut workunit_ids = vec![json!(workunit_id)];
    workunit_ids.extend(linked_workunits(jobs.first()));
    power
        .save("job", json!({"id": job_id, "workunitid": workunit_ids}))
        .await?;
    Ok(())
}

/// Creates one workunit per container and links each to the session's job.
///
/// Containers that fail are logged and skipped; the IDs of the created
/// workunits are returned in container order. A workunit that cannot be
/// linked is still returned, with the linking error logged.
pub async fn create_workunits(
    ctx: &JobContext,
    app_name: &str,
    app_desc: &str,
    app_id: i64,
    container_ids: &[i64],
) -> Vec<i64> {
    let logger = ctx.logger();
    let lims = match ctx.lims() {
        Ok(lims) => lims,
        Err(e) => {
            if !container_ids.is_empty() {
                logger
                    .log_operation("Error", format!("Cannot create workunits: {e}"), true)
                    .await;
            }
            return Vec::new();
        }
    };

    let mut created = Vec::with_capacity(container_ids.len());
    for &container_id in container_ids {
        match create_workunit(lims, app_name, app_desc, app_id, container_id).await {
            Ok(workunit_id) => {
                logger
                    .log_operation(
                        "Info",
                        format!("Created Workunit {workunit_id} for Order {container_id}"),
                        true,
                    )
                    .await;
                created.push(workunit_id);

                let Some(job_id) = lims.session.job_id else {
                    debug!(workunit_id, "session has no job, workunit left unlinked");
                    continue;
                };
                if let Err(e) = link_to_job(lims, job_id, workunit_id).await {
                    logger
                        .log_operation(
                            "Error",
                            format!("Failed to link Workunit {workunit_id} to Job {job_id}: {e}"),
                            true,
                        )
                        .await;
                }
            }
            Err(e) => {
                logger
                    .log_operation(
                        "Error",
                        format!("Failed to create workunit for Order {container_id}: {e}"),
                        true,
                    )
                    .await;
            }
        }
    }
    created
}
