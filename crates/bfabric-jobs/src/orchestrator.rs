// SPDX-FileCopyrightText: 2026 B-Fabric Web Apps Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The five-step job pipeline.
//!
//! Steps run strictly in order and every step runs even when an earlier one
//! failed. Each produces one [`JobStepResult`]; failures are logged as
//! `Error` operations and never abort the run.

use std::sync::Arc;

use bfabric_core::{ApplicationSummary, JobStepResult, LimsConnector, StepStatus};
use bfabric_session::{SessionOutcome, SessionResolver};
use tracing::{info, warn};

use crate::context::JobContext;
use crate::files::copy_files;
use crate::request::JobRequest;
use crate::resources::{attach_files, attach_resources};
use crate::shell::execute_commands;
use crate::workunits::{create_workunits, get_container_ids};

pub const STEP_RESOLVE_SESSION: &str = "resolve_session";
pub const STEP_COPY_FILES: &str = "copy_files";
pub const STEP_EXECUTE_COMMANDS: &str = "execute_commands";
pub const STEP_CREATE_WORKUNITS: &str = "create_workunits";
pub const STEP_ATTACH_RESOURCES: &str = "attach_resources";

/// What the session step hands to the later steps.
struct ResolvedRun {
    ctx: JobContext,
    container_ids: Vec<i64>,
    application: ApplicationSummary,
    application_id: Option<i64>,
}

/// Runs job requests against the LIMS.
pub struct JobOrchestrator {
    resolver: Arc<SessionResolver>,
    connector: Arc<dyn LimsConnector>,
}

impl JobOrchestrator {
    pub fn new(resolver: Arc<SessionResolver>, connector: Arc<dyn LimsConnector>) -> Self {
        Self {
            resolver,
            connector,
        }
    }

    /// Runs all five steps for `request` on behalf of `token`.
    pub async fn run(&self, request: &JobRequest, token: &str) -> Vec<JobStepResult> {
        let mut results = Vec::with_capacity(5);

        let (run, resolved) = self.resolve_session(token).await;
        record(&run.ctx, &mut results, resolved).await;

        let copied = if request.file_copies.is_empty() {
            JobStepResult::noop(STEP_COPY_FILES, "no files to copy")
        } else {
            let summary = copy_files(&request.file_copies, run.ctx.logger()).await;
            if summary.all_succeeded() {
                JobStepResult::success(STEP_COPY_FILES, summary.to_string())
            } else {
                JobStepResult::failure(STEP_COPY_FILES, summary.to_string())
            }
        };
        record(&run.ctx, &mut results, copied).await;

        let executed = if request.commands.is_empty() {
            JobStepResult::noop(STEP_EXECUTE_COMMANDS, "no commands to execute")
        } else {
            match execute_commands(&request.commands, run.ctx.logger()).await {
                Ok(report) => JobStepResult::success(STEP_EXECUTE_COMMANDS, report),
                Err(e) => JobStepResult::failure(
                    STEP_EXECUTE_COMMANDS,
                    format!("Failed to execute bash commands: {e}"),
                ),
            }
        };
        record(&run.ctx, &mut results, executed).await;

        let (workunit_ids, created) = self.create_workunits_step(&run).await;
        record(&run.ctx, &mut results, created).await;

        let resources = attach_resources(&run.ctx, &workunit_ids, &request.resource_paths).await;
        let attachments = attach_files(&run.ctx, &request.attachments).await;
        let report = resources + attachments;
        let attached = if report.attempted == 0 {
            JobStepResult::noop(STEP_ATTACH_RESOURCES, "no resources or attachments")
        } else if report.failed == 0 {
            JobStepResult::success(
                STEP_ATTACH_RESOURCES,
                format!("{} file(s) attached", report.attempted),
            )
        } else {
            JobStepResult::failure(
                STEP_ATTACH_RESOURCES,
                format!("{}/{} uploads succeeded", report.succeeded(), report.attempted),
            )
        };
        record(&run.ctx, &mut results, attached).await;

        info!(
            job_id = ?run.ctx.logger().job_id(),
            failed = results.iter().filter(|r| !r.is_success()).count(),
            "job run finished"
        );
        results
    }

    async fn resolve_session(&self, token: &str) -> (ResolvedRun, JobStepResult) {
        let outcome = self.resolver.resolve(token).await;

        let mut run = ResolvedRun {
            ctx: JobContext::detached(),
            container_ids: Vec::new(),
            application: ApplicationSummary::default(),
            application_id: None,
        };

        let Some(session) = outcome.session() else {
            let reason = match outcome {
                SessionOutcome::Expired => "session token expired",
                _ => "no valid session token",
            };
            return (run, JobStepResult::failure(STEP_RESOLVE_SESSION, reason));
        };

        run.ctx = match JobContext::open(self.connector.as_ref(), session.clone()) {
            Ok(ctx) => ctx,
            Err(e) => {
                warn!(error = %e, "cannot open LIMS clients for job run");
                return (
                    run,
                    JobStepResult::failure(STEP_RESOLVE_SESSION, format!("cannot open LIMS clients: {e}")),
                );
            }
        };
        run.application = self.resolver.application(session).await;
        run.application_id = session.application_id;

        match get_container_ids(&run.ctx).await {
            Ok(ids) => run.container_ids = ids,
            Err(e) => {
                return (
                    run,
                    JobStepResult::failure(STEP_RESOLVE_SESSION, format!("failed to read samples: {e}")),
                );
            }
        }

        let result = match outcome {
            SessionOutcome::Authenticated(..) => JobStepResult::success(
                STEP_RESOLVE_SESSION,
                format!(
                    "authenticated as {}, containers {:?}",
                    session.user, run.container_ids
                ),
            ),
            _ => JobStepResult::failure(
                STEP_RESOLVE_SESSION,
                format!(
                    "entity {:?} {:?} could not be resolved",
                    session.entity_class_name, session.entity_id
                ),
            ),
        };
        (run, result)
    }

    async fn create_workunits_step(&self, run: &ResolvedRun) -> (Vec<i64>, JobStepResult) {
        if run.container_ids.is_empty() {
            return (Vec::new(), JobStepResult::noop(STEP_CREATE_WORKUNITS, "no containers"));
        }
        let Some(app_id) = run.application_id else {
            return (
                Vec::new(),
                JobStepResult::failure(STEP_CREATE_WORKUNITS, "session has no application id"),
            );
        };

        let ids = create_workunits(
            &run.ctx,
            &run.application.name,
            &run.application.description,
            app_id,
            &run.container_ids,
        )
        .await;

        let result = if ids.is_empty() {
            JobStepResult::failure(STEP_CREATE_WORKUNITS, "No workunits were created.")
        } else if ids.len() < run.container_ids.len() {
            JobStepResult::failure(
                STEP_CREATE_WORKUNITS,
                format!(
                    "{}/{} workunits created: {ids:?}",
                    ids.len(),
                    run.container_ids.len()
                ),
            )
        } else if let Some(job_id) = unlinkable_job(run) {
            JobStepResult::failure(
                STEP_CREATE_WORKUNITS,
                format!("Created workunits {ids:?}, but no power user is available to link them to job {job_id}"),
            )
        } else {
            JobStepResult::success(STEP_CREATE_WORKUNITS, format!("Created workunits {ids:?}"))
        };
        (ids, result)
    }
}

/// The session's job when new workunits cannot be linked to it.
fn unlinkable_job(run: &ResolvedRun) -> Option<i64> {
    if run.ctx.has_power_user() {
        return None;
    }
    run.ctx.session().and_then(|session| session.job_id)
}

/// Logs a step result and appends it to `results`.
async fn record(ctx: &JobContext, results: &mut Vec<JobStepResult>, result: JobStepResult) {
    let kind = match result.status {
        StepStatus::Failure => "Error",
        StepStatus::Success if result.is_noop() => "Info",
        StepStatus::Success => "Success",
    };
    ctx.logger()
        .log_operation(kind, format!("{}: {}", result.step_name, result.detail), true)
        .await;
    results.push(result);
}
