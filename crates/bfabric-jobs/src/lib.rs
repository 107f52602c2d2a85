// SPDX-FileCopyrightText: 2026 B-Fabric Web Apps Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Job pipeline for B-Fabric web apps.
//!
//! A run resolves the caller's session, copies files, executes shell
//! commands, creates one workunit per order and uploads result files. See
//! [`JobOrchestrator::run`].

pub mod context;
pub mod files;
pub mod orchestrator;
pub mod request;
pub mod resources;
pub mod shell;
pub mod workunits;

pub use context::JobContext;
pub use files::{CopySummary, copy_files};
pub use orchestrator::JobOrchestrator;
pub use request::{AttachmentSpec, FileCopy, JobRequest};
pub use resources::{AttachReport, attach_files, attach_resources};
pub use shell::execute_commands;
pub use workunits::{create_workunits, get_container_ids};
