// SPDX-FileCopyrightText: 2026 B-Fabric Web Apps Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operation log for session resolution and job runs.
//!
//! Every entry is timestamped, mirrored to `tracing`, and kept in memory.
//! When the logger knows a job ID and has a flush target, pending entries
//! are appended to the LIMS job record on [`OperationLogger::flush`].

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Local};
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::traits::LimsClient;
use crate::types::SessionContext;

/// One recorded operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    /// Free-form category such as `Info`, `Success`, `Error` or an operation name.
    pub kind: String,
    pub message: String,
}

impl LogEntry {
    /// Returns true for entries of kind `Error` (case-insensitive).
    pub fn is_error(&self) -> bool {
        self.kind.eq_ignore_ascii_case("error")
    }

    fn render(&self) -> String {
        format!(
            "[{}] {}: {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.kind,
            self.message
        )
    }
}

/// Per-session operation logger.
pub struct OperationLogger {
    job_id: Option<i64>,
    username: String,
    environment: String,
    entries: Mutex<Vec<LogEntry>>,
    /// Indices into `entries` not yet written to the flush target.
    pending_from: Mutex<usize>,
    sink: Option<Arc<dyn LimsClient>>,
}

impl OperationLogger {
    pub fn new(job_id: Option<i64>, username: impl Into<String>, environment: impl Into<String>) -> Self {
        Self {
            job_id,
            username: username.into(),
            environment: environment.into(),
            entries: Mutex::new(Vec::new()),
            pending_from: Mutex::new(0),
            sink: None,
        }
    }

    /// Logger tagged with the session's job, user and environment.
    pub fn for_session(session: &SessionContext) -> Self {
        Self::new(session.job_id, session.user.clone(), session.environment.to_string())
    }

    /// Logger for requests without a usable session. Entries only go to `tracing`
    /// and memory.
    pub fn detached() -> Self {
        Self::new(None, "None", "None")
    }

    /// Sets the client used to append entries to the LIMS job record.
    pub fn with_sink(mut self, sink: Arc<dyn LimsClient>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn job_id(&self) -> Option<i64> {
        self.job_id
    }

    /// Records an operation and, if `flush` is set, pushes pending entries.
    pub async fn log_operation(&self, kind: &str, message: impl Into<String>, flush: bool) {
        let entry = LogEntry {
            timestamp: Local::now(),
            kind: kind.to_string(),
            message: message.into(),
        };

        if entry.is_error() {
            error!(
                job_id = ?self.job_id,
                user = %self.username,
                environment = %self.environment,
                kind = %entry.kind,
                "{}",
                entry.message
            );
        } else {
            info!(
                job_id = ?self.job_id,
                user = %self.username,
                environment = %self.environment,
                kind = %entry.kind,
                "{}",
                entry.message
            );
        }

        self.entries.lock().await.push(entry);

        if flush {
            self.flush().await;
        }
    }

    /// Runs a LIMS call and records one entry describing it.
    ///
    /// The entry kind is the operation name on success and `Error` on failure.
    /// The call's result is returned untouched.
    pub async fn log_call<T, E, F>(
        &self,
        operation: &str,
        endpoint: &str,
        query: &Value,
        call: F,
    ) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: Display,
    {
        let started = Instant::now();
        let result = call.await;
        let elapsed_ms = started.elapsed().as_millis();

        match &result {
            Ok(_) => {
                self.log_operation(
                    operation,
                    format!("{operation} `{endpoint}` with {query} ({elapsed_ms} ms)"),
                    true,
                )
                .await;
            }
            Err(e) => {
                self.log_operation(
                    "Error",
                    format!("{operation} `{endpoint}` with {query} failed after {elapsed_ms} ms: {e}"),
                    true,
                )
                .await;
            }
        }

        result
    }

    /// Appends pending entries to the LIMS job record.
    ///
    /// Without a job ID or sink the pending marker simply advances. Flush
    /// failures are reported through `tracing` and the entries stay pending.
    pub async fn flush(&self) {
        let mut pending_from = self.pending_from.lock().await;
        let (text, end) = {
            let entries = self.entries.lock().await;
            if *pending_from >= entries.len() {
                return;
            }
            let text = entries[*pending_from..]
                .iter()
                .map(LogEntry::render)
                .collect::<Vec<_>>()
                .join("\n");
            (text, entries.len())
        };

        let (Some(sink), Some(job_id)) = (&self.sink, self.job_id) else {
            *pending_from = end;
            return;
        };

        match sink.save("job", json!({"id": job_id, "logthis": text})).await {
            Ok(_) => *pending_from = end,
            Err(e) => warn!(job_id, error = %e, "failed to flush operation log to LIMS"),
        }
    }

    /// Snapshot of all recorded entries, oldest first.
    pub async fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().await.clone()
    }

    /// Snapshot of entries of kind `Error`.
    pub async fn errors(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .await
            .iter()
            .filter(|e| e.is_error())
            .cloned()
            .collect()
    }
}
