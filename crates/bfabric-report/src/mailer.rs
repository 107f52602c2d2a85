// SPDX-FileCopyrightText: 2026 B-Fabric Web Apps Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bug report delivery over any `lettre` async transport.

use std::fmt::Display;

use bfabric_config::model::MailConfig;
use bfabric_core::BfabricError;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::{AsyncSendmailTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, warn};

use crate::report::BugReport;

/// Subject line of every bug report mail.
pub const SUBJECT: &str = "Bug Report";

/// Sends bug reports to a fixed address.
pub struct BugReporter<T> {
    transport: T,
    from: Mailbox,
    to: Mailbox,
}

fn mailbox(address: &str, field: &str) -> Result<Mailbox, BfabricError> {
    address.parse().map_err(|e| BfabricError::Mail {
        message: format!("invalid {field} address `{address}`"),
        source: Some(Box::new(e)),
    })
}

impl BugReporter<AsyncSendmailTransport<Tokio1Executor>> {
    /// Reporter handing mail to the local sendmail binary.
    pub fn sendmail(config: &MailConfig) -> Result<Self, BfabricError> {
        let transport = match &config.sendmail_command {
            Some(command) => AsyncSendmailTransport::<Tokio1Executor>::new_with_command(command),
            None => AsyncSendmailTransport::<Tokio1Executor>::new(),
        };
        Self::new(transport, &config.from_address, &config.bug_report_email)
    }
}

impl<T> BugReporter<T>
where
    T: AsyncTransport + Send + Sync,
    T::Error: Display,
{
    pub fn new(transport: T, from: &str, to: &str) -> Result<Self, BfabricError> {
        Ok(Self {
            transport,
            from: mailbox(from, "from")?,
            to: mailbox(to, "bug report")?,
        })
    }

    pub fn message(&self, report: &BugReport) -> Result<Message, BfabricError> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(SUBJECT)
            .header(ContentType::TEXT_PLAIN)
            .body(report.render())
            .map_err(|e| BfabricError::Mail {
                message: "failed to build bug report mail".to_string(),
                source: Some(Box::new(e)),
            })
    }

    /// Sends `report`. Returns false and logs the cause when delivery fails.
    pub async fn send(&self, report: &BugReport) -> bool {
        let message = match self.message(report) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "bug report not sent");
                return false;
            }
        };

        match self.transport.send(message).await {
            Ok(_) => {
                info!(to = %self.to, "bug report sent");
                true
            }
            Err(e) => {
                warn!(to = %self.to, error = %e, "bug report delivery failed");
                false
            }
        }
    }
}
