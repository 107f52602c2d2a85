// SPDX-FileCopyrightText: 2026 B-Fabric Web Apps Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bug reports for B-Fabric web apps.
//!
//! [`BugReport`] captures the session, entity and user description;
//! [`BugReporter`] mails it, by default through the host's sendmail.

pub mod mailer;
pub mod report;

pub use mailer::BugReporter;
pub use report::BugReport;
