// SPDX-FileCopyrightText: 2026 B-Fabric Web Apps Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the session/job logic and the LIMS.
//!
//! Clients are obtained through a [`LimsConnector`] that is built once at
//! process start and handed to every component as `Arc<dyn LimsConnector>`.

pub mod connector;
pub mod lims;

pub use connector::LimsConnector;
pub use lims::LimsClient;
