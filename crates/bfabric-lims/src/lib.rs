// SPDX-FileCopyrightText: 2026 B-Fabric Web Apps Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP implementation of the LIMS client traits.
//!
//! [`HttpLimsConnector`] is constructed once from configuration and opens
//! [`HttpLimsClient`]s for sessions and for the per-environment power user.

pub mod client;
pub mod connector;

pub use client::HttpLimsClient;
pub use connector::HttpLimsConnector;
