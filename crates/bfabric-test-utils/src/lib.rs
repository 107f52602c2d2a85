// SPDX-FileCopyrightText: 2026 B-Fabric Web Apps Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for B-Fabric web apps.
//!
//! Deterministic stand-ins for the LIMS so session and job tests run
//! without a B-Fabric installation.
//!
//! # Components
//!
//! - [`MockLims`] - in-memory LIMS implementing both client and connector
//! - [`fixtures`] - canned authentication responses and sessions

pub mod fixtures;
pub mod mock_lims;

pub use mock_lims::{MockCall, MockLims, MockUpload};
