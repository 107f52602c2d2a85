// SPDX-FileCopyrightText: 2026 B-Fabric Web Apps Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session handling for B-Fabric web apps.
//!
//! Validates the token a LIMS user arrives with, decodes it into a
//! [`SessionContext`](bfabric_core::SessionContext) and resolves the entity
//! it points at. Failures never escape: the caller always gets a
//! [`SessionOutcome`].

pub mod auth;
pub mod resolver;
pub mod token;

pub use auth::AuthClient;
pub use resolver::{PageState, SessionOutcome, SessionResolver};
pub use token::{parse_session, token_from_query};
