// SPDX-FileCopyrightText: 2026 B-Fabric Web Apps Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error type shared by every crate in the workspace.

use thiserror::Error;

/// Boxed source error carried by the richer variants.
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// The primary error type for LIMS calls, session handling and job steps.
#[derive(Debug, Error)]
pub enum BfabricError {
    /// Configuration errors (missing credentials, invalid header values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Token validation failed (transport error, bad status, bad payload).
    #[error("authentication error: {message}")]
    Auth {
        message: String,
        source: Option<BoxedSource>,
    },

    /// A LIMS API call failed or returned something unusable.
    #[error("LIMS error on `{endpoint}`: {message}")]
    Lims {
        endpoint: String,
        message: String,
        source: Option<BoxedSource>,
    },

    /// Local filesystem or process errors.
    #[error("I/O error: {message}")]
    Io {
        message: String,
        source: Option<BoxedSource>,
    },

    /// Bug report could not be built or handed to the mail transport.
    #[error("mail error: {message}")]
    Mail {
        message: String,
        source: Option<BoxedSource>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl BfabricError {
    /// Shorthand for a [`BfabricError::Lims`] without a source.
    pub fn lims(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        BfabricError::Lims {
            endpoint: endpoint.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for an [`BfabricError::Io`] wrapping a `std::io::Error`.
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        BfabricError::Io {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}
