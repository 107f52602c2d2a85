// SPDX-FileCopyrightText: 2026 B-Fabric Web Apps Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for B-Fabric web apps.
//!
//! This crate provides the error type, the session and job domain types,
//! the LIMS client traits and the operation log shared by the rest of the
//! workspace.

pub mod error;
pub mod oplog;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::BfabricError;
pub use oplog::{LogEntry, OperationLogger};
pub use traits::{LimsClient, LimsConnector};
pub use types::{
    ApplicationSummary, EntityClass, EntitySummary, Environment, JobStepResult, SessionContext,
    StepStatus,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bfabric_error_variants_render() {
        let config = BfabricError::Config("missing login".into());
        assert_eq!(config.to_string(), "configuration error: missing login");

        let lims = BfabricError::lims("workunit", "empty response");
        assert_eq!(lims.to_string(), "LIMS error on `workunit`: empty response");

        let io = BfabricError::io("copy a -> b", std::io::Error::other("denied"));
        assert_eq!(io.to_string(), "I/O error: copy a -> b");

        let _auth = BfabricError::Auth {
            message: "bad status".into(),
            source: None,
        };
        let _mail = BfabricError::Mail {
            message: "no sendmail".into(),
            source: None,
        };
        let _internal = BfabricError::Internal("test".into());
    }

    #[test]
    fn environment_display_and_parse() {
        use std::str::FromStr;

        for env in [Environment::Production, Environment::Test] {
            let parsed = Environment::from_str(&env.to_string()).expect("should parse back");
            assert_eq!(env, parsed);
        }
        assert!(Environment::from_str("Staging").is_err());
    }

    #[test]
    fn step_status_serialization() {
        let json = serde_json::to_string(&StepStatus::Failure).expect("should serialize");
        assert_eq!(json, "\"Failure\"");
    }

    #[test]
    fn trait_objects_are_usable() {
        fn _assert_client(_: &dyn LimsClient) {}
        fn _assert_connector(_: &dyn LimsConnector) {}
    }
}
