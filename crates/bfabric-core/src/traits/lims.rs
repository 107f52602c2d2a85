// SPDX-FileCopyrightText: 2026 B-Fabric Web Apps Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The LIMS client contract.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::BfabricError;

/// A client bound to one set of LIMS credentials.
///
/// Every call returns the list of records the LIMS answered with. An empty
/// list is a valid answer; callers decide whether it is an error.
#[async_trait]
pub trait LimsClient: Send + Sync {
    /// Reads the records of `endpoint` matching `query` (e.g. `{"id": 5}`).
    async fn read(&self, endpoint: &str, query: Value) -> Result<Vec<Value>, BfabricError>;

    /// Creates or updates `object` on `endpoint`, returning the stored records.
    async fn save(&self, endpoint: &str, object: Value) -> Result<Vec<Value>, BfabricError>;

    /// Uploads `content` as a resource named `name` attached to a workunit.
    async fn upload_resource(
        &self,
        name: &str,
        content: &[u8],
        workunit_id: i64,
    ) -> Result<Vec<Value>, BfabricError>;
}
