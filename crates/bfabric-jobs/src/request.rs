// SPDX-FileCopyrightText: 2026 B-Fabric Web Apps Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Job request: what a run should copy, execute and attach.

use std::path::PathBuf;

use bfabric_core::BfabricError;
use serde::{Deserialize, Serialize};

/// One file copy. A destination that is an existing directory receives
/// the source file under its own name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileCopy {
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl FileCopy {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }
}

/// A file to attach to an arbitrary LIMS entity.
///
/// All fields are optional so that incomplete entries survive parsing and
/// can be reported individually.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttachmentSpec {
    pub file_name: Option<String>,
    pub file_path: Option<PathBuf>,
    pub entity_class: Option<String>,
    pub entity_id: Option<i64>,
}

/// Everything one pipeline run works on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JobRequest {
    pub file_copies: Vec<FileCopy>,
    pub commands: Vec<String>,
    pub resource_paths: Vec<PathBuf>,
    pub attachments: Vec<AttachmentSpec>,
}

impl JobRequest {
    /// Parses a job file.
    ///
    /// ```toml
    /// commands = ["gzip -k results.txt"]
    /// resource_paths = ["results.txt.gz"]
    ///
    /// [[file_copies]]
    /// source = "/data/in.raw"
    /// destination = "/scratch/"
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self, BfabricError> {
        toml::from_str(content).map_err(|e| BfabricError::Config(format!("invalid job file: {e}")))
    }
}
