// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Errors of writing results to disk.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    /// An identifier that becomes part of a file name would escape the output directory.
    #[error("Refusing {field} '{value}': contains a path separator or '..'")]
    PathTraversal { field: &'static str, value: String },

    #[error("Package name is empty")]
    MissingIdentity,

    #[error("Failed to create report directory: {path:?}")]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create report file: {path:?}")]
    CreateFileFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize report to JSON: {path:?}")]
    SerializeFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type ReportResult<T> = Result<T, ReportError>;
