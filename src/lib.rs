// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Static software composition analysis for packages about to be published.
//!
//! This crate provides functionality to:
//! - Open package trees from directories or DEB and RPM archives
//! - Infer runtime dependencies from ELF linkage, script interpreters and pkg-config metadata
//! - Infer the shared libraries and commands a package provides
//! - Summarize and persist the results

pub mod package;
pub mod report;
pub mod sca;

#[cfg(test)]
mod testing;

// Re-export key types for convenience
pub use package::{Package, PackageFile, PackageHandle, PackageIdentity, PackageOptions};
pub use report::{summarize_report, write_report, Report};
pub use sca::{analyze, Analysis, AnalysisOptions, AuthoringErrorPolicy, Dependencies, ScaError};
