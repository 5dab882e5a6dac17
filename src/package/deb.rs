// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Implements DEB package extraction using `dpkg-deb`.

use std::path::Path;
use tempfile::TempDir;

use super::extractor::{
    spawn_error, wait_with_timeout, PackageError, PackageExtractor, PackageResult,
    DEFAULT_EXTRACTION_TIMEOUT,
};

pub(crate) struct DebExtractor;

impl PackageExtractor for DebExtractor {
    const EXTENSION: &'static str = "deb";

    /// Extract a DEB package into a temporary directory.
    ///
    /// # Errors
    /// Returns an error if the package cannot be extracted.
    ///
    /// # Timeout
    /// The `dpkg-deb` subprocess is killed after 30 seconds and a `CommandTimeout` error is returned.
    fn extract(package: &Path, dest: &TempDir) -> PackageResult<()> {
        let mut child = std::process::Command::new("dpkg-deb")
            .arg("-x")
            .arg(package)
            .arg(dest.path())
            .spawn()
            .map_err(|e| spawn_error("dpkg-deb", package, e))?;

        let exit_status =
            wait_with_timeout(&mut child, DEFAULT_EXTRACTION_TIMEOUT, "dpkg-deb", package)?;

        if exit_status.success() {
            Ok(())
        } else {
            Err(PackageError::ExtractionFailed {
                path: package.to_path_buf(),
                reason: format!(
                    "dpkg-deb exited with non-zero status: {}",
                    exit_status.code().unwrap_or(-1)
                ),
            })
        }
    }
}
