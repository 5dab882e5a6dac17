// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Implements RPM package extraction using `rpm2cpio` and `cpio`.

use std::path::Path;
use std::process::Stdio;
use std::time::Instant;
use tempfile::TempDir;

use super::extractor::{
    spawn_error, wait_with_timeout, PackageError, PackageExtractor, PackageResult,
    DEFAULT_EXTRACTION_TIMEOUT,
};

pub(crate) struct RpmExtractor;

impl PackageExtractor for RpmExtractor {
    const EXTENSION: &'static str = "rpm";

    /// Extract an RPM package into a temporary directory.
    ///
    /// # Errors
    /// Returns an error if the package cannot be extracted.
    ///
    /// # Timeout
    /// The `rpm2cpio | cpio` pipeline shares one 30 second budget; on expiry the processes are
    /// killed and a `CommandTimeout` error is returned.
    fn extract(package: &Path, dest: &TempDir) -> PackageResult<()> {
        let start = Instant::now();

        let mut rpm2cpio_child = std::process::Command::new("rpm2cpio")
            .arg(package)
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| spawn_error("rpm2cpio", package, e))?;

        let Some(rpm2cpio_stdout) = rpm2cpio_child.stdout.take() else {
            let _ = rpm2cpio_child.kill();
            let _ = rpm2cpio_child.wait();
            return Err(PackageError::ExtractionFailed {
                path: package.to_path_buf(),
                reason: "Failed to get stdout from rpm2cpio".to_string(),
            });
        };

        let mut cpio_child = match std::process::Command::new("cpio")
            .arg("-id")
            .arg("--quiet")
            // Never follow absolute member names out of the extraction directory.
            .arg("--no-absolute-filenames")
            .current_dir(dest.path())
            .stdin(rpm2cpio_stdout)
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                let _ = rpm2cpio_child.kill();
                let _ = rpm2cpio_child.wait();
                return Err(spawn_error("cpio", package, e));
            }
        };

        let remaining_timeout = DEFAULT_EXTRACTION_TIMEOUT.saturating_sub(start.elapsed());
        let cpio_status = wait_with_timeout(&mut cpio_child, remaining_timeout, "cpio", package)?;

        // rpm2cpio has finished by now since cpio consumed all its output.
        let _ = rpm2cpio_child.wait();

        if cpio_status.success() {
            Ok(())
        } else {
            Err(PackageError::ExtractionFailed {
                path: package.to_path_buf(),
                reason: format!(
                    "cpio exited with non-zero status: {}",
                    cpio_status.code().unwrap_or(-1)
                ),
            })
        }
    }
}
