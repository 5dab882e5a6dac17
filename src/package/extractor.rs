// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Defines the `PackageExtractor` trait for unpacking archive formats into a read-only tree.

use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::Child;
use std::time::Duration;
use tempfile::TempDir;
use thiserror::Error;
use wait_timeout::ChildExt;

use super::elf::ElfError;

/// Default timeout for package extraction commands (30 seconds).
pub(crate) const DEFAULT_EXTRACTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Result type for package operations.
pub type PackageResult<T> = std::result::Result<T, PackageError>;

/// Errors that can occur during package operations.
#[derive(Debug, Error)]
pub enum PackageError {
    #[error("Failed to create/delete temporary directory")]
    TempDirFailed {
        #[source]
        source: std::io::Error,
    },
    #[error("Command not found: {command} (package: {path:?})")]
    CommandNotFound { command: String, path: PathBuf },
    #[error("Command failed: {command} (package: {path:?})")]
    CommandFailed {
        command: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Command timed out after {timeout:?}: {command} (package: {path:?})")]
    CommandTimeout {
        command: String,
        path: PathBuf,
        timeout: Duration,
    },
    #[error("Extraction failed for package {path:?}: {reason}")]
    ExtractionFailed { path: PathBuf, reason: String },
    #[error("Failed to walk package tree: {path:?}")]
    WalkDirFailed {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("Unsupported package type: {extension}")]
    UnsupportedPackageType { extension: String },
    #[error("Package source does not exist: {path:?}")]
    SourceNotFound { path: PathBuf },
    #[error("Unknown relative package: {name}")]
    UnknownRelative { name: String },
    #[error("Failed to read symlink: {path:?}")]
    ReadSymlinkFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read file: {path:?}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Corrupt ELF object {path:?}")]
    Artifact {
        path: PathBuf,
        #[source]
        source: ElfError,
    },
}

/// Wait for a child process to complete with a timeout.
///
/// Uses platform-specific APIs (SIGCHLD on Unix) to wait for the process without polling.
/// If the timeout is reached, the process is killed.
///
/// # Returns
/// - `Ok(ExitStatus)` if the process completed within the timeout
/// - `Err(PackageError::CommandTimeout)` if the process timed out
/// - `Err(PackageError::CommandFailed)` if there was an error waiting for the process
pub(crate) fn wait_with_timeout(
    child: &mut Child,
    timeout: Duration,
    command: &str,
    package_path: &Path,
) -> PackageResult<std::process::ExitStatus> {
    if let Some(status) = child
        .wait_timeout(timeout)
        .map_err(|e| PackageError::CommandFailed {
            command: command.to_string(),
            path: package_path.to_path_buf(),
            source: e,
        })?
    {
        // Check if the process completed successfully or was terminated by a signal.
        if status.code().is_some() {
            Ok(status)
        } else if let Some(signal) = status.signal() {
            Err(PackageError::CommandFailed {
                command: command.to_string(),
                path: package_path.to_path_buf(),
                source: std::io::Error::other(format!("Process terminated by signal: {signal}")),
            })
        } else {
            Err(PackageError::CommandFailed {
                command: command.to_string(),
                path: package_path.to_path_buf(),
                source: std::io::Error::other("Unknown process termination"),
            })
        }
    } else {
        let _ = child.kill();
        let _ = child.wait();
        Err(PackageError::CommandTimeout {
            command: command.to_string(),
            path: package_path.to_path_buf(),
            timeout,
        })
    }
}

/// Map a spawn failure to the matching error variant.
pub(crate) fn spawn_error(command: &str, package: &Path, e: std::io::Error) -> PackageError {
    if e.kind() == std::io::ErrorKind::NotFound {
        PackageError::CommandNotFound {
            command: command.to_string(),
            path: package.to_path_buf(),
        }
    } else {
        PackageError::CommandFailed {
            command: command.to_string(),
            path: package.to_path_buf(),
            source: e,
        }
    }
}

/// Trait for package extractors that perform the actual extraction logic.
pub(crate) trait PackageExtractor {
    const EXTENSION: &'static str; // Packages are identified by their extension.

    /// Extract package contents to a destination directory.
    ///
    /// # Errors
    /// Returns an error if extraction fails.
    fn extract(package: &Path, dest: &TempDir) -> PackageResult<()>;

    /// Extract and make sure the archive was not empty.
    ///
    /// # Errors
    /// Returns an error if extraction fails or no entries were unpacked.
    fn unpack(package: &Path) -> PackageResult<TempDir> {
        let dest = TempDir::new().map_err(|e| PackageError::TempDirFailed { source: e })?;
        Self::extract(package, &dest)?;

        let empty = std::fs::read_dir(dest.path())
            .map_err(|e| PackageError::ReadFailed {
                path: package.to_path_buf(),
                source: e,
            })?
            .next()
            .is_none();
        if empty {
            return Err(PackageError::ExtractionFailed {
                path: package.to_path_buf(),
                reason: "Extraction completed but no files were found".to_string(),
            });
        }
        Ok(dest)
    }
}
