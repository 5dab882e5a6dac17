// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Persists reports under `<output-dir>/<arch>/sca-<name>-<version>-r<epoch>.json`.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use tracing::info;

use super::errors::{ReportError, ReportResult};
use super::Report;

/// Reject identifiers that could point outside the directory they are joined to.
fn check_identifier(field: &'static str, value: &str) -> ReportResult<()> {
    if value.contains("..") || value.contains('/') || value.contains(MAIN_SEPARATOR) {
        return Err(ReportError::PathTraversal {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Location of the report of a package build.
///
/// # Errors
/// Returns an error if the name is empty or an identifier contains a path separator or `..`.
pub fn report_path(
    output_dir: &Path,
    arch: &str,
    name: &str,
    version: &str,
    epoch: u64,
) -> ReportResult<PathBuf> {
    if name.is_empty() {
        return Err(ReportError::MissingIdentity);
    }
    check_identifier("arch", arch)?;
    check_identifier("name", name)?;
    check_identifier("version", version)?;
    Ok(output_dir
        .join(arch)
        .join(format!("sca-{name}-{version}-r{epoch}.json")))
}

/// Write `report` as pretty JSON. Returns the path written.
///
/// # Errors
/// Returns an error if an identifier is rejected or the file cannot be written.
pub fn write_report(report: &Report<'_>, output_dir: &Path, arch: &str) -> ReportResult<PathBuf> {
    let package = &report.package;
    let path = report_path(
        output_dir,
        arch,
        &package.name,
        &package.version,
        package.epoch,
    )?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| ReportError::CreateDirFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;
    }

    info!("Writing report to file: file={}", path.display());
    let file = File::create(&path).map_err(|e| ReportError::CreateFileFailed {
        path: path.clone(),
        source: e,
    })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report).map_err(|e| {
        ReportError::SerializeFailed {
            path: path.clone(),
            source: e,
        }
    })?;
    writer.flush().map_err(|e| ReportError::CreateFileFailed {
        path: path.clone(),
        source: e,
    })?;
    Ok(path)
}
