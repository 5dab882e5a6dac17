// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Commands a package puts on the default `PATH`.

use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use super::dependencies::Findings;
use super::token::Token;
use super::AnalysisContext;
use crate::package::{PackageFs, PackageResult};

/// Directories whose executables are commands.
pub const COMMAND_DIRS: [&str; 4] = ["/bin", "/sbin", "/usr/bin", "/usr/sbin"];

/// Read and execute permission for owner, group and others.
const EXECUTABLE_MODE: u32 = 0o555;

/// Findings of the entry at `path`.
///
/// # Errors
/// Returns an error if the entry cannot be inspected.
pub(crate) fn analyze(
    path: &Path,
    fs: &PackageFs,
    ctx: &AnalysisContext,
) -> PackageResult<Findings> {
    if ctx.options.no_commands || ctx.options.no_provides {
        return Ok(Findings::default());
    }
    let (Some(dir), Some(name)) = (path.parent(), path.file_name()) else {
        return Ok(Findings::default());
    };
    if !COMMAND_DIRS.iter().any(|command_dir| dir == Path::new(command_dir)) {
        return Ok(Findings::default());
    }

    let metadata = fs.metadata(path)?;
    if !metadata.is_file() || metadata.permissions().mode() & EXECUTABLE_MODE != EXECUTABLE_MODE {
        return Ok(Findings::default());
    }
    Ok(Findings {
        provides: vec![Token::Command {
            name: name.to_string_lossy().into_owned(),
            version: Some(ctx.full_version.clone()),
        }],
        ..Findings::default()
    })
}
