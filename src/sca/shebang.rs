// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Script interpreter detection from the `#!` line.

use std::fs;
use std::io::{self, Read};
use std::path::Path;
use thiserror::Error;

use super::dependencies::Findings;
use super::token::Token;
use super::AnalysisContext;
use crate::package::PackageFs;

/// Only this many bytes of a script are read.
pub const MAX_SHEBANG_LEN: u64 = 1024;

/// Interpreter assumed present on every system.
const BASE_SHELL: &str = "/bin/sh";

/// The only `env` whose argument names the interpreter.
const ENV: &str = "/usr/bin/env";

#[derive(Debug, Error)]
pub enum ShebangError {
    /// `env` without `-S` passes everything after the name as one argument at runtime.
    #[error("Shebang passes multiple arguments to env without -S: '{line}'")]
    MultipleArguments { line: String },

    #[error("Shebang invokes env without an interpreter: '{line}'")]
    MissingInterpreter { line: String },

    #[error("Failed to read script")]
    Read(#[from] io::Error),
}

impl ShebangError {
    /// Whether the error is a mistake of the package author rather than an unreadable file.
    #[must_use]
    pub fn is_authoring_error(&self) -> bool {
        !matches!(self, Self::Read(_))
    }
}

/// Interpreter named by the first line of `reader`, if it needs declaring.
///
/// # Errors
/// Returns an error if the line invokes `env` ambiguously or the reader fails.
pub fn interpreter<R: Read>(reader: R) -> Result<Option<String>, ShebangError> {
    let mut head = Vec::new();
    reader.take(MAX_SHEBANG_LEN).read_to_end(&mut head)?;

    let Some(rest) = head.strip_prefix(b"#!") else {
        return Ok(None);
    };
    let end = rest.iter().position(|&b| b == b'\n').unwrap_or(rest.len());
    let line = String::from_utf8_lossy(&rest[..end]);
    let mut words = line.split_whitespace();

    let Some(program) = words.next() else {
        return Ok(None);
    };
    if program == BASE_SHELL {
        return Ok(None);
    }
    if program != ENV {
        return Ok(Some(program.to_string()));
    }

    let args: Vec<&str> = words.collect();
    match args.as_slice() {
        [] | ["-S"] => Err(ShebangError::MissingInterpreter {
            line: line.trim().to_string(),
        }),
        [name] | ["-S", name, ..] => Ok(Some((*name).to_string())),
        _ => Err(ShebangError::MultipleArguments {
            line: line.trim().to_string(),
        }),
    }
}

/// Findings of the script at `path`.
pub(crate) fn analyze(
    path: &Path,
    fs: &PackageFs,
    ctx: &AnalysisContext,
) -> Result<Findings, ShebangError> {
    if ctx.options.no_depends {
        return Ok(Findings::default());
    }
    let file = fs::File::open(fs.host_path(path))?;
    Ok(Findings {
        runtime: interpreter(file)?.map(Token::command).into_iter().collect(),
        ..Findings::default()
    })
}
