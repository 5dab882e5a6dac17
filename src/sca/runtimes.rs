// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Language runtimes needed by installed Ruby gems and Python modules.

use std::path::{Component, Path};

use super::dependencies::Findings;
use super::token::Token;

/// Gems live below `<dir>/<ruby ABI version>/`, e.g. `/usr/lib/ruby/gems/3.2.0/`.
pub const RUBY_GEMS_DIR: &str = "/usr/lib/ruby/gems";

/// Python modules live below `<dir>/python3.X/site-packages/`.
pub const PYTHON_LIB_DIR: &str = "/usr/lib";

fn first_component(path: &Path) -> Option<&str> {
    match path.components().next()? {
        Component::Normal(name) => name.to_str(),
        _ => None,
    }
}

/// `major.minor` of a dotted version, if both parts are numeric.
fn major_minor(version: &str) -> Option<String> {
    let mut parts = version.split('.');
    let major = parts.next().filter(|p| is_numeric(p))?;
    let minor = parts.next().filter(|p| is_numeric(p))?;
    Some(format!("{major}.{minor}"))
}

fn is_numeric(part: &str) -> bool {
    !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit())
}

/// `ruby-X.Y` for a file below the gem directory of Ruby `X.Y`.
fn ruby_runtime(path: &Path) -> Option<Token> {
    let below = path.strip_prefix(RUBY_GEMS_DIR).ok()?;
    // The version directory itself needs nothing.
    if below.components().count() < 2 {
        return None;
    }
    let version = major_minor(first_component(below)?)?;
    Some(Token::Package(format!("ruby-{version}")))
}

/// `python-X.Y` for a file below the `site-packages` of Python `X.Y`.
fn python_runtime(path: &Path) -> Option<Token> {
    let below = path.strip_prefix(PYTHON_LIB_DIR).ok()?;
    let mut components = below.components();
    let Some(Component::Normal(lib)) = components.next() else {
        return None;
    };
    let Some(Component::Normal(site)) = components.next() else {
        return None;
    };
    if site != "site-packages" || components.next().is_none() {
        return None;
    }
    let version = major_minor(lib.to_str()?.strip_prefix("python")?)?;
    Some(Token::Package(format!("python-{version}")))
}

/// Findings of the file at `path`.
pub(crate) fn analyze(path: &Path) -> Findings {
    Findings {
        runtime: ruby_runtime(path)
            .into_iter()
            .chain(python_runtime(path))
            .collect(),
        ..Findings::default()
    }
}
