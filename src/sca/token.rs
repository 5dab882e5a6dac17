// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Namespaced dependency tokens (`so:`, `so-ver:`, `cmd:`, `pc:`).

use std::fmt;

/// One requirement or capability. Rendered with its namespace prefix; consumers treat the
/// rendered string as opaque.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Token {
    /// `so:<name>` or `so:<name>=<version>`.
    SharedObject {
        name: String,
        version: Option<String>,
    },
    /// `so-ver:<name>=<version>`.
    SharedObjectVersion { name: String, version: String },
    /// `cmd:<name>` or `cmd:<name>=<version>`.
    Command {
        name: String,
        version: Option<String>,
    },
    /// `pc:<module>` or `pc:<module>=<version>`.
    PkgConfig {
        module: String,
        version: Option<String>,
    },
    /// A plain package name.
    Package(String),
}

impl Token {
    pub fn shared_object(name: impl Into<String>) -> Self {
        Self::SharedObject {
            name: name.into(),
            version: None,
        }
    }

    pub fn command(name: impl Into<String>) -> Self {
        Self::Command {
            name: name.into(),
            version: None,
        }
    }
}

fn write_versioned(
    f: &mut fmt::Formatter<'_>,
    prefix: &str,
    name: &str,
    version: Option<&str>,
) -> fmt::Result {
    match version {
        Some(version) => write!(f, "{prefix}:{name}={version}"),
        None => write!(f, "{prefix}:{name}"),
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SharedObject { name, version } => write_versioned(f, "so", name, version.as_deref()),
            Self::SharedObjectVersion { name, version } => write!(f, "so-ver:{name}={version}"),
            Self::Command { name, version } => write_versioned(f, "cmd", name, version.as_deref()),
            Self::PkgConfig { module, version } => {
                write_versioned(f, "pc", module, version.as_deref())
            }
            Self::Package(name) => f.write_str(name),
        }
    }
}
