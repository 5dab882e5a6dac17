// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Packages already installed in the build environment, read from a `name=version` listing.

use anyhow::{bail, Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Installed packages, keyed by name.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InstalledPackages {
    packages: BTreeMap<String, String>,
}

impl InstalledPackages {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Read installed packages from a file.
    ///
    /// Each line holds `name=version`. Empty lines and lines starting with `#` are ignored.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or a line is not a `name=version` pair.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read installed packages file: {}", path.display()))?;

        let mut packages = BTreeMap::new();
        for (number, line) in content.lines().map(str::trim).enumerate() {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((name, version)) = line.split_once('=') else {
                bail!(
                    "{}:{}: expected 'name=version', got '{line}'",
                    path.display(),
                    number + 1
                );
            };
            packages.insert(name.trim().to_string(), version.trim().to_string());
        }
        Ok(Self { packages })
    }

    /// Version of an installed package.
    #[must_use]
    pub fn version(&self, name: &str) -> Option<&str> {
        self.packages.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl FromIterator<(String, String)> for InstalledPackages {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            packages: iter.into_iter().collect(),
        }
    }
}
