// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! The boundary through which the analysis reads a package without knowing how it was built.

use serde::{Deserialize, Serialize};

use super::extractor::PackageResult;
use super::fs::PackageFs;
use super::installed::InstalledPackages;
use crate::sca::Dependencies;

/// Author-declared switches that gate inference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PackageOptions {
    /// Capabilities are recorded as vendored instead of provided.
    pub no_provides: bool,
    /// No runtime dependencies are inferred.
    pub no_depends: bool,
    /// Commands in standard command directories are not provided.
    pub no_commands: bool,
}

/// A package that provides a capability, as known to the distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provider {
    /// Name of the providing package.
    pub package: String,
    /// Version under which the capability is provided (`2` for `so:libcap.so.2=2`).
    pub version: String,
}

/// Narrow query interface into the distribution's dependency graph.
pub trait PackageResolver: Send + Sync {
    /// Find the provider of a capability such as `so:libc.so.6`.
    fn resolve(&self, capability: &str) -> Option<Provider>;
}

/// A package about to be published, as seen by the analysis.
pub trait PackageHandle: Sync {
    fn name(&self) -> &str;

    fn version(&self) -> &str;

    fn epoch(&self) -> u64;

    /// `<version>-r<epoch>`, the form capabilities are pinned to.
    fn full_version(&self) -> String {
        format!("{}-r{}", self.version(), self.epoch())
    }

    /// Names of every package produced by the same build, this one included.
    fn relative_names(&self) -> Vec<&str>;

    fn filesystem(&self) -> &PackageFs;

    /// Tree of a package produced by the same build.
    ///
    /// # Errors
    /// Returns an error if `name` is not one of [`PackageHandle::relative_names`].
    fn filesystem_for_relative(&self, name: &str) -> PackageResult<&PackageFs>;

    fn options(&self) -> PackageOptions;

    /// Dependencies the author declared by hand.
    fn declared_dependencies(&self) -> &Dependencies;

    fn installed_packages(&self) -> &InstalledPackages;

    fn package_resolver(&self) -> Option<&dyn PackageResolver> {
        None
    }
}
