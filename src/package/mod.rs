// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Package handles: identity, read-only trees (directories or extracted archives) and the
//! collaborator interfaces the analysis consumes.

mod deb;
mod elf;
mod extractor;
mod files;
mod fs;
mod handle;
mod installed;
mod rpm;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::info;

use deb::DebExtractor;
pub use elf::{Elf, ElfError, ElfType};
use extractor::PackageExtractor;
pub use extractor::{PackageError, PackageResult};
pub use files::{PackageFile, LD_SO_CONF_DIR};
pub use fs::{Artifacts, Diagnostic, PackageFs};
pub use handle::{PackageHandle, PackageOptions, PackageResolver, Provider};
pub use installed::InstalledPackages;
use rpm::RpmExtractor;

use crate::sca::Dependencies;

/// Name, version and epoch of a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageIdentity {
    pub name: String,
    pub version: String,
    pub epoch: u64,
}

impl PackageIdentity {
    pub fn new(name: impl Into<String>, version: impl Into<String>, epoch: u64) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            epoch,
        }
    }
}

/// A package tree on disk. Archives are extracted into a temporary directory that lives as long
/// as the source.
#[derive(Debug)]
pub struct PackageSource {
    fs: PackageFs,
    // Dropping the directory removes the extracted tree.
    _extraction: Option<TempDir>,
}

impl PackageSource {
    /// Open a directory tree, or extract a `.deb`/`.rpm` archive.
    ///
    /// # Errors
    /// Returns an error if the path does not exist, the archive type is unsupported, or
    /// extraction fails.
    pub fn open(path: &Path) -> PackageResult<Self> {
        if path.is_dir() {
            return Ok(Self {
                fs: PackageFs::new(path)?,
                _extraction: None,
            });
        }
        if !path.exists() {
            return Err(PackageError::SourceNotFound {
                path: path.to_path_buf(),
            });
        }

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| PackageError::UnsupportedPackageType {
                extension: "unknown".to_string(),
            })?;

        info!("Extracting package: package={}", path.display());
        let extraction = match extension {
            DebExtractor::EXTENSION => DebExtractor::unpack(path)?,
            RpmExtractor::EXTENSION => RpmExtractor::unpack(path)?,
            _ => {
                return Err(PackageError::UnsupportedPackageType {
                    extension: extension.to_string(),
                })
            }
        };
        Ok(Self {
            fs: PackageFs::new(extraction.path())?,
            _extraction: Some(extraction),
        })
    }

    #[must_use]
    pub fn fs(&self) -> &PackageFs {
        &self.fs
    }
}

/// Directory or archive backed [`PackageHandle`].
pub struct Package {
    identity: PackageIdentity,
    source: PackageSource,
    relatives: BTreeMap<String, PackageSource>,
    options: PackageOptions,
    declared: Dependencies,
    installed: InstalledPackages,
    resolver: Option<Box<dyn PackageResolver>>,
}

impl Package {
    /// Open the package at `path`.
    ///
    /// # Errors
    /// Returns an error if the package tree cannot be opened or extracted.
    pub fn open(identity: PackageIdentity, path: &Path) -> PackageResult<Self> {
        Ok(Self::new(identity, PackageSource::open(path)?))
    }

    #[must_use]
    pub fn new(identity: PackageIdentity, source: PackageSource) -> Self {
        Self {
            identity,
            source,
            relatives: BTreeMap::new(),
            options: PackageOptions::default(),
            declared: Dependencies::default(),
            installed: InstalledPackages::default(),
            resolver: None,
        }
    }

    /// Register a package produced by the same build.
    ///
    /// # Errors
    /// Returns an error if the relative's tree cannot be opened or extracted.
    pub fn with_relative(mut self, name: impl Into<String>, path: &Path) -> PackageResult<Self> {
        self.relatives.insert(name.into(), PackageSource::open(path)?);
        Ok(self)
    }

    #[must_use]
    pub fn with_options(mut self, options: PackageOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_declared_dependencies(mut self, declared: Dependencies) -> Self {
        self.declared = declared;
        self
    }

    #[must_use]
    pub fn with_installed_packages(mut self, installed: InstalledPackages) -> Self {
        self.installed = installed;
        self
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: Box<dyn PackageResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    #[must_use]
    pub fn identity(&self) -> &PackageIdentity {
        &self.identity
    }

    /// Host location of the package tree.
    #[must_use]
    pub fn root(&self) -> PathBuf {
        self.source.fs().root().to_path_buf()
    }
}

impl PackageHandle for Package {
    fn name(&self) -> &str {
        &self.identity.name
    }

    fn version(&self) -> &str {
        &self.identity.version
    }

    fn epoch(&self) -> u64 {
        self.identity.epoch
    }

    fn relative_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.relatives.keys().map(String::as_str).collect();
        if !self.relatives.contains_key(&self.identity.name) {
            names.push(&self.identity.name);
        }
        names.sort_unstable();
        names
    }

    fn filesystem(&self) -> &PackageFs {
        self.source.fs()
    }

    fn filesystem_for_relative(&self, name: &str) -> PackageResult<&PackageFs> {
        if name == self.identity.name {
            return Ok(self.source.fs());
        }
        self.relatives
            .get(name)
            .map(PackageSource::fs)
            .ok_or_else(|| PackageError::UnknownRelative {
                name: name.to_string(),
            })
    }

    fn options(&self) -> PackageOptions {
        self.options
    }

    fn declared_dependencies(&self) -> &Dependencies {
        &self.declared
    }

    fn installed_packages(&self) -> &InstalledPackages {
        &self.installed
    }

    fn package_resolver(&self) -> Option<&dyn PackageResolver> {
        self.resolver.as_deref()
    }
}
