// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Read-only view of a package tree and the lazy artifact walk over it.

use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

use super::extractor::{PackageError, PackageResult};
use super::files::PackageFile;

/// An artifact that could not be analyzed and was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub path: PathBuf,
    pub message: String,
}

impl Diagnostic {
    pub(crate) fn new(path: impl Into<PathBuf>, error: &dyn std::error::Error) -> Self {
        // Include the source chain so the specific rule is visible.
        let mut message = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        Self {
            path: path.into(),
            message,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// Read-only filesystem view of an installed package tree.
///
/// Package paths are absolute paths inside the package (`/usr/lib/libfoo.so.1`) and are mapped
/// onto the host directory the tree lives in.
#[derive(Debug, Clone)]
pub struct PackageFs {
    root: PathBuf,
}

impl PackageFs {
    /// Create a view of the tree rooted at `root`.
    ///
    /// # Errors
    /// Returns an error if `root` is not an existing directory.
    pub fn new(root: impl Into<PathBuf>) -> PackageResult<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(PackageError::SourceNotFound { path: root });
        }
        Ok(Self { root })
    }

    /// Host directory of the tree.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a package path onto the host filesystem.
    #[must_use]
    pub fn host_path(&self, package_path: &Path) -> PathBuf {
        let relative = package_path.strip_prefix("/").unwrap_or(package_path);
        self.root.join(relative)
    }

    /// Open a file of the package for reading.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened.
    pub fn open(&self, package_path: &Path) -> PackageResult<fs::File> {
        fs::File::open(self.host_path(package_path)).map_err(|e| PackageError::ReadFailed {
            path: package_path.to_path_buf(),
            source: e,
        })
    }

    /// Metadata of an entry, without following symlinks.
    ///
    /// # Errors
    /// Returns an error if the entry cannot be inspected.
    pub fn metadata(&self, package_path: &Path) -> PackageResult<fs::Metadata> {
        fs::symlink_metadata(self.host_path(package_path)).map_err(|e| PackageError::ReadFailed {
            path: package_path.to_path_buf(),
            source: e,
        })
    }

    /// Lazily walk and classify every file and symlink of the package.
    #[must_use]
    pub fn artifacts(&self) -> Artifacts<'_> {
        self.artifacts_in(Path::new("/"))
    }

    /// Lazily walk and classify the files and symlinks below one package directory.
    #[must_use]
    pub fn artifacts_in(&self, package_dir: &Path) -> Artifacts<'_> {
        Artifacts {
            fs: self,
            walker: WalkDir::new(self.host_path(package_dir))
                .follow_links(false)
                .sort_by_file_name()
                .into_iter(),
            diagnostics: Vec::new(),
        }
    }

    fn package_path(&self, host_path: &Path) -> Option<PathBuf> {
        host_path
            .strip_prefix(&self.root)
            .ok()
            .map(|stripped| Path::new("/").join(stripped))
    }
}

/// Single-pass iterator of `(package path, kind)` pairs.
///
/// Entries that cannot be read or classified are skipped with a warning and kept as diagnostics.
pub struct Artifacts<'a> {
    fs: &'a PackageFs,
    walker: walkdir::IntoIter,
    diagnostics: Vec<Diagnostic>,
}

impl Artifacts<'_> {
    /// Entries skipped so far.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    #[must_use]
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    fn skip(&mut self, path: PathBuf, error: &dyn std::error::Error) {
        let diagnostic = Diagnostic::new(path, error);
        warn!("Skipping artifact: {diagnostic}");
        self.diagnostics.push(diagnostic);
    }
}

impl Iterator for Artifacts<'_> {
    type Item = (PathBuf, PackageFile);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e
                        .path()
                        .and_then(|p| self.fs.package_path(p))
                        .unwrap_or_else(|| PathBuf::from("/"));
                    let error = PackageError::WalkDirFailed {
                        path: path.clone(),
                        source: e,
                    };
                    self.skip(path, &error);
                    continue;
                }
            };
            let file_type = entry.file_type();
            if !(file_type.is_file() || file_type.is_symlink()) {
                continue;
            }
            let Some(package_path) = self.fs.package_path(entry.path()) else {
                continue;
            };
            match PackageFile::classify(entry.path(), &package_path) {
                Ok(file) => return Some((package_path, file)),
                Err(e) => self.skip(package_path, &e),
            }
        }
    }
}
