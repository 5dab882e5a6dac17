// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Shared-library search paths: the standard directories plus entries from `ld.so.conf.d`
//! fragments, minus directories reserved for private executable helpers.

use path_clean::PathClean;
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

use crate::package::{Diagnostic, PackageError, PackageFile, PackageFs, PackageHandle, LD_SO_CONF_DIR};

/// Directories the dynamic linker searches without configuration.
pub const DEFAULT_LIBRARY_DIRS: [&str; 4] = ["/lib", "/lib64", "/usr/lib", "/usr/lib64"];

/// Path components naming directories of private executable helpers. Shared objects and
/// pkg-config descriptors below them are never treated as library artifacts.
pub const PRIVATE_HELPER_DIRS: [&str; 1] = ["libexec"];

/// Whether `path` lies in a directory reserved for private executable helpers.
#[must_use]
pub fn is_private_helper_path(path: &Path) -> bool {
    path.components().any(|component| match component {
        Component::Normal(name) => PRIVATE_HELPER_DIRS.iter().any(|dir| name == *dir),
        _ => false,
    })
}

/// Ordered set of library directories. Only grows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPaths {
    dirs: Vec<PathBuf>,
}

impl Default for SearchPaths {
    fn default() -> Self {
        Self {
            dirs: DEFAULT_LIBRARY_DIRS.iter().map(PathBuf::from).collect(),
        }
    }
}

impl SearchPaths {
    /// Standard directories plus the fragments found in the package and all its relatives.
    ///
    /// Unreadable fragments are skipped and reported as diagnostics.
    pub fn resolve<H: PackageHandle + ?Sized>(handle: &H) -> (Self, Vec<Diagnostic>) {
        let mut search_paths = Self::default();
        let mut diagnostics = Vec::new();

        for name in handle.relative_names() {
            let fs = match handle.filesystem_for_relative(name) {
                Ok(fs) => fs,
                Err(e) => {
                    warn!("Cannot read relative package {name}: {e}");
                    diagnostics.push(Diagnostic::new(PathBuf::from(name), &e));
                    continue;
                }
            };
            for (path, result) in fragments(fs) {
                match result {
                    Ok(content) => {
                        for dir in parse_ld_so_conf(&content) {
                            if search_paths.add(dir.clone()) {
                                debug!(
                                    "Library search path {} from {name}:{}",
                                    dir.display(),
                                    path.display()
                                );
                            }
                        }
                    }
                    Err(e) => {
                        let diagnostic = Diagnostic::new(path, &e);
                        warn!("Skipping artifact: {diagnostic}");
                        diagnostics.push(diagnostic);
                    }
                }
            }
        }
        (search_paths, diagnostics)
    }

    /// Add a directory. Returns `false` for duplicates and for private helper directories.
    pub fn add(&mut self, dir: PathBuf) -> bool {
        if is_private_helper_path(&dir) {
            debug!("Ignoring private helper directory as search path: {}", dir.display());
            return false;
        }
        if self.dirs.contains(&dir) {
            return false;
        }
        self.dirs.push(dir);
        true
    }

    /// Whether the artifact at `path` is resolvable through one of the directories.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        if is_private_helper_path(path) {
            return false;
        }
        let Some(parent) = path.parent() else {
            return false;
        };
        self.dirs.iter().any(|dir| parent.starts_with(dir))
    }

    #[must_use]
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

/// Whether `dir` is a real directory of the package, reached without following symlinks.
fn is_package_dir(fs: &PackageFs, dir: &Path) -> bool {
    for ancestor in dir.ancestors().filter(|a| *a != Path::new("/")) {
        match fs.metadata(ancestor) {
            Ok(metadata) if metadata.file_type().is_symlink() => {
                debug!("Not following symlinked directory {}", ancestor.display());
                return false;
            }
            Ok(metadata) if ancestor == dir => return metadata.is_dir(),
            Ok(_) => {}
            Err(_) => return false,
        }
    }
    false
}

/// Read every `ld.so.conf.d` fragment of a package tree, sorted by path.
fn fragments(fs: &PackageFs) -> Vec<(PathBuf, Result<String, PackageError>)> {
    let conf_dir = Path::new(LD_SO_CONF_DIR);
    if !is_package_dir(fs, conf_dir) {
        return Vec::new();
    }
    fs.artifacts_in(conf_dir)
        .filter(|(_, file)| matches!(file, PackageFile::LdSoConf))
        .map(|(path, _)| {
            let content = fs.open(&path).and_then(|mut file| {
                let mut content = String::new();
                file.read_to_string(&mut content)
                    .map_err(|e| PackageError::ReadFailed {
                        path: path.clone(),
                        source: e,
                    })?;
                Ok(content)
            });
            (path, content)
        })
        .collect()
}

/// Directories listed in an `ld.so.conf` fragment.
///
/// `#` starts a comment. Relative entries are anchored at `/`. `include` directives are not
/// followed.
#[must_use]
pub fn parse_ld_so_conf(content: &str) -> Vec<PathBuf> {
    content
        .lines()
        .map(|line| line.split('#').next().unwrap_or("").trim())
        .filter(|line| !line.is_empty())
        .filter(|line| {
            if line.starts_with("include ") {
                debug!("Not following ld.so.conf directive: {line}");
                false
            } else {
                true
            }
        })
        .map(|line| Path::new("/").join(line).clean())
        .collect()
}
