// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Static dependency inference over a package tree.
//!
//! Every artifact is classified once, then the analyzers run over the artifacts in parallel and
//! return their [`Findings`]. A single merge at the end folds the findings into the caller's
//! [`Dependencies`], so a failed or cancelled pass leaves the declaration untouched.

pub mod commands;
mod dependencies;
pub mod docs;
pub mod pkgconfig;
mod resolver;
pub mod runtimes;
pub mod search_path;
pub mod shebang;
pub mod soname;
mod token;

use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::package::{Diagnostic, PackageError, PackageFile, PackageFs, PackageHandle, PackageOptions};
use dependencies::Collected;
pub use dependencies::{Dependencies, Findings};
pub use pkgconfig::{PkgConfig, PkgConfigError};
pub use search_path::{is_private_helper_path, SearchPaths};
pub use shebang::ShebangError;
pub use token::Token;

#[derive(Debug, Error)]
pub enum ScaError {
    #[error("Analysis of package {package} was cancelled")]
    Cancelled { package: String },

    #[error("Invalid shebang in {path:?}")]
    Shebang {
        path: PathBuf,
        #[source]
        source: ShebangError,
    },

    #[error("Invalid pkg-config descriptor {path:?}")]
    PkgConfig {
        path: PathBuf,
        #[source]
        source: PkgConfigError,
    },

    #[error(transparent)]
    Package(#[from] PackageError),
}

impl ScaError {
    /// Whether the error is a mistake of the package author.
    #[must_use]
    pub fn is_authoring_error(&self) -> bool {
        matches!(self, Self::Shebang { source, .. } if source.is_authoring_error())
    }
}

pub type ScaResult<T> = Result<T, ScaError>;

/// What to do when a script's content is an authoring error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthoringErrorPolicy {
    /// Fail the whole analysis.
    #[default]
    Abort,
    /// Record a diagnostic and drop the artifact's contribution.
    SkipArtifact,
}

/// Shared flag that stops a running analysis between artifacts.
#[derive(Debug, Clone, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    fn check(&self, package: &str) -> ScaResult<()> {
        if self.is_cancelled() {
            return Err(ScaError::Cancelled {
                package: package.to_string(),
            });
        }
        Ok(())
    }
}

/// Engine settings chosen by the caller.
#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    pub policy: AuthoringErrorPolicy,
    pub cancellation: Cancellation,
}

/// Everything an analyzer needs besides the artifact itself.
pub(crate) struct AnalysisContext {
    pub(crate) search_paths: SearchPaths,
    pub(crate) options: PackageOptions,
    /// `<version>-r<epoch>` of the analyzed package.
    pub(crate) full_version: String,
}

/// What an analysis looked at, for reporting.
#[derive(Debug, Serialize)]
pub struct Analysis {
    pub artifacts: BTreeMap<PathBuf, PackageFile>,
    pub search_paths: Vec<PathBuf>,
    /// Artifacts that were skipped, sorted by path.
    pub diagnostics: Vec<Diagnostic>,
}

/// Infer the dependencies of `handle` and merge them into `dependencies`.
///
/// # Errors
/// Returns an error if the analysis is cancelled, or if a script is an authoring error under
/// [`AuthoringErrorPolicy::Abort`]. `dependencies` is left untouched in both cases.
pub fn analyze<H: PackageHandle + ?Sized>(
    handle: &H,
    dependencies: &mut Dependencies,
    options: &AnalysisOptions,
) -> ScaResult<Analysis> {
    let name = handle.name();
    info!("Analyzing package {name}-{}", handle.full_version());

    let (search_paths, mut diagnostics) = SearchPaths::resolve(handle);
    options.cancellation.check(name)?;

    let fs = handle.filesystem();
    let mut walk = fs.artifacts();
    let mut artifacts = BTreeMap::new();
    for (path, file) in walk.by_ref() {
        options.cancellation.check(name)?;
        artifacts.insert(path, file);
    }
    diagnostics.extend(walk.into_diagnostics());

    let ctx = AnalysisContext {
        search_paths,
        options: handle.options(),
        full_version: handle.full_version(),
    };
    let doc_package = docs::is_doc_package(name) && !ctx.options.no_depends;

    let collected = artifacts
        .par_iter()
        .try_fold(
            Collected::default,
            |collected, (path, file)| -> ScaResult<Collected> {
                options.cancellation.check(name)?;
                let artifact = analyze_artifact(path, file, fs, &ctx, options.policy, doc_package)?;
                Ok(collected + artifact)
            },
        )
        .try_reduce(Collected::default, |a, b| Ok(a + b))?;
    options.cancellation.check(name)?;

    let mut findings = collected.findings;
    if let Some(resolver) = handle.package_resolver() {
        findings = resolver::pin_shared_objects(findings, resolver, handle.installed_packages());
    }
    let findings = findings.normalized();
    diagnostics.extend(collected.diagnostics);
    diagnostics.sort_by(|a, b| a.path.cmp(&b.path));

    debug!(
        "Findings for {name}: runtime={}, provides={}, vendored={}, skipped={}",
        findings.runtime.len(),
        findings.provides.len(),
        findings.vendored.len(),
        diagnostics.len()
    );
    dependencies.merge(&findings);
    info!("Analyzed {} artifacts of package {name}", artifacts.len());

    Ok(Analysis {
        artifacts,
        search_paths: ctx.search_paths.dirs().to_vec(),
        diagnostics,
    })
}

/// Findings of one artifact. Unreadable artifacts become diagnostics; authoring errors follow
/// `policy`.
fn analyze_artifact(
    path: &Path,
    file: &PackageFile,
    fs: &PackageFs,
    ctx: &AnalysisContext,
    policy: AuthoringErrorPolicy,
    doc_package: bool,
) -> ScaResult<Collected> {
    match artifact_findings(path, file, fs, ctx, doc_package) {
        Ok(findings) => Ok(findings.into()),
        Err(e) if e.is_authoring_error() && policy == AuthoringErrorPolicy::Abort => Err(e),
        Err(e) => {
            let diagnostic = Diagnostic::new(path, &e);
            warn!("Skipping artifact: {diagnostic}");
            Ok(Collected {
                findings: Findings::default(),
                diagnostics: vec![diagnostic],
            })
        }
    }
}

fn artifact_findings(
    path: &Path,
    file: &PackageFile,
    fs: &PackageFs,
    ctx: &AnalysisContext,
    doc_package: bool,
) -> ScaResult<Findings> {
    let mut findings = if doc_package {
        docs::analyze(path)
    } else {
        Findings::default()
    };
    if !ctx.options.no_depends {
        findings = findings + runtimes::analyze(path);
    }

    match file {
        PackageFile::Elf(elf) => findings = findings + soname::analyze(path, elf, ctx),
        PackageFile::Script => {
            let script = shebang::analyze(path, fs, ctx).map_err(|e| ScaError::Shebang {
                path: path.to_path_buf(),
                source: e,
            })?;
            findings = findings + script;
        }
        PackageFile::PkgConfig => {
            let descriptor = pkgconfig::analyze(path, fs, ctx).map_err(|e| ScaError::PkgConfig {
                path: path.to_path_buf(),
                source: e,
            })?;
            findings = findings + descriptor;
        }
        PackageFile::Symlink(_) => return Ok(findings),
        PackageFile::File | PackageFile::LdSoConf => {}
    }

    Ok(findings + commands::analyze(path, fs, ctx)?)
}
