// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Report struct and public API for presenting and persisting analysis results.

mod console;
mod errors;
mod output;
mod totals;

pub use console::summarize_report;
pub use errors::{ReportError, ReportResult};
pub use output::{report_path, write_report};

use serde::Serialize;
use std::path::PathBuf;

use crate::package::{Diagnostic, PackageHandle};
use crate::sca::{Analysis, Dependencies};
use totals::ReportTotals;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct ReportPackage {
    pub(crate) name: String,
    pub(crate) version: String,
    pub(crate) epoch: u64,
}

#[derive(Debug, Serialize)]
pub struct Report<'a> {
    package: ReportPackage,
    source: String,
    totals: ReportTotals,
    search_paths: &'a [PathBuf],
    diagnostics: &'a [Diagnostic],
    dependencies: &'a Dependencies,
}

impl<'a> Report<'a> {
    /// Create a report of a finished analysis.
    #[must_use]
    pub fn new<H: PackageHandle + ?Sized>(
        handle: &H,
        analysis: &'a Analysis,
        dependencies: &'a Dependencies,
    ) -> Self {
        let root = handle.filesystem().root();
        Self {
            package: ReportPackage {
                name: handle.name().to_string(),
                version: handle.version().to_string(),
                epoch: handle.epoch(),
            },
            source: root
                .canonicalize()
                .unwrap_or_else(|_| root.to_path_buf())
                .to_string_lossy()
                .to_string(),
            totals: ReportTotals::new(
                &analysis.artifacts,
                dependencies,
                analysis.diagnostics.len(),
            ),
            search_paths: &analysis.search_paths,
            diagnostics: &analysis.diagnostics,
            dependencies,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::{Package, PackageIdentity};
    use crate::sca::{analyze, AnalysisOptions};
    use crate::testing::{ElfBuilder, TreeBuilder};
    use tempfile::TempDir;

    #[test]
    fn test_write_report() {
        let tree = TreeBuilder::new()
            .elf(
                "/usr/lib/libfoo.so.1.2",
                &ElfBuilder::shared_object("libfoo.so.1").needed("libc.so.6"),
            )
            .executable_file("/usr/bin/foo", "#!/bin/dash\n");
        let package = Package::open(PackageIdentity::new("foo", "1.2", 3), tree.path()).unwrap();
        let mut deps = Dependencies::default();
        let analysis = analyze(&package, &mut deps, &AnalysisOptions::default()).unwrap();
        let report = Report::new(&package, &analysis, &deps);

        let out = TempDir::new().unwrap();
        let path = write_report(&report, out.path(), "x86_64").unwrap();
        assert_eq!(path, out.path().join("x86_64/sca-foo-1.2-r3.json"));

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["package"]["name"], "foo");
        assert_eq!(json["totals"]["artifacts"]["total"], 2);
        assert_eq!(json["totals"]["elfs"]["shared_libraries"], 1);
        assert_eq!(
            json["dependencies"]["runtime"],
            serde_json::json!(["cmd:/bin/dash", "so:libc.so.6"])
        );
        assert_eq!(
            json["dependencies"]["provides"],
            serde_json::json!(["cmd:foo=1.2-r3", "so-ver:libfoo.so.1=1.2-r3", "so:libfoo.so.1=1"])
        );
    }

    #[test]
    fn test_write_report_rejects_traversal() {
        let tree = TreeBuilder::new().file("/usr/share/foo/data", "data");
        let package =
            Package::open(PackageIdentity::new("foo", "../1", 0), tree.path()).unwrap();
        let mut deps = Dependencies::default();
        let analysis = analyze(&package, &mut deps, &AnalysisOptions::default()).unwrap();
        let report = Report::new(&package, &analysis, &deps);

        let out = TempDir::new().unwrap();
        assert!(matches!(
            write_report(&report, out.path(), "x86_64"),
            Err(ReportError::PathTraversal { field: "version", .. })
        ));
        assert!(std::fs::read_dir(out.path()).unwrap().next().is_none());
    }
}
