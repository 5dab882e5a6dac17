// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Statistics over the analyzed artifacts and the inferred dependencies.

mod artifacts;
mod dependencies;
mod elf;

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::package::PackageFile;
use crate::sca::Dependencies;

type Artifacts = BTreeMap<PathBuf, PackageFile>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct ReportTotals {
    pub(crate) artifacts: artifacts::Totals,
    pub(crate) elfs: elf::Totals,
    pub(crate) dependencies: dependencies::Totals,
    pub(crate) skipped: usize,
}

impl ReportTotals {
    #[must_use]
    pub(crate) fn new(artifacts: &Artifacts, dependencies: &Dependencies, skipped: usize) -> Self {
        Self {
            artifacts: artifacts::Totals::calculate(artifacts),
            elfs: elf::Totals::calculate(artifacts),
            dependencies: dependencies::Totals::calculate(dependencies),
            skipped,
        }
    }
}
