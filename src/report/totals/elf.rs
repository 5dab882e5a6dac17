// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.
use rayon::prelude::*;
use serde::Serialize;
use std::ops::Add;

use super::Artifacts;
use crate::package::PackageFile;

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct Totals {
    pub(crate) executables: usize,
    pub(crate) shared_libraries: usize,
    pub(crate) other: usize,
    pub(crate) total: usize,
}

impl Totals {
    pub(crate) fn calculate(artifacts: &Artifacts) -> Self {
        artifacts
            .par_iter()
            .fold(Totals::default, |mut totals, (_, file)| {
                if let PackageFile::Elf(elf) = file {
                    if elf.is_executable() {
                        totals.executables += 1;
                    } else if elf.soname().is_some() {
                        totals.shared_libraries += 1;
                    } else {
                        totals.other += 1;
                    }
                }
                totals
            })
            .reduce(Totals::default, |a, b| a + b)
    }
}

impl Add for Totals {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        let executables = self.executables + other.executables;
        let shared_libraries = self.shared_libraries + other.shared_libraries;
        let other = self.other + other.other;
        Self {
            executables,
            shared_libraries,
            other,
            total: executables + shared_libraries + other,
        }
    }
}
