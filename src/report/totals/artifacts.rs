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
    pub(crate) elfs: usize,
    pub(crate) scripts: usize,
    pub(crate) pkg_config: usize,
    pub(crate) ld_so_conf: usize,
    pub(crate) symlinks: usize,
    pub(crate) files: usize,
    pub(crate) total: usize,
}

impl Totals {
    pub(crate) fn calculate(artifacts: &Artifacts) -> Self {
        artifacts
            .par_iter()
            .fold(Totals::default, |mut totals, (_, file)| {
                match file {
                    PackageFile::Elf(_) => totals.elfs += 1,
                    PackageFile::Script => totals.scripts += 1,
                    PackageFile::PkgConfig => totals.pkg_config += 1,
                    PackageFile::LdSoConf => totals.ld_so_conf += 1,
                    PackageFile::Symlink(_) => totals.symlinks += 1,
                    PackageFile::File => totals.files += 1,
                }
                totals
            })
            .reduce(Totals::default, |a, b| a + b)
    }
}

impl Add for Totals {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        let elfs = self.elfs + other.elfs;
        let scripts = self.scripts + other.scripts;
        let pkg_config = self.pkg_config + other.pkg_config;
        let ld_so_conf = self.ld_so_conf + other.ld_so_conf;
        let symlinks = self.symlinks + other.symlinks;
        let files = self.files + other.files;
        Self {
            elfs,
            scripts,
            pkg_config,
            ld_so_conf,
            symlinks,
            files,
            total: elfs + scripts + pkg_config + ld_so_conf + symlinks + files,
        }
    }
}
