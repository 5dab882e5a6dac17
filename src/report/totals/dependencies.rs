// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.
use dashmap::DashSet;
use rayon::prelude::*;
use serde::Serialize;
use std::ops::Add;

use crate::sca::Dependencies;

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct Totals {
    pub(crate) runtime: usize,
    pub(crate) provides: usize,
    pub(crate) vendored: usize,
    pub(crate) shared_objects: usize,
    pub(crate) commands: usize,
    pub(crate) pkg_config: usize,
    pub(crate) packages: usize,
    pub(crate) total: usize,
    pub(crate) total_unique: usize,
}

#[derive(Clone, Copy)]
enum Set {
    Runtime,
    Provides,
    Vendored,
}

/// Name of the capability a token is about, without namespace or version.
fn capability(token: &str) -> &str {
    let unversioned = token.split_once('=').map_or(token, |(name, _)| name);
    unversioned
        .split_once(':')
        .map_or(unversioned, |(_, name)| name)
}

impl Totals {
    pub(crate) fn calculate(dependencies: &Dependencies) -> Self {
        let tokens: Vec<(Set, &str)> = [
            (Set::Runtime, &dependencies.runtime),
            (Set::Provides, &dependencies.provides),
            (Set::Vendored, &dependencies.vendored),
        ]
        .into_iter()
        .flat_map(|(set, tokens)| tokens.iter().map(move |token| (set, token.as_str())))
        .collect();

        let unique = DashSet::new();
        let mut totals = tokens
            .par_iter()
            .fold(Totals::default, |mut totals, &(set, token)| {
                unique.insert(capability(token));
                match set {
                    Set::Runtime => totals.runtime += 1,
                    Set::Provides => totals.provides += 1,
                    Set::Vendored => totals.vendored += 1,
                }
                if token.starts_with("so:") || token.starts_with("so-ver:") {
                    totals.shared_objects += 1;
                } else if token.starts_with("cmd:") {
                    totals.commands += 1;
                } else if token.starts_with("pc:") {
                    totals.pkg_config += 1;
                } else {
                    totals.packages += 1;
                }
                totals
            })
            .reduce(Totals::default, |a, b| a + b);
        totals.total_unique = unique.len();
        totals
    }
}

impl Add for Totals {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        let runtime = self.runtime + other.runtime;
        let provides = self.provides + other.provides;
        let vendored = self.vendored + other.vendored;
        Self {
            runtime,
            provides,
            vendored,
            shared_objects: self.shared_objects + other.shared_objects,
            commands: self.commands + other.commands,
            pkg_config: self.pkg_config + other.pkg_config,
            packages: self.packages + other.packages,
            total: runtime + provides + vendored,
            total_unique: 0, // Handled by the calculate function.
        }
    }
}
