// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! The dependency declaration and the per-analyzer findings folded into it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::ops::Add;
use std::path::Path;

use super::token::Token;
use crate::package::Diagnostic;

/// Runtime requirements, provided capabilities and vendored metadata of one package.
///
/// Sets are ordered, so the serialized form is deduplicated and sorted independently of the
/// order findings arrived in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dependencies {
    pub runtime: BTreeSet<String>,
    pub provides: BTreeSet<String>,
    pub vendored: BTreeSet<String>,
}

impl Dependencies {
    /// Read an author-declared baseline from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a valid declaration.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read declared dependencies: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse declared dependencies: {}", path.display()))
    }

    /// Add every token of `findings`. Existing entries are never removed.
    pub fn merge(&mut self, findings: &Findings) {
        self.runtime
            .extend(findings.runtime.iter().map(ToString::to_string));
        self.provides
            .extend(findings.provides.iter().map(ToString::to_string));
        self.vendored
            .extend(findings.vendored.iter().map(ToString::to_string));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.runtime.is_empty() && self.provides.is_empty() && self.vendored.is_empty()
    }
}

/// Tokens emitted by one analyzer, or by several once added together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Findings {
    pub runtime: Vec<Token>,
    pub provides: Vec<Token>,
    pub vendored: Vec<Token>,
}

impl Findings {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.runtime.is_empty() && self.provides.is_empty() && self.vendored.is_empty()
    }

    /// Sort and deduplicate each list.
    #[must_use]
    pub(crate) fn normalized(mut self) -> Self {
        for tokens in [&mut self.runtime, &mut self.provides, &mut self.vendored] {
            tokens.sort_unstable();
            tokens.dedup();
        }
        self
    }
}

impl Add for Findings {
    type Output = Self;

    fn add(mut self, other: Self) -> Self {
        self.runtime.extend(other.runtime);
        self.provides.extend(other.provides);
        self.vendored.extend(other.vendored);
        self
    }
}

/// Findings of a set of artifacts plus the artifacts that had to be skipped.
#[derive(Debug, Default)]
pub(crate) struct Collected {
    pub(crate) findings: Findings,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl From<Findings> for Collected {
    fn from(findings: Findings) -> Self {
        Self {
            findings,
            diagnostics: Vec::new(),
        }
    }
}

impl Add for Collected {
    type Output = Self;

    fn add(mut self, other: Self) -> Self {
        self.findings = self.findings + other.findings;
        self.diagnostics.extend(other.diagnostics);
        self
    }
}
