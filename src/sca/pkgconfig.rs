// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! pkg-config descriptors shipped by a package.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use super::dependencies::Findings;
use super::search_path::is_private_helper_path;
use super::token::Token;
use super::AnalysisContext;
use crate::package::PackageFs;

/// Architecture-independent descriptor directory, searched in addition to the library paths.
pub const SHARED_PKG_CONFIG_DIR: &str = "/usr/share/pkgconfig";

const COMPARISON_OPERATORS: [&str; 6] = ["<", "<=", "=", "!=", ">=", ">"];

#[derive(Debug, Error)]
pub enum PkgConfigError {
    #[error("Failed to read pkg-config descriptor")]
    Read(#[from] io::Error),

    #[error("pkg-config descriptor has no Version field")]
    MissingVersion,

    #[error("Undefined variable '{name}' on line {line}")]
    UndefinedVariable { name: String, line: usize },

    #[error("Unterminated variable reference on line {line}")]
    UnterminatedVariable { line: usize },
}

/// The fields of a descriptor the analysis uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkgConfig {
    /// Module name, which pkg-config derives from the file name.
    pub module: String,
    pub version: String,
    /// Modules from `Requires:`, without version constraints.
    pub requires: Vec<String>,
}

impl PkgConfig {
    /// Parse the descriptor found at `path`.
    ///
    /// # Errors
    /// Returns an error if a variable is undefined or the `Version` field is missing.
    pub fn parse(path: &Path, content: &str) -> Result<Self, PkgConfigError> {
        let module = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut variables = HashMap::new();
        if let Some(dir) = path.parent() {
            variables.insert("pcfiledir".to_string(), dir.to_string_lossy().into_owned());
        }

        let mut version = None;
        let mut requires = Vec::new();
        for (index, raw) in content.lines().enumerate() {
            let number = index + 1;
            let line = raw.split('#').next().unwrap_or("").trim();
            let tag_end = line
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '.'))
                .unwrap_or(line.len());
            let (tag, rest) = line.split_at(tag_end);
            if tag.is_empty() {
                continue;
            }
            let rest = rest.trim_start();
            if let Some(value) = rest.strip_prefix('=') {
                let value = expand(value.trim(), &variables, number)?;
                variables.insert(tag.to_string(), value);
            } else if let Some(value) = rest.strip_prefix(':') {
                match tag {
                    "Version" => version = Some(expand(value.trim(), &variables, number)?),
                    "Requires" => {
                        requires = module_names(&expand(value.trim(), &variables, number)?);
                    }
                    _ => {}
                }
            }
        }

        Ok(Self {
            module,
            version: version
                .filter(|v| !v.is_empty())
                .ok_or(PkgConfigError::MissingVersion)?,
            requires,
        })
    }
}

/// Substitute `${name}` references. `$$` is a literal dollar.
fn expand(
    value: &str,
    variables: &HashMap<String, String>,
    line: usize,
) -> Result<String, PkgConfigError> {
    let mut expanded = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find('$') {
        expanded.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        if let Some(after) = after.strip_prefix('$') {
            expanded.push('$');
            rest = after;
        } else if let Some(reference) = after.strip_prefix('{') {
            let end = reference
                .find('}')
                .ok_or(PkgConfigError::UnterminatedVariable { line })?;
            let name = &reference[..end];
            let value = variables
                .get(name)
                .ok_or_else(|| PkgConfigError::UndefinedVariable {
                    name: name.to_string(),
                    line,
                })?;
            expanded.push_str(value);
            rest = &reference[end + 1..];
        } else {
            expanded.push('$');
            rest = after;
        }
    }
    expanded.push_str(rest);
    Ok(expanded)
}

/// Module names of a dependency list like `glib-2.0 >= 2.50, zlib`.
fn module_names(list: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut words = list
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|word| !word.is_empty());
    while let Some(word) = words.next() {
        if COMPARISON_OPERATORS.contains(&word) {
            // The version that follows the operator.
            words.next();
        } else {
            names.push(word.to_string());
        }
    }
    names
}

/// Whether a descriptor at `path` describes a library this package makes available.
fn is_exported(path: &Path, ctx: &AnalysisContext) -> bool {
    ctx.search_paths.contains(path)
        || (path.starts_with(SHARED_PKG_CONFIG_DIR) && !is_private_helper_path(path))
}

/// Findings of the descriptor at `path`.
pub(crate) fn analyze(
    path: &Path,
    fs: &PackageFs,
    ctx: &AnalysisContext,
) -> Result<Findings, PkgConfigError> {
    if !is_exported(path, ctx) {
        debug!("Ignoring private pkg-config descriptor: {}", path.display());
        return Ok(Findings::default());
    }
    let content = fs::read_to_string(fs.host_path(path))?;
    let descriptor = PkgConfig::parse(path, &content)?;

    let mut findings = Findings {
        vendored: vec![Token::PkgConfig {
            module: descriptor.module,
            version: Some(descriptor.version),
        }],
        ..Findings::default()
    };
    if !ctx.options.no_depends {
        findings.runtime = descriptor
            .requires
            .into_iter()
            .map(|module| Token::PkgConfig {
                module,
                version: None,
            })
            .collect();
    }
    Ok(findings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::PackageOptions;
    use crate::sca::SearchPaths;
    use crate::testing::TreeBuilder;

    const LIBPQ_PC: &str = "\
# Generated by the build
prefix=/usr
libdir=${prefix}/lib
includedir=${prefix}/include
major=16

Name: libpq
Description: PostgreSQL libpq library
URL: https://www.postgresql.org/
Version: ${major}.2
Requires:
Requires.private: libssl, libcrypto
Libs: -L${libdir} -lpq
Cflags: -I${includedir}
";

    fn context() -> AnalysisContext {
        AnalysisContext {
            search_paths: SearchPaths::default(),
            options: PackageOptions::default(),
            full_version: "16.2-r0".to_string(),
        }
    }

    #[test]
    fn test_parse_expands_variables() {
        let pc = PkgConfig::parse(Path::new("/usr/lib/pkgconfig/libpq.pc"), LIBPQ_PC).unwrap();
        assert_eq!(pc.module, "libpq");
        assert_eq!(pc.version, "16.2");
        assert!(pc.requires.is_empty());
    }

    #[test]
    fn test_parse_requires_drops_constraints() {
        let content = "Name: foo\nVersion: 1.0\nRequires: glib-2.0 >= 2.50, gobject-2.0,zlib\n";
        let pc = PkgConfig::parse(Path::new("/usr/lib/pkgconfig/foo.pc"), content).unwrap();
        assert_eq!(pc.requires, ["glib-2.0", "gobject-2.0", "zlib"]);
    }

    #[test]
    fn test_parse_errors() {
        let path = Path::new("/usr/lib/pkgconfig/foo.pc");
        assert!(matches!(
            PkgConfig::parse(path, "Name: foo\n"),
            Err(PkgConfigError::MissingVersion)
        ));
        assert!(matches!(
            PkgConfig::parse(path, "Version: ${missing}\n"),
            Err(PkgConfigError::UndefinedVariable { line: 1, .. })
        ));
        assert!(matches!(
            PkgConfig::parse(path, "v=1\nVersion: ${v\n"),
            Err(PkgConfigError::UnterminatedVariable { line: 2 })
        ));
    }

    #[test]
    fn test_pcfiledir_is_predefined() {
        let content = "prefix=${pcfiledir}/../..\nVersion: 2\n";
        let pc = PkgConfig::parse(Path::new("/usr/lib/pkgconfig/foo.pc"), content).unwrap();
        assert_eq!(pc.version, "2");
    }

    #[test]
    fn test_analyze_vendors_exported_descriptors() {
        let tree = TreeBuilder::new()
            .file("/usr/lib/pkgconfig/libpq.pc", LIBPQ_PC)
            .file(
                "/usr/share/pkgconfig/foo-data.pc",
                "Version: 3\nRequires: libpq >= 16\n",
            );
        let fs = PackageFs::new(tree.path()).unwrap();
        let ctx = context();

        let libpq = analyze(Path::new("/usr/lib/pkgconfig/libpq.pc"), &fs, &ctx).unwrap();
        assert_eq!(libpq.vendored[0].to_string(), "pc:libpq=16.2");
        assert!(libpq.runtime.is_empty());

        let data = analyze(Path::new("/usr/share/pkgconfig/foo-data.pc"), &fs, &ctx).unwrap();
        assert_eq!(data.vendored[0].to_string(), "pc:foo-data=3");
        assert_eq!(data.runtime[0].to_string(), "pc:libpq");
    }

    #[test]
    fn test_analyze_ignores_private_descriptors() {
        let tree = TreeBuilder::new()
            .file("/usr/libexec/neon/v14/lib/pkgconfig/libpq.pc", LIBPQ_PC);
        let fs = PackageFs::new(tree.path()).unwrap();
        let findings = analyze(
            Path::new("/usr/libexec/neon/v14/lib/pkgconfig/libpq.pc"),
            &fs,
            &context(),
        )
        .unwrap();
        assert!(findings.is_empty());
    }
}
