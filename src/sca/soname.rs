// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Linkage analysis: what an ELF object needs and which soname it provides.

use std::path::Path;
use tracing::debug;

use super::dependencies::Findings;
use super::token::Token;
use super::AnalysisContext;
use crate::package::Elf;

/// Major version of a soname: the leading digits after the first `.so.`.
///
/// Sonames without a `.so.` suffix or without leading digits have major version `0`.
#[must_use]
pub fn major_version(soname: &str) -> &str {
    let Some((_, tail)) = soname.split_once(".so.") else {
        return "0";
    };
    let end = tail
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(tail.len());
    if end == 0 {
        "0"
    } else {
        &tail[..end]
    }
}

/// Findings of one ELF object at `path`.
///
/// Executables count wherever they live. Other objects count only when the dynamic linker can
/// find them.
pub(crate) fn analyze(path: &Path, elf: &Elf, ctx: &AnalysisContext) -> Findings {
    let resolvable = ctx.search_paths.contains(path);
    if !(elf.is_executable() || resolvable) {
        debug!("Ignoring ELF object outside library search paths: {}", path.display());
        return Findings::default();
    }

    let mut findings = Findings::default();
    if !ctx.options.no_depends {
        findings.runtime = elf.needed().iter().map(Token::shared_object).collect();
    }

    if let Some(soname) = elf.soname().filter(|_| resolvable) {
        let capabilities = vec![
            Token::SharedObject {
                name: soname.to_string(),
                version: Some(major_version(soname).to_string()),
            },
            Token::SharedObjectVersion {
                name: soname.to_string(),
                version: ctx.full_version.clone(),
            },
        ];
        if ctx.options.no_provides {
            findings.vendored = capabilities;
        } else {
            findings.provides = capabilities;
        }
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::{ElfType, PackageOptions};
    use crate::sca::SearchPaths;

    fn context(options: PackageOptions) -> AnalysisContext {
        AnalysisContext {
            search_paths: SearchPaths::default(),
            options,
            full_version: "2.69-r0".to_string(),
        }
    }

    fn rendered(tokens: &[Token]) -> Vec<String> {
        tokens.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_major_version() {
        assert_eq!(major_version("libcap.so.2.69"), "2");
        assert_eq!(major_version("libfoo.so.0unstable"), "0");
        assert_eq!(major_version("libpq.so.14"), "14");
        assert_eq!(major_version("libfoo.so"), "0");
        assert_eq!(major_version("ld-linux-x86-64.so.2"), "2");
        assert_eq!(major_version("libfoo.so.beta"), "0");
    }

    #[test]
    fn test_library_in_search_path() {
        let elf = Elf::new_for_testing(
            ElfType::SharedObject,
            &["libc.so.6", "libpsx.so.2"],
            Some("libcap.so.2"),
            None,
        );
        let findings = analyze(
            Path::new("/usr/lib/libcap.so.2.69"),
            &elf,
            &context(PackageOptions::default()),
        );
        assert_eq!(rendered(&findings.runtime), ["so:libc.so.6", "so:libpsx.so.2"]);
        assert_eq!(
            rendered(&findings.provides),
            ["so:libcap.so.2=2", "so-ver:libcap.so.2=2.69-r0"]
        );
        assert!(findings.vendored.is_empty());
    }

    #[test]
    fn test_library_outside_search_path_is_ignored() {
        let elf = Elf::new_for_testing(
            ElfType::SharedObject,
            &["libc.so.6"],
            Some("libpq.so.5"),
            None,
        );
        let ctx = context(PackageOptions::default());
        assert!(analyze(Path::new("/usr/libexec/neon/v14/lib/libpq.so.5"), &elf, &ctx).is_empty());
        assert!(analyze(Path::new("/opt/foo/libpq.so.5"), &elf, &ctx).is_empty());
    }

    #[test]
    fn test_executable_counts_anywhere_but_provides_nothing() {
        let elf = Elf::new_for_testing(
            ElfType::SharedObject,
            &["libcap.so.2", "libc.so.6"],
            None,
            Some("/lib/ld-linux-aarch64.so.1"),
        );
        let findings = analyze(
            Path::new("/usr/libexec/libcap/capsh-helper"),
            &elf,
            &context(PackageOptions::default()),
        );
        assert_eq!(rendered(&findings.runtime), ["so:libcap.so.2", "so:libc.so.6"]);
        assert!(findings.provides.is_empty());
    }

    #[test]
    fn test_no_self_suppression() {
        let elf = Elf::new_for_testing(
            ElfType::SharedObject,
            &["libfoo.so.1"],
            Some("libfoo.so.1"),
            None,
        );
        let findings = analyze(
            Path::new("/usr/lib/libfoo.so.1"),
            &elf,
            &context(PackageOptions::default()),
        );
        assert_eq!(rendered(&findings.runtime), ["so:libfoo.so.1"]);
        assert_eq!(findings.provides.len(), 2);
    }

    #[test]
    fn test_options_gate_tokens() {
        let elf = Elf::new_for_testing(
            ElfType::SharedObject,
            &["libc.so.6"],
            Some("libpq.so.5"),
            None,
        );
        let options = PackageOptions {
            no_provides: true,
            no_depends: true,
            ..PackageOptions::default()
        };
        let findings = analyze(Path::new("/usr/lib/libpq.so.5.16"), &elf, &context(options));
        assert!(findings.runtime.is_empty());
        assert!(findings.provides.is_empty());
        assert_eq!(
            rendered(&findings.vendored),
            ["so:libpq.so.5=5", "so-ver:libpq.so.5=2.69-r0"]
        );
    }
}
