// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Documentation viewers needed by `-doc` packages.

use std::path::Path;

use super::dependencies::Findings;
use super::token::Token;

/// Suffix of documentation package names.
pub const DOC_PACKAGE_SUFFIX: &str = "-doc";

/// Documentation directories and the package that reads them.
const VIEWERS: [(&str, &str); 2] = [("/usr/share/man", "man-db"), ("/usr/share/info", "texinfo")];

/// Whether the analyzer applies to a package of this name.
#[must_use]
pub fn is_doc_package(name: &str) -> bool {
    name.ends_with(DOC_PACKAGE_SUFFIX)
}

/// Findings of the file at `path` of a documentation package.
pub(crate) fn analyze(path: &Path) -> Findings {
    Findings {
        runtime: VIEWERS
            .iter()
            .filter(|(dir, _)| path.starts_with(dir))
            .map(|(_, viewer)| Token::Package((*viewer).to_string()))
            .collect(),
        ..Findings::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_package_names() {
        assert!(is_doc_package("libcap-doc"));
        assert!(!is_doc_package("libcap"));
        assert!(!is_doc_package("docker"));
    }

    #[test]
    fn test_viewers() {
        let man = analyze(Path::new("/usr/share/man/man1/foo.1.gz"));
        assert_eq!(man.runtime, [Token::Package("man-db".into())]);
        let info = analyze(Path::new("/usr/share/info/foo.info.gz"));
        assert_eq!(info.runtime, [Token::Package("texinfo".into())]);
        assert!(analyze(Path::new("/usr/share/doc/foo/README")).is_empty());
        assert!(analyze(Path::new("/usr/share/manual/foo")).is_empty());
    }
}
