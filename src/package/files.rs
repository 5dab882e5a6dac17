// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Classifies package entries by analyzable kind, reading file headers rather than trusting extensions.

use path_clean::PathClean;
use serde::Serialize;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use super::elf::{Elf, ElfError, ELF_MAGIC};
use super::extractor::{PackageError, PackageResult};

/// Directory holding dynamic-linker configuration fragments.
pub const LD_SO_CONF_DIR: &str = "/etc/ld.so.conf.d";

/// Represents a file in a package.
#[derive(Debug, Clone, Serialize)]
pub enum PackageFile {
    File,
    Symlink(PathBuf), // Stores the normalized target path of the symlink.
    Elf(Elf),
    Script,
    PkgConfig,
    LdSoConf,
}

impl PackageFile {
    /// Classify the entry at `host_path`, which lives at `package_path` inside the package.
    ///
    /// # Errors
    /// Returns an error if the entry cannot be read or carries ELF magic but is corrupt.
    pub(crate) fn classify(host_path: &Path, package_path: &Path) -> PackageResult<Self> {
        if host_path.is_symlink() {
            let target = fs::read_link(host_path).map_err(|e| PackageError::ReadSymlinkFailed {
                path: package_path.to_path_buf(),
                source: e,
            })?;
            // Resolve relative targets relative to the symlink's parent directory
            let resolved_target = if target.is_absolute() {
                target
            } else {
                package_path
                    .parent()
                    .unwrap_or_else(|| Path::new("/"))
                    .join(&target)
            };
            return Ok(Self::Symlink(resolved_target.clean()));
        }

        // Text formats without magic are recognised by their conventional location.
        if is_ld_so_conf(package_path) {
            return Ok(Self::LdSoConf);
        }
        if is_pkg_config(package_path) {
            return Ok(Self::PkgConfig);
        }

        match read_magic(host_path, package_path)? {
            Magic::Shebang => Ok(Self::Script),
            Magic::Elf => match Elf::from_path(host_path) {
                Ok(elf) => Ok(Self::Elf(elf)),
                Err(ElfError::NotElfFile { .. } | ElfError::FileTooSmall { .. }) => Ok(Self::File),
                Err(e) => Err(PackageError::Artifact {
                    path: package_path.to_path_buf(),
                    source: e,
                }),
            },
            Magic::Other => Ok(Self::File),
        }
    }
}

enum Magic {
    Elf,
    Shebang,
    Other,
}

fn read_magic(host_path: &Path, package_path: &Path) -> PackageResult<Magic> {
    let mut file = fs::File::open(host_path).map_err(|e| PackageError::ReadFailed {
        path: package_path.to_path_buf(),
        source: e,
    })?;
    let mut magic = [0u8; 4];
    let mut filled = 0;
    // Short files are fine, only the first bytes matter.
    while filled < magic.len() {
        match file.read(&mut magic[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => {
                return Err(PackageError::ReadFailed {
                    path: package_path.to_path_buf(),
                    source: e,
                })
            }
        }
    }
    Ok(if filled >= 2 && magic.starts_with(b"#!") {
        Magic::Shebang
    } else if filled == 4 && magic == ELF_MAGIC {
        Magic::Elf
    } else {
        Magic::Other
    })
}

fn is_ld_so_conf(package_path: &Path) -> bool {
    package_path.parent() == Some(Path::new(LD_SO_CONF_DIR))
        && package_path.extension().is_some_and(|ext| ext == "conf")
}

fn is_pkg_config(package_path: &Path) -> bool {
    package_path.extension().is_some_and(|ext| ext == "pc")
        && package_path
            .parent()
            .and_then(Path::file_name)
            .is_some_and(|dir| dir == "pkgconfig")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ElfBuilder, TreeBuilder};

    fn classify(tree: &TreeBuilder, package_path: &str) -> PackageResult<PackageFile> {
        let host = tree.path().join(package_path.trim_start_matches('/'));
        PackageFile::classify(&host, Path::new(package_path))
    }

    #[test]
    fn test_classify_by_content() {
        let tree = TreeBuilder::new()
            .file("/usr/bin/tool", "#!/usr/bin/env bash\necho hi\n")
            .file("/usr/share/doc/readme", "plain text")
            .elf("/usr/lib/libfoo.so.1", &ElfBuilder::shared_object("libfoo.so.1"));

        assert!(matches!(classify(&tree, "/usr/bin/tool"), Ok(PackageFile::Script)));
        assert!(matches!(
            classify(&tree, "/usr/share/doc/readme"),
            Ok(PackageFile::File)
        ));
        assert!(matches!(
            classify(&tree, "/usr/lib/libfoo.so.1"),
            Ok(PackageFile::Elf(_))
        ));
    }

    #[test]
    fn test_script_extension_is_not_trusted() {
        // A `.sh` file without a shebang is plain data, a shebang without extension is a script.
        let tree = TreeBuilder::new()
            .file("/usr/share/foo/env.sh", "export FOO=1\n")
            .file("/usr/libexec/foo/run", "#!/bin/dash\n");
        assert!(matches!(
            classify(&tree, "/usr/share/foo/env.sh"),
            Ok(PackageFile::File)
        ));
        assert!(matches!(
            classify(&tree, "/usr/libexec/foo/run"),
            Ok(PackageFile::Script)
        ));
    }

    #[test]
    fn test_elf_extension_is_not_trusted() {
        let tree = TreeBuilder::new().elf(
            "/usr/bin/launcher.sh",
            &ElfBuilder::executable("/lib/ld-linux-x86-64.so.2").needed("libfoo.so.1"),
        );
        match classify(&tree, "/usr/bin/launcher.sh") {
            Ok(PackageFile::Elf(elf)) => assert_eq!(elf.needed(), ["libfoo.so.1"]),
            other => panic!("Expected ELF, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_by_location() {
        let tree = TreeBuilder::new()
            .file("/etc/ld.so.conf.d/foo.conf", "/opt/foo/lib\n")
            .file("/etc/ld.so.conf", "include /etc/ld.so.conf.d/*.conf\n")
            .file("/usr/lib/pkgconfig/foo.pc", "Name: foo\nVersion: 1\n")
            .file("/usr/share/foo/foo.pc", "not a descriptor\n");

        assert!(matches!(
            classify(&tree, "/etc/ld.so.conf.d/foo.conf"),
            Ok(PackageFile::LdSoConf)
        ));
        assert!(matches!(
            classify(&tree, "/etc/ld.so.conf"),
            Ok(PackageFile::File)
        ));
        assert!(matches!(
            classify(&tree, "/usr/lib/pkgconfig/foo.pc"),
            Ok(PackageFile::PkgConfig)
        ));
        assert!(matches!(
            classify(&tree, "/usr/share/foo/foo.pc"),
            Ok(PackageFile::File)
        ));
    }

    #[test]
    fn test_relative_symlink_is_normalized() {
        let tree = TreeBuilder::new()
            .elf("/usr/lib/libfoo.so.1.2", &ElfBuilder::shared_object("libfoo.so.1"))
            .symlink("/usr/lib/libfoo.so.1", "../lib/./libfoo.so.1.2");
        match classify(&tree, "/usr/lib/libfoo.so.1") {
            Ok(PackageFile::Symlink(target)) => {
                assert_eq!(target, PathBuf::from("/usr/lib/libfoo.so.1.2"));
            }
            other => panic!("Expected symlink, got {other:?}"),
        }
    }

    #[test]
    fn test_corrupt_elf_is_an_error_naming_the_path() {
        let mut bytes = ElfBuilder::shared_object("libbroken.so.1").build();
        bytes.truncate(80);
        let tree = TreeBuilder::new();
        let host = tree.path().join("usr/lib/libbroken.so.1");
        fs::create_dir_all(host.parent().unwrap()).unwrap();
        fs::write(&host, bytes).unwrap();

        let err = classify(&tree, "/usr/lib/libbroken.so.1").unwrap_err();
        assert!(err.to_string().contains("/usr/lib/libbroken.so.1"));
    }
}
