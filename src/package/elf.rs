// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Parses ELF files to extract `DT_NEEDED`, `DT_SONAME` and the program interpreter. Uses the `goblin` crate for ELF parsing.

use goblin::elf::Elf as GoblinElf;
use serde::Serialize;
use std::fs;
use std::io;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};
use thiserror::Error;

type Result<T> = std::result::Result<T, ElfError>;

/// ELF magic bytes: 0x7f followed by ASCII "ELF" (`e_ident[EI_MAG0..EI_MAG3]`).
pub(crate) const ELF_MAGIC: [u8; 4] = [0x7f, 0x45, 0x4c, 0x46];

/// Errors that can occur when parsing ELF files.
#[derive(Debug, Error)]
pub enum ElfError {
    #[error("File is too small to be an ELF file: {path:?}")]
    FileTooSmall { path: PathBuf },
    #[error("File is not an ELF file: {path:?}")]
    NotElfFile { path: PathBuf },
    #[error("Failed to open file: {path:?}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to read file: {path:?}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse ELF file: {path:?}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: goblin::error::Error,
    },
    #[error("Unknown ELF type in file: {path:?}")]
    UnknownElfType { path: PathBuf },
}

/// ELF file type (wrapper around `goblin::elf::header::e_type`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ElfType {
    None,
    Relocatable,
    Executable,
    SharedObject,
    Core,
}

/// Linkage information of an ELF object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Elf {
    kind: ElfType,
    needed: Vec<String>,
    soname: Option<String>,
    interpreter: Option<String>,
}

impl Elf {
    /// Parse an ELF file from a path.
    ///
    /// # Errors
    /// Returns an error if the file is not an ELF file or its headers are corrupt.
    pub(crate) fn from_path(path: &Path) -> Result<Self> {
        let bytes = Self::read(path)?;
        Self::parse(path, &bytes)
    }

    /// Get the ELF file type (executable, shared object, etc.).
    #[must_use]
    pub fn kind(&self) -> &ElfType {
        &self.kind
    }

    /// Get the list of required shared objects (`DT_NEEDED` entries).
    #[must_use]
    pub fn needed(&self) -> &[String] {
        &self.needed
    }

    /// Get the self-declared library name (`DT_SONAME`), if any.
    #[must_use]
    pub fn soname(&self) -> Option<&str> {
        self.soname.as_deref()
    }

    /// Get the program interpreter (`PT_INTERP`), if any.
    #[must_use]
    pub fn interpreter(&self) -> Option<&str> {
        self.interpreter.as_deref()
    }

    /// An executable either requests a program interpreter or is a fixed-address `ET_EXEC`.
    /// PIE binaries are `ET_DYN` and are recognised by their interpreter.
    #[must_use]
    pub fn is_executable(&self) -> bool {
        self.interpreter.is_some() || self.kind == ElfType::Executable
    }

    /// Reads the entire file at path into bytes if the file is an ELF file.
    ///
    /// # Errors
    /// Returns an error if the file is not an ELF file or cannot be read.
    fn read(path: &Path) -> Result<Vec<u8>> {
        let metadata = fs::metadata(path).map_err(|e| ElfError::OpenFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        // Skip files that are too small to be ELF (must be at least ELF header size)
        if metadata.len() < 64 {
            return Err(ElfError::FileTooSmall {
                path: path.to_path_buf(),
            });
        }

        let mut file = fs::File::open(path).map_err(|e| ElfError::OpenFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut magic = [0u8; 4];
        file.read_exact(&mut magic)
            .map_err(|e| ElfError::ReadFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
        if magic != ELF_MAGIC {
            return Err(ElfError::NotElfFile {
                path: path.to_path_buf(),
            });
        }

        // goblin requires the full file, but we've at least filtered out non-ELF files
        file.seek(std::io::SeekFrom::Start(0))
            .map_err(|e| ElfError::ReadFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|e| ElfError::ReadFailed {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(bytes)
    }

    fn parse(path: &Path, bytes: &[u8]) -> Result<Self> {
        let elf = GoblinElf::parse(bytes).map_err(|e| ElfError::ParseFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut needed = Vec::new();
        let mut soname = None;

        if let Some(dynamic) = &elf.dynamic {
            for dyn_entry in &dynamic.dyns {
                let Ok(strtab_idx) = usize::try_from(dyn_entry.d_val) else {
                    continue;
                };
                match dyn_entry.d_tag {
                    goblin::elf::dynamic::DT_NEEDED => {
                        if let Some(name) = elf.dynstrtab.get_at(strtab_idx) {
                            needed.push(name.to_string());
                        }
                    }
                    goblin::elf::dynamic::DT_SONAME => {
                        soname = elf
                            .dynstrtab
                            .get_at(strtab_idx)
                            .filter(|name| !name.is_empty())
                            .map(str::to_string);
                    }
                    _ => {}
                }
            }
        }

        Ok(Self {
            kind: match elf.header.e_type {
                goblin::elf::header::ET_NONE => ElfType::None,
                goblin::elf::header::ET_REL => ElfType::Relocatable,
                goblin::elf::header::ET_EXEC => ElfType::Executable,
                goblin::elf::header::ET_DYN => ElfType::SharedObject,
                goblin::elf::header::ET_CORE => ElfType::Core,
                _ => {
                    return Err(ElfError::UnknownElfType {
                        path: path.to_path_buf(),
                    });
                }
            },
            needed,
            soname,
            interpreter: elf.interpreter.map(str::to_string),
        })
    }

    #[cfg(test)]
    pub(crate) fn new_for_testing(
        kind: ElfType,
        needed: &[&str],
        soname: Option<&str>,
        interpreter: Option<&str>,
    ) -> Self {
        Self {
            kind,
            needed: needed.iter().map(|s| (*s).to_string()).collect(),
            soname: soname.map(str::to_string),
            interpreter: interpreter.map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{testdata_dir, ElfBuilder};
    use tempfile::TempDir;

    #[test]
    fn test_parse_shared_object() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("libcap.so.2.69");
        ElfBuilder::shared_object("libcap.so.2")
            .needed("libc.so.6")
            .needed("libpsx.so.2")
            .write(&path);

        let elf = Elf::from_path(&path).expect("Should parse synthetic shared object");
        assert_eq!(elf.kind(), &ElfType::SharedObject);
        assert_eq!(elf.soname(), Some("libcap.so.2"));
        assert_eq!(elf.needed(), ["libc.so.6", "libpsx.so.2"]);
        assert_eq!(elf.interpreter(), None);
        assert!(!elf.is_executable());
    }

    #[test]
    fn test_parse_pie_executable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("capsh");
        ElfBuilder::executable("/lib/ld-linux-x86-64.so.2")
            .needed("libcap.so.2")
            .write(&path);

        let elf = Elf::from_path(&path).expect("Should parse synthetic executable");
        assert_eq!(elf.soname(), None);
        assert_eq!(elf.interpreter(), Some("/lib/ld-linux-x86-64.so.2"));
        assert!(elf.is_executable());
    }

    #[test]
    fn test_truncated_elf_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.so");
        let mut bytes = ElfBuilder::shared_object("libbroken.so.1").build();
        // Keep the header, but point the program headers past the end of the file.
        bytes.truncate(80);
        fs::write(&path, bytes).unwrap();

        match Elf::from_path(&path) {
            Err(ElfError::ParseFailed { path: p, .. }) => assert_eq!(p, path),
            other => panic!("Expected ParseFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_elf_file_too_small() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tiny");
        fs::write(&path, "not an elf file").unwrap();
        assert!(matches!(
            Elf::from_path(&path),
            Err(ElfError::FileTooSmall { .. })
        ));
    }

    #[test]
    fn test_elf_not_elf_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("text");
        fs::write(
            &path,
            "This is not an ELF file. It's just a text file for testing, long enough \
             to get past the header size check.",
        )
        .unwrap();
        assert!(matches!(
            Elf::from_path(&path),
            Err(ElfError::NotElfFile { .. })
        ));
    }

    #[test]
    fn test_gcc_built_library_fixture() {
        // Generated by build.rs when gcc is available.
        let path = testdata_dir().join("pkgroot/usr/lib/libhello.so.1");
        if !path.exists() {
            eprintln!(
                "Skipping test: fixture '{}' not found (gcc unavailable at build time).",
                path.display()
            );
            return;
        }
        let elf = Elf::from_path(&path).expect("Should parse gcc-built library");
        assert_eq!(elf.soname(), Some("libhello.so.1"));
        assert!(elf.needed().iter().any(|n| n.starts_with("libc.so")));
    }
}
