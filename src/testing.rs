// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Test helpers: a writer for minimal ELF64 objects and a builder for on-disk package trees.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const ET_DYN: u16 = 3;
const EM_X86_64: u16 = 62;
const PT_LOAD: u32 = 1;
const PT_DYNAMIC: u32 = 2;
const PT_INTERP: u32 = 3;
const DT_NULL: u64 = 0;
const DT_NEEDED: u64 = 1;
const DT_STRTAB: u64 = 5;
const DT_STRSZ: u64 = 10;
const DT_SONAME: u64 = 14;
const EHDR_SIZE: usize = 64;
const PHDR_SIZE: usize = 56;
const DYN_SIZE: usize = 16;

pub(crate) fn testdata_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

/// Builds little-endian ELF64 objects carrying only what linkage analysis reads:
/// `DT_NEEDED`, `DT_SONAME` and `PT_INTERP`. No section headers are emitted.
pub(crate) struct ElfBuilder {
    needed: Vec<String>,
    soname: Option<String>,
    interpreter: Option<String>,
}

impl ElfBuilder {
    pub(crate) fn shared_object(soname: &str) -> Self {
        Self {
            needed: Vec::new(),
            soname: Some(soname.to_string()),
            interpreter: None,
        }
    }

    pub(crate) fn executable(interpreter: &str) -> Self {
        Self {
            needed: Vec::new(),
            soname: None,
            interpreter: Some(interpreter.to_string()),
        }
    }

    pub(crate) fn needed(mut self, name: &str) -> Self {
        self.needed.push(name.to_string());
        self
    }

    pub(crate) fn write(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, self.build()).unwrap();
        if self.interpreter.is_some() {
            fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
        }
    }

    pub(crate) fn build(&self) -> Vec<u8> {
        let phnum = if self.interpreter.is_some() { 3 } else { 2 };
        let interp_off = EHDR_SIZE + phnum * PHDR_SIZE;
        let interp = self
            .interpreter
            .as_ref()
            .map(|i| {
                let mut bytes = i.as_bytes().to_vec();
                bytes.push(0);
                bytes
            })
            .unwrap_or_default();

        // String table: leading NUL, then every name NUL-terminated.
        let strtab_off = interp_off + interp.len();
        let mut strtab = vec![0u8];
        let mut dyns: Vec<(u64, u64)> = Vec::new();
        for name in &self.needed {
            dyns.push((DT_NEEDED, strtab.len() as u64));
            strtab.extend_from_slice(name.as_bytes());
            strtab.push(0);
        }
        if let Some(soname) = &self.soname {
            dyns.push((DT_SONAME, strtab.len() as u64));
            strtab.extend_from_slice(soname.as_bytes());
            strtab.push(0);
        }
        dyns.push((DT_STRTAB, strtab_off as u64));
        dyns.push((DT_STRSZ, strtab.len() as u64));
        dyns.push((DT_NULL, 0));

        let dyn_off = (strtab_off + strtab.len()).next_multiple_of(8);
        let dyn_len = dyns.len() * DYN_SIZE;
        let total = dyn_off + dyn_len;

        let mut out = Vec::with_capacity(total);
        // e_ident
        out.extend_from_slice(&[0x7f, b'E', b'L', b'F', 2, 1, 1, 0]);
        out.extend_from_slice(&[0u8; 8]);
        out.extend_from_slice(&ET_DYN.to_le_bytes());
        out.extend_from_slice(&EM_X86_64.to_le_bytes());
        out.extend_from_slice(&1u32.to_le_bytes()); // e_version
        out.extend_from_slice(&0u64.to_le_bytes()); // e_entry
        out.extend_from_slice(&(EHDR_SIZE as u64).to_le_bytes()); // e_phoff
        out.extend_from_slice(&0u64.to_le_bytes()); // e_shoff
        out.extend_from_slice(&0u32.to_le_bytes()); // e_flags
        out.extend_from_slice(&(EHDR_SIZE as u16).to_le_bytes());
        out.extend_from_slice(&(PHDR_SIZE as u16).to_le_bytes());
        out.extend_from_slice(&(phnum as u16).to_le_bytes());
        out.extend_from_slice(&64u16.to_le_bytes()); // e_shentsize
        out.extend_from_slice(&0u16.to_le_bytes()); // e_shnum
        out.extend_from_slice(&0u16.to_le_bytes()); // e_shstrndx

        if self.interpreter.is_some() {
            push_phdr(&mut out, PT_INTERP, 4, interp_off, interp.len(), 1);
        }
        push_phdr(&mut out, PT_LOAD, 4, 0, total, 0x1000);
        push_phdr(&mut out, PT_DYNAMIC, 6, dyn_off, dyn_len, 8);

        out.extend_from_slice(&interp);
        out.extend_from_slice(&strtab);
        out.resize(dyn_off, 0);
        for (tag, val) in dyns {
            out.extend_from_slice(&tag.to_le_bytes());
            out.extend_from_slice(&val.to_le_bytes());
        }
        out
    }
}

fn push_phdr(out: &mut Vec<u8>, p_type: u32, flags: u32, offset: usize, size: usize, align: u64) {
    out.extend_from_slice(&p_type.to_le_bytes());
    out.extend_from_slice(&flags.to_le_bytes());
    out.extend_from_slice(&(offset as u64).to_le_bytes()); // p_offset
    out.extend_from_slice(&(offset as u64).to_le_bytes()); // p_vaddr
    out.extend_from_slice(&(offset as u64).to_le_bytes()); // p_paddr
    out.extend_from_slice(&(size as u64).to_le_bytes()); // p_filesz
    out.extend_from_slice(&(size as u64).to_le_bytes()); // p_memsz
    out.extend_from_slice(&align.to_le_bytes());
}

/// A package tree rooted in a temporary directory. Paths are given as package paths (`/usr/lib/...`).
pub(crate) struct TreeBuilder {
    root: TempDir,
}

impl TreeBuilder {
    pub(crate) fn new() -> Self {
        Self {
            root: TempDir::new().unwrap(),
        }
    }

    pub(crate) fn path(&self) -> &Path {
        self.root.path()
    }

    fn host_path(&self, package_path: &str) -> PathBuf {
        let host = self.root.path().join(package_path.trim_start_matches('/'));
        if let Some(parent) = host.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        host
    }

    pub(crate) fn file(self, package_path: &str, content: &str) -> Self {
        fs::write(self.host_path(package_path), content).unwrap();
        self
    }

    pub(crate) fn executable_file(self, package_path: &str, content: &str) -> Self {
        let host = self.host_path(package_path);
        fs::write(&host, content).unwrap();
        fs::set_permissions(&host, fs::Permissions::from_mode(0o755)).unwrap();
        self
    }

    pub(crate) fn elf(self, package_path: &str, elf: &ElfBuilder) -> Self {
        elf.write(&self.host_path(package_path));
        self
    }

    pub(crate) fn symlink(self, package_path: &str, target: &str) -> Self {
        std::os::unix::fs::symlink(target, self.host_path(package_path)).unwrap();
        self
    }
}
