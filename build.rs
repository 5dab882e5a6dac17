// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Build script to generate test fixtures for the `package_sca` crate.
//!
//! This script attempts to generate all required test fixtures including:
//! - A package tree with a script and a pkg-config descriptor (always generated)
//! - A shared library and a binary linked against it (requires gcc)
//! - DEB packages (requires gcc + fakeroot + dpkg-deb)
//! - RPM packages (requires gcc + rpmbuild)
//!
//! If required tools are not available, the script will skip those fixtures
//! and emit warnings. Tests will gracefully skip when fixtures are missing.

use std::env;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::Command;

/// Check if a command is available in PATH.
fn command_exists(cmd: &str) -> bool {
    Command::new("which")
        .arg(cmd)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Available tools for fixture generation.
struct AvailableTools {
    gcc: bool,
    fakeroot: bool,
    dpkg_deb: bool,
    rpmbuild: bool,
    rpmdb: bool,
}

impl AvailableTools {
    fn detect() -> Self {
        Self {
            gcc: command_exists("gcc"),
            fakeroot: command_exists("fakeroot"),
            dpkg_deb: command_exists("dpkg-deb"),
            rpmbuild: command_exists("rpmbuild"),
            rpmdb: command_exists("rpmdb"),
        }
    }

    fn can_build_deb(&self) -> bool {
        self.gcc && self.fakeroot && self.dpkg_deb
    }

    fn can_build_rpm(&self) -> bool {
        self.gcc && self.rpmbuild && self.rpmdb
    }

    fn report_missing(&self) {
        let missing: Vec<&str> = [
            ("gcc", self.gcc),
            ("fakeroot", self.fakeroot),
            ("dpkg-deb", self.dpkg_deb),
            ("rpmbuild", self.rpmbuild),
            ("rpmdb", self.rpmdb),
        ]
        .into_iter()
        .filter(|(_, available)| !available)
        .map(|(tool, _)| tool)
        .collect();

        if !missing.is_empty() {
            println!(
                "cargo:warning=Some fixture generation tools are missing: {}. Some test fixtures will not be generated.",
                missing.join(", ")
            );
        }
    }
}

fn main() {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    let testdata_dir = Path::new(&manifest_dir).join("testdata");
    let pkgroot = testdata_dir.join("pkgroot");

    fs::create_dir_all(&pkgroot).expect("Failed to create testdata directory");

    let tools = AvailableTools::detect();
    tools.report_missing();

    generate_text_fixtures(&pkgroot);

    if tools.gcc {
        generate_elf_fixtures(&pkgroot);
    }

    if tools.can_build_deb() {
        generate_deb_package(&testdata_dir, "hello");
    }

    if tools.can_build_rpm() {
        generate_rpm_package(&testdata_dir, "hello");
    }

    println!("cargo:rerun-if-changed=build.rs");
}

fn write_if_missing(path: &Path, content: &str, mode: u32) {
    if path.exists() {
        return;
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create fixture directory");
    }
    fs::write(path, content).expect("Failed to write fixture");
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .expect("Failed to set fixture permissions");
}

/// Generate text fixtures that don't require external tools.
fn generate_text_fixtures(pkgroot: &Path) {
    write_if_missing(
        &pkgroot.join("usr/bin/hello-py"),
        "#!/usr/bin/env python3\nprint('hello')\n",
        0o755,
    );
    write_if_missing(
        &pkgroot.join("usr/lib/pkgconfig/hello.pc"),
        "prefix=/usr\nlibdir=${prefix}/lib\n\nName: hello\nDescription: Hello library\nVersion: 1.0.0\nLibs: -L${libdir} -lhello\n",
        0o644,
    );
}

/// Create C source files for package binaries.
fn create_c_sources(build_dir: &Path) {
    let lib_source = r#"#include <stdio.h>

void hello_from_lib() {
    printf("Hello from shared library!\n");
}
"#;

    let bin_source = r#"#include <stdio.h>

void hello_from_lib();

int main() {
    printf("Hello from binary!\n");
    hello_from_lib();
    return 0;
}
"#;

    fs::write(build_dir.join("libhello.c"), lib_source).expect("Failed to write libhello.c");
    fs::write(build_dir.join("hello.c"), bin_source).expect("Failed to write hello.c");
}

/// Build `libhello.so.1` and a `hello` binary linked against it.
fn build_package_binaries(build_dir: &Path) -> bool {
    let lib_status = Command::new("gcc")
        .args([
            "-shared",
            "-fPIC",
            "-Wl,-soname,libhello.so.1",
            "-o",
            build_dir.join("libhello.so.1").to_str().unwrap(),
            build_dir.join("libhello.c").to_str().unwrap(),
        ])
        .status();

    if lib_status.map(|s| !s.success()).unwrap_or(true) {
        return false;
    }

    // The link step looks for the unversioned name.
    let _ = fs::remove_file(build_dir.join("libhello.so"));
    if std::os::unix::fs::symlink("libhello.so.1", build_dir.join("libhello.so")).is_err() {
        return false;
    }

    let bin_status = Command::new("gcc")
        .args([
            "-o",
            build_dir.join("hello").to_str().unwrap(),
            build_dir.join("hello.c").to_str().unwrap(),
            &format!("-L{}", build_dir.display()),
            "-lhello",
        ])
        .status();

    bin_status.map(|s| s.success()).unwrap_or(false)
}

/// Compile the binaries into a fresh temporary build directory.
fn build_in_temp(temp_dir: &Path) -> Option<std::path::PathBuf> {
    let build_dir = temp_dir.join("build");
    fs::create_dir_all(&build_dir).expect("Failed to create build directory");
    create_c_sources(&build_dir);
    build_package_binaries(&build_dir).then_some(build_dir)
}

/// Install the compiled binaries below `root`.
fn install_binaries(build_dir: &Path, root: &Path) {
    fs::create_dir_all(root.join("usr/bin")).expect("Failed to create bin directory");
    fs::create_dir_all(root.join("usr/lib")).expect("Failed to create lib directory");
    fs::copy(build_dir.join("hello"), root.join("usr/bin/hello"))
        .expect("Failed to copy hello binary");
    fs::copy(
        build_dir.join("libhello.so.1"),
        root.join("usr/lib/libhello.so.1"),
    )
    .expect("Failed to copy libhello.so.1");
}

/// Generate the gcc-built ELF objects of the fixture tree.
fn generate_elf_fixtures(pkgroot: &Path) {
    if pkgroot.join("usr/lib/libhello.so.1").exists() && pkgroot.join("usr/bin/hello").exists() {
        return;
    }

    let temp_dir = env::temp_dir().join("package_sca_build");
    let _ = fs::remove_dir_all(&temp_dir);
    fs::create_dir_all(&temp_dir).expect("Failed to create temp directory");

    match build_in_temp(&temp_dir) {
        Some(build_dir) => install_binaries(&build_dir, pkgroot),
        None => {
            println!("cargo:warning=Failed to compile test binaries, skipping ELF fixture generation");
        }
    }

    let _ = fs::remove_dir_all(&temp_dir);
}

/// Generate a DEB package.
fn generate_deb_package(testdata_dir: &Path, package_name: &str) {
    let deb_file = testdata_dir.join(format!("{package_name}.deb"));
    if deb_file.exists() {
        return;
    }

    let temp_dir = env::temp_dir().join(format!("package_sca_deb_{package_name}"));
    let _ = fs::remove_dir_all(&temp_dir);
    fs::create_dir_all(&temp_dir).expect("Failed to create temp directory");

    let package_dir = temp_dir.join(format!("deb_{package_name}"));
    let debian_dir = package_dir.join("DEBIAN");
    fs::create_dir_all(&debian_dir).expect("Failed to create DEBIAN directory");

    let control_content = format!(
        "Package: {package_name}
Version: 1.0.0
Section: test
Priority: optional
Architecture: amd64
Maintainer: Test <test@example.com>
Description: Test package for dependency inference
"
    );
    fs::write(debian_dir.join("control"), control_content).expect("Failed to write control file");

    let Some(build_dir) = build_in_temp(&temp_dir) else {
        println!("cargo:warning=Failed to build binaries for DEB package");
        let _ = fs::remove_dir_all(&temp_dir);
        return;
    };
    install_binaries(&build_dir, &package_dir);

    let status = Command::new("fakeroot")
        .args([
            "dpkg-deb",
            "--build",
            package_dir.to_str().unwrap(),
            deb_file.to_str().unwrap(),
        ])
        .status();

    if status.map(|s| !s.success()).unwrap_or(true) {
        println!("cargo:warning=Failed to build DEB package");
    }

    let _ = fs::remove_dir_all(&temp_dir);
}

/// Generate an RPM package.
fn generate_rpm_package(testdata_dir: &Path, package_name: &str) {
    let rpm_file = testdata_dir.join(format!("{package_name}.rpm"));
    if rpm_file.exists() {
        return;
    }

    let temp_dir = env::temp_dir().join(format!("package_sca_rpm_{package_name}"));
    let _ = fs::remove_dir_all(&temp_dir);
    fs::create_dir_all(&temp_dir).expect("Failed to create temp directory");

    let rpmbuild_dir = temp_dir.join("rpmbuild");
    let rpmdb_dir = temp_dir.join("rpmdb");
    let spec_dir = rpmbuild_dir.join("SPECS");
    let package_buildroot = rpmbuild_dir
        .join("BUILDROOT")
        .join(format!("{package_name}-1.0.0-1.x86_64"));

    fs::create_dir_all(&spec_dir).expect("Failed to create SPECS directory");
    fs::create_dir_all(&rpmdb_dir).expect("Failed to create rpmdb directory");

    let _ = Command::new("rpmdb")
        .args(["--initdb", "--dbpath", rpmdb_dir.to_str().unwrap()])
        .status();

    let spec_content = format!(
        "Name:           {package_name}
Version:        1.0.0
Release:        1
Summary:        Test package for dependency inference
License:        MIT
BuildArch:      x86_64
AutoReqProv:    no

%description
Test package for dependency inference

%files
/usr/bin/hello
/usr/lib/libhello.so.1
"
    );
    let spec_path = spec_dir.join(format!("{package_name}.spec"));
    fs::write(&spec_path, spec_content).expect("Failed to write spec file");

    let Some(build_dir) = build_in_temp(&temp_dir) else {
        println!("cargo:warning=Failed to build binaries for RPM package");
        let _ = fs::remove_dir_all(&temp_dir);
        return;
    };
    install_binaries(&build_dir, &package_buildroot);

    let status = Command::new("rpmbuild")
        .args([
            "--dbpath",
            rpmdb_dir.to_str().unwrap(),
            "--define",
            &format!("_topdir {}", rpmbuild_dir.display()),
            "--define",
            &format!("_builddir {}/BUILD", rpmbuild_dir.display()),
            "--define",
            &format!("_rpmdir {}/RPMS", rpmbuild_dir.display()),
            "--define",
            &format!("_sourcedir {}/SOURCES", rpmbuild_dir.display()),
            "--define",
            &format!("_specdir {}", spec_dir.display()),
            "--define",
            &format!("_srcrpmdir {}/SRPMS", rpmbuild_dir.display()),
            "--buildroot",
            package_buildroot.to_str().unwrap(),
            "-bb",
            spec_path.to_str().unwrap(),
        ])
        .output();

    match status {
        Ok(output) if output.status.success() => {
            let rpm_output =
                rpmbuild_dir.join(format!("RPMS/x86_64/{package_name}-1.0.0-1.x86_64.rpm"));
            if let Err(e) = fs::copy(&rpm_output, &rpm_file) {
                println!("cargo:warning=Failed to copy RPM to testdata: {e}");
            }
        }
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if !stderr.contains("Unable to open sqlite database")
                && !stderr.contains("cannot open Packages database")
            {
                println!("cargo:warning=rpmbuild failed: {stderr}");
            }
        }
        Err(e) => {
            println!("cargo:warning=Failed to run rpmbuild: {e}");
        }
    }

    let _ = fs::remove_dir_all(&temp_dir);
}
