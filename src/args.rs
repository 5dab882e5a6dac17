// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "package_sca")]
#[command(about = "Infers runtime dependencies and provided capabilities of a package")]
pub(crate) struct Args {
    /// Path to the package tree, or a deb or rpm package file.
    pub package: PathBuf,

    /// Package name.
    #[arg(long)]
    pub name: String,

    /// Package version, without epoch.
    #[arg(long = "version")]
    pub package_version: String,

    /// Package epoch.
    #[arg(long, default_value_t = 0)]
    pub epoch: u64,

    /// Another package of the same build, as NAME=PATH. May be repeated.
    #[arg(long = "relative", value_name = "NAME=PATH", value_parser = parse_relative)]
    pub relatives: Vec<(String, PathBuf)>,

    #[arg(
        long,
        value_name = "FILE",
        long_help = "Path to a JSON file of dependencies declared by the package author.\n\
                Keys are runtime, provides and vendored, each a list of tokens.\n\
                Missing keys are empty."
    )]
    pub declared: Option<PathBuf>,

    #[arg(
        long,
        value_name = "FILE",
        long_help = "Path to a text file of installed packages.\n\
                Each line is name=version.\n\
                Empty lines and lines starting with # are ignored."
    )]
    pub installed: Option<PathBuf>,

    /// Record provided capabilities as vendored.
    #[arg(long)]
    pub no_provides: bool,

    /// Do not infer runtime dependencies.
    #[arg(long)]
    pub no_depends: bool,

    /// Do not provide commands.
    #[arg(long)]
    pub no_commands: bool,

    /// Skip scripts with invalid shebangs instead of failing.
    #[arg(long)]
    pub skip_invalid_scripts: bool,

    /// Directory to write the JSON report to, under an ARCH subdirectory.
    #[arg(long, value_name = "DIR", requires = "arch")]
    pub output_dir: Option<PathBuf>,

    /// Architecture the package was built for.
    #[arg(long, requires = "output_dir")]
    pub arch: Option<String>,

    /// Number of analysis threads. Defaults to the available parallelism.
    #[arg(long, short)]
    pub jobs: Option<usize>,

    /// Enable debug logging.
    #[arg(long, short)]
    pub verbose: bool,
}

fn parse_relative(value: &str) -> Result<(String, PathBuf), String> {
    match value.split_once('=') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => {
            Ok((name.to_string(), PathBuf::from(path)))
        }
        _ => Err(format!("expected NAME=PATH, got '{value}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse() {
        let args = Args::try_parse_from([
            "package_sca",
            "/tmp/libcap",
            "--name",
            "libcap",
            "--version",
            "2.69",
            "--relative",
            "libcap-dev=/tmp/libcap-dev",
            "--output-dir",
            "/tmp/out",
            "--arch",
            "aarch64",
        ])
        .unwrap();
        assert_eq!(args.name, "libcap");
        assert_eq!(args.package_version, "2.69");
        assert_eq!(args.epoch, 0);
        assert_eq!(
            args.relatives,
            vec![("libcap-dev".to_string(), PathBuf::from("/tmp/libcap-dev"))]
        );
        assert_eq!(args.arch.as_deref(), Some("aarch64"));
    }

    #[test]
    fn test_output_dir_requires_arch() {
        assert!(Args::try_parse_from([
            "package_sca",
            "/tmp/libcap",
            "--name",
            "libcap",
            "--version",
            "2.69",
            "--output-dir",
            "/tmp/out",
        ])
        .is_err());
    }

    #[test]
    fn test_parse_relative() {
        assert!(parse_relative("foo").is_err());
        assert!(parse_relative("=/tmp").is_err());
        assert!(parse_relative("foo=").is_err());
    }
}
