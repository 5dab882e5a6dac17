// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.
mod args;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use args::Args;
use package_sca::package::{
    InstalledPackages, Package, PackageHandle, PackageIdentity, PackageOptions,
};
use package_sca::report::{summarize_report, write_report, Report};
use package_sca::sca::{analyze, AnalysisOptions, AuthoringErrorPolicy, Dependencies};

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .context("Failed to configure analysis threads")?;
    }

    let package = open_package(&args)?;
    let mut dependencies = package.declared_dependencies().clone();
    let options = AnalysisOptions {
        policy: if args.skip_invalid_scripts {
            AuthoringErrorPolicy::SkipArtifact
        } else {
            AuthoringErrorPolicy::Abort
        },
        ..AnalysisOptions::default()
    };
    let analysis = analyze(&package, &mut dependencies, &options)
        .with_context(|| format!("Failed to analyze package: {}", args.name))?;

    let report = Report::new(&package, &analysis, &dependencies);
    if let (Some(output_dir), Some(arch)) = (&args.output_dir, &args.arch) {
        let path = write_report(&report, output_dir, arch).context("Failed to write report")?;
        info!("Report written: file={}", path.display());
    }
    summarize_report(&report);
    Ok(())
}

/// `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let env_filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("package_sca=debug")
    } else {
        EnvFilter::new("package_sca=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();

    debug!("Logging initialized (verbose={verbose})");
}

/// Open the package and everything the command line says about it.
///
/// # Errors
/// Returns an error if a package tree cannot be opened or an input file cannot be read.
fn open_package(args: &Args) -> Result<Package> {
    let identity = PackageIdentity::new(&args.name, &args.package_version, args.epoch);
    let mut package = Package::open(identity, &args.package)
        .with_context(|| format!("Failed to open package: {}", args.package.display()))?;

    for (name, path) in &args.relatives {
        package = package
            .with_relative(name, path)
            .with_context(|| format!("Failed to open relative package {name}: {}", path.display()))?;
    }

    let declared = match &args.declared {
        Some(path) => Dependencies::from_file(path)?,
        None => Dependencies::default(),
    };
    let installed = match &args.installed {
        Some(path) => InstalledPackages::from_file(path)
            .with_context(|| "Failed to read installed packages file")?,
        None => InstalledPackages::empty(),
    };

    Ok(package
        .with_options(PackageOptions {
            no_provides: args.no_provides,
            no_depends: args.no_depends,
            no_commands: args.no_commands,
        })
        .with_declared_dependencies(declared)
        .with_installed_packages(installed))
}
