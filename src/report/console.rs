// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Formats and prints report summaries to the console.

use comfy_table::{Cell, Table};

use super::Report;

/// Summarize the report to the console.
///
/// Prints the package, artifact and dependency statistics, the inferred dependencies and any
/// artifacts that had to be skipped.
pub fn summarize_report(report: &Report<'_>) {
    println!(
        "Package: {}-{}-r{}",
        report.package.name, report.package.version, report.package.epoch
    );
    println!("Source: {}\n", report.source);

    println!("{}\n", artifact_table(report));
    println!("{}\n", elf_table(report));
    println!("{}\n", dependency_table(report));

    if !report.dependencies.is_empty() {
        println!("{}\n", tokens_table(report));
    }

    if !report.diagnostics.is_empty() {
        println!("{}", diagnostics_table(report));
        println!(
            "\nTotal: {} artifact(s) skipped",
            report.diagnostics.len()
        );
    }
}

/// Create a table with the default preset styling.
fn default_table_preset() -> Table {
    let mut table = Table::new();
    table
        .load_preset(comfy_table::presets::UTF8_FULL_CONDENSED)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS)
        .set_content_arrangement(comfy_table::ContentArrangement::Dynamic);
    table
}

fn header(first: &str, second: &str) -> Vec<Cell> {
    vec![
        Cell::new(first).add_attribute(comfy_table::Attribute::Bold),
        Cell::new(second).add_attribute(comfy_table::Attribute::Bold),
    ]
}

fn total_row(total: usize) -> Vec<Cell> {
    vec![
        Cell::new("Total").add_attribute(comfy_table::Attribute::Bold),
        Cell::new(total).add_attribute(comfy_table::Attribute::Bold),
    ]
}

/// Create a table showing artifact kind statistics.
fn artifact_table(report: &Report) -> Table {
    let totals = &report.totals.artifacts;
    let mut table = default_table_preset();
    table
        .set_header(header("Artifact", "Count"))
        .add_row(vec![Cell::new("ELF objects"), Cell::new(totals.elfs)])
        .add_row(vec![Cell::new("Scripts"), Cell::new(totals.scripts)])
        .add_row(vec![Cell::new("pkg-config"), Cell::new(totals.pkg_config)])
        .add_row(vec![Cell::new("ld.so.conf.d"), Cell::new(totals.ld_so_conf)])
        .add_row(vec![Cell::new("Symlinks"), Cell::new(totals.symlinks)])
        .add_row(vec![Cell::new("Other files"), Cell::new(totals.files)])
        .add_row(vec![Cell::new("Skipped"), Cell::new(report.totals.skipped)])
        .add_row(total_row(totals.total));
    table
}

/// Create a table showing ELF object statistics.
fn elf_table(report: &Report) -> Table {
    let totals = &report.totals.elfs;
    let mut table = default_table_preset();
    table
        .set_header(header("ELF Type", "Count"))
        .add_row(vec![Cell::new("Executables"), Cell::new(totals.executables)])
        .add_row(vec![
            Cell::new("Shared libraries"),
            Cell::new(totals.shared_libraries),
        ])
        .add_row(vec![Cell::new("Other"), Cell::new(totals.other)])
        .add_row(total_row(totals.total));
    table
}

/// Create a table showing dependency statistics.
fn dependency_table(report: &Report) -> Table {
    let totals = &report.totals.dependencies;
    let mut table = default_table_preset();
    table
        .set_header(header("Dependencies", "Count"))
        .add_row(vec![Cell::new("Runtime"), Cell::new(totals.runtime)])
        .add_row(vec![Cell::new("Provides"), Cell::new(totals.provides)])
        .add_row(vec![Cell::new("Vendored"), Cell::new(totals.vendored)])
        .add_row(vec![Cell::new("Shared objects"), Cell::new(totals.shared_objects)])
        .add_row(vec![Cell::new("Commands"), Cell::new(totals.commands)])
        .add_row(vec![Cell::new("pkg-config"), Cell::new(totals.pkg_config)])
        .add_row(vec![Cell::new("Packages"), Cell::new(totals.packages)])
        .add_row(vec![
            Cell::new("Unique"),
            Cell::new(totals.total_unique),
        ])
        .add_row(total_row(totals.total));
    table
}

/// Create a table listing every inferred token by set.
fn tokens_table(report: &Report) -> Table {
    let deps = report.dependencies;
    let mut table = default_table_preset();
    table.set_header(header("Set", "Token"));
    for (set, tokens) in [
        ("runtime", &deps.runtime),
        ("provides", &deps.provides),
        ("vendored", &deps.vendored),
    ] {
        for token in tokens {
            table.add_row(vec![Cell::new(set), Cell::new(token)]);
        }
    }
    table
}

/// Create a table showing skipped artifacts and why.
fn diagnostics_table(report: &Report) -> Table {
    let mut table = default_table_preset();
    table.set_header(header("Skipped Artifact", "Reason"));
    for diagnostic in report.diagnostics {
        table.add_row(vec![
            Cell::new(diagnostic.path.to_string_lossy()),
            Cell::new(&diagnostic.message),
        ]);
    }
    table
}
