// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Pins shared-object requirements to the version an installed provider offers.

use dashmap::DashMap;
use rayon::prelude::*;
use std::collections::BTreeSet;
use tracing::debug;

use super::dependencies::Findings;
use super::token::Token;
use crate::package::{InstalledPackages, PackageResolver};

/// Replace bare `so:` runtime tokens with `so:<name>=<version>` where an installed package
/// provides them. Each name is looked up once.
pub(crate) fn pin_shared_objects(
    mut findings: Findings,
    resolver: &dyn PackageResolver,
    installed: &InstalledPackages,
) -> Findings {
    let names: BTreeSet<&str> = findings
        .runtime
        .iter()
        .filter_map(|token| match token {
            Token::SharedObject {
                name,
                version: None,
            } => Some(name.as_str()),
            _ => None,
        })
        .collect();

    let pinned: DashMap<String, String> = DashMap::new();
    names.par_iter().for_each(|name| {
        let capability = Token::shared_object(*name).to_string();
        match resolver.resolve(&capability) {
            Some(provider) if installed.contains(&provider.package) => {
                debug!(
                    "Pinning {capability} to {} from {}",
                    provider.version, provider.package
                );
                pinned.insert((*name).to_string(), provider.version);
            }
            Some(provider) => {
                debug!("Provider {} of {capability} is not installed", provider.package);
            }
            None => debug!("No provider for {capability}"),
        }
    });

    for token in &mut findings.runtime {
        if let Token::SharedObject { name, version } = token {
            if version.is_none() {
                *version = pinned.get(name.as_str()).map(|v| v.value().clone());
            }
        }
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::Provider;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct StaticResolver {
        providers: HashMap<String, Provider>,
        lookups: AtomicUsize,
    }

    impl StaticResolver {
        fn with(mut self, capability: &str, package: &str, version: &str) -> Self {
            self.providers.insert(
                capability.to_string(),
                Provider {
                    package: package.to_string(),
                    version: version.to_string(),
                },
            );
            self
        }
    }

    impl PackageResolver for StaticResolver {
        fn resolve(&self, capability: &str) -> Option<Provider> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.providers.get(capability).cloned()
        }
    }

    #[test]
    fn test_pins_installed_providers_only() {
        let resolver = StaticResolver::default()
            .with("so:libc.so.6", "glibc", "6")
            .with("so:libz.so.1", "zlib", "1");
        let installed: InstalledPackages =
            [("glibc".to_string(), "2.39-r0".to_string())].into_iter().collect();
        let findings = Findings {
            runtime: vec![
                Token::shared_object("libc.so.6"),
                Token::shared_object("libz.so.1"),
                Token::shared_object("libfoo.so.3"),
                Token::shared_object("libc.so.6"),
                Token::command("bash"),
            ],
            ..Findings::default()
        };

        let pinned = pin_shared_objects(findings, &resolver, &installed);
        let rendered: Vec<_> = pinned.runtime.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            [
                "so:libc.so.6=6",
                "so:libz.so.1",
                "so:libfoo.so.3",
                "so:libc.so.6=6",
                "cmd:bash"
            ]
        );
        assert_eq!(resolver.lookups.load(Ordering::SeqCst), 3);
    }
}
