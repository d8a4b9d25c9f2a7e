//! Parsers for dpkg listings and apt diagnostics

use std::sync::LazyLock;

use regex::Regex;

use crate::types::Package;

static MISSING_PACKAGE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)(?:Unable to locate package\s+(\S+)|Package '?([^'\s]+)'? has no installation candidate)",
    )
    .expect("Invalid regex")
});

/// Rows of `dpkg-query -W -f='${Package}|${Version}|${Status}\n'`
///
/// Rows that don't split into exactly three fields are dropped.
pub fn parse_packages(output: &str) -> Vec<Package> {
    output
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.trim().split('|').collect();
            let [name, version, status] = fields[..] else {
                return None;
            };
            if name.is_empty() {
                return None;
            }

            Some(Package {
                name: name.to_string(),
                version: version.to_string(),
                installed: is_installed_status(status),
            })
        })
        .collect()
}

/// dpkg status such as `install ok installed` or `deinstall ok config-files`
///
/// Only the last word is the package state.
fn is_installed_status(status: &str) -> bool {
    status
        .split_whitespace()
        .last()
        .is_some_and(|state| state == "installed")
}

/// Package names apt reported as unknown or uninstallable, in order of
/// first appearance
pub fn parse_missing_packages(stderr: &str) -> Vec<String> {
    let mut missing: Vec<String> = Vec::new();
    for caps in MISSING_PACKAGE_REGEX.captures_iter(stderr) {
        let Some(name) = caps.get(1).or_else(|| caps.get(2)) else {
            continue;
        };
        let name = name.as_str().to_string();
        if !missing.contains(&name) {
            missing.push(name);
        }
    }
    missing
}
