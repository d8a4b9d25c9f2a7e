//! Parsers for `systemctl` output

use std::sync::LazyLock;

use regex::Regex;

use crate::types::{Service, ServiceStatus};

static UNIT_NOT_FOUND_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Unit (\S+?) (?:could not be found|not found)").expect("Invalid regex"));

/// Split off the first `count` whitespace-separated fields, returning them
/// with the untouched remainder of the line
fn split_leading_fields(line: &str, count: usize) -> Option<(Vec<&str>, &str)> {
    let mut fields = Vec::with_capacity(count);
    let mut rest = line.trim_start();
    for _ in 0..count {
        if rest.is_empty() {
            return None;
        }
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        fields.push(&rest[..end]);
        rest = rest[end..].trim_start();
    }
    Some((fields, rest.trim_end()))
}

/// `systemctl list-units --type=service --no-pager`
///
/// ```text
///   UNIT                  LOAD   ACTIVE SUB     DESCRIPTION
///   avahi-daemon.service  loaded active running Avahi mDNS/DNS-SD Stack
/// ● bluetooth.service     loaded failed failed  Bluetooth service
/// ```
///
/// The header, the legend and the summary footer are skipped because
/// their first column is not a unit name.
pub fn parse_services(output: &str) -> Vec<Service> {
    output
        .lines()
        .filter_map(|line| {
            let line = line.trim_start().trim_start_matches(['●', '*']);
            let (fields, description) = split_leading_fields(line, 4)?;
            let unit = fields[0];
            let (name, _suffix) = unit.split_once('.')?;
            if name.is_empty() {
                return None;
            }

            Some(Service {
                name: name.to_string(),
                description: description.to_string(),
                status: ServiceStatus::from_active_state(fields[2]),
            })
        })
        .collect()
}

/// Units systemctl reported as nonexistent, without their `.service` suffix
pub fn parse_missing_units(stderr: &str) -> Vec<String> {
    let mut missing: Vec<String> = Vec::new();
    for caps in UNIT_NOT_FOUND_REGEX.captures_iter(stderr) {
        let unit = caps[1].trim_matches(|c| c == '\'' || c == '"');
        let name = unit.strip_suffix(".service").unwrap_or(unit).to_string();
        if !missing.contains(&name) {
            missing.push(name);
        }
    }
    missing
}
