//! Parsers for the six core telemetry commands
//!
//! Each parser takes raw stdout and never fails: output that doesn't have
//! the expected shape yields the field's default.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::types::{DiskUsage, LoadAverage, MemoryUsage, UNKNOWN_HOSTNAME};

static TEMPERATURE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"temp=(-?\d+(?:\.\d+)?)'C").expect("Invalid regex"));

static LOAD_AVERAGE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"load averages?:\s*(\d+(?:\.\d+)?),?\s+(\d+(?:\.\d+)?),?\s+(\d+(?:\.\d+)?)")
        .expect("Invalid regex")
});

/// `hostname` output, trimmed; `"unknown"` when empty
pub fn parse_hostname(output: &str) -> String {
    let hostname = output.trim();
    if hostname.is_empty() {
        UNKNOWN_HOSTNAME.to_string()
    } else {
        hostname.to_string()
    }
}

/// `vcgencmd measure_temp` output such as `temp=55.4'C`
pub fn parse_temperature(output: &str) -> f64 {
    let parsed = TEMPERATURE_REGEX
        .captures(output)
        .and_then(|caps| caps[1].parse::<f64>().ok());

    parsed.unwrap_or_else(|| {
        debug!(output = %output.trim(), "unrecognized temperature output");
        0.0
    })
}

/// `free -b` output
///
/// The header row has no label and is skipped. The first labelled row
/// (normally `Mem:`) supplies total/used/free from its first three numeric
/// columns; `shared`, `buff/cache` and `available` are ignored.
pub fn parse_memory(output: &str) -> MemoryUsage {
    let row = output.lines().find_map(|line| {
        let mut fields = line.split_whitespace();
        let label = fields.next()?;
        label.ends_with(':').then_some(fields)
    });

    let Some(fields) = row else {
        debug!("no labelled row in free output");
        return MemoryUsage::default();
    };

    let numbers: Vec<u64> = fields.filter_map(|f| f.parse().ok()).take(3).collect();
    match numbers[..] {
        [total, used, free] => MemoryUsage { total, used, free },
        _ => {
            debug!(columns = numbers.len(), "free row has fewer than three numeric columns");
            MemoryUsage::default()
        }
    }
}

/// `df -B1 /` output
///
/// Uses the row mounted at `/`. Long device names make df wrap a row onto
/// two lines, so fields are accumulated until a row is complete.
pub fn parse_disk(output: &str) -> DiskUsage {
    let mut pending: Vec<&str> = Vec::new();

    for line in output.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.first() == Some(&"Filesystem") {
            continue;
        }

        pending.extend(fields);
        if pending.len() < 6 {
            continue;
        }

        let row = std::mem::take(&mut pending);
        if row.last() != Some(&"/") {
            continue;
        }

        let column = |i: usize| row.get(i).and_then(|f| f.parse::<u64>().ok());
        if let (Some(total), Some(used), Some(free)) = (column(1), column(2), column(3)) {
            return DiskUsage { total, used, free };
        }
    }

    debug!("no root filesystem row in df output");
    DiskUsage::default()
}

/// The `load average: a, b, c` suffix of `uptime`
pub fn parse_load_average(output: &str) -> LoadAverage {
    let parsed = LOAD_AVERAGE_REGEX.captures(output).and_then(|caps| {
        let value = |i: usize| caps[i].parse::<f64>().ok();
        Some(LoadAverage::new(value(1)?, value(2)?, value(3)?))
    });

    parsed.unwrap_or_else(|| {
        debug!(output = %output.trim(), "no load average in uptime output");
        LoadAverage::default()
    })
}

/// `/proc/uptime` output, truncated to whole seconds
pub fn parse_uptime(output: &str) -> u64 {
    let seconds = output
        .split_whitespace()
        .next()
        .and_then(|field| field.parse::<f64>().ok())
        .filter(|secs| secs.is_finite() && *secs >= 0.0);

    match seconds {
        Some(secs) => secs.trunc() as u64,
        None => {
            debug!(output = %output.trim(), "unrecognized /proc/uptime output");
            0
        }
    }
}
