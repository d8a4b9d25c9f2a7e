//! Parsers for `vcgencmd` and device-tree output

use tracing::debug;

use crate::types::{ThrottleState, UNKNOWN_MODEL};

/// Value after the `=` in `key=value` style vcgencmd output, if the key
/// is the one expected
///
/// vcgencmd reports its own failures as `error=<code> error_msg=...`, which
/// must not be read as a measurement.
fn assignment_value<'a>(output: &'a str, is_key: impl Fn(&str) -> bool) -> Option<&'a str> {
    let (key, value) = output.trim().split_once('=')?;
    is_key(key.trim()).then(|| value.trim())
}

/// `vcgencmd get_throttled` output such as `throttled=0x50005`
pub fn parse_throttled(output: &str) -> ThrottleState {
    let raw = assignment_value(output, |key| key == "throttled").and_then(|value| {
        let hex = value
            .strip_prefix("0x")
            .or_else(|| value.strip_prefix("0X"))
            .unwrap_or(value);
        u32::from_str_radix(hex, 16).ok()
    });

    match raw {
        Some(bits) => ThrottleState::from_bits(bits),
        None => {
            debug!(output = %output.trim(), "unrecognized get_throttled output");
            ThrottleState::default()
        }
    }
}

/// `vcgencmd measure_volts` output such as `volt=0.8563V`
pub fn parse_voltage(output: &str) -> f64 {
    assignment_value(output, |key| key == "volt")
        .and_then(|value| value.trim_end_matches(['V', 'v']).parse::<f64>().ok())
        .unwrap_or_else(|| {
            debug!(output = %output.trim(), "unrecognized measure_volts output");
            0.0
        })
}

/// `vcgencmd measure_clock` output such as `frequency(48)=1500398464`
pub fn parse_clock(output: &str) -> u64 {
    assignment_value(output, |key| key.starts_with("frequency(") && key.ends_with(')'))
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or_else(|| {
            debug!(output = %output.trim(), "unrecognized measure_clock output");
            0
        })
}

/// `/proc/device-tree/model`, which is NUL-terminated
pub fn parse_model(output: &str) -> String {
    let model = output.replace('\0', "");
    let model = model.trim();
    if model.is_empty() {
        UNKNOWN_MODEL.to_string()
    } else {
        model.to_string()
    }
}
