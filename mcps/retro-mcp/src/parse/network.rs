//! Parser for `ip -o -4 addr show`

use crate::types::NetworkInterface;

/// One line per address:
///
/// ```text
/// 2: eth0    inet 192.168.1.50/24 brd 192.168.1.255 scope global eth0\       valid_lft forever
/// ```
///
/// Lines without an `inet` address are dropped.
pub fn parse_network_interfaces(output: &str) -> Vec<NetworkInterface> {
    output
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            let name = fields.get(1)?.trim_end_matches(':');
            let inet = fields.iter().position(|f| *f == "inet")?;
            let (address, prefix) = fields.get(inet + 1)?.split_once('/')?;

            Some(NetworkInterface {
                name: name.to_string(),
                address: address.to_string(),
                prefix_len: prefix.parse().ok()?,
            })
        })
        .collect()
}
