//! Pure parsers turning command output into typed values
//!
//! None of these functions fail. Malformed output degrades to a documented
//! default (zero, `"unknown"`, or an empty list) and is logged at `debug`.

pub mod bios;
pub mod hardware;
pub mod network;
pub mod packages;
pub mod services;
pub mod system;

pub use bios::{bios_display_name, guess_bios_system, parse_bios_listing, parse_file_size, BIOS_EXTENSIONS};
pub use hardware::{parse_clock, parse_model, parse_throttled, parse_voltage};
pub use network::parse_network_interfaces;
pub use packages::{parse_missing_packages, parse_packages};
pub use services::{parse_missing_units, parse_services};
pub use system::{
    parse_disk, parse_hostname, parse_load_average, parse_memory, parse_temperature, parse_uptime,
};
