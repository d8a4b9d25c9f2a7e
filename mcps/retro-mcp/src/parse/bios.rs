//! Parsers for BIOS directory enumeration

/// File extensions searched for in the BIOS directory
pub const BIOS_EXTENSIONS: &[&str] = &["bin", "rom", "bios", "zip"];

/// Paths printed by `find`, one per line
pub fn parse_bios_listing(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Final path segment
pub fn bios_display_name(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(path)
}

/// Platform a BIOS image belongs to, guessed from well-known file names
pub fn guess_bios_system(name: &str) -> &'static str {
    let name = name.to_ascii_lowercase();
    if name.contains("scph") || name.contains("psx") {
        "psx"
    } else if name.starts_with("dc_") || name.contains("dc_boot") {
        "dreamcast"
    } else if name.contains("kick") {
        "amiga"
    } else if name.contains("gba") {
        "gba"
    } else if name.contains("neogeo") {
        "neogeo"
    } else {
        "unknown"
    }
}

/// `stat -c%s` output
pub fn parse_file_size(output: &str) -> Option<u64> {
    output.trim().parse().ok()
}
