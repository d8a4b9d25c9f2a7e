//! BIOS image types

use serde::{Deserialize, Serialize};

/// A BIOS image found in the emulator BIOS directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiosFile {
    /// Final path segment
    pub name: String,
    pub path: String,
    /// Platform guessed from the file name
    pub system: String,
    pub present: bool,
    pub required: bool,
    /// Size in bytes, if the size query succeeded
    pub size: Option<u64>,
}
