//! Network interface types

use serde::{Deserialize, Serialize};

/// An IPv4 address bound to an interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInterface {
    pub name: String,
    pub address: String,
    pub prefix_len: u8,
}
