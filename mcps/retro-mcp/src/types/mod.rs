//! Typed records produced from remote command output

mod bios;
mod command;
mod hardware;
mod network;
mod package;
mod service;
mod system;

pub use bios::*;
pub use command::*;
pub use hardware::*;
pub use network::*;
pub use package::*;
pub use service::*;
pub use system::*;
