//! The `~M` command grammar spoken by FlashForge controllers on TCP port 8899.

pub mod command;

pub use command::{Command, CommandError};

/// Default TCP port of the controller's status protocol.
pub const DEFAULT_PORT: u16 = 8899;
