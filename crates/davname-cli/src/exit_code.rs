//! Process exit codes.
//!
//! Scripts can tell a broken configuration apart from other failures.

/// Command completed successfully.
pub const SUCCESS: u8 = 0;

/// General failure (I/O, server startup, bad arguments to a command).
pub const ERROR: u8 = 1;

/// The configuration file or a directive in it is invalid.
pub const CONFIG_ERROR: u8 = 2;
