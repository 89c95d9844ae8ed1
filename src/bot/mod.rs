//! Command parsing and message handling.

pub mod dispatcher;

pub use dispatcher::{handle_message, parse_command, Command};
