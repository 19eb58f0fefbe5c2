//! CLI argument parsing and command handling.

mod args;
pub mod validators;

pub use args::{Cli, Command, ConfigAction, MonitorArgs};
