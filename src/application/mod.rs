//! Application layer - use cases and services

pub mod commands;
pub mod watch_service;

pub use commands::{Cli, Commands, CommandExecutor};
pub use watch_service::{CycleReport, WatchService};
