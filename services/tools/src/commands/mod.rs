//! Subcommand implementations

pub mod monitor;
pub mod publish;
