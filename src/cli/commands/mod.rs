//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. This allows:
//! - Single binary with subcommands (`archlint validate`, `archlint chain`)
//! - Shared settings loading and report emission
//! - Consistent global flag handling

pub mod chain;
pub mod dispatcher;
pub mod report;
pub mod validate;

pub use dispatcher::{Command, CommandDispatcher, CommandResult, Streams};
