//! Command-line interface for tune-sorter.

mod commands;

pub use commands::{Cli, run};
