//! CLI library modules for the annoview binary.
//!
//! Commands live here rather than in the binary so they can be tested
//! without spawning a process.

pub mod commands;
pub mod output;
pub mod parser;
pub mod utils;

pub use parser::{Cli, Commands};
