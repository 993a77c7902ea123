//! Library module for the hdbstudio binary.
//!
//! Exposes the CLI definition and command handlers so they can be tested
//! without spawning the binary. The binary itself lives in `main.rs`.

pub mod cli;
pub mod commands;
pub mod output;
pub mod transport;

pub use cli::{Cli, Command, GlobalArgs};
