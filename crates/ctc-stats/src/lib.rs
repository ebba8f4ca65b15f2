// Library root: exposes the CLI and config modules so integration tests can
// drive them without spawning the binary.

pub mod cli;
pub mod config;
