//! The `utils` module provides helpers for spawning the external tools and
//! for the few file system operations the runner performs itself.

pub mod command_runner;
pub mod file_system;
