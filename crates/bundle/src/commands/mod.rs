//! Command implementations for the bundle CLI
//!
//! Each command module handles the CLI interface and delegates to
//! bundle-core for the actual work.

pub mod diff;
pub mod mutate;
