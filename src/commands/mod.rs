//! Command handlers for the CLI.

pub mod update;
