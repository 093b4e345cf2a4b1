//! CLI library components for doi-sync.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
pub mod types;
