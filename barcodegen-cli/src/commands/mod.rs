//! CLI subcommands.

pub mod common;
pub mod list;
pub mod render;
