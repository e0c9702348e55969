//! CLI subcommands.

pub mod electrodes;
pub mod process;
pub mod simulate;
