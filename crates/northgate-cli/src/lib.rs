//! Northgate CLI: option resolution and record output for the `northgate`
//! binary.

pub mod config;
pub mod output;

pub use config::{resolve_options, OptionOverrides};
pub use output::{write_records, OutputFormat};
