//! Command-line interface for metrotube.

mod commands;
mod icons;

pub use commands::{is_verbose, run};
