//! Command-line entry point: argument parsing and the conversion run.

pub mod args;
pub mod run;

pub use args::Cli;
pub use run::execute;
