//! Error handling utilities
//!
//! This module provides centralized error handling for the application.

use tracing::error;

use crate::error::Error;

/// Exit status for a failed run.
///
/// A failing external tool passes its own exit code through. Problems
/// with the invocation itself (missing environment, unknown subject, bad
/// settings) exit with 2, everything else with 1.
pub fn exit_code_for(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<Error>() {
        Some(err) => match err.command_exit_code() {
            Some(code) if code != 0 => code,
            _ => match err {
                Error::MissingEnvironment { .. }
                | Error::SubjectNotFound(_)
                | Error::Config(_)
                | Error::Toml(_) => 2,
                _ => 1,
            },
        },
        None => 1,
    }
}

/// Handle fatal errors and exit with appropriate status code
///
/// With `verbose` set the full error chain is printed as well.
pub fn handle_fatal_error(error: anyhow::Error, verbose: bool) -> ! {
    error!("Fatal error: {}", error);
    eprintln!("Error: {error}");

    if verbose {
        eprintln!("\nError chain:");
        for (i, cause) in error.chain().enumerate() {
            eprintln!("  {}: {}", i, cause);
        }
    }

    std::process::exit(exit_code_for(&error))
}
