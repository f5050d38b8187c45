//! Application configuration
//!
//! Verbosity switches taken from the command line.

/// Application configuration structure
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// `-v`: debug output
    pub verbose: bool,
    /// `--debug`: trace output, wins over `verbose`
    pub debug: bool,
}

impl AppConfig {
    pub fn new(verbose: bool, debug: bool) -> Self {
        Self { verbose, debug }
    }

    /// Get the log level string based on verbosity
    pub fn log_level(&self) -> &'static str {
        if self.debug {
            "trace"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }

    /// Show module targets in log lines
    pub fn show_target(&self) -> bool {
        self.debug
    }
}
