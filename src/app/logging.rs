//! Logging configuration and initialization

use crate::app::config::AppConfig;
use tracing::{debug, trace};
use tracing_subscriber::EnvFilter;

/// Initialize tracing/logging for the application
pub fn init_logging(config: &AppConfig) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level()))
        .with_target(config.show_target())
        .with_line_number(config.debug)
        .with_writer(std::io::stderr)
        .init();

    debug!("fs2hcp started at log level {}", config.log_level());
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());
}
