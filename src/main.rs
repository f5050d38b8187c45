use clap::Parser;
use tracing::info;

use fs2hcp::app::{handle_fatal_error, init_logging};
use fs2hcp::cli::{execute, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = cli.app_config();
    init_logging(&config);

    match execute(&cli).await {
        Ok(summary) => info!(
            "Subject {} done: {} stages run, {} skipped",
            cli.subject,
            summary.executed.len(),
            summary.skipped.len()
        ),
        Err(e) => handle_fatal_error(e, config.verbose || config.debug),
    }
}
