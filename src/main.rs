use std::process::ExitCode;

use clap::Parser as _;
use delete_workflow_runs::cli::{self, Cli};
use tracing::info;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    cli::init_tracing();

    match cli::run(&cli).await {
        Ok(summary) => {
            info!(
                "done: {} workflows, {} completed runs, {} deleted",
                summary.workflows, summary.collected, summary.deleted
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
