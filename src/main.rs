// src/main.rs

use std::process::ExitCode;

use wyp::{cli, logging, report, run};

#[tokio::main]
async fn main() -> ExitCode {
    match run_main().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Returning (rather than exiting) drops the runtime, which kills
            // any child still attached to it.
            report::announce(&err);
            ExitCode::FAILURE
        }
    }
}

async fn run_main() -> wyp::errors::Result<()> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args).await
}
