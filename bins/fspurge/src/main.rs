use std::process::ExitCode;

use clap::Parser;

use fspurge_cli::{exit_code, run, Environment, PurgeArgs};
use fspurge_logging::init_logging;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = PurgeArgs::parse();

    let _guard = match init_logging(&args.log_config()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("fspurge: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result: anyhow::Result<_> = run(&args, &Environment::from_process()).await;
    if let Err(e) = &result {
        tracing::error!("{e:#}");
    }
    exit_code(&result)
}
