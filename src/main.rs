use std::process::ExitCode;

use trierouter::cli::run_cli;
use trierouter::logging::{init_logging, LogConfig};

fn main() -> anyhow::Result<ExitCode> {
    init_logging(&LogConfig::from_env())?;
    run_cli()
}
