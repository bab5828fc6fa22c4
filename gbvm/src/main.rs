// gbvm/src/main.rs
use std::process;

use clap::Parser;
use colored::Colorize;
use gbvm_common::config::Config;
use gbvm_common::error::{GbvmError, Result as gbvmResult};
use tracing::level_filters::LevelFilter;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::CliArgs;

fn init_logging(verbose: u8) {
    let level_filter = match verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level_filter.into())
        .with_env_var("GBVM_LOG")
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .without_time()
        .try_init();
}

fn main() {
    let cli_args = CliArgs::parse();
    init_logging(cli_args.verbose);

    if let Err(e) = run(&cli_args) {
        error!("Command failed: {:#}", e);
        eprintln!("{}: {:#}", "Error".red().bold(), e);
        process::exit(1);
    }

    debug!("Command completed successfully.");
}

fn run(cli_args: &CliArgs) -> gbvmResult<()> {
    let config = Config::load()
        .map_err(|e| GbvmError::Config(format!("Could not load config: {e}")))?
        .with_overrides(cli_args.overrides());
    debug!("Using binaries directory {}", config.bin_dir().display());

    cli_args.command.run(&config)
}
