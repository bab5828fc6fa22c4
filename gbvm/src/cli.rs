// gbvm/src/cli.rs
//! Defines the command-line argument structure using clap.
use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use gbvm_common::config::{Config, ConfigOverrides};
use gbvm_common::error::{GbvmError, Result};
use gbvm_core::RunSummary;

pub mod backup;
pub mod install;
pub mod list;
pub mod outdated;
pub mod status;
pub mod upgrade;

use crate::cli::backup::Backup;
use crate::cli::install::InstallArgs;
use crate::cli::list::List;
use crate::cli::outdated::Outdated;
use crate::cli::upgrade::UpgradeArgs;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, name = "gbvm", bin_name = "gbvm")]
#[command(propagate_version = true)]
pub struct CliArgs {
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Workspace root; binaries live in `<GOPATH>/bin` unless GOBIN is set
    #[arg(long, global = true)]
    pub gopath: Option<PathBuf>,

    /// Directory of installed binaries, overriding GOPATH
    #[arg(long, global = true)]
    pub gobin: Option<PathBuf>,

    /// Module proxy base URL
    #[arg(long, global = true)]
    pub proxy: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

impl CliArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            gopath: self.gopath.clone(),
            gobin: self.gobin.clone(),
            proxy_url: self.proxy.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    List(List),
    Backup(Backup),
    Outdated(Outdated),
    Upgrade(UpgradeArgs),
    #[command(alias = "restore")]
    Install(InstallArgs),
}

impl Command {
    pub fn run(&self, config: &Config) -> Result<()> {
        match self {
            Self::List(command) => command.run(config),
            Self::Backup(command) => command.run(config),
            Self::Outdated(command) => command.run(config),
            Self::Upgrade(command) => command.run(config),
            Self::Install(command) => command.run(config),
        }
    }
}

/// Turns per-binary failures into a non-zero exit once the batch is done.
pub(crate) fn batch_result(summary: &RunSummary) -> Result<()> {
    if summary.has_failures() {
        return Err(GbvmError::BatchFailed {
            failed: summary.failed.len(),
            total: summary.total(),
        });
    }
    Ok(())
}
