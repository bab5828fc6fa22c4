// gbvm/src/cli/install.rs
use std::path::PathBuf;

use clap::Args;
use gbvm_common::config::Config;
use gbvm_common::error::Result;
use gbvm_common::pipeline::PipelineEvent;
use gbvm_core::{GoInstaller, Restorer};

use crate::cli::batch_result;
use crate::cli::status::{render_event, Operation};

/// Reinstalls the exact versions recorded by `gbvm backup`.
#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Manifest file written by `gbvm backup`
    pub manifest: PathBuf,

    /// Show what would be installed without installing anything
    #[arg(long)]
    pub dry_run: bool,
}

impl InstallArgs {
    pub fn run(&self, config: &Config) -> Result<()> {
        let installer = GoInstaller::for_run(config, self.dry_run)?;
        let render = |event: PipelineEvent| render_event(Operation::Restore, event);
        let restorer = Restorer::new(&installer, &render, self.dry_run);

        let summary = restorer.restore_file(&self.manifest, config)?;
        batch_result(&summary)
    }
}
