// gbvm/src/cli/upgrade.rs
use clap::Args;
use gbvm_common::config::Config;
use gbvm_common::error::Result;
use gbvm_common::pipeline::PipelineEvent;
use gbvm_core::check::UpgradeDecision;
use gbvm_core::{GoInstaller, RunSummary, UpgradeOptions, Upgrader};
use gbvm_net::ProxyClient;
use tracing::debug;

use crate::cli::batch_result;
use crate::cli::status::{render_event, Operation};

#[derive(Args, Debug)]
pub struct UpgradeArgs {
    /// Binaries to upgrade; every binary in the directory when omitted
    #[arg()]
    pub names: Vec<String>,

    /// Leave binaries built from a working tree alone
    #[arg(long)]
    pub skip_dev: bool,

    /// Show what would be upgraded without installing anything
    #[arg(long)]
    pub dry_run: bool,
}

impl UpgradeArgs {
    pub fn run(&self, config: &Config) -> Result<()> {
        let client = ProxyClient::new(config)?;
        let installer = GoInstaller::for_run(config, self.dry_run)?;
        let render = |event: PipelineEvent| render_event(Operation::Upgrade, event);
        let upgrader = Upgrader::new(
            &client,
            &installer,
            &render,
            UpgradeOptions {
                skip_dev: self.skip_dev,
                dry_run: self.dry_run,
            },
        );

        if self.names.is_empty() {
            let summary = upgrader.upgrade_all(config)?;
            return batch_result(&summary);
        }

        let summary = self.upgrade_each(&upgrader, config);
        batch_result(&summary)
    }

    /// Each name is handled on its own: a missing binary is reported and the
    /// remaining names are still processed.
    fn upgrade_each(&self, upgrader: &Upgrader<'_>, config: &Config) -> RunSummary {
        let mut summary = RunSummary::default();
        for name in &self.names {
            debug!("Targeted upgrade of {}", name);
            match upgrader.upgrade_named(name, config) {
                Ok(UpgradeDecision::UpgradeTo(_)) => summary.succeeded.push(name.clone()),
                Ok(UpgradeDecision::UpToDate) => summary.up_to_date.push(name.clone()),
                Ok(UpgradeDecision::SkippedDevel) => summary.skipped.push(name.clone()),
                Err(e) => summary.failed.push((name.clone(), e)),
            }
        }
        summary
    }
}
