// gbvm-core/src/upgrade.rs
//! Per-binary upgrade loop.
//!
//! Binaries are processed one at a time in inventory order. Any failure while
//! handling one binary is reported through the event sink and recorded in the
//! summary; the loop then moves on to the next binary.

use std::time::Instant;

use gbvm_common::config::Config;
use gbvm_common::error::Result;
use gbvm_common::model::InstalledBinary;
use gbvm_common::pipeline::{EventSink, JobAction, PipelineEvent, SkipReason};
use gbvm_net::VersionSource;
use tracing::debug;

use crate::check::installed::{get_installed_binaries, get_installed_binary};
use crate::check::update::UpgradeDecision;
use crate::installer::Installer;
use crate::summary::RunSummary;

#[derive(Debug, Clone, Copy, Default)]
pub struct UpgradeOptions {
    /// Leave binaries built from a working tree alone.
    pub skip_dev: bool,
    /// Report what would be installed without installing it.
    pub dry_run: bool,
}

pub struct Upgrader<'a> {
    source: &'a dyn VersionSource,
    installer: &'a dyn Installer,
    events: &'a dyn EventSink,
    options: UpgradeOptions,
}

impl<'a> Upgrader<'a> {
    pub fn new(
        source: &'a dyn VersionSource,
        installer: &'a dyn Installer,
        events: &'a dyn EventSink,
        options: UpgradeOptions,
    ) -> Self {
        Self {
            source,
            installer,
            events,
            options,
        }
    }

    /// Bulk mode: scans the binaries directory and upgrades everything that
    /// is behind. Only a failed scan is returned as an error.
    pub fn upgrade_all(&self, config: &Config) -> Result<RunSummary> {
        let installed = get_installed_binaries(config)?;
        Ok(self.upgrade_binaries(&installed))
    }

    /// Targeted mode for a single binary name. A missing binary is
    /// `ArtifactNotFound`.
    pub fn upgrade_named(&self, name: &str, config: &Config) -> Result<UpgradeDecision> {
        let binary = get_installed_binary(name, config).map_err(|e| {
            self.events
                .emit(PipelineEvent::job_failed(name.to_string(), None, &e));
            e
        })?;
        self.upgrade_one(&binary)
    }

    pub fn upgrade_binaries(&self, installed: &[InstalledBinary]) -> RunSummary {
        let started = Instant::now();
        let mut summary = RunSummary::default();

        let (candidates, excluded): (Vec<&InstalledBinary>, Vec<&InstalledBinary>) = installed
            .iter()
            .partition(|binary| !(self.options.skip_dev && binary.is_devel()));
        for binary in excluded {
            debug!("Excluding development build {}", binary.name);
            self.events.emit(PipelineEvent::Skipped {
                target_id: binary.name.clone(),
                reason: SkipReason::DevelBuild,
            });
            summary.skipped.push(binary.name.clone());
        }

        self.events.emit(PipelineEvent::PipelineStarted {
            total_jobs: candidates.len(),
        });

        for binary in candidates {
            match self.upgrade_one(binary) {
                Ok(UpgradeDecision::UpgradeTo(_)) => summary.succeeded.push(binary.name.clone()),
                Ok(UpgradeDecision::UpToDate) => summary.up_to_date.push(binary.name.clone()),
                Ok(UpgradeDecision::SkippedDevel) => summary.skipped.push(binary.name.clone()),
                Err(e) => summary.failed.push((binary.name.clone(), e)),
            }
        }

        summary.duration = started.elapsed();
        self.events.emit(summary.finished_event());
        summary
    }

    /// Fetches the latest version for one binary and installs it when the
    /// binary is behind. Failures are emitted as `JobFailed` and returned.
    pub fn upgrade_one(&self, binary: &InstalledBinary) -> Result<UpgradeDecision> {
        if self.options.skip_dev && binary.is_devel() {
            self.events.emit(PipelineEvent::Skipped {
                target_id: binary.name.clone(),
                reason: SkipReason::DevelBuild,
            });
            return Ok(UpgradeDecision::SkippedDevel);
        }

        let latest = self.source.fetch_latest(&binary.module).map_err(|e| {
            debug!("Failed to fetch latest version for {}: {}", binary.name, e);
            self.events
                .emit(PipelineEvent::job_failed(binary.name.clone(), None, &e));
            e
        })?;

        let decision = UpgradeDecision::evaluate(&binary.version, &latest);
        let UpgradeDecision::UpgradeTo(target_version) = &decision else {
            debug!(
                "{} is up to date ({} >= {})",
                binary.name, binary.version, latest
            );
            self.events.emit(PipelineEvent::UpToDate {
                target_id: binary.name.clone(),
                installed_version: binary.version.clone(),
                latest_version: latest,
            });
            return Ok(decision);
        };

        let action = JobAction::Upgrade {
            from_version: binary.version.clone(),
            to_version: target_version.clone(),
        };
        self.events.emit(PipelineEvent::JobStarted {
            target_id: binary.name.clone(),
            action: action.clone(),
            dry_run: self.options.dry_run,
        });
        if self.options.dry_run {
            return Ok(decision);
        }

        self.install(binary, target_version).map_err(|e| {
            debug!("Failed to upgrade {}: {}", binary.name, e);
            self.events.emit(PipelineEvent::job_failed(
                binary.name.clone(),
                Some(action.clone()),
                &e,
            ));
            e
        })?;

        self.events.emit(PipelineEvent::JobSuccess {
            target_id: binary.name.clone(),
            action,
        });
        Ok(decision)
    }

    fn install(&self, binary: &InstalledBinary, version: &str) -> Result<()> {
        debug!(
            "Installing {} for {}",
            binary.install_target(version),
            binary.name
        );
        self.installer.install(&binary.path, version)
    }
}
