// gbvm-core/src/restore.rs
//! Reinstalls the exact versions recorded in a manifest.

use std::path::Path;
use std::time::Instant;

use gbvm_common::config::Config;
use gbvm_common::error::Result;
use gbvm_common::model::{InstalledBinary, Manifest};
use gbvm_common::pipeline::{EventSink, JobAction, PipelineEvent, SkipReason};
use tracing::debug;

use crate::check::installed::find_installed_binary;
use crate::installer::Installer;
use crate::summary::RunSummary;

#[derive(Debug)]
enum RestoreOutcome {
    Installed,
    Skipped,
}

pub struct Restorer<'a> {
    installer: &'a dyn Installer,
    events: &'a dyn EventSink,
    dry_run: bool,
}

impl<'a> Restorer<'a> {
    pub fn new(installer: &'a dyn Installer, events: &'a dyn EventSink, dry_run: bool) -> Self {
        Self {
            installer,
            events,
            dry_run,
        }
    }

    /// Loads `manifest_path` and restores it. An unreadable or malformed
    /// manifest aborts before any record is processed.
    pub fn restore_file(&self, manifest_path: &Path, config: &Config) -> Result<RunSummary> {
        let manifest = Manifest::load(manifest_path)?;
        debug!(
            "Loaded {} records from {}",
            manifest.len(),
            manifest_path.display()
        );
        Ok(self.restore(&manifest, config))
    }

    pub fn restore(&self, manifest: &Manifest, config: &Config) -> RunSummary {
        let started = Instant::now();
        let mut summary = RunSummary::default();
        self.events.emit(PipelineEvent::PipelineStarted {
            total_jobs: manifest.len(),
        });

        for record in manifest {
            match self.restore_one(record, config) {
                Ok(RestoreOutcome::Installed) => summary.succeeded.push(record.name.clone()),
                Ok(RestoreOutcome::Skipped) => summary.skipped.push(record.name.clone()),
                Err(e) => {
                    debug!("Failed to restore {}: {}", record.name, e);
                    summary.failed.push((record.name.clone(), e));
                }
            }
        }

        summary.duration = started.elapsed();
        self.events.emit(summary.finished_event());
        summary
    }

    fn restore_one(&self, record: &InstalledBinary, config: &Config) -> Result<RestoreOutcome> {
        if record.is_devel() {
            self.skip(record, SkipReason::NotInstallable);
            return Ok(RestoreOutcome::Skipped);
        }

        let current = find_installed_binary(&record.name, config).map_err(|e| {
            self.events
                .emit(PipelineEvent::job_failed(record.name.clone(), None, &e));
            e
        })?;
        let from_version = current.map(|binary| binary.version);
        if from_version.as_deref() == Some(record.version.as_str()) {
            self.skip(record, SkipReason::AlreadyAtVersion);
            return Ok(RestoreOutcome::Skipped);
        }

        let action = JobAction::Restore {
            from_version,
            to_version: record.version.clone(),
        };
        self.events.emit(PipelineEvent::JobStarted {
            target_id: record.name.clone(),
            action: action.clone(),
            dry_run: self.dry_run,
        });
        if self.dry_run {
            return Ok(RestoreOutcome::Installed);
        }

        if let Err(e) = self.installer.install(&record.path, &record.version) {
            self.events.emit(PipelineEvent::job_failed(
                record.name.clone(),
                Some(action),
                &e,
            ));
            return Err(e);
        }
        self.events.emit(PipelineEvent::JobSuccess {
            target_id: record.name.clone(),
            action,
        });
        Ok(RestoreOutcome::Installed)
    }

    fn skip(&self, record: &InstalledBinary, reason: SkipReason) {
        debug!("Skipping {} ({:?})", record.name, reason);
        self.events.emit(PipelineEvent::Skipped {
            target_id: record.name.clone(),
            reason,
        });
    }
}
