// gbvm-common/src/pipeline.rs
use serde::{Deserialize, Serialize};

use crate::error::GbvmError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum JobAction {
    Upgrade {
        from_version: String,
        to_version: String,
    },
    Restore {
        /// `None` when the binary is not currently installed.
        from_version: Option<String>,
        to_version: String,
    },
}

impl JobAction {
    pub fn to_version(&self) -> &str {
        match self {
            JobAction::Upgrade { to_version, .. } | JobAction::Restore { to_version, .. } => {
                to_version
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SkipReason {
    /// Built from a working tree and excluded by `--skip-dev`.
    DevelBuild,
    /// Already at the exact version recorded in the manifest.
    AlreadyAtVersion,
    /// Manifest entry records `(devel)`, which cannot be installed.
    NotInstallable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    PipelineStarted {
        total_jobs: usize,
    },
    PipelineFinished {
        duration_secs: f64,
        success_count: usize,
        fail_count: usize,
        skip_count: usize,
    },
    UpToDate {
        target_id: String,
        installed_version: String,
        latest_version: String,
    },
    JobStarted {
        target_id: String,
        action: JobAction,
        dry_run: bool,
    },
    JobSuccess {
        target_id: String,
        action: JobAction,
    },
    JobFailed {
        target_id: String,
        action: Option<JobAction>,
        error: String,
    },
    Skipped {
        target_id: String,
        reason: SkipReason,
    },
}

impl PipelineEvent {
    pub fn job_failed(target_id: String, action: Option<JobAction>, error: &GbvmError) -> Self {
        PipelineEvent::JobFailed {
            target_id,
            action,
            error: error.to_string(),
        }
    }
}

/// Receives progress events from the upgrade and restore loops.
pub trait EventSink {
    fn emit(&self, event: PipelineEvent);
}

impl<F> EventSink for F
where
    F: Fn(PipelineEvent),
{
    fn emit(&self, event: PipelineEvent) {
        self(event)
    }
}
