// gbvm/src/cli/status.rs
//! Renders pipeline events as progress lines on the terminal.

use colored::Colorize;
use gbvm_common::pipeline::{JobAction, PipelineEvent, SkipReason};

/// Which batch the events belong to; only changes the wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Upgrade,
    Restore,
}

impl Operation {
    fn verb(self) -> &'static str {
        match self {
            Operation::Upgrade => "upgrade",
            Operation::Restore => "restore",
        }
    }
}

pub fn render_event(operation: Operation, event: PipelineEvent) {
    if let Some(line) = format_event(operation, &event) {
        println!("{line}");
    }
}

pub(crate) fn format_event(operation: Operation, event: &PipelineEvent) -> Option<String> {
    match event {
        PipelineEvent::PipelineStarted { total_jobs } => {
            if *total_jobs == 0 {
                None
            } else {
                Some(format!("{} Checking {total_jobs} binaries", "==>".bold().blue()))
            }
        }
        PipelineEvent::UpToDate {
            target_id,
            installed_version,
            ..
        } => Some(format!(
            "{} is up to date ({})",
            target_id.cyan(),
            installed_version
        )),
        PipelineEvent::JobStarted {
            target_id,
            action,
            dry_run,
        } => {
            let prefix = if *dry_run { "[dry run] " } else { "" };
            let line = match action {
                JobAction::Upgrade {
                    from_version,
                    to_version,
                } => format!(
                    "{prefix}upgrading {} from {from_version} to {}",
                    target_id.cyan(),
                    to_version.green()
                ),
                JobAction::Restore {
                    from_version: Some(from_version),
                    to_version,
                } => format!(
                    "{prefix}restoring {} from {from_version} to {}",
                    target_id.cyan(),
                    to_version.green()
                ),
                JobAction::Restore {
                    from_version: None,
                    to_version,
                } => format!(
                    "{prefix}installing {} at {}",
                    target_id.cyan(),
                    to_version.green()
                ),
            };
            Some(line)
        }
        PipelineEvent::JobSuccess { target_id, action } => Some(format!(
            "{} {}@{}",
            "✓".green().bold(),
            target_id,
            action.to_version()
        )),
        PipelineEvent::JobFailed {
            target_id, error, ..
        } => Some(format!(
            "{} to {} {}: {}",
            "failed".red().bold(),
            operation.verb(),
            target_id.cyan(),
            error.red()
        )),
        PipelineEvent::Skipped { target_id, reason } => {
            let why = match reason {
                SkipReason::DevelBuild => "development build",
                SkipReason::AlreadyAtVersion => "already at recorded version",
                SkipReason::NotInstallable => "recorded as (devel), cannot be installed",
            };
            Some(format!("{} {} ({why})", "skip".yellow(), target_id.cyan()))
        }
        PipelineEvent::PipelineFinished {
            duration_secs,
            success_count,
            fail_count,
            skip_count,
        } => Some(format!(
            "{} in {:.2}s ({} {}, {} failed, {} unchanged)",
            "Finished".bold(),
            duration_secs,
            success_count,
            match operation {
                Operation::Upgrade => "upgraded",
                Operation::Restore => "restored",
            },
            fail_count,
            skip_count
        )),
    }
}
