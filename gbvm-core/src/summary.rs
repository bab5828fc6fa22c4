// gbvm-core/src/summary.rs
use std::time::Duration;

use gbvm_common::error::GbvmError;
use gbvm_common::pipeline::PipelineEvent;

/// Outcome of one batch run, keyed by binary name.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Installed (or, for a dry run, would have been installed).
    pub succeeded: Vec<String>,
    pub up_to_date: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<(String, GbvmError)>,
    pub duration: Duration,
}

impl RunSummary {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.up_to_date.len() + self.skipped.len() + self.failed.len()
    }

    pub(crate) fn finished_event(&self) -> PipelineEvent {
        PipelineEvent::PipelineFinished {
            duration_secs: self.duration.as_secs_f64(),
            success_count: self.succeeded.len(),
            fail_count: self.failed.len(),
            skip_count: self.skipped.len() + self.up_to_date.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finished_event_counts_up_to_date_as_skipped() {
        let summary = RunSummary {
            succeeded: vec!["a".into()],
            up_to_date: vec!["b".into(), "c".into()],
            skipped: vec!["d".into()],
            failed: vec![("e".into(), GbvmError::Config("x".into()))],
            duration: Duration::from_millis(1500),
        };

        assert!(summary.has_failures());
        assert_eq!(summary.total(), 5);
        match summary.finished_event() {
            PipelineEvent::PipelineFinished {
                duration_secs,
                success_count,
                fail_count,
                skip_count,
            } => {
                assert!((duration_secs - 1.5).abs() < f64::EPSILON);
                assert_eq!((success_count, fail_count, skip_count), (1, 1, 3));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
