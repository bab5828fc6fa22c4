// gbvm-core/src/check/update.rs
use std::cmp::Ordering;

use gbvm_common::error::GbvmError;
use gbvm_common::model::{compare_versions, InstalledBinary};
use gbvm_net::VersionSource;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpgradeDecision {
    UpToDate,
    UpgradeTo(String),
    SkippedDevel,
}

impl UpgradeDecision {
    /// Decides by version ordering, not string equality, so `v1.2` against a
    /// latest of `v1.2.0` is up to date.
    pub fn evaluate(current: &str, latest: &str) -> Self {
        match compare_versions(current, latest) {
            Ordering::Less => UpgradeDecision::UpgradeTo(latest.to_string()),
            Ordering::Equal | Ordering::Greater => UpgradeDecision::UpToDate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateInfo {
    pub name: String,
    pub module: String,
    pub installed_version: String,
    pub available_version: String,
}

/// Result of checking a set of binaries against the registry.
#[derive(Debug, Default)]
pub struct UpdateCheck {
    pub updates: Vec<UpdateInfo>,
    pub up_to_date: Vec<String>,
    pub skipped: Vec<String>,
    pub errors: Vec<(String, GbvmError)>,
}

/// Looks up each binary's module and collects the ones with newer versions.
/// A failed lookup is recorded against that binary only.
pub fn check_for_updates(
    installed: &[InstalledBinary],
    source: &dyn VersionSource,
    skip_dev: bool,
) -> UpdateCheck {
    let mut check = UpdateCheck::default();

    for binary in installed {
        if skip_dev && binary.is_devel() {
            debug!("Skipping development build {}", binary.name);
            check.skipped.push(binary.name.clone());
            continue;
        }

        let latest = match source.fetch_latest(&binary.module) {
            Ok(latest) => latest,
            Err(e) => {
                warn!("Update check failed for {}: {}", binary.name, e);
                check.errors.push((binary.name.clone(), e));
                continue;
            }
        };

        match UpgradeDecision::evaluate(&binary.version, &latest) {
            UpgradeDecision::UpgradeTo(available_version) => {
                debug!(
                    "Update found for {}: {} -> {}",
                    binary.name, binary.version, available_version
                );
                check.updates.push(UpdateInfo {
                    name: binary.name.clone(),
                    module: binary.module.clone(),
                    installed_version: binary.version.clone(),
                    available_version,
                });
            }
            _ => check.up_to_date.push(binary.name.clone()),
        }
    }
    check
}
