// gbvm-common/src/model/version.rs
//! Ordering for Go module version strings.
//!
//! Looser than semver: prerelease and build suffixes are
//! dropped, missing components count as zero, and unparseable components
//! count as zero instead of failing. Pseudo-versions on a `v0.0.0` base are
//! ordered by their commit timestamp.
use std::cmp::Ordering;

/// Version recorded for binaries built from a working tree.
pub const DEVEL_VERSION: &str = "(devel)";

pub fn is_devel(version: &str) -> bool {
    version == DEVEL_VERSION
}

#[derive(Debug, Clone)]
enum VersionKey {
    Devel,
    Numeric(Vec<u64>),
}

impl VersionKey {
    fn parse(version: &str) -> Self {
        if is_devel(version) {
            return VersionKey::Devel;
        }

        let trimmed = version.strip_prefix('v').unwrap_or(version);
        let mut dash_parts = trimmed.splitn(3, '-');
        let release = dash_parts.next().unwrap_or_default();

        // v0.0.0-<timestamp>-<hash>
        if release == "0.0.0" {
            if let Some(timestamp) = dash_parts.next().and_then(|ts| ts.parse::<u64>().ok()) {
                return VersionKey::Numeric(vec![0, 0, 0, timestamp]);
            }
        }

        let release = release.split('+').next().unwrap_or_default();
        VersionKey::Numeric(
            release
                .split('.')
                .map(|component| component.parse::<u64>().unwrap_or(0))
                .collect(),
        )
    }
}

impl Ord for VersionKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (VersionKey::Devel, VersionKey::Devel) => Ordering::Equal,
            (VersionKey::Devel, VersionKey::Numeric(_)) => Ordering::Less,
            (VersionKey::Numeric(_), VersionKey::Devel) => Ordering::Greater,
            (VersionKey::Numeric(a), VersionKey::Numeric(b)) => {
                let len = a.len().max(b.len());
                (0..len)
                    .map(|i| {
                        let left = a.get(i).copied().unwrap_or(0);
                        let right = b.get(i).copied().unwrap_or(0);
                        left.cmp(&right)
                    })
                    .find(|ord| *ord != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            }
        }
    }
}

// Equality follows the ordering, so `1.2` and `1.2.0` are the same key.
impl PartialEq for VersionKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionKey {}

impl PartialOrd for VersionKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compares two module versions. Total and infallible.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    VersionKey::parse(a).cmp(&VersionKey::parse(b))
}
