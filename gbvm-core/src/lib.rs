// gbvm-core/src/lib.rs

pub mod buildinfo;
pub mod check;
pub mod installer;
pub mod restore;
pub mod summary;
pub mod upgrade;

#[cfg(test)]
mod test_support;

pub use buildinfo::{read_build_info, BuildInfo, Module};
pub use check::{check_for_updates, get_installed_binaries, get_installed_binary, UpdateInfo};
pub use installer::{GoInstaller, Installer};
pub use restore::Restorer;
pub use summary::RunSummary;
pub use upgrade::{UpgradeOptions, Upgrader};
