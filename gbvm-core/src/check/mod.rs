pub mod installed;
pub mod update;

pub use installed::{find_installed_binary, get_installed_binaries, get_installed_binary};
pub use update::{check_for_updates, UpdateCheck, UpdateInfo, UpgradeDecision};
