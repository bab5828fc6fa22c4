// gbvm-common/src/model/binary.rs
use serde::{Deserialize, Serialize};

use super::version::is_devel;

/// One executable found in the binaries directory.
///
/// Field order is the manifest's on-disk order and must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledBinary {
    /// File name of the executable, never taken from embedded metadata.
    pub name: String,
    /// Main module version recorded at build time, possibly `(devel)`.
    pub version: String,
    /// Main module path, the registry lookup key.
    #[serde(rename = "mod")]
    pub module: String,
    /// Package path of the command inside its module.
    pub path: String,
}

impl InstalledBinary {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        module: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            module: module.into(),
            path: path.into(),
        }
    }

    pub fn is_devel(&self) -> bool {
        is_devel(&self.version)
    }

    /// The `path@version` directive handed to the installer.
    pub fn install_target(&self, version: &str) -> String {
        install_target(&self.path, version)
    }
}

pub fn install_target(command_path: &str, version: &str) -> String {
    format!("{command_path}@{version}")
}
