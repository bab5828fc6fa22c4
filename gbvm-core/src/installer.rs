// gbvm-core/src/installer.rs
use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use gbvm_common::config::Config;
use gbvm_common::error::{GbvmError, Result};
use gbvm_common::model::binary::install_target;
use tracing::debug;

/// Installs an exact version of a command, replacing any binary of the same
/// name.
pub trait Installer {
    fn install(&self, command_path: &str, version: &str) -> Result<()>;
}

/// Runs `go install <path>@<version>` into the configured binaries directory.
#[derive(Debug, Clone)]
pub struct GoInstaller {
    go_tool: PathBuf,
    bin_dir: PathBuf,
}

impl GoInstaller {
    /// Locates `go` on `PATH`. A dry run never installs, so the lookup is
    /// skipped and a missing toolchain is not an error.
    pub fn for_run(config: &Config, dry_run: bool) -> Result<Self> {
        Self::resolve_in(config, dry_run, env::var_os("PATH"))
    }

    fn resolve_in(config: &Config, dry_run: bool, search_path: Option<OsString>) -> Result<Self> {
        if dry_run {
            debug!("Dry run, not looking up the go tool");
            return Ok(Self::with_go_tool(PathBuf::from("go"), config));
        }
        let cwd = env::current_dir()?;
        let go_tool = which::which_in("go", search_path, cwd).map_err(|e| {
            GbvmError::Config(format!("Failed to find the 'go' tool on PATH: {e}"))
        })?;
        debug!("Using go tool at {}", go_tool.display());
        Ok(Self::with_go_tool(go_tool, config))
    }

    pub fn with_go_tool(go_tool: PathBuf, config: &Config) -> Self {
        Self {
            go_tool,
            bin_dir: config.bin_dir(),
        }
    }
}

impl Installer for GoInstaller {
    fn install(&self, command_path: &str, version: &str) -> Result<()> {
        let target = install_target(command_path, version);
        debug!(
            "Running {} install {} (GOBIN={})",
            self.go_tool.display(),
            target,
            self.bin_dir.display()
        );

        let output = Command::new(&self.go_tool)
            .arg("install")
            .arg(&target)
            .env("GOBIN", &self.bin_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| GbvmError::InstallFailed {
                target: target.clone(),
                reason: format!("failed to execute {}: {e}", self.go_tool.display()),
            })?;

        if output.status.success() {
            debug!("Installed {}", target);
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let reason = match stderr.trim() {
            "" => format!("go install exited with {}", output.status),
            message => message.to_string(),
        };
        Err(GbvmError::InstallFailed { target, reason })
    }
}
