// gbvm-core/src/test_support.rs
// Fakes and fixtures shared by the unit tests.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use gbvm_common::config::Config;
use gbvm_common::error::{GbvmError, Result};
use gbvm_common::pipeline::{EventSink, PipelineEvent};
use gbvm_net::VersionSource;

use crate::buildinfo::tests::go_binary;
use crate::installer::Installer;

pub(crate) fn config_for(bin_dir: &Path) -> Config {
    Config {
        gopath: PathBuf::from("/nonexistent/gopath"),
        gobin: Some(bin_dir.to_path_buf()),
        proxy_url: "https://proxy.golang.org".to_string(),
    }
}

pub(crate) fn write_go_binary(
    dir: &Path,
    name: &str,
    cmd_path: &str,
    module: &str,
    version: &str,
) -> PathBuf {
    let modinfo = format!("path\t{cmd_path}\nmod\t{module}\t{version}\th1:x=\n");
    let path = dir.join(name);
    fs::write(&path, go_binary(&modinfo)).unwrap();
    path
}

#[derive(Default)]
pub(crate) struct FakeRegistry {
    latest: HashMap<String, String>,
    failing: HashSet<String>,
    queried: RefCell<Vec<String>>,
}

impl FakeRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, module: &str, version: &str) -> Self {
        self.latest.insert(module.to_string(), version.to_string());
        self
    }

    pub(crate) fn failing(mut self, module: &str) -> Self {
        self.failing.insert(module.to_string());
        self
    }

    pub(crate) fn was_queried(&self, module: &str) -> bool {
        self.queried.borrow().iter().any(|m| m == module)
    }
}

impl VersionSource for FakeRegistry {
    fn fetch_latest(&self, module: &str) -> Result<String> {
        self.queried.borrow_mut().push(module.to_string());
        if self.failing.contains(module) {
            return Err(GbvmError::RegistryUnavailable {
                module: module.to_string(),
                reason: "connection refused".to_string(),
            });
        }
        self.latest
            .get(module)
            .cloned()
            .ok_or_else(|| GbvmError::RegistryStatus {
                module: module.to_string(),
                code: 404,
            })
    }
}

#[derive(Default)]
pub(crate) struct RecordingInstaller {
    failing: HashSet<String>,
    calls: RefCell<Vec<(String, String)>>,
}

impl RecordingInstaller {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing(mut self, command_path: &str) -> Self {
        self.failing.insert(command_path.to_string());
        self
    }

    pub(crate) fn calls(&self) -> Vec<(String, String)> {
        self.calls.borrow().clone()
    }
}

impl Installer for RecordingInstaller {
    fn install(&self, command_path: &str, version: &str) -> Result<()> {
        self.calls
            .borrow_mut()
            .push((command_path.to_string(), version.to_string()));
        if self.failing.contains(command_path) {
            return Err(GbvmError::InstallFailed {
                target: format!("{command_path}@{version}"),
                reason: "build failed".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct EventLog {
    events: RefCell<Vec<PipelineEvent>>,
}

impl EventLog {
    pub(crate) fn events(&self) -> Vec<PipelineEvent> {
        self.events.borrow().clone()
    }
}

impl EventSink for EventLog {
    fn emit(&self, event: PipelineEvent) {
        self.events.borrow_mut().push(event);
    }
}
