// gbvm-common/src/config.rs
use std::env;
use std::path::PathBuf;

use directories::UserDirs;
use tracing::debug;

use super::error::{GbvmError, Result};

pub const DEFAULT_PROXY_URL: &str = "https://proxy.golang.org";

/// Process-wide settings, resolved once at startup and passed by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub gopath: PathBuf,
    pub gobin: Option<PathBuf>,
    pub proxy_url: String,
}

/// Command-line values that take precedence over the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub gopath: Option<PathBuf>,
    pub gobin: Option<PathBuf>,
    pub proxy_url: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        debug!("Loading gbvm configuration");
        let home = UserDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
        Self::resolve(|key| env::var(key).ok(), home)
    }

    /// Resolves the configuration from an environment lookup and an optional
    /// home directory.
    pub fn resolve<F>(lookup: F, home: Option<PathBuf>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let gopath = match non_empty("GOPATH").and_then(|raw| first_gopath_entry(&raw)) {
            Some(path) => path,
            None => {
                let home = home.ok_or_else(|| {
                    GbvmError::Config(
                        "GOPATH is not set and no home directory could be determined".to_string(),
                    )
                })?;
                debug!("GOPATH not set, falling back to {}/go", home.display());
                home.join("go")
            }
        };
        debug!("Effective GOPATH set to: {}", gopath.display());

        let gobin = non_empty("GOBIN").map(PathBuf::from);
        if let Some(gobin) = &gobin {
            debug!("GOBIN set to: {}", gobin.display());
        }

        let proxy_url = non_empty("GOPROXY")
            .and_then(|raw| first_proxy_entry(&raw))
            .unwrap_or_else(|| {
                debug!("No usable GOPROXY entry, using {}", DEFAULT_PROXY_URL);
                DEFAULT_PROXY_URL.to_string()
            });
        debug!("Effective module proxy: {}", proxy_url);

        Ok(Self {
            gopath,
            gobin,
            proxy_url,
        })
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(gopath) = overrides.gopath {
            self.gopath = gopath;
        }
        if let Some(gobin) = overrides.gobin {
            self.gobin = Some(gobin);
        }
        if let Some(proxy_url) = overrides.proxy_url {
            self.proxy_url = proxy_url.trim_end_matches('/').to_string();
        }
        self
    }

    /// Directory holding the installed binaries; `GOBIN` wins over `GOPATH/bin`.
    pub fn bin_dir(&self) -> PathBuf {
        self.gobin
            .clone()
            .unwrap_or_else(|| self.gopath.join("bin"))
    }

    pub fn binary_path(&self, name: &str) -> PathBuf {
        self.bin_dir().join(name)
    }

    pub fn proxy_url(&self) -> &str {
        &self.proxy_url
    }
}

fn first_gopath_entry(raw: &str) -> Option<PathBuf> {
    env::split_paths(raw).find(|p| !p.as_os_str().is_empty())
}

// GOPROXY is a list separated by ',' or '|'; "direct" and "off" are not URLs.
fn first_proxy_entry(raw: &str) -> Option<String> {
    raw.split([',', '|'])
        .map(str::trim)
        .find(|entry| !entry.is_empty() && *entry != "direct" && *entry != "off")
        .map(|entry| entry.trim_end_matches('/').to_string())
}
