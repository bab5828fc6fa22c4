// gbvm-core/src/check/installed.rs
use std::fs;
use std::io;
use std::path::Path;

use gbvm_common::config::Config;
use gbvm_common::error::{GbvmError, Result};
use gbvm_common::model::InstalledBinary;
use tracing::{debug, warn};

use crate::buildinfo::read_build_info;

/// Reads the module identity embedded in one executable. The record's name
/// is always the file name.
pub fn inspect_binary(path: &Path) -> Result<InstalledBinary> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| GbvmError::not_a_build_artifact(path, "path has no file name"))?;
    let info = read_build_info(path)?;
    Ok(InstalledBinary {
        name,
        version: info.main.version,
        module: info.main.path,
        path: info.path,
    })
}

fn handle_dir_entry(res: io::Result<fs::DirEntry>, dir: &Path) -> Option<fs::DirEntry> {
    match res {
        Ok(entry) => Some(entry),
        Err(e) => {
            warn!("Error reading entry in {}: {}", dir.display(), e);
            None
        }
    }
}

/// Lists every Go binary in the binaries directory, sorted by file name.
/// Files that are not Go executables are skipped; an unreadable directory is
/// an error.
pub fn get_installed_binaries(config: &Config) -> Result<Vec<InstalledBinary>> {
    let bin_dir = config.bin_dir();
    debug!("Scanning {} for Go binaries", bin_dir.display());

    let mut entries: Vec<fs::DirEntry> = fs::read_dir(&bin_dir)?
        .filter_map(|res| handle_dir_entry(res, &bin_dir))
        .collect();
    entries.sort_by_key(|entry| entry.file_name());

    let mut installed = Vec::new();
    for entry in entries {
        let path = entry.path();
        if !path.is_file() {
            debug!("Skipping non-file entry {}", path.display());
            continue;
        }
        match inspect_binary(&path) {
            Ok(binary) => installed.push(binary),
            Err(e) => debug!("Skipping {}: {}", path.display(), e),
        }
    }
    debug!("Found {} Go binaries", installed.len());
    Ok(installed)
}

/// Looks up the binary called `name`. Missing files are `ArtifactNotFound`.
pub fn get_installed_binary(name: &str, config: &Config) -> Result<InstalledBinary> {
    find_installed_binary(name, config)?.ok_or_else(|| GbvmError::ArtifactNotFound {
        name: name.to_string(),
        dir: config.bin_dir(),
    })
}

/// Like [`get_installed_binary`] but a missing file is `Ok(None)`.
pub fn find_installed_binary(name: &str, config: &Config) -> Result<Option<InstalledBinary>> {
    let path = config.binary_path(name);
    if !path.is_file() {
        debug!("No binary at {}", path.display());
        return Ok(None);
    }
    inspect_binary(&path).map(Some)
}
