// gbvm-common/src/model/manifest.rs
use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use super::binary::InstalledBinary;
use crate::error::{GbvmError, Result};

/// The exported inventory: an ordered list of binaries, stored as a JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    pub entries: Vec<InstalledBinary>,
}

impl Manifest {
    pub fn new(entries: Vec<InstalledBinary>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parses a manifest document. A bare `null` is an empty manifest.
    pub fn from_json_str(input: &str) -> serde_json::Result<Self> {
        let entries: Option<Vec<InstalledBinary>> = serde_json::from_str(input)?;
        Ok(Self::new(entries.unwrap_or_default()))
    }

    /// Two-space indented JSON followed by a newline.
    pub fn to_json_string(&self) -> Result<String> {
        let mut out = serde_json::to_string_pretty(&self.entries)?;
        out.push('\n');
        Ok(out)
    }

    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading manifest from {}", path.display());
        let raw = fs::read_to_string(path).map_err(|e| GbvmError::ManifestUnreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let manifest = Self::from_json_str(&raw).map_err(|e| GbvmError::ManifestMalformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        debug!("Loaded {} manifest entries", manifest.len());
        Ok(manifest)
    }

    /// Writes the manifest through a temporary file in the target directory
    /// and renames it into place.
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let contents = self.to_json_string()?;
        let mut temp_file = NamedTempFile::new_in(dir)?;
        temp_file.write_all(contents.as_bytes())?;
        temp_file.flush()?;
        temp_file.as_file().sync_all()?;
        temp_file.persist(path).map_err(|e| GbvmError::from(e.error))?;
        debug!(
            "Wrote {} manifest entries to {}",
            self.len(),
            path.display()
        );
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a InstalledBinary;
    type IntoIter = std::slice::Iter<'a, InstalledBinary>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl From<Vec<InstalledBinary>> for Manifest {
    fn from(entries: Vec<InstalledBinary>) -> Self {
        Self::new(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
  {
    "name": "gopls",
    "version": "v0.16.1",
    "mod": "golang.org/x/tools/gopls",
    "path": "golang.org/x/tools/gopls"
  },
  {
    "name": "stringer",
    "version": "v0.0.0-20240101000000-0123456789ab",
    "mod": "golang.org/x/tools",
    "path": "golang.org/x/tools/cmd/stringer"
  }
]
"#;

    fn inventory(n: usize) -> Vec<InstalledBinary> {
        (0..n)
            .map(|i| {
                InstalledBinary::new(
                    format!("tool{i}"),
                    format!("v1.{i}.0"),
                    format!("example.com/tool{i}"),
                    format!("example.com/tool{i}/cmd/tool{i}"),
                )
            })
            .collect()
    }

    #[test]
    fn decode_then_encode_is_byte_identical() {
        let manifest = Manifest::from_json_str(SAMPLE).unwrap();
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.entries[1].module, "golang.org/x/tools");
        assert_eq!(manifest.to_json_string().unwrap(), SAMPLE);
    }

    #[test]
    fn save_and_load_preserve_every_record() {
        let dir = tempfile::tempdir().unwrap();
        for n in [0, 1, 5] {
            let path = dir.path().join(format!("backup-{n}.json"));
            let manifest = Manifest::new(inventory(n));
            manifest.save(&path).unwrap();
            let loaded = Manifest::load(&path).unwrap();
            assert_eq!(loaded, manifest);
        }
    }

    #[test]
    fn null_document_is_an_empty_manifest() {
        let manifest = Manifest::from_json_str("null\n").unwrap();
        assert!(manifest.is_empty());
        assert_eq!(manifest.to_json_string().unwrap(), "[]\n");
    }

    #[test]
    fn unreadable_and_malformed_manifests_are_distinct_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            Manifest::load(&missing),
            Err(GbvmError::ManifestUnreadable { .. })
        ));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, r#"[{"name": "gopls"}]"#).unwrap();
        assert!(matches!(
            Manifest::load(&broken),
            Err(GbvmError::ManifestMalformed { .. })
        ));
    }
}
