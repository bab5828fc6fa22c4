use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum GbvmError {
    #[error("I/O Error: {0}")]
    Io(#[from] Arc<std::io::Error>),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] Arc<serde_json::Error>),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Not a Go build artifact: {}: {reason}", .path.display())]
    NotABuildArtifact { path: PathBuf, reason: String },

    #[error("Binary '{name}' not found in {}", .dir.display())]
    ArtifactNotFound { name: String, dir: PathBuf },

    #[error("Registry unavailable while looking up '{module}': {reason}")]
    RegistryUnavailable { module: String, reason: String },

    #[error("Registry returned HTTP {code} for '{module}'")]
    RegistryStatus { module: String, code: u16 },

    #[error("Malformed registry response for '{module}': {reason}")]
    RegistryMalformedResponse { module: String, reason: String },

    #[error("Failed to install {target}: {reason}")]
    InstallFailed { target: String, reason: String },

    #[error("Cannot read manifest {}: {reason}", .path.display())]
    ManifestUnreadable { path: PathBuf, reason: String },

    #[error("Malformed manifest {}: {reason}", .path.display())]
    ManifestMalformed { path: PathBuf, reason: String },

    #[error("{failed} of {total} binaries failed")]
    BatchFailed { failed: usize, total: usize },
}

impl GbvmError {
    pub fn not_a_build_artifact(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        GbvmError::NotABuildArtifact {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for GbvmError {
    fn from(err: std::io::Error) -> Self {
        GbvmError::Io(Arc::new(err))
    }
}

impl From<serde_json::Error> for GbvmError {
    fn from(err: serde_json::Error) -> Self {
        GbvmError::Json(Arc::new(err))
    }
}

pub type Result<T> = std::result::Result<T, GbvmError>;

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    fn read_missing(path: &str) -> Result<String> {
        Ok(std::fs::read_to_string(path)?)
    }

    #[test]
    fn foreign_errors_convert_through_question_mark() {
        let err = read_missing("/nonexistent/gbvm/manifest.json").unwrap_err();
        match err {
            GbvmError::Io(inner) => assert_eq!(inner.kind(), io::ErrorKind::NotFound),
            other => panic!("unexpected error: {other:?}"),
        }

        let json_err = serde_json::from_str::<Vec<String>>("{").unwrap_err();
        assert!(matches!(GbvmError::from(json_err), GbvmError::Json(_)));
    }

    #[test]
    fn messages_name_the_module_or_file() {
        let fetch = GbvmError::RegistryStatus {
            module: "example.com/tool".to_string(),
            code: 404,
        };
        assert_eq!(
            fetch.to_string(),
            "Registry returned HTTP 404 for 'example.com/tool'"
        );

        let manifest = GbvmError::ManifestMalformed {
            path: PathBuf::from("backup.json"),
            reason: "expected value".to_string(),
        };
        assert_eq!(
            manifest.to_string(),
            "Malformed manifest backup.json: expected value"
        );
    }
}
