// gbvm-common/src/model/mod.rs
pub mod binary;
pub mod manifest;
pub mod version;

// Re-export
pub use binary::InstalledBinary;
pub use manifest::Manifest;
pub use version::{compare_versions, is_devel, DEVEL_VERSION};
