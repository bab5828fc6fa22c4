// gbvm-common/src/lib.rs
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;

// Re-export key types
pub use config::{Config, ConfigOverrides};
pub use error::{GbvmError, Result};
pub use model::{InstalledBinary, Manifest};
