// gbvm-net/src/lib.rs
pub mod registry;
pub mod validation;

pub use registry::{latest_url, ProxyClient, VersionSource};
