// gbvm-net/src/validation.rs
use gbvm_common::error::{GbvmError, Result};
use url::Url;

/// Checks that a module proxy base is an absolute http(s) URL.
pub fn validate_proxy_url(url_str: &str) -> Result<()> {
    let url = Url::parse(url_str)
        .map_err(|e| GbvmError::Config(format!("Failed to parse proxy URL '{url_str}': {e}")))?;
    match url.scheme() {
        "https" | "http" => Ok(()),
        other => Err(GbvmError::Config(format!(
            "Unsupported proxy URL scheme for '{url_str}': must be http or https, but got '{other}'"
        ))),
    }
}
