// gbvm-net/src/registry.rs
use std::time::Duration;

use gbvm_common::config::Config;
use gbvm_common::error::{GbvmError, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde::Deserialize;
use tracing::debug;

use crate::validation::validate_proxy_url;

const REQUEST_TIMEOUT_SECS: u64 = 60;
const CONNECT_TIMEOUT_SECS: u64 = 30;
const USER_AGENT_STRING: &str = "gbvm (Rust; Go binary version manager)";

/// Looks up the newest published version of a module.
pub trait VersionSource {
    fn fetch_latest(&self, module: &str) -> Result<String>;
}

/// Body of `<proxy>/<module>/@latest`.
#[derive(Debug, Deserialize)]
struct LatestInfo {
    #[serde(rename = "Version")]
    version: String,
    #[serde(rename = "Time", default)]
    time: Option<String>,
}

/// Client for the GOPROXY protocol's `@latest` endpoint.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    client: Client,
    base_url: String,
}

impl ProxyClient {
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_base_url(config.proxy_url())
    }

    pub fn with_base_url(base_url: &str) -> Result<Self> {
        validate_proxy_url(base_url)?;
        Ok(Self {
            client: build_http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl VersionSource for ProxyClient {
    fn fetch_latest(&self, module: &str) -> Result<String> {
        let url = latest_url(&self.base_url, module);
        debug!("Fetching latest version for {} from {}", module, url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| GbvmError::RegistryUnavailable {
                module: module.to_string(),
                reason: e.to_string(),
            })?;
        let status = response.status();
        debug!("Received HTTP status: {} for {}", status, url);

        if !status.is_success() {
            return Err(GbvmError::RegistryStatus {
                module: module.to_string(),
                code: status.as_u16(),
            });
        }

        let body = response
            .text()
            .map_err(|e| GbvmError::RegistryUnavailable {
                module: module.to_string(),
                reason: format!("failed to read response body: {e}"),
            })?;
        parse_latest_response(module, &body)
    }
}

/// Lookup URL for a module; module paths are lowercased.
pub fn latest_url(base_url: &str, module: &str) -> String {
    format!(
        "{}/{}/@latest",
        base_url.trim_end_matches('/'),
        module.to_lowercase()
    )
}

fn parse_latest_response(module: &str, body: &str) -> Result<String> {
    let info: LatestInfo =
        serde_json::from_str(body).map_err(|e| GbvmError::RegistryMalformedResponse {
            module: module.to_string(),
            reason: e.to_string(),
        })?;
    if info.version.trim().is_empty() {
        return Err(GbvmError::RegistryMalformedResponse {
            module: module.to_string(),
            reason: "empty Version field".to_string(),
        });
    }
    debug!(
        "Latest version of {} is {} (published {})",
        module,
        info.version,
        info.time.as_deref().unwrap_or("unknown")
    );
    Ok(info.version)
}

fn build_http_client() -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_STRING));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| GbvmError::Config(format!("Failed to build HTTP client: {e}")))
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    use super::*;

    /// Serves a single canned HTTP response on a local port. The receiver
    /// yields the request line the client sent.
    fn serve_once(status_line: &str, body: &str) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            let mut header = String::new();
            while reader.read_line(&mut header).unwrap() > 0 && header != "\r\n" {
                header.clear();
            }
            stream.write_all(response.as_bytes()).unwrap();
            let _ = tx.send(request_line.trim_end().to_string());
        });
        (base_url, rx)
    }

    // Loopback requests must not be routed through a proxy from the environment.
    fn local_client(base_url: &str) -> ProxyClient {
        ProxyClient {
            client: Client::builder().no_proxy().build().unwrap(),
            base_url: base_url.to_string(),
        }
    }

    #[test]
    fn fetch_returns_the_published_version() {
        let (base_url, requests) = serve_once(
            "200 OK",
            r#"{"Version":"v1.2.3","Time":"2024-05-01T10:00:00Z"}"#,
        );
        let client = local_client(&base_url);

        let version = client.fetch_latest("github.com/BurntSushi/toml").unwrap();
        assert_eq!(version, "v1.2.3");
        assert_eq!(
            requests.recv().unwrap(),
            "GET /github.com/burntsushi/toml/@latest HTTP/1.1"
        );
    }

    #[test]
    fn fetch_maps_error_status_to_registry_status() {
        let (base_url, _requests) = serve_once("404 Not Found", "not found");
        let client = local_client(&base_url);

        match client.fetch_latest("example.com/missing") {
            Err(GbvmError::RegistryStatus { module, code }) => {
                assert_eq!(module, "example.com/missing");
                assert_eq!(code, 404);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn fetch_maps_refused_connection_to_registry_unavailable() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = local_client(&format!("http://127.0.0.1:{port}"));

        assert!(matches!(
            client.fetch_latest("example.com/tool"),
            Err(GbvmError::RegistryUnavailable { .. })
        ));
    }

    #[test]
    fn lookup_url_lowercases_the_module() {
        assert_eq!(
            latest_url("https://proxy.golang.org/", "github.com/BurntSushi/toml"),
            "https://proxy.golang.org/github.com/burntsushi/toml/@latest"
        );
    }

    #[test]
    fn version_is_read_from_latest_info() {
        let body = r#"{"Version":"v0.16.1","Time":"2024-07-02T19:03:53Z"}"#;
        assert_eq!(
            parse_latest_response("golang.org/x/tools/gopls", body).unwrap(),
            "v0.16.1"
        );

        let without_time = r#"{"Version":"v1.2.3"}"#;
        assert_eq!(
            parse_latest_response("example.com/m", without_time).unwrap(),
            "v1.2.3"
        );
    }

    #[test]
    fn unexpected_shapes_are_malformed_responses() {
        for body in [
            "not json",
            "[]",
            r#"{"version":"v1.0.0"}"#,
            r#"{"Version":42}"#,
            r#"{"Version":""}"#,
        ] {
            assert!(
                matches!(
                    parse_latest_response("example.com/m", body),
                    Err(GbvmError::RegistryMalformedResponse { .. })
                ),
                "{body}"
            );
        }
    }

    #[test]
    fn client_rejects_unsupported_proxy_schemes() {
        assert!(matches!(
            ProxyClient::with_base_url("file:///srv/goproxy"),
            Err(GbvmError::Config(_))
        ));
        let client = ProxyClient::with_base_url("https://proxy.golang.org/").unwrap();
        assert_eq!(client.base_url(), "https://proxy.golang.org");
    }
}
