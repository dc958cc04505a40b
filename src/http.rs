//! HTTP fetching of pages and candidate images

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::{Client, Response};
use tracing::instrument;
use url::Url;

use crate::error::{Error, Result};

const DEFAULT_MAX_REDIRECTS: usize = 10;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_BODY_SIZE: usize = 10 * 1024 * 1024; // 10 MB

/// Configuration for HTTP requests.
#[derive(Debug, Clone)]
pub struct HttpOptions {
    /// Allow insecure HTTPS connections (self-signed certs).
    ///
    /// **Security Warning:** Enabling this allows man-in-the-middle attacks.
    pub allow_insecure: bool,

    /// Follow HTTP redirects
    pub follow_redirects: bool,

    /// Maximum number of redirects to follow
    pub max_redirects: usize,

    /// Per-request timeout
    pub timeout: Duration,

    /// Maximum response body size in bytes, for pages and images alike.
    ///
    /// Larger bodies are truncated. Default: 10 MB.
    pub max_body_size: usize,

    /// Block requests to private/internal IP addresses (SSRF protection).
    ///
    /// Applies to the page and to every image candidate it references, so a
    /// hostile page cannot make the prober reach internal services.
    /// Default: true.
    pub block_private_ips: bool,

    /// User-Agent header
    pub user_agent: String,

    /// Additional headers to send
    pub headers: Vec<(String, String)>,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            allow_insecure: false,
            follow_redirects: true,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            block_private_ips: true,
            user_agent: format!("imgpick/{}", env!("CARGO_PKG_VERSION")),
            headers: Vec::new(),
        }
    }
}

impl HttpOptions {
    /// Create a new HttpOptions with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to allow insecure HTTPS connections.
    pub fn allow_insecure(mut self, allow: bool) -> Self {
        self.allow_insecure = allow;
        self
    }

    /// Set whether to follow redirects.
    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    /// Set the maximum number of redirects to follow.
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum response body size in bytes.
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    /// Set whether to block requests to private/internal IP addresses.
    ///
    /// **Security Note:** Disabling this exposes your application to SSRF attacks
    /// if URLs come from untrusted sources.
    pub fn block_private_ips(mut self, block: bool) -> Self {
        self.block_private_ips = block;
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Add a custom header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Build a reqwest Client from these options.
    pub(crate) fn build_client(&self) -> Result<Client> {
        let redirect_policy = if self.follow_redirects {
            reqwest::redirect::Policy::limited(self.max_redirects)
        } else {
            reqwest::redirect::Policy::none()
        };

        let mut headers = reqwest::header::HeaderMap::new();
        for (name, value) in &self.headers {
            if let (Ok(name), Ok(value)) = (
                name.parse::<reqwest::header::HeaderName>(),
                value.parse::<reqwest::header::HeaderValue>(),
            ) {
                headers.insert(name, value);
            }
        }

        Ok(Client::builder()
            .danger_accept_invalid_certs(self.allow_insecure)
            .redirect(redirect_policy)
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .default_headers(headers)
            .build()?)
    }
}

fn is_private_ipv4(ip: Ipv4Addr) -> bool {
    ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local() // includes cloud metadata at 169.254.169.254
        || ip.is_broadcast()
        || ip.is_unspecified()
        || ip.is_documentation()
        || ip.octets()[0] == 0
        || ip.octets()[0] >= 224
}

fn is_private_ipv6(ip: Ipv6Addr) -> bool {
    ip.is_loopback()
        || ip.is_unspecified()
        || ip.is_multicast()
        || ip.to_ipv4_mapped().is_some_and(is_private_ipv4)
        || (ip.segments()[0] & 0xfe00) == 0xfc00 // unique local
        || (ip.segments()[0] & 0xffc0) == 0xfe80 // link-local
}

fn is_private_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_private_ipv4(v4),
        IpAddr::V6(v6) => is_private_ipv6(v6),
    }
}

/// Check that `url` is an http(s) URL with a host.
pub(crate) fn validate_scheme(url: &Url) -> Result<()> {
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::InvalidUrl(format!(
            "unsupported scheme '{}', only http/https allowed",
            url.scheme()
        )));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(Error::InvalidUrl("missing host".to_string()));
    }
    Ok(())
}

/// Reject URLs whose host is, or resolves to, an internal address.
async fn check_ssrf(url: &Url) -> Result<()> {
    let host = url
        .host_str()
        .ok_or_else(|| Error::InvalidUrl("missing host".to_string()))?;

    let host_lower = host.to_lowercase();
    if host_lower == "localhost"
        || host_lower.ends_with(".local")
        || host_lower.ends_with(".internal")
    {
        return Err(Error::SsrfBlocked(format!(
            "blocked request to internal host: {host}"
        )));
    }

    let port = url.port_or_known_default().unwrap_or(80);
    let lookup = host.trim_start_matches('[').trim_end_matches(']');

    // A failed lookup is left for reqwest to report
    if let Ok(addrs) = tokio::net::lookup_host((lookup, port)).await {
        for addr in addrs {
            if is_private_ip(addr.ip()) {
                return Err(Error::SsrfBlocked(format!(
                    "blocked request to private IP: {} (resolved from {host})",
                    addr.ip()
                )));
            }
        }
    }

    Ok(())
}

async fn send(client: &Client, url: &Url, options: &HttpOptions) -> Result<Response> {
    validate_scheme(url)?;
    if options.block_private_ips {
        check_ssrf(url).await?;
    }

    let response = client.get(url.clone()).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    Ok(response)
}

/// Fetch a page body, lossily decoded as UTF-8. Non-success statuses are
/// errors.
#[instrument(skip_all, fields(url = %url))]
pub(crate) async fn fetch_page(client: &Client, url: &Url, options: &HttpOptions) -> Result<String> {
    let response = send(client, url, options).await?;
    let bytes = read_body(response, options.max_body_size).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Fetch the raw bytes behind a URL.
pub(crate) async fn fetch_bytes(client: &Client, url: &Url, options: &HttpOptions) -> Result<Vec<u8>> {
    let response = send(client, url, options).await?;
    read_body(response, options.max_body_size).await
}

/// Stream a response body, stopping once `max_body_size` bytes are read.
async fn read_body(response: Response, max_body_size: usize) -> Result<Vec<u8>> {
    let content_length = usize::try_from(response.content_length().unwrap_or(0)).unwrap_or(0);
    let capacity = content_length.min(max_body_size).min(1024 * 1024); // Cap initial alloc at 1MB
    let mut bytes = Vec::with_capacity(capacity);
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        let remaining = max_body_size.saturating_sub(bytes.len());
        let to_take = chunk.len().min(remaining);
        bytes.extend_from_slice(&chunk[..to_take]);
        if to_take < chunk.len() {
            break;
        }
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_default_options() {
        let options = HttpOptions::default();
        assert!(!options.allow_insecure);
        assert!(options.follow_redirects);
        assert_eq!(options.max_redirects, DEFAULT_MAX_REDIRECTS);
        assert_eq!(options.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(options.max_body_size, DEFAULT_MAX_BODY_SIZE);
        assert!(options.block_private_ips);
        assert!(options.user_agent.starts_with("imgpick/"));
    }

    #[test]
    fn test_builder_pattern() {
        let options = HttpOptions::new()
            .allow_insecure(true)
            .follow_redirects(false)
            .max_redirects(5)
            .timeout(Duration::from_secs(5))
            .max_body_size(1024)
            .block_private_ips(false)
            .user_agent("Custom Agent")
            .header("X-Custom", "Value");

        assert!(options.allow_insecure);
        assert!(!options.follow_redirects);
        assert_eq!(options.max_redirects, 5);
        assert_eq!(options.timeout, Duration::from_secs(5));
        assert_eq!(options.max_body_size, 1024);
        assert!(!options.block_private_ips);
        assert_eq!(options.user_agent, "Custom Agent");
        assert_eq!(options.headers.len(), 1);
        assert!(options.build_client().is_ok());
    }

    #[test]
    fn test_scheme_validation() {
        assert!(validate_scheme(&url("https://example.com/")).is_ok());
        let err = validate_scheme(&url("file:///etc/passwd")).unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));
        assert!(validate_scheme(&url("data:text/plain,hi")).is_err());
    }

    #[tokio::test]
    async fn test_ssrf_blocks_internal_hosts() {
        for target in [
            "http://localhost/",
            "http://server.local/",
            "http://metadata.google.internal/",
        ] {
            let err = check_ssrf(&url(target)).await.unwrap_err();
            assert!(err.to_string().contains("internal host"), "{target}");
        }
    }

    #[tokio::test]
    async fn test_ssrf_blocks_private_addresses() {
        for target in [
            "http://192.168.1.1/",
            "http://127.0.0.1:8080/",
            "http://169.254.169.254/",
            "http://[::1]/",
        ] {
            let err = check_ssrf(&url(target)).await.unwrap_err();
            assert!(err.to_string().contains("private IP"), "{target}");
        }
    }

    #[test]
    fn test_private_ipv4_detection() {
        assert!(is_private_ipv4(Ipv4Addr::new(127, 0, 0, 1)));
        assert!(is_private_ipv4(Ipv4Addr::new(10, 0, 0, 1)));
        assert!(is_private_ipv4(Ipv4Addr::new(172, 16, 0, 1)));
        assert!(is_private_ipv4(Ipv4Addr::new(169, 254, 169, 254)));
        assert!(!is_private_ipv4(Ipv4Addr::new(8, 8, 8, 8)));
        assert!(!is_private_ipv4(Ipv4Addr::new(93, 184, 216, 34)));
    }

    #[test]
    fn test_private_ipv6_detection() {
        assert!(is_private_ipv6(Ipv6Addr::LOCALHOST));
        assert!(is_private_ipv6("fe80::1".parse().unwrap()));
        assert!(is_private_ipv6("fc00::1".parse().unwrap()));
        assert!(is_private_ipv6("::ffff:10.0.0.1".parse().unwrap()));
        assert!(!is_private_ipv6("2607:f8b0:4004:800::200e".parse().unwrap()));
    }
}
