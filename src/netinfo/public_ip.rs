//! Public address resolution
//!
//! Connection links need the server's public address. When the `server_ip`
//! setting is empty (or still the installer placeholder) the address is looked
//! up: first over HTTP, then by running a local probe command, and finally a
//! placeholder is used. Each stage is bounded by the same timeout and nothing
//! is retried.

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use log::{debug, warn};
use tokio::process::Command;

/// Setting value the installer writes before the address is known
pub const SERVER_IP_PLACEHOLDER: &str = "SERVER_IP";

/// Address used when every lookup failed
pub const UNKNOWN_SERVER_IP: &str = "YOUR_SERVER_IP";

/// Resolves the address advertised to clients
#[derive(Debug, Clone)]
pub struct PublicIpResolver {
    lookup_url: String,
    probe_program: PathBuf,
    probe_args: Vec<String>,
    timeout: Duration,
}

impl PublicIpResolver {
    /// Resolver using `lookup_url` and `curl -s4 ifconfig.me` as the probe
    pub fn new(lookup_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            lookup_url: lookup_url.into(),
            probe_program: PathBuf::from("curl"),
            probe_args: vec!["-s4".to_string(), "ifconfig.me".to_string()],
            timeout,
        }
    }

    /// Replace the local probe command.
    pub fn with_probe(mut self, program: impl Into<PathBuf>, args: &[&str]) -> Self {
        self.probe_program = program.into();
        self.probe_args = args.iter().map(|arg| arg.to_string()).collect();
        self
    }

    /// Address for connection links.
    ///
    /// Never fails: `configured` wins when it is set, otherwise the lookup
    /// chain runs and ends at [`UNKNOWN_SERVER_IP`].
    pub async fn resolve(&self, configured: &str) -> String {
        let configured = configured.trim();
        if !configured.is_empty() && configured != SERVER_IP_PLACEHOLDER {
            return configured.to_string();
        }

        if let Some(ip) = self.lookup_http().await {
            debug!("Public address {} resolved via {}", ip, self.lookup_url);
            return ip;
        }

        if let Some(ip) = self.probe_local().await {
            debug!("Public address {} resolved via {}", ip, self.probe_program.display());
            return ip;
        }

        warn!("Could not determine public address; set server_ip in Settings");
        UNKNOWN_SERVER_IP.to_string()
    }

    async fn lookup_http(&self) -> Option<String> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.timeout)
            .build()
            .ok()?;

        let response = match client.get(&self.lookup_url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!("Address lookup via {} failed: {}", self.lookup_url, e);
                return None;
            }
        };

        let body = response.error_for_status().ok()?.text().await.ok()?;
        parse_address(&body)
    }

    async fn probe_local(&self) -> Option<String> {
        let probe = Command::new(&self.probe_program)
            .args(&self.probe_args)
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(self.timeout, probe).await {
            Ok(Ok(output)) if output.status.success() => {
                parse_address(&String::from_utf8_lossy(&output.stdout))
            }
            Ok(Ok(output)) => {
                debug!("Address probe exited with {}", output.status);
                None
            }
            Ok(Err(e)) => {
                debug!("Address probe {} failed: {}", self.probe_program.display(), e);
                None
            }
            Err(_) => {
                debug!("Address probe timed out after {:?}", self.timeout);
                None
            }
        }
    }
}

/// Accept only a bare IP address
fn parse_address(raw: &str) -> Option<String> {
    let candidate = raw.trim();
    candidate.parse::<IpAddr>().ok().map(|ip| ip.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    // Nothing listens on the discard port in the test environment
    const DEAD_URL: &str = "http://127.0.0.1:9/";

    #[test]
    fn test_parse_address() {
        assert_eq!(parse_address(" 203.0.113.5\n").as_deref(), Some("203.0.113.5"));
        assert_eq!(parse_address("2001:db8::1").as_deref(), Some("2001:db8::1"));
        assert_eq!(parse_address("<html>error</html>"), None);
        assert_eq!(parse_address(""), None);
    }

    #[tokio::test]
    async fn test_configured_address_wins() {
        let resolver = PublicIpResolver::new(DEAD_URL, Duration::from_millis(200));
        assert_eq!(resolver.resolve("vpn.example.com").await, "vpn.example.com");
    }

    #[tokio::test]
    async fn test_falls_back_to_probe() {
        let resolver = PublicIpResolver::new(DEAD_URL, Duration::from_secs(2))
            .with_probe("echo", &["198.51.100.4"]);
        assert_eq!(resolver.resolve("").await, "198.51.100.4");
        assert_eq!(resolver.resolve(SERVER_IP_PLACEHOLDER).await, "198.51.100.4");
    }

    #[tokio::test]
    async fn test_falls_back_to_placeholder() {
        let resolver = PublicIpResolver::new(DEAD_URL, Duration::from_millis(500))
            .with_probe("false", &[]);
        assert_eq!(resolver.resolve("  ").await, UNKNOWN_SERVER_IP);
    }

    #[tokio::test]
    async fn test_probe_is_bounded_by_timeout() {
        let resolver = PublicIpResolver::new(DEAD_URL, Duration::from_millis(300))
            .with_probe("sleep", &["5"]);

        let started = Instant::now();
        assert_eq!(resolver.resolve("").await, UNKNOWN_SERVER_IP);
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_http_lookup() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = axum::Router::new().route("/", axum::routing::get(|| async { "203.0.113.9\n" }));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let resolver = PublicIpResolver::new(format!("http://{}/", addr), Duration::from_secs(2))
            .with_probe("false", &[]);
        assert_eq!(resolver.resolve("").await, "203.0.113.9");
    }
}
