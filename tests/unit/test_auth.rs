//! Unit tests for the auth gate and the edge server
//!
//! Tests cover:
//! - Gate decisions for protected and allow-listed paths
//! - End-to-end requests against a running server on loopback

use skyscope::auth::server::EdgeServer;
use skyscope::auth::{
    basic_header, parse_basic, BasicAuthGate, GateDecision, PathMatcher, StaticCredentials,
};
use skyscope::config::{AuthConfig, ServerConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

// ============================================================================
// Gate
// ============================================================================

mod gate_tests {
    use super::*;

    #[test]
    fn test_every_failure_gets_identical_challenge() {
        let gate = BasicAuthGate::from_config(&AuthConfig::default());
        let baseline = gate.check("/", None);
        assert!(!baseline.is_proceed());

        let failures = [
            basic_header("skyscope", "drone2024"),
            basic_header("Skyscope", "drone2025"),
            "Digest username=\"skyscope\"".to_string(),
            "Basic ====".to_string(),
        ];
        for header in &failures {
            assert_eq!(gate.check("/", Some(header)), baseline, "{}", header);
        }
    }

    #[test]
    fn test_password_keeps_everything_after_first_colon() {
        let gate = BasicAuthGate::from_config(&AuthConfig::default());
        let header = basic_header("skyscope", "drone2025:x");
        assert_eq!(
            parse_basic(&header),
            Some(("skyscope".to_string(), "drone2025:x".to_string()))
        );
        // A trailing ":x" segment is part of the password, not ignored.
        assert!(!gate.check("/", Some(&header)).is_proceed());
    }

    #[test]
    fn test_custom_realm_and_prefixes() {
        let gate = BasicAuthGate::new(
            StaticCredentials::new("ops", "hangar"),
            PathMatcher::new(["static", "health"]),
            "Ops Console",
        );
        assert!(gate.check("/healthz", None).is_proceed());
        assert!(gate.check("/static/logo.svg", None).is_proceed());
        match gate.check("/_next/app.js", None) {
            GateDecision::Challenge(c) => {
                assert_eq!(c.www_authenticate, "Basic realm=\"Ops Console\"")
            }
            GateDecision::Proceed => panic!("default prefixes should not apply"),
        }
        let header = basic_header("ops", "hangar");
        assert!(gate.check("/", Some(&header)).is_proceed());
    }
}

// ============================================================================
// Edge server
// ============================================================================

struct Site {
    _dir: TempDir,
    server: EdgeServer,
}

impl Site {
    async fn start() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>SkyScope</h1>").unwrap();
        std::fs::write(dir.path().join("favicon.ico"), [0u8, 0, 1, 0]).unwrap();
        std::fs::create_dir(dir.path().join("services")).unwrap();
        std::fs::write(dir.path().join("services/index.html"), "services").unwrap();
        std::fs::write(dir.path().join("drone photo.txt"), "aerial survey").unwrap();

        let config = ServerConfig {
            bind: "127.0.0.1:0".to_string(),
            site_root: dir.path().to_path_buf(),
            max_header_bytes: 2048,
        };
        let gate = Arc::new(BasicAuthGate::from_config(&AuthConfig::default()));
        let server = EdgeServer::start(&config, gate).await.unwrap();
        Self { _dir: dir, server }
    }

    fn addr(&self) -> SocketAddr {
        self.server.local_addr()
    }
}

struct Reply {
    status: u16,
    headers: Vec<(String, String)>,
    body: String,
}

impl Reply {
    /// Header value by case-insensitive name.
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

async fn send(addr: SocketAddr, raw: &str) -> Reply {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw.as_bytes()).await.unwrap();
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await.unwrap();
    let text = String::from_utf8_lossy(&buf).into_owned();
    let (head, body) = text.split_once("\r\n\r\n").unwrap_or((text.as_str(), ""));
    let mut lines = head.lines();
    let status = lines
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);
    let headers = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(n, v)| (n.trim().to_string(), v.trim().to_string()))
        .collect();
    Reply {
        status,
        headers,
        body: body.to_string(),
    }
}

async fn request(addr: SocketAddr, method: &str, path: &str, auth: Option<&str>) -> Reply {
    let auth_line = auth
        .map(|a| format!("Authorization: {}\r\n", a))
        .unwrap_or_default();
    send(
        addr,
        &format!(
            "{} {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n{}\r\n",
            method, path, auth_line
        ),
    )
    .await
}

async fn get(addr: SocketAddr, path: &str, auth: Option<&str>) -> Reply {
    request(addr, "GET", path, auth).await
}

mod server_tests {
    use super::*;

    #[tokio::test]
    async fn test_unauthenticated_request_challenged() {
        let site = Site::start().await;
        let reply = get(site.addr(), "/", None).await;
        assert_eq!(reply.status, 401);
        assert_eq!(
            reply.header("WWW-Authenticate"),
            Some("Basic realm=\"SkyScope Drone Services\"")
        );
        assert_eq!(reply.body, "Authentication required");
        site.server.stop().await;
    }

    #[tokio::test]
    async fn test_authenticated_request_served() {
        let site = Site::start().await;
        let auth = basic_header("skyscope", "drone2025");

        let reply = get(site.addr(), "/", Some(&auth)).await;
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body, "<h1>SkyScope</h1>");
        assert!(reply
            .header("Content-Type")
            .is_some_and(|v| v.starts_with("text/html")));

        let reply = get(site.addr(), "/services/", Some(&auth)).await;
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body, "services");

        let reply = get(site.addr(), "/nope.html", Some(&auth)).await;
        assert_eq!(reply.status, 404);
        site.server.stop().await;
    }

    #[tokio::test]
    async fn test_file_names_with_spaces_served() {
        let site = Site::start().await;
        let auth = basic_header("skyscope", "drone2025");

        let reply = get(site.addr(), "/drone%20photo.txt", Some(&auth)).await;
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body, "aerial survey");

        let reply = get(site.addr(), "/drone%20photo.txt", None).await;
        assert_eq!(reply.status, 401);
        site.server.stop().await;
    }

    #[tokio::test]
    async fn test_allow_listed_paths_skip_gate() {
        let site = Site::start().await;
        let reply = get(site.addr(), "/favicon.ico", None).await;
        assert_eq!(reply.status, 200);
        assert_eq!(reply.header("Content-Type"), Some("image/x-icon"));

        // Bypassed but absent: the gate stays out of the way.
        let reply = get(site.addr(), "/_next/static/chunk.js", None).await;
        assert_eq!(reply.status, 404);
        site.server.stop().await;
    }

    #[tokio::test]
    async fn test_traversal_and_methods() {
        let site = Site::start().await;
        let auth = basic_header("skyscope", "drone2025");

        let reply = get(site.addr(), "/../etc/passwd", Some(&auth)).await;
        assert_eq!(reply.status, 404);

        let reply = request(site.addr(), "POST", "/", Some(&auth)).await;
        assert_eq!(reply.status, 405);
        assert_eq!(reply.header("Allow"), Some("GET, HEAD"));

        // Method checks sit behind the gate.
        let reply = request(site.addr(), "POST", "/", None).await;
        assert_eq!(reply.status, 401);

        let reply = request(site.addr(), "HEAD", "/", Some(&auth)).await;
        assert_eq!(reply.status, 200);
        assert!(reply.body.is_empty());
        site.server.stop().await;
    }

    #[tokio::test]
    async fn test_malformed_and_oversized_requests() {
        let site = Site::start().await;
        let reply = send(site.addr(), "NONSENSE\r\n\r\n").await;
        assert_eq!(reply.status, 400);

        let padding = "a".repeat(3072);
        let reply = send(
            site.addr(),
            &format!(
                "GET / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\nX-Padding: {}\r\n\r\n",
                padding
            ),
        )
        .await;
        assert_eq!(reply.status, 431);
        site.server.stop().await;
    }

    #[tokio::test]
    async fn test_missing_site_root_rejected() {
        let config = ServerConfig {
            bind: "127.0.0.1:0".to_string(),
            site_root: "/definitely/not/a/site".into(),
            max_header_bytes: 2048,
        };
        let gate = Arc::new(BasicAuthGate::from_config(&AuthConfig::default()));
        assert!(EdgeServer::start(&config, gate).await.is_err());
    }
}
