//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use versioned_api::config::{parse_config, ServiceConfig};
use versioned_api::http::HttpServer;
use versioned_api::lifecycle::Shutdown;

/// Handler table used across the HTTP tests: the range tier at 1.0, 1.4 and
/// 3.0, plus an exact 1.1 handler.
#[allow(dead_code)]
pub const ARTICLES: &str = r#"
    [versioning]
    envelope = true

    [[endpoints]]
    path = "/articles"

    [[endpoints.handlers]]
    name = "H1"
    action = "read"
    version = "1.0"
    body = { layout = "list" }

    [[endpoints.handlers]]
    name = "H2"
    action = "read"
    version = "1.1"
    exact = true
    body = { layout = "list", beta = true }

    [[endpoints.handlers]]
    name = "H3"
    action = "read"
    version = "1.4"
    body = { layout = "cards" }

    [[endpoints.handlers]]
    name = "H4"
    action = "read"
    version = "3.0"
    body = { layout = "feed" }

    [[endpoints.handlers]]
    name = "create-any"
    action = "create"
    status = 201
    body = { created = true }
"#;

pub fn config(toml: &str) -> ServiceConfig {
    parse_config(toml).expect("test config is valid")
}

/// A server running on an ephemeral port.
#[allow(dead_code)]
pub struct RunningServer {
    pub addr: SocketAddr,
    pub updates: mpsc::UnboundedSender<ServiceConfig>,
    pub shutdown: Shutdown,
}

/// Start a server for `config` on 127.0.0.1 with an ephemeral port.
#[allow(dead_code)]
pub async fn start_server(config: ServiceConfig) -> RunningServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (updates, config_updates) = mpsc::unbounded_channel();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).expect("server config compiles");
    let signal = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, signal).await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(50)).await;

    RunningServer {
        addr,
        updates,
        shutdown,
    }
}

#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
