//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use gateway::config::{GatewayConfig, RuntimeState, TimeoutConfig};
use gateway::lifecycle::Shutdown;
use gateway::{GatewayServer, RouteManager};

/// Start a mock backend that answers every request with `"<name> <request target>"`.
pub async fn start_mock_backend(name: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let mut head = Vec::new();
                        let mut buf = [0u8; 1024];
                        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                            match socket.read(&mut buf).await {
                                Ok(0) | Err(_) => return,
                                Ok(n) => head.extend_from_slice(&buf[..n]),
                            }
                        }

                        let head = String::from_utf8_lossy(&head);
                        let target = head
                            .lines()
                            .next()
                            .and_then(|line| line.split_whitespace().nth(1))
                            .unwrap_or("")
                            .to_string();
                        let body = format!("{} {}", name, target);
                        let response = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// An address nothing listens on.
pub async fn dead_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// A port that was free a moment ago.
pub fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

pub fn config_in(dir: &Path, port: u16) -> GatewayConfig {
    let mut config = GatewayConfig {
        runtime_path: dir.to_path_buf(),
        ..GatewayConfig::default()
    };
    config.gateway.port = port.to_string();
    config.gateway.bind_host = "127.0.0.1".to_string();
    config
}

pub fn manager_for(state: &Arc<RuntimeState>) -> Arc<RouteManager> {
    Arc::new(RouteManager::new(state.clone()))
}

/// Serve the gateway on an ephemeral port and return its address.
pub async fn start_gateway(routes: Arc<RouteManager>, shutdown: Shutdown) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = GatewayServer::new(routes, &TimeoutConfig::default());
    tokio::spawn(server.run(listener, shutdown));
    addr
}

/// Poll `url` until it answers or the deadline passes.
pub async fn wait_until_up(client: &reqwest::Client, url: &str) -> reqwest::Response {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        match client.get(url).send().await {
            Ok(response) => return response,
            Err(e) if tokio::time::Instant::now() >= deadline => panic!("{} never came up: {}", url, e),
            Err(_) => tokio::time::sleep(Duration::from_millis(25)).await,
        }
    }
}
