use std::{net::SocketAddr, time::Duration};

use axum::Router;
use tokio::net::TcpListener;

use crate::config::{Config, ValidationPolicy};

/// Serves `app` on an ephemeral local port for the lifetime of the test runtime
pub async fn spawn_upstream(app: Router) -> SocketAddr {
    spawn_upstream_with(|_| app).await
}

/// Like [`spawn_upstream`], for routers that link back to their own address
pub async fn spawn_upstream_with(build: impl FnOnce(SocketAddr) -> Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = build(addr);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// A local address nothing listens on
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

pub fn test_config(upstream: SocketAddr) -> Config {
    Config {
        bind: "127.0.0.1:0".parse().unwrap(),
        channel_list_url: format!("http://{upstream}/nz.json"),
        validation: ValidationPolicy::Strict,
        concurrency: 2,
        timeout_secs: 5,
        resolver_url: format!("http://{upstream}/output.php"),
        relay_target: "https://webiptv.site/skynz.php?id={id}".to_string(),
        relay_id: "219026".to_string(),
    }
}

pub fn test_client() -> reqwest::Client {
    crate::util::init_http_client(Duration::from_secs(5)).unwrap()
}
