//! Read-only HTTP view of the latest snapshot (`GET /health`, `GET /state`).

use anyhow::{Context, Result};
use logger::now_iso;
use match_engine::MatchState;
use poller::SharedState;
use serde::Serialize;
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info};

#[derive(Serialize)]
struct StateBody<'a> {
    ts: String,
    state: Option<&'a MatchState>,
}

/// `(status line, content type, body)` for one request line.
fn route(method: &str, path: &str, snapshot: Option<&MatchState>) -> (&'static str, &'static str, String) {
    match (method, path) {
        ("GET", "/health") => ("HTTP/1.1 200 OK", "text/plain; charset=utf-8", "ok".to_string()),
        ("GET", "/state") => {
            let body = StateBody { ts: now_iso(), state: snapshot };
            let json = serde_json::to_string_pretty(&body).unwrap_or_else(|_| "{}".to_string());
            ("HTTP/1.1 200 OK", "application/json; charset=utf-8", json)
        }
        _ => (
            "HTTP/1.1 404 Not Found",
            "text/plain; charset=utf-8",
            "not found".to_string(),
        ),
    }
}

async fn handle_connection(mut stream: TcpStream, shared: SharedState) -> Result<()> {
    let mut buf = vec![0u8; 8192];
    let n = stream.read(&mut buf).await.context("http read")?;
    if n == 0 {
        return Ok(());
    }

    let req = String::from_utf8_lossy(&buf[..n]);
    let first_line = req.lines().next().unwrap_or_default();
    let mut parts = first_line.split_whitespace();
    let method = parts.next().unwrap_or("");
    let path = parts.next().unwrap_or("");

    let (status_line, content_type, body) = {
        let snapshot = shared.read().await;
        route(method, path, snapshot.as_ref())
    };

    let resp = format!(
        "{status_line}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    stream.write_all(resp.as_bytes()).await.context("http write")?;
    Ok(())
}

pub async fn serve_listener(listener: TcpListener, shared: SharedState) -> Result<()> {
    loop {
        let (stream, peer) = listener.accept().await.context("http accept")?;
        let shared = shared.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, shared).await {
                debug!("http handler err {}: {}", peer, e);
            }
        });
    }
}

pub async fn serve(bind: SocketAddr, shared: SharedState) -> Result<()> {
    let listener = TcpListener::bind(bind).await.context("http bind")?;
    info!("status http listening on http://{} (GET /health, /state)", bind);
    serve_listener(listener, shared).await
}
