//! In-process fake WebDAV server for tests
//!
//! [`start_fake_dav`] serves every method and path from one fallback handler.
//! Each request is recorded; the answer is the status scripted for its
//! `(method, path)` with [`FakeDav::respond`], 201 Created otherwise.

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// One request as the server saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub content_length: Option<String>,
    pub body: Bytes,
}

#[derive(Default)]
pub struct FakeDav {
    requests: Mutex<Vec<Recorded>>,
    script: Mutex<HashMap<(String, String), (u16, String)>>,
}

impl FakeDav {
    pub fn respond(&self, method: &str, path: &str, status: u16, body: &str) {
        self.script.lock().unwrap().insert(
            (method.to_string(), path.to_string()),
            (status, body.to_string()),
        );
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    /// `(method, path)` of every request so far, in arrival order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.requests()
            .into_iter()
            .map(|r| (r.method, r.path))
            .collect()
    }
}

async fn handle(
    State(dav): State<Arc<FakeDav>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    dav.requests.lock().unwrap().push(Recorded {
        method: method.to_string(),
        path: uri.path().to_string(),
        authorization: header("authorization"),
        content_length: header("content-length"),
        body,
    });

    let scripted = dav
        .script
        .lock()
        .unwrap()
        .get(&(method.to_string(), uri.path().to_string()))
        .cloned();
    let (status, body) = scripted.unwrap_or((201, String::new()));
    match StatusCode::from_u16(status) {
        Ok(status) => (status, body).into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// Start a fake server on a free local port; returns its base URL.
pub async fn start_fake_dav() -> anyhow::Result<(String, Arc<FakeDav>)> {
    let dav = Arc::new(FakeDav::default());
    let app = Router::new()
        .fallback(handle)
        .layer(DefaultBodyLimit::disable())
        .with_state(Arc::clone(&dav));

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Ok((format!("http://{addr}"), dav))
}

/// Start a raw server that accepts one request, answers `status` with a body
/// shorter than its Content-Length, and hangs up.
pub async fn start_truncating_server(status: u16) -> anyhow::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut chunk = [0u8; 8192];
        let request_len = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                return;
            }
            request.extend_from_slice(&chunk[..n]);
            if let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                let headers = String::from_utf8_lossy(&request[..end]).to_lowercase();
                let declared = headers
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                break end + 4 + declared;
            }
        };
        while request.len() < request_len {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&chunk[..n]);
        }
        let head = format!("HTTP/1.1 {status} Status\r\nContent-Length: 100\r\n\r\npartial");
        socket.write_all(head.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
    });
    Ok(format!("http://{addr}"))
}
