//! Integration test support for promptsmith
//!
//! Provides a loopback HTTP server that records what the real transport
//! sends and answers with a canned reply, so the vendor adapters can be
//! exercised end to end without network access.

use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use promptsmith_core::IgnoreLock as _;
use promptsmith_providers::ReqwestTransport;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt as _, AsyncReadExt as _, AsyncWriteExt as _, BufReader};
use tokio::net::{TcpListener, TcpStream};

/// One request as seen by the [`StubServer`].
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    /// HTTP method.
    pub method: String,
    /// Path and query string.
    pub target: String,
    /// Header names lowercased, in arrival order.
    pub headers: Vec<(String, String)>,
    /// Body parsed as JSON, `Null` if it was not JSON.
    pub body: Value,
}

impl CapturedRequest {
    /// First header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(header, _)| *header == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Canned response.
#[derive(Debug)]
struct StubReply {
    status: u16,
    body: String,
}

/// Loopback HTTP/1.1 server answering every request with the same reply.
pub struct StubServer {
    /// Bound address.
    addr: SocketAddr,
    /// Requests received so far.
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl StubServer {
    /// Starts a server replying with `status` and a raw `body`.
    ///
    /// # Errors
    /// Returns an error if no loopback port can be bound.
    pub async fn start<B: Into<String>>(status: u16, body: B) -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let captured = Arc::new(Mutex::new(Vec::new()));
        let reply = Arc::new(StubReply {
            status,
            body: body.into(),
        });

        let sink = Arc::clone(&captured);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(respond(stream, Arc::clone(&reply), Arc::clone(&sink)));
            }
        });

        Ok(Self { addr, captured })
    }

    /// Starts a server replying with `status` and a JSON body.
    ///
    /// # Errors
    /// Returns an error if no loopback port can be bound.
    pub async fn json(status: u16, body: &Value) -> io::Result<Self> {
        Self::start(status, body.to_string()).await
    }

    /// `http://127.0.0.1:<port>`
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.captured.lock_ignore_poison().clone()
    }
}

async fn respond(
    stream: TcpStream,
    reply: Arc<StubReply>,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
) -> io::Result<()> {
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_owned();
    let target = parts.next().unwrap_or_default().to_owned();

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).await?;
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            break;
        }
        if let Some((name, value)) = trimmed.split_once(':') {
            headers.push((name.trim().to_ascii_lowercase(), value.trim().to_owned()));
        }
    }

    let length = headers
        .iter()
        .find(|(name, _)| name == "content-length")
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or(0);
    let mut raw_body = vec![0; length];
    reader.read_exact(&mut raw_body).await?;

    captured.lock_ignore_poison().push(CapturedRequest {
        method,
        target,
        headers,
        body: serde_json::from_slice(&raw_body).unwrap_or(Value::Null),
    });

    let reason = StatusCode::from_u16(reply.status)
        .ok()
        .and_then(|status| status.canonical_reason())
        .unwrap_or("Unknown");
    let response = format!(
        "HTTP/1.1 {} {reason}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
        reply.status,
        reply.body.len(),
        reply.body
    );

    let mut stream = reader.into_inner();
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

/// Transport that ignores proxy settings from the environment.
///
/// # Errors
/// Returns an error if the client cannot be built.
pub fn loopback_transport() -> reqwest::Result<ReqwestTransport> {
    let client = Client::builder().no_proxy().build()?;
    Ok(ReqwestTransport::with_client(client))
}

/// Base URL of a port nothing listens on.
///
/// # Errors
/// Returns an error if no loopback port can be bound.
pub async fn refused_base_url() -> io::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}"))
}
