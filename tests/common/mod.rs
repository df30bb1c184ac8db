//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use calendar_proxy::config::ProxyConfig;
use calendar_proxy::lifecycle::Shutdown;
use calendar_proxy::origin::OriginClient;
use calendar_proxy::HttpServer;

/// What the mock origin answers with.
pub struct OriginReply {
    pub status: u16,
    pub headers: Vec<(&'static str, &'static str)>,
    pub body: Vec<u8>,
}

impl OriginReply {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::status(200, body)
    }

    pub fn status(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn header(mut self, name: &'static str, value: &'static str) -> Self {
        self.headers.push((name, value));
        self
    }
}

/// A mock origin listening on an ephemeral port.
pub struct MockOrigin {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockOrigin {
    /// Base URL to configure as the proxy origin.
    pub fn base_url(&self) -> String {
        format!("http://{}/data", self.addr)
    }

    /// Request lines (`GET /data/a.ics HTTP/1.1`) seen so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Start a programmable origin. `reply` receives the request path.
pub async fn start_origin<F>(reply: F) -> MockOrigin
where
    F: Fn(&str) -> OriginReply + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let reply = Arc::new(reply);

    let seen = requests.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let reply = reply.clone();
                    let seen = seen.clone();
                    tokio::spawn(async move {
                        let Some(request_line) = read_request_head(&mut socket).await else {
                            return;
                        };
                        let path = request_line.split(' ').nth(1).unwrap_or("/").to_string();
                        seen.lock().unwrap().push(request_line);

                        let OriginReply { status, headers, body } = reply(&path);
                        let mut response = format!(
                            "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n",
                            status,
                            reason(status),
                            body.len()
                        );
                        for (name, value) in headers {
                            response.push_str(&format!("{name}: {value}\r\n"));
                        }
                        response.push_str("\r\n");

                        let mut bytes = response.into_bytes();
                        bytes.extend_from_slice(&body);
                        let _ = socket.write_all(&bytes).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockOrigin { addr, requests }
}

/// Start an origin that accepts connections and never answers.
pub async fn start_silent_origin() -> MockOrigin {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    MockOrigin {
        addr,
        requests: Arc::new(Mutex::new(Vec::new())),
    }
}

/// Read up to the end of the request head and return the request line.
async fn read_request_head(socket: &mut tokio::net::TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let head = String::from_utf8_lossy(&buf);
    head.lines().next().map(str::to_string)
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        203 => "Non-Authoritative Information",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// Start the proxy on an ephemeral port against `base_url`.
pub async fn start_proxy(base_url: &str) -> (SocketAddr, Shutdown) {
    start_proxy_with(proxy_config(base_url), client()).await
}

/// Default test config pointed at `base_url`, listening on an ephemeral port.
pub fn proxy_config(base_url: &str) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.origin.base_url = base_url.to_string();
    config
}

/// Start the proxy with an explicit config and origin client.
pub async fn start_proxy_with(
    config: ProxyConfig,
    origin_client: reqwest::Client,
) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let origin = OriginClient::with_client(origin_client, config.origin.base_url.clone());
    let server = HttpServer::with_origin(config, origin);
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// Client that never goes through an environment proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
