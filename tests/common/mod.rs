//! Shared utilities for integration testing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use appsflyer_proxy::config::Settings;
use appsflyer_proxy::http::HttpServer;
use appsflyer_proxy::lifecycle::Shutdown;
use appsflyer_proxy::observability::StatsdClient;

/// A proxy instance under test.
#[allow(dead_code)]
pub struct TestProxy {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

/// Start the proxy on an ephemeral port, pointed at `endpoint`.
#[allow(dead_code)]
pub async fn spawn_proxy(endpoint: String, auth_key: &str, dev_key: &str) -> TestProxy {
    spawn_proxy_with_metrics(endpoint, auth_key, dev_key, None).await
}

/// Start the proxy with an optional StatsD producer attached.
#[allow(dead_code)]
pub async fn spawn_proxy_with_metrics(
    endpoint: String,
    auth_key: &str,
    dev_key: &str,
    metrics: Option<StatsdClient>,
) -> TestProxy {
    let settings = Settings {
        auth_key: auth_key.to_string(),
        dev_key: dev_key.to_string(),
        port: 0,
        endpoint,
        route_prefix: "appsflyer_proxy".to_string(),
        statsd: None,
    };

    let server = HttpServer::new(&settings, metrics).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let mut rx = shutdown.subscribe();
    let handle = tokio::spawn(server.run(listener, async move {
        let _ = rx.recv().await;
    }));

    // Let the accept loop come up before tests hit it.
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    TestProxy {
        addr,
        shutdown,
        handle,
    }
}

/// Start a programmable mock upstream on an ephemeral port.
///
/// The closure receives the captured request (head plus raw body) and
/// returns the status and body to respond with.
#[allow(dead_code)]
pub async fn start_mock_upstream<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let request = read_request(&mut socket).await;
                        let (status, body) = f(request).await;
                        let status_text = match status {
                            200 => "200 OK".to_string(),
                            400 => "400 Bad Request".to_string(),
                            401 => "401 Unauthorized".to_string(),
                            429 => "429 Too Many Requests".to_string(),
                            500 => "500 Internal Server Error".to_string(),
                            502 => "502 Bad Gateway".to_string(),
                            503 => "503 Service Unavailable".to_string(),
                            other => format!("{other} Status"),
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Read one HTTP request off the socket: head, then the body per
/// Content-Length or chunked framing. Best effort; returns what was read.
async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        if let Some(pos) = find_subslice(&buf, b"\r\n\r\n") {
            break pos;
        }
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return String::from_utf8_lossy(&buf).into_owned(),
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
    let mut body = buf.split_off(head_end + 4);

    if let Some(len) = header_value(&head, "content-length").and_then(|v| v.parse::<usize>().ok()) {
        while body.len() < len {
            match socket.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(n) => body.extend_from_slice(&chunk[..n]),
            }
        }
    } else if header_value(&head, "transfer-encoding")
        .is_some_and(|v| v.eq_ignore_ascii_case("chunked"))
    {
        while !body.ends_with(b"0\r\n\r\n") {
            match socket.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(n) => body.extend_from_slice(&chunk[..n]),
            }
        }
    }

    format!("{head}\r\n\r\n{}", String::from_utf8_lossy(&body))
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn header_value(head: &str, name: &str) -> Option<String> {
    head.lines().find_map(|line| {
        let (header, value) = line.split_once(':')?;
        header
            .trim()
            .eq_ignore_ascii_case(name)
            .then(|| value.trim().to_string())
    })
}
