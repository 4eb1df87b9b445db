//! Test utilities: a minimal local HTTP server.

use std::{io, net::SocketAddr};

use tokio::{
    io::{AsyncReadExt as _, AsyncWriteExt as _},
    net::{TcpListener, TcpSocket, TcpStream},
    task::JoinHandle,
};

/// Serves a fixed response to a fixed number of connections, and records
/// the raw requests it received.
pub(crate) struct MockServer {
    addr: SocketAddr,
    requests: JoinHandle<io::Result<Vec<String>>>,
}

impl MockServer {
    /// Answer a single request.
    pub(crate) async fn start(status: u16, body: &'static str) -> io::Result<Self> {
        Self::start_many(1, status, body).await
    }

    /// Answer `n` requests, each on its own connection, concurrently.
    pub(crate) async fn start_many(n: usize, status: u16, body: &'static str) -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let requests = tokio::spawn(async move {
            let mut handlers = Vec::with_capacity(n);
            for _ in 0..n {
                let (socket, _) = listener.accept().await?;
                handlers.push(tokio::spawn(respond(socket, status, body)));
            }

            let mut requests = Vec::with_capacity(n);
            for handler in handlers {
                requests.push(handler.await.map_err(io::Error::other)??);
            }

            Ok::<_, io::Error>(requests)
        });

        Ok(Self { addr, requests })
    }

    /// Accept a connection and read the request, but never respond.
    pub(crate) async fn silent() -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let requests = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await?;
            read_request(&mut socket).await?;
            std::future::pending::<()>().await;
            Ok::<_, io::Error>(Vec::new())
        });

        Ok(Self { addr, requests })
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// The first request received.
    pub(crate) async fn request(self) -> anyhow::Result<String> {
        let mut requests = self.requests().await?;
        anyhow::ensure!(!requests.is_empty(), "no request received");
        Ok(requests.swap_remove(0))
    }

    /// Every request received, in the order the connections were accepted.
    pub(crate) async fn requests(self) -> anyhow::Result<Vec<String>> {
        Ok(self.requests.await??)
    }
}

/// A URL on a port that stays bound but never listens, so connections to it
/// are refused for as long as the value is alive.
pub(crate) struct RefusedUrl {
    _socket: TcpSocket,
    url: String,
}

impl std::ops::Deref for RefusedUrl {
    type Target = str;

    fn deref(&self) -> &str {
        &self.url
    }
}

pub(crate) async fn refused_url() -> io::Result<RefusedUrl> {
    let socket = TcpSocket::new_v4()?;
    socket.bind(SocketAddr::from(([127, 0, 0, 1], 0)))?;
    let addr = socket.local_addr()?;

    Ok(RefusedUrl {
        _socket: socket,
        url: format!("http://{addr}/"),
    })
}

async fn respond(mut socket: TcpStream, status: u16, body: &'static str) -> io::Result<String> {
    let request = read_request(&mut socket).await?;

    let reason = http::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown");
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\n\
         content-type: application/json\r\n\
         content-length: {}\r\n\
         connection: close\r\n\
         \r\n\
         {body}",
        body.len()
    );

    socket.write_all(response.as_bytes()).await?;
    socket.shutdown().await?;
    Ok(request)
}

async fn read_request(socket: &mut TcpStream) -> io::Result<String> {
    let mut buf = Vec::new();
    let mut chunk = [0; 4096];

    loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            break;
        }

        buf.extend_from_slice(&chunk[..n]);
        let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };

        let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
        let content_length = head
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);

        if buf.len() >= end + 4 + content_length {
            break;
        }
    }

    Ok(String::from_utf8_lossy(&buf).into_owned())
}
