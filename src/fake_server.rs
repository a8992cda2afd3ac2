//! Canned-JSON game server for tests.
//! Answers each connection once from a fixed route table and records what it was sent.

use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub path: String,
    pub body: String,
}

#[derive(Clone, Debug)]
struct Route {
    method: &'static str,
    path: &'static str,
    status: u16,
    body: String,
}

#[derive(Default)]
pub struct FakeServer {
    routes: Vec<Route>,
}

pub struct RunningServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<Request>>>,
}

impl RunningServer {
    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_to(&self, method: &str, path: &str) -> Option<Request> {
        self.requests()
            .into_iter()
            .find(|r| r.method == method && r.path == path)
    }
}

impl FakeServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, method: &'static str, path: &'static str, status: u16, body: impl Into<String>) -> Self {
        self.routes.push(Route { method, path, status, body: body.into() });
        self
    }

    pub async fn start(self) -> RunningServer {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let routes = Arc::new(self.routes);

        let seen = requests.clone();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let routes = routes.clone();
                let seen = seen.clone();
                tokio::spawn(async move { answer(socket, &routes, &seen).await });
            }
        });

        RunningServer { base_url, requests }
    }
}

async fn answer(mut socket: TcpStream, routes: &[Route], seen: &Mutex<Vec<Request>>) {
    let Some(request) = read_request(&mut socket).await else {
        return;
    };
    let (status, body) = routes
        .iter()
        .find(|r| r.method == request.method && r.path == request.path)
        .map(|r| (r.status, r.body.clone()))
        .unwrap_or((404, r#"{"error": "not found"}"#.to_string()));
    seen.lock().unwrap().push(request);

    let reason = match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        _ => "Internal Server Error",
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

async fn read_request(socket: &mut TcpStream) -> Option<Request> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);

        let Some(header_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
        let length = head
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        let body_start = header_end + 4;
        if buf.len() < body_start + length {
            continue;
        }

        let mut words = head.split_whitespace();
        let method = words.next()?.to_string();
        let path = words.next()?.to_string();
        let body = String::from_utf8_lossy(&buf[body_start..body_start + length]).to_string();
        return Some(Request { method, path, body });
    }
}
