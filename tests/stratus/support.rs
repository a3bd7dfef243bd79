#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Canned response served for one matching request.
#[derive(Debug, Clone)]
pub struct CannedResponse {
    pub status: u16,
    pub body: String,
}

/// One request observed by the fake cluster, for assertions on mutations.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

type RouteTable = Arc<Mutex<HashMap<String, VecDeque<CannedResponse>>>>;

/// In-process cluster API standing in for a real API server. Routes are
/// stubbed per method+path; stubbing the same route repeatedly builds a
/// sequence where the final response stays sticky, which lets tests model
/// state that changes between poll attempts.
pub struct FakeCluster {
    routes: RouteTable,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    addr: SocketAddr,
    accept_task: JoinHandle<()>,
}

impl FakeCluster {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake cluster listener");
        let addr = listener.local_addr().expect("fake cluster address");
        let routes: RouteTable = Arc::new(Mutex::new(HashMap::new()));
        let requests = Arc::new(Mutex::new(Vec::new()));

        let accept_routes = Arc::clone(&routes);
        let accept_requests = Arc::clone(&requests);
        let accept_task = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                let routes = Arc::clone(&accept_routes);
                let requests = Arc::clone(&accept_requests);
                tokio::spawn(async move {
                    let _ = serve_connection(stream, routes, requests).await;
                });
            }
        });

        Self {
            routes,
            requests,
            addr,
            accept_task,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Queues a JSON response for the given method and path.
    pub fn stub<T: serde::Serialize>(&self, method: &str, path: &str, status: u16, body: &T) {
        let body = serde_json::to_string(body).expect("serialize stub body");
        let mut routes = self.routes.lock().expect("routes lock");
        routes
            .entry(route_key(method, path))
            .or_default()
            .push_back(CannedResponse { status, body });
    }

    /// Queues a bare 404 with a Kubernetes-style Status body.
    pub fn stub_not_found(&self, method: &str, path: &str) {
        let mut routes = self.routes.lock().expect("routes lock");
        routes
            .entry(route_key(method, path))
            .or_default()
            .push_back(not_found_response());
    }

    /// Requests observed so far, in arrival order.
    pub fn recorded(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl Drop for FakeCluster {
    fn drop(&mut self) {
        self.accept_task.abort();
    }
}

/// Builds an `ApiClient` pointed at the fake cluster. Callers hold the
/// serial-test lock: the endpoint travels through process environment.
pub fn client_for(cluster: &FakeCluster) -> stratus::stratus::api::ApiClient {
    std::env::set_var("STRATUS_SERVER", cluster.url());
    let client = stratus::stratus::api::ApiClient::from_env().expect("api client");
    std::env::remove_var("STRATUS_SERVER");
    client
}

fn route_key(method: &str, path: &str) -> String {
    format!("{} {}", method, path)
}

fn not_found_response() -> CannedResponse {
    CannedResponse {
        status: 404,
        body: r#"{"kind":"Status","apiVersion":"v1","status":"Failure","message":"the server could not find the requested resource","reason":"NotFound","code":404}"#
            .to_string(),
    }
}

async fn serve_connection(
    mut stream: TcpStream,
    routes: RouteTable,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
) -> std::io::Result<()> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let read = stream.read(&mut chunk).await?;
        if read == 0 {
            return Ok(());
        }
        buffer.extend_from_slice(&chunk[..read]);
        if let Some(pos) = find_header_end(&buffer) {
            break pos;
        }
    };

    let header_text = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let mut lines = header_text.lines();
    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let content_length = lines
        .filter_map(|line| {
            let (name, value) = line.split_once(':')?;
            if name.eq_ignore_ascii_case("content-length") {
                value.trim().parse::<usize>().ok()
            } else {
                None
            }
        })
        .next()
        .unwrap_or(0);

    let mut body = buffer[header_end + 4..].to_vec();
    while body.len() < content_length {
        let read = stream.read(&mut chunk).await?;
        if read == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..read]);
    }

    requests.lock().expect("requests lock").push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        body: String::from_utf8_lossy(&body).to_string(),
    });

    let response = {
        let mut routes = routes.lock().expect("routes lock");
        match routes.get_mut(&route_key(&method, &path)) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if queue.len() == 1 => queue.front().unwrap().clone(),
            _ => not_found_response(),
        }
    };

    let reason = match response.status {
        200 => "OK",
        404 => "Not Found",
        409 => "Conflict",
        500 => "Internal Server Error",
        _ => "Unknown",
    };
    let payload = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        response.status,
        reason,
        response.body.len(),
        response.body
    );
    stream.write_all(payload.as_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}

fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|window| window == b"\r\n\r\n")
}
