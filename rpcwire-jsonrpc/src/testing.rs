//! Helpers for testing the JSON RPC client.
//!
//! This module is only compiled when `test` is enabled.  Integration tests include it by path, so
//! it refers to this crate by name rather than through `crate::`.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use rpcwire_jsonrpc::{HttpRequest, HttpResponse, Transport};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;

/// Initialize tracing with a subscriber and some reasonable defaults suitable for enabling log
/// output in tests.
///
/// This is idempotent; it can be called from multiple tests in multiple threads but will only
/// initialize tracing once.
pub fn init_test_logging() {
    use std::sync::OnceLock;

    const DEFAULT_LOG_FILTER: &str = "rpcwire_jsonrpc=trace,info";
    static INIT_LOGGING: OnceLock<()> = OnceLock::new();

    INIT_LOGGING.get_or_init(|| {
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
            .with_test_writer()
            .try_init()
            .unwrap()
    });
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct MockTransportError(String);

enum MockReply {
    Respond(HttpResponse),
    Fail(String),
    Hang(PendingResponse),
}

#[derive(Default)]
struct MockState {
    replies: VecDeque<MockReply>,
    requests: Vec<HttpRequest>,
}

/// In-memory [`Transport`] which answers requests with canned responses, in the order they were
/// queued, and records every request it was asked to send.
///
/// Clones share the same queue and request log, so keep one clone to inspect after handing the
/// other to a client.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a `200 OK` response with this body
    pub fn respond(&self, body: impl Into<String>) -> &Self {
        self.respond_with(HttpResponse::ok(body.into()))
    }

    /// Queue a response with an arbitrary status
    pub fn respond_status(&self, status: u16, message: &str, body: impl Into<String>) -> &Self {
        self.respond_with(HttpResponse {
            status,
            status_message: message.to_string(),
            body: body.into().into_bytes(),
        })
    }

    pub fn respond_with(&self, response: HttpResponse) -> &Self {
        self.push(MockReply::Respond(response));
        self
    }

    /// Queue a transport-level failure, as though the connection was refused
    pub fn fail(&self, message: &str) -> &Self {
        self.push(MockReply::Fail(message.to_string()));
        self
    }

    /// Queue a response that never arrives.  The returned probe reports when the request starts,
    /// and when the transport's future is dropped.
    pub fn hang(&self) -> PendingResponse {
        let pending = PendingResponse::default();
        self.push(MockReply::Hang(pending.clone()));
        pending
    }

    /// Every request sent so far
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// The body of the most recent request, parsed as JSON
    pub fn last_request_json(&self) -> serde_json::Value {
        let requests = self.requests();
        let request = requests.last().expect("No requests were sent");
        serde_json::from_slice(&request.body).unwrap()
    }

    fn push(&self, reply: MockReply) {
        self.state.lock().unwrap().replies.push_back(reply);
    }
}

impl Transport for MockTransport {
    type Error = MockTransportError;

    fn execute(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse, Self::Error>> + Send + '_ {
        let reply = {
            let mut state = self.state.lock().unwrap();
            state.requests.push(request);
            state.replies.pop_front()
        };

        async move {
            match reply {
                Some(MockReply::Respond(response)) => Ok(response),
                Some(MockReply::Fail(message)) => Err(MockTransportError(message)),
                Some(MockReply::Hang(pending)) => {
                    let _dropped = pending.dropped.clone().drop_guard();
                    pending.started.cancel();
                    std::future::pending::<Result<HttpResponse, MockTransportError>>().await
                }
                None => Err(MockTransportError("No response queued in mock transport".to_string())),
            }
        }
    }
}

/// Probe into a request that never gets a response.
#[derive(Clone, Default)]
pub struct PendingResponse {
    started: CancellationToken,
    dropped: CancellationToken,
}

impl PendingResponse {
    /// Wait until the transport has started on the request
    pub async fn started(&self) {
        self.started.cancelled().await
    }

    /// Wait until the transport's future has been dropped
    pub async fn dropped(&self) {
        self.dropped.cancelled().await
    }

    pub fn is_dropped(&self) -> bool {
        self.dropped.is_cancelled()
    }
}

/// A request as received by [`HttpStub`]
#[derive(Clone, Debug)]
pub struct ReceivedRequest {
    pub request_line: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl ReceivedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Minimal HTTP/1.1 server on a random local port, for exercising the real `reqwest` transport.
///
/// Answers each connection with the next canned `(status, reason, body)`, then closes it.
pub struct HttpStub {
    addr: SocketAddr,
    received: Arc<Mutex<Vec<ReceivedRequest>>>,
    shutdown: CancellationToken,
}

impl HttpStub {
    pub async fn start(responses: Vec<(u16, &'static str, String)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let received = Arc::new(Mutex::new(Vec::new()));
        let shutdown = CancellationToken::new();

        let log = received.clone();
        let token = shutdown.clone();
        tokio::spawn(async move {
            let mut responses = VecDeque::from(responses);
            loop {
                let (stream, _) = tokio::select! {
                    _ = token.cancelled() => break,
                    accepted = listener.accept() => accepted.unwrap(),
                };
                let Some(response) = responses.pop_front() else {
                    break;
                };
                serve_one(stream, response, &log).await;
            }
        });

        Self {
            addr,
            received,
            shutdown,
        }
    }

    /// Base URL of the stub, with a trailing `/`
    pub fn base_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    pub fn received(&self) -> Vec<ReceivedRequest> {
        self.received.lock().unwrap().clone()
    }
}

impl Drop for HttpStub {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Read one request and write the response.  The request is logged before the response is sent, so
/// it's visible to the test by the time the client sees the response.
async fn serve_one(
    mut stream: TcpStream,
    (status, reason, body): (u16, &'static str, String),
    log: &Mutex<Vec<ReceivedRequest>>,
) {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "Connection closed before the request headers were complete");
        buffer.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let mut lines = head.split("\r\n").filter(|line| !line.is_empty());
    let request_line = lines.next().unwrap_or_default().to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .collect();

    let content_length: usize = headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
        .map(|(_, value)| value.parse().unwrap())
        .unwrap_or(0);

    while buffer.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "Connection closed before the request body was complete");
        buffer.extend_from_slice(&chunk[..n]);
    }
    log.lock().unwrap().push(ReceivedRequest {
        request_line,
        headers,
        body: buffer[header_end..header_end + content_length].to_vec(),
    });

    let response = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(response.as_bytes()).await.unwrap();
    stream.shutdown().await.unwrap();
}
