//! Loopback HTTP server with scripted replies.
//!
//! Exercises the real HTTP transport without leaving the machine. Each
//! accepted connection consumes the next scripted reply; once the script is
//! exhausted the listener closes and further connections are refused.

use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::task::JoinSet;

/// One scripted HTTP response.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
        }
    }

    fn to_response(&self) -> Response<Full<Bytes>> {
        let mut response = Response::new(Full::new(Bytes::from(self.body.clone())));
        *response.status_mut() =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        response
    }
}

/// A background server answering `replies` in order.
pub struct CannedServer {
    base_url: String,
    request_lines: Arc<Mutex<Vec<String>>>,
    handle: Option<JoinHandle<()>>,
}

impl CannedServer {
    /// Bind an ephemeral loopback port and start answering.
    ///
    /// # Panics
    /// Panics if the port cannot be bound.
    pub fn start(replies: Vec<Reply>) -> Self {
        let listener = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap_or_else(|e| panic!("CannedServer: failed to bind: {e}"));
        listener
            .set_nonblocking(true)
            .unwrap_or_else(|e| panic!("CannedServer: failed to configure listener: {e}"));
        let port = listener.local_addr().unwrap().port();
        let request_lines = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&request_lines);

        let handle = std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap_or_else(|e| panic!("CannedServer: failed to start runtime: {e}"));
            runtime.block_on(serve(listener, replies, seen));
        });

        Self {
            base_url: format!("http://127.0.0.1:{port}/"),
            request_lines,
            handle: Some(handle),
        }
    }

    /// `http://127.0.0.1:<port>/`
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request lines received so far, e.g. `GET /platformio.ini HTTP/1.1`.
    pub fn request_lines(&self) -> Vec<String> {
        self.request_lines.lock().unwrap().clone()
    }

    /// Wait for the scripted replies to be consumed.
    pub fn join(mut self) -> Vec<String> {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        self.request_lines()
    }
}

async fn serve(
    listener: std::net::TcpListener,
    replies: Vec<Reply>,
    seen: Arc<Mutex<Vec<String>>>,
) {
    let Ok(listener) = TcpListener::from_std(listener) else {
        return;
    };
    let mut connections = JoinSet::new();

    for reply in replies {
        let Ok((stream, _)) = listener.accept().await else {
            break;
        };
        let seen = Arc::clone(&seen);
        connections.spawn(async move {
            let service = service_fn(move |req: Request<Incoming>| {
                seen.lock().unwrap().push(format!(
                    "{} {} {:?}",
                    req.method(),
                    req.uri(),
                    req.version()
                ));
                let response = reply.to_response();
                async move { Ok::<_, Infallible>(response) }
            });
            // One request per connection keeps the script aligned with accepts.
            let _ = http1::Builder::new()
                .keep_alive(false)
                .serve_connection(TokioIo::new(stream), service)
                .await;
        });
    }

    drop(listener);
    while connections.join_next().await.is_some() {}
}
