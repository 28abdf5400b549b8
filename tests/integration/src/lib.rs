//! Integration tests for BPA Guard.
//!
//! The reconciler runs against in-memory AWS collaborators while responses go
//! through the real [`HttpResponseSink`](bpa_guard_reconciler::HttpResponseSink)
//! to an in-process HTTP server standing in for the pre-signed S3 URL.
//!
//! Run them with:
//! ```text
//! cargo test -p bpa-guard-integration
//! ```

use std::net::SocketAddr;
use std::sync::Once;

use bytes::Bytes;
use http::{Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// A request received by the [`CaptureServer`].
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    /// HTTP method.
    pub method: Method,
    /// Path and query.
    pub path: String,
    /// `Content-Type` header, if sent.
    pub content_type: Option<String>,
    /// Raw body.
    pub body: Bytes,
}

/// Local HTTP server that records every request and answers with a fixed
/// status.
#[derive(Debug)]
pub struct CaptureServer {
    addr: SocketAddr,
    requests: mpsc::UnboundedReceiver<CapturedRequest>,
}

impl CaptureServer {
    /// Start a server on an ephemeral port.
    pub async fn start(status: StatusCode) -> Self {
        init_tracing();

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind capture server");
        let addr = listener.local_addr().expect("capture server address");
        let (tx, requests) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let tx = tx.clone();
                tokio::spawn(async move {
                    let svc = service_fn(move |req: Request<Incoming>| {
                        let tx = tx.clone();
                        async move {
                            let method = req.method().clone();
                            let path = req
                                .uri()
                                .path_and_query()
                                .map_or_else(String::new, ToString::to_string);
                            let content_type = req
                                .headers()
                                .get(http::header::CONTENT_TYPE)
                                .and_then(|v| v.to_str().ok())
                                .map(ToOwned::to_owned);
                            let body = req.into_body().collect().await?.to_bytes();
                            let _ = tx.send(CapturedRequest {
                                method,
                                path,
                                content_type,
                                body,
                            });
                            let mut response = Response::new(Full::new(Bytes::new()));
                            *response.status_mut() = status;
                            Ok::<_, hyper::Error>(response)
                        }
                    });
                    if let Err(e) = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), svc)
                        .await
                    {
                        tracing::debug!(error = %e, "capture connection closed");
                    }
                });
            }
        });

        Self { addr, requests }
    }

    /// URL for `path` on this server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Wait for the next captured request.
    pub async fn next_request(&mut self) -> CapturedRequest {
        tokio::time::timeout(std::time::Duration::from_secs(5), self.requests.recv())
            .await
            .expect("timed out waiting for request")
            .expect("capture server stopped")
    }

    /// Number of requests received and not yet consumed.
    pub fn pending(&mut self) -> usize {
        let mut count = 0;
        while self.requests.try_recv().is_ok() {
            count += 1;
        }
        count
    }
}

/// An address nothing listens on.
pub async fn closed_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("ephemeral address");
    drop(listener);
    format!("http://{addr}/response")
}

mod test_callback;
mod test_lifecycle;
