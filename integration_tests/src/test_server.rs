use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::Router;
use tokio::task::JoinHandle;

/// One request as seen by the test server.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// Stand-in for the error-tracking service: records every request and answers
/// with a fixed status after an optional delay.
pub struct TestServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn launch() -> anyhow::Result<Self> {
        Self::launch_with(StatusCode::OK, Duration::ZERO).await
    }

    pub async fn launch_with(status: StatusCode, delay: Duration) -> anyhow::Result<Self> {
        let requests: Arc<Mutex<Vec<CapturedRequest>>> = Arc::default();
        let recorded = requests.clone();

        let app = Router::new().fallback(
            move |method: Method, uri: Uri, headers: HeaderMap, body: Bytes| {
                let recorded = recorded.clone();
                async move {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    let request = CapturedRequest {
                        method,
                        path: uri.path().to_string(),
                        headers,
                        body,
                    };
                    if let Ok(mut requests) = recorded.lock() {
                        requests.push(request);
                    }
                    (status, r#"{"id":"accepted"}"#)
                }
            },
        );

        // 0: means port will be picked by the OS
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tracing::debug!("test server listening on {}", addr);

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("test server stopped: {}", e);
            }
        });

        Ok(Self {
            addr,
            requests,
            handle,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// DSN pointing at this server, e.g. `dsn("pub:priv", "42")`.
    pub fn dsn(&self, credentials: &str, project: &str) -> String {
        format!("http://{}@{}/{}", credentials, self.addr, project)
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
