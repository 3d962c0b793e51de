//! HTTP transport
//!
//! Thin wrapper around a pooled hyper client:
//! - HTTP/1.1 with TCP_NODELAY and keepalive
//! - native-tls for https endpoints
//! - Per-request timeout for body-less requests; uploads are bounded only
//!   by the connect timeout

use bytes::Bytes;
use http_body_util::combinators::UnsyncBoxBody;
use hyper::body::{Body, Incoming};
use hyper::{Request, Response};
use hyper_tls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client as HyperClient;
use hyper_util::rt::TokioExecutor;
use native_tls::TlsConnector;
use std::fmt;
use std::time::Duration;

use super::error::{Result, UpyunError};

/// Request body: empty, in-memory, or a file streamed from disk
pub type RequestBody = UnsyncBoxBody<Bytes, std::io::Error>;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Pooled HTTP(S) transport
///
/// Clone is cheap - the hyper client is reference counted.
#[derive(Clone)]
pub struct HttpTransport {
    client: HyperClient<HttpsConnector<HttpConnector>, RequestBody>,
    timeout: Duration,
}

impl HttpTransport {
    /// Transport with certificate verification enabled
    pub fn new() -> Result<Self> {
        Self::build(false)
    }

    /// Transport that accepts any certificate and hostname
    pub fn insecure() -> Result<Self> {
        Self::build(true)
    }

    fn build(insecure_tls: bool) -> Result<Self> {
        let mut http = HttpConnector::new();
        http.set_nodelay(true);
        http.enforce_http(false);
        http.set_connect_timeout(Some(Duration::from_secs(10)));
        http.set_keepalive(Some(Duration::from_secs(90)));

        let tls = if insecure_tls {
            tracing::warn!("INSECURE TLS MODE ENABLED: Certificate verification is disabled!");
            TlsConnector::builder()
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true)
                .build()?
        } else {
            TlsConnector::new()?
        };

        let https = HttpsConnector::from((http, tls.into()));

        let client = HyperClient::builder(TokioExecutor::new())
            .pool_idle_timeout(Duration::from_secs(90))
            .set_host(true)
            .build(https);

        Ok(Self {
            client,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send one request and return the response with its body unread.
    ///
    /// The timeout only applies when there is no body to send; uploads run
    /// until the server answers.
    pub async fn send(&self, request: Request<RequestBody>) -> Result<Response<Incoming>> {
        if !request.body().is_end_stream() {
            return Ok(self.client.request(request).await?);
        }

        match tokio::time::timeout(self.timeout, self.client.request(request)).await {
            Ok(response) => Ok(response?),
            Err(_) => Err(UpyunError::Timeout(self.timeout)),
        }
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("timeout", &self.timeout())
            .finish_non_exhaustive()
    }
}
