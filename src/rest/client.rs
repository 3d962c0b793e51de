//! UpYun REST client
//!
//! One async method per remote operation. Every call:
//! - builds a fresh [`RequestDescriptor`] (new date, new signature)
//! - binds it to the client's current [`Endpoint`] value
//! - sends exactly one request, no retries
//! - maps statuses outside 200..=204 to [`UpyunError::Api`]

use bytes::Bytes;
use http_body_util::{BodyExt, BodyStream};
use hyper::body::Incoming;
use hyper::header::HeaderMap;
use hyper::{Method, Response, StatusCode};
use std::path::Path;
use std::time::Duration;
use futures::StreamExt;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::endpoint::Endpoint;
use super::error::{Result, UpyunError};
use super::request::{bucket_uri, Payload, RequestDescriptor, HEADER_FOLDER, HEADER_MKDIR};
use super::signer::Signer;
use super::transport::HttpTransport;
use super::types::{parse_listing, FileEntry, FileInfo, FileStat};
use crate::config::Profile;

/// Sub-resource returning the bucket's used bytes
const USAGE_QUERY: &str = "?usage";

/// Statuses the API reports for a successful call
fn is_success(status: StatusCode) -> bool {
    (200..=204).contains(&status.as_u16())
}

fn api_error(status: StatusCode, body: &[u8]) -> UpyunError {
    let message = String::from_utf8_lossy(body).to_string();
    tracing::warn!(status = status.as_u16(), %message, "UpYun request rejected");
    UpyunError::Api { status, message }
}

/// Turn a non-success status into an API error carrying the body text
fn check_status(status: StatusCode, body: &[u8]) -> Result<()> {
    if is_success(status) {
        Ok(())
    } else {
        Err(api_error(status, body))
    }
}

/// UpYun storage client bound to one operator and bucket.
///
/// Clone is cheap - clones share the transport's connection pool.
#[derive(Clone, Debug)]
pub struct UpyunClient {
    transport: HttpTransport,
    signer: Signer,
    bucket: String,
    endpoint: Endpoint,
}

impl UpyunClient {
    /// Create a client on the auto-routing endpoint
    pub fn new(operator: impl Into<String>, password: &str, bucket: impl Into<String>) -> Result<Self> {
        Ok(Self::with_transport(HttpTransport::new()?, operator, password, bucket))
    }

    /// Create a client on an existing transport
    pub fn with_transport(
        transport: HttpTransport,
        operator: impl Into<String>,
        password: &str,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            signer: Signer::new(operator, password),
            bucket: bucket.into(),
            endpoint: Endpoint::Auto,
        }
    }

    /// Create a client from a configuration profile
    pub fn from_profile(profile: &Profile, transport: HttpTransport) -> Self {
        Self::with_transport(transport, profile.operator.clone(), &profile.password, profile.bucket.clone())
            .with_endpoint(Endpoint::from_route(profile.endpoint.as_deref()))
    }

    /// Switch endpoint, consuming the client
    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Switch endpoint in place
    pub fn set_endpoint(&mut self, endpoint: Endpoint) {
        self.endpoint = endpoint;
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.transport = self.transport.with_timeout(timeout);
        self
    }

    pub fn operator(&self) -> &str {
        self.signer.operator()
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    fn uri(&self, path: &str) -> String {
        bucket_uri(&self.bucket, path)
    }

    /// Send a descriptor against the current endpoint
    async fn dispatch(&self, descriptor: RequestDescriptor) -> Result<Response<Incoming>> {
        tracing::debug!(
            method = %descriptor.method(),
            uri = descriptor.uri(),
            endpoint = %self.endpoint,
            "UpYun request"
        );
        let request = descriptor.into_request(&self.endpoint, &self.signer).await?;
        let response = self.transport.send(request).await?;
        tracing::debug!(status = response.status().as_u16(), "UpYun response");
        Ok(response)
    }

    /// Send and collect the whole body, without status mapping
    async fn fetch(&self, descriptor: RequestDescriptor) -> Result<(StatusCode, HeaderMap, Bytes)> {
        let response = self.dispatch(descriptor).await?;
        let (parts, body) = response.into_parts();
        let body = body.collect().await?.to_bytes();
        Ok((parts.status, parts.headers, body))
    }

    /// Send, collect, and map non-success statuses to errors
    async fn execute(&self, descriptor: RequestDescriptor) -> Result<(HeaderMap, Bytes)> {
        let (status, headers, body) = self.fetch(descriptor).await?;
        check_status(status, &body)?;
        Ok((headers, body))
    }

    /// Upload a local file, creating missing parent folders.
    ///
    /// The file is stat'ed first; a missing or unreadable file fails with
    /// the original I/O error before any request is sent.
    pub async fn upload_file(&self, local_path: impl AsRef<Path>, remote_path: &str) -> Result<()> {
        let local_path = local_path.as_ref();
        let metadata = tokio::fs::metadata(local_path).await?;

        let descriptor = RequestDescriptor::new(
            Method::PUT,
            self.uri(remote_path),
            Payload::File(local_path.to_path_buf()),
            metadata.len(),
        )
        .flag(HEADER_MKDIR);

        self.execute(descriptor).await?;
        Ok(())
    }

    /// Upload an in-memory buffer, creating missing parent folders
    pub async fn upload_bytes(&self, data: impl Into<Bytes>, remote_path: &str) -> Result<()> {
        let data = data.into();
        let length = data.len() as u64;

        let descriptor = RequestDescriptor::new(
            Method::PUT,
            self.uri(remote_path),
            Payload::Buffer(data),
            length,
        )
        .flag(HEADER_MKDIR);

        self.execute(descriptor).await?;
        Ok(())
    }

    /// Download a file into memory
    pub async fn download(&self, remote_path: &str) -> Result<Bytes> {
        let descriptor = RequestDescriptor::new(Method::GET, self.uri(remote_path), Payload::Empty, 0);
        let (_, body) = self.execute(descriptor).await?;
        Ok(body)
    }

    /// Stream a file into `sink`, returning the number of bytes written.
    ///
    /// The sink is neither flushed nor shut down; that stays with the caller.
    pub async fn download_to<W>(&self, remote_path: &str, sink: &mut W) -> Result<u64>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let descriptor = RequestDescriptor::new(Method::GET, self.uri(remote_path), Payload::Empty, 0);
        let response = self.dispatch(descriptor).await?;
        let status = response.status();

        if !is_success(status) {
            let body = response.into_body().collect().await?.to_bytes();
            return Err(api_error(status, &body));
        }

        let mut body = BodyStream::new(response.into_body());
        let mut total_bytes = 0u64;

        while let Some(frame) = body.next().await {
            let frame = frame?;
            if let Some(chunk) = frame.data_ref() {
                sink.write_all(chunk).await?;
                total_bytes += chunk.len() as u64;
            }
        }

        Ok(total_bytes)
    }

    /// Probe a path with HEAD.
    ///
    /// Statuses are not mapped to errors: a missing path comes back as
    /// `status == 404` with default metadata.
    pub async fn stat(&self, remote_path: &str) -> Result<FileStat> {
        let descriptor = RequestDescriptor::new(Method::HEAD, self.uri(remote_path), Payload::Empty, 0);
        let (status, headers, _) = self.fetch(descriptor).await?;

        Ok(FileStat {
            status,
            info: FileInfo::from_headers(&headers),
        })
    }

    async fn delete(&self, remote_path: &str) -> Result<()> {
        let descriptor = RequestDescriptor::new(Method::DELETE, self.uri(remote_path), Payload::Empty, 0);
        self.execute(descriptor).await?;
        Ok(())
    }

    /// Delete a file
    pub async fn delete_file(&self, remote_path: &str) -> Result<()> {
        self.delete(remote_path).await
    }

    /// Delete an empty folder. The service tells folders from files by
    /// path, so this shares the file deletion request.
    pub async fn delete_folder(&self, remote_path: &str) -> Result<()> {
        self.delete(remote_path).await
    }

    /// Create a folder and any missing parents
    pub async fn create_folder(&self, remote_path: &str) -> Result<()> {
        let descriptor = RequestDescriptor::new(Method::POST, self.uri(remote_path), Payload::Empty, 0)
            .flag(HEADER_FOLDER)
            .flag(HEADER_MKDIR);
        self.execute(descriptor).await?;
        Ok(())
    }

    /// List the direct children of a folder in server order
    pub async fn list_folder(&self, remote_path: &str) -> Result<Vec<FileEntry>> {
        let descriptor = RequestDescriptor::new(Method::GET, self.uri(remote_path), Payload::Empty, 0);
        let (_, body) = self.execute(descriptor).await?;
        Ok(parse_listing(&String::from_utf8_lossy(&body)))
    }

    /// Bytes used by the bucket
    pub async fn usage(&self) -> Result<u64> {
        let mut uri = self.uri("/");
        uri.push_str(USAGE_QUERY);

        let descriptor = RequestDescriptor::new(Method::GET, uri, Payload::Empty, 0);
        let (_, body) = self.execute(descriptor).await?;

        let text = String::from_utf8_lossy(&body);
        text.trim()
            .parse()
            .map_err(|_| UpyunError::InvalidResponse(format!("Unexpected usage body: {:?}", text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> UpyunClient {
        UpyunClient::new("test", "test1234", "jackson-test-space").unwrap()
    }

    #[test]
    fn test_client_creation() {
        let client = client();
        assert_eq!(client.operator(), "test");
        assert_eq!(client.bucket(), "jackson-test-space");
        assert_eq!(client.endpoint(), &Endpoint::Auto);
    }

    #[test]
    fn test_set_endpoint() {
        let mut client = client();
        client.set_endpoint(Endpoint::from_route(Some("v1")));
        assert_eq!(client.endpoint().url(), "http://v1.api.upyun.com");

        client.set_endpoint(Endpoint::from_route(Some("http://www.baidu.com")));
        assert_eq!(client.endpoint().url(), "http://www.baidu.com");

        client.set_endpoint(Endpoint::from_route(None));
        assert_eq!(client.endpoint().url(), "http://v0.api.upyun.com");
    }

    #[test]
    fn test_clone_keeps_own_endpoint() {
        let original = client();
        let switched = original.clone().with_endpoint(Endpoint::Mobile);
        assert_eq!(original.endpoint(), &Endpoint::Auto);
        assert_eq!(switched.endpoint(), &Endpoint::Mobile);
    }

    #[test]
    fn test_success_range() {
        assert!(is_success(StatusCode::OK));
        assert!(is_success(StatusCode::NO_CONTENT));
        assert!(!is_success(StatusCode::PARTIAL_CONTENT));
        assert!(!is_success(StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn test_check_status_maps_body() {
        let err = check_status(StatusCode::UNAUTHORIZED, b"sign error").unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        match err {
            UpyunError::Api { message, .. } => assert_eq!(message, "sign error"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_debug_hides_password() {
        let out = format!("{:?}", client());
        assert!(!out.contains("test1234"));
    }
}
