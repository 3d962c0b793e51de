//! Request construction
//!
//! A [`RequestDescriptor`] captures one call: method, signed uri, a fresh
//! HTTP date, content length, extra flag headers and the payload. It is
//! turned into a hyper request against an explicit [`Endpoint`].

use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use hyper::body::Frame;
use hyper::header::{HeaderName, HeaderValue, AUTHORIZATION, CONTENT_LENGTH, DATE};
use hyper::{Method, Request};
use std::borrow::Cow;
use std::path::PathBuf;
use tokio_util::io::ReaderStream;

use super::endpoint::Endpoint;
use super::error::Result;
use super::signer::Signer;
use super::transport::RequestBody;

/// Ask the service to create missing parent folders
pub const HEADER_MKDIR: &str = "mkdir";
/// Mark a POST as folder creation
pub const HEADER_FOLDER: &str = "folder";

/// Source of a request body
#[derive(Debug, Clone, Default)]
pub enum Payload {
    #[default]
    Empty,
    Buffer(Bytes),
    File(PathBuf),
}

/// Format a timestamp as an RFC 1123 HTTP-date
pub fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Build the signed request uri: `/<bucket><path>`, percent-encoded per
/// segment. Slashes are kept as-is; nothing else is validated.
pub fn bucket_uri(bucket: &str, path: &str) -> String {
    let raw = format!("/{}{}", bucket, path);
    raw.split('/')
        .map(urlencoding::encode)
        .collect::<Vec<Cow<'_, str>>>()
        .join("/")
}

/// Only methods that may carry a payload get a Content-Length header
fn sends_content_length(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::DELETE)
}

/// One logical request, not yet bound to an endpoint
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    method: Method,
    uri: String,
    date: String,
    content_length: u64,
    headers: Vec<(HeaderName, HeaderValue)>,
    payload: Payload,
}

impl RequestDescriptor {
    /// New descriptor stamped with the current time
    pub fn new(method: Method, uri: String, payload: Payload, content_length: u64) -> Self {
        Self {
            method,
            uri,
            date: http_date(Utc::now()),
            content_length,
            headers: Vec::new(),
            payload,
        }
    }

    /// Override the date (signature tests)
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    /// Add a `<name>: true` flag header
    pub fn flag(mut self, name: &'static str) -> Self {
        self.headers.push((
            HeaderName::from_static(name),
            HeaderValue::from_static("true"),
        ));
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    /// Sign and assemble the hyper request.
    ///
    /// A file payload is opened here and streamed; an open failure is
    /// returned as the original I/O error.
    pub async fn into_request(self, endpoint: &Endpoint, signer: &Signer) -> Result<Request<RequestBody>> {
        let authorization = signer.authorization(
            self.method.as_str(),
            &self.uri,
            &self.date,
            self.content_length,
        );

        let mut builder = Request::builder()
            .method(self.method.clone())
            .uri(endpoint.join(&self.uri))
            .header(AUTHORIZATION, authorization)
            .header(DATE, &self.date);

        if sends_content_length(&self.method) {
            builder = builder.header(CONTENT_LENGTH, self.content_length);
        }
        for (name, value) in self.headers {
            builder = builder.header(name, value);
        }

        let body: RequestBody = match self.payload {
            Payload::Buffer(bytes) => Full::new(bytes).map_err(|never| match never {}).boxed_unsync(),
            Payload::File(path) if self.content_length > 0 => {
                let file = tokio::fs::File::open(&path).await?;
                let stream = ReaderStream::new(file).map_ok(Frame::data);
                StreamBody::new(stream).boxed_unsync()
            }
            Payload::File(_) | Payload::Empty => {
                Empty::<Bytes>::new().map_err(|never| match never {}).boxed_unsync()
            }
        };

        Ok(builder.body(body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;

    const TEST_DATE: &str = "Wed, 21 Oct 2015 07:28:00 GMT";

    fn signer() -> Signer {
        Signer::new("test", "test1234")
    }

    #[test]
    fn test_http_date_format() {
        let at = Utc.with_ymd_and_hms(2015, 10, 21, 7, 28, 0).unwrap();
        assert_eq!(http_date(at), TEST_DATE);
    }

    #[test]
    fn test_bucket_uri() {
        assert_eq!(bucket_uri("bucket", "/a/b.txt"), "/bucket/a/b.txt");
        assert_eq!(bucket_uri("bucket", "/folder/"), "/bucket/folder/");
        assert_eq!(bucket_uri("bucket", "/my file.txt"), "/bucket/my%20file.txt");
    }

    #[tokio::test]
    async fn test_get_has_no_content_length() {
        let request = RequestDescriptor::new(
            Method::GET,
            "/jackson-test-space/sticker.jpg".to_string(),
            Payload::Empty,
            0,
        )
        .with_date(TEST_DATE)
        .into_request(&Endpoint::Auto, &signer())
        .await
        .unwrap();

        assert_eq!(request.method(), Method::GET);
        assert_eq!(
            request.uri().to_string(),
            "http://v0.api.upyun.com/jackson-test-space/sticker.jpg"
        );
        assert_eq!(request.headers()[DATE], TEST_DATE);
        assert_eq!(
            request.headers()[AUTHORIZATION],
            "UpYun test:ce61a1ebd2c0886c9d25ba889f5c8482"
        );
        assert!(request.headers().get(CONTENT_LENGTH).is_none());
    }

    #[tokio::test]
    async fn test_put_buffer_sets_length_and_flags() {
        let request = RequestDescriptor::new(
            Method::PUT,
            "/bucket/a.txt".to_string(),
            Payload::Buffer(Bytes::from_static(b"hello")),
            5,
        )
        .flag(HEADER_MKDIR)
        .into_request(&Endpoint::Telecom, &signer())
        .await
        .unwrap();

        assert_eq!(request.headers()[CONTENT_LENGTH], "5");
        assert_eq!(request.headers()[HEADER_MKDIR], "true");
        assert!(request.uri().to_string().starts_with("http://v1.api.upyun.com/"));

        let body = request.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"hello");
    }

    #[tokio::test]
    async fn test_delete_sends_zero_length() {
        let request = RequestDescriptor::new(Method::DELETE, "/bucket/a.txt".to_string(), Payload::Empty, 0)
            .into_request(&Endpoint::Auto, &signer())
            .await
            .unwrap();
        assert_eq!(request.headers()[CONTENT_LENGTH], "0");
    }

    #[tokio::test]
    async fn test_file_payload_is_streamed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"streamed content").unwrap();

        let request = RequestDescriptor::new(
            Method::PUT,
            "/bucket/s.txt".to_string(),
            Payload::File(file.path().to_path_buf()),
            16,
        )
        .into_request(&Endpoint::Auto, &signer())
        .await
        .unwrap();

        let body = request.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"streamed content");
    }

    #[tokio::test]
    async fn test_empty_file_payload_sends_no_body() {
        let request = RequestDescriptor::new(
            Method::POST,
            "/bucket/folder/".to_string(),
            Payload::File(PathBuf::from("/definitely/not/here")),
            0,
        )
        .into_request(&Endpoint::Auto, &signer())
        .await
        .unwrap();

        let body = request.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }

    #[test]
    fn test_descriptor_gets_fresh_date() {
        let d = RequestDescriptor::new(Method::HEAD, "/b/x".to_string(), Payload::Empty, 0);
        assert!(d.date().ends_with(" GMT"));
        assert_eq!(d.content_length(), 0);
    }
}
