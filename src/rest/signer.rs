//! UpYun request signer
//!
//! Signature = md5(METHOD & URI & DATE & CONTENT_LENGTH & md5(PASSWORD)),
//! sent as `Authorization: UpYun <operator>:<signature>`.
//!
//! The password digest is computed once at construction; the plain
//! password is dropped and never leaves this module.

use std::fmt;

/// Authorization scheme name expected by the API
pub const AUTH_SCHEME: &str = "UpYun";

/// Field separator of the string to sign
const SEPARATOR: &str = "&";

/// Lowercase hex MD5 of `data`
pub fn md5_hex(data: impl AsRef<[u8]>) -> String {
    hex::encode(md5::compute(data).0)
}

/// Compute the request signature from a plain password.
///
/// Pure function: identical inputs always yield the same 32-char hex string.
pub fn signature(method: &str, uri: &str, date: &str, content_length: u64, password: &str) -> String {
    sign_with_digest(method, uri, date, content_length, &md5_hex(password))
}

fn sign_with_digest(
    method: &str,
    uri: &str,
    date: &str,
    content_length: u64,
    password_digest: &str,
) -> String {
    let length = content_length.to_string();
    let to_sign = [method, uri, date, length.as_str(), password_digest].join(SEPARATOR);
    md5_hex(to_sign)
}

/// Request signer bound to one operator
#[derive(Clone)]
pub struct Signer {
    operator: String,
    /// Pre-computed md5(password)
    password_digest: String,
}

impl Signer {
    pub fn new(operator: impl Into<String>, password: &str) -> Self {
        Self {
            operator: operator.into(),
            password_digest: md5_hex(password),
        }
    }

    pub fn operator(&self) -> &str {
        &self.operator
    }

    /// Signature for one request
    pub fn sign(&self, method: &str, uri: &str, date: &str, content_length: u64) -> String {
        sign_with_digest(method, uri, date, content_length, &self.password_digest)
    }

    /// Full `Authorization` header value
    pub fn authorization(&self, method: &str, uri: &str, date: &str, content_length: u64) -> String {
        let signature = self.sign(method, uri, date, content_length);
        format!("{} {}:{}", AUTH_SCHEME, self.operator, signature)
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("operator", &self.operator)
            .field("password_digest", &"<redacted>")
            .finish()
    }
}
