//! UpYun REST API client
//!
//! This module provides:
//! - UpYun request signing (md5 over method, uri, date, length, password digest)
//! - Endpoint selection between the auto route and the carrier routes
//! - Async storage operations (upload, download, stat, delete, folders, usage)
//! - Typed listing and metadata results

pub mod client;
pub mod endpoint;
pub mod error;
pub mod request;
pub mod signer;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use client::UpyunClient;
pub use endpoint::Endpoint;
pub use error::{Result, UpyunError};
pub use request::{Payload, RequestDescriptor};
pub use signer::{signature, Signer};
pub use transport::HttpTransport;
pub use types::{FileEntry, FileInfo, FileKind, FileStat};
