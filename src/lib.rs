//! upyun - async client for the UpYun object storage REST API

pub mod cli;
pub mod config;
pub mod rest;

pub use config::Config;
pub use rest::{Endpoint, UpyunClient, UpyunError};
