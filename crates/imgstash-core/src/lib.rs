//! imgstash-core: shared foundation for the Imgstash image store
//!
//! Provides the RFC 7807 problem-details response type used by every
//! HTTP-facing crate, plus the server configuration.

pub mod config;
pub mod problemdetails;

pub use config::ServerConfig;
