//! # Native Bridge Implementations
//!
//! Default implementations of bridge traits for server and CLI hosts.
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest` (rustls, connection pooling)
//!
//! The CRM and ERP contracts are implemented by the `provider-*` crates on top
//! of this transport.
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use bridge_native::ReqwestHttpClient;
//! use bridge_traits::HttpClient;
//!
//! let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new()?);
//! ```

mod http;

pub use http::ReqwestHttpClient;
