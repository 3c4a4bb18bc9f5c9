//! # Authentication Module
//!
//! OAuth 1.0a request signing for token-based ERP access.
//!
//! ## Overview
//!
//! NetSuite's REST endpoints accept Token-Based Authentication: every request
//! carries an `Authorization: OAuth ...` header whose signature is an
//! HMAC-SHA256 over the method, URL and OAuth parameters. This crate builds
//! that header; it performs no network I/O.
//!
//! ## Features
//!
//! - HMAC-SHA256 signatures (RFC 5849 base string rules)
//! - Query parameters folded into the signature base string
//! - Injectable clock for deterministic timestamps
//! - Credential types whose `Debug` output never prints secrets

pub mod error;
pub mod oauth1;
pub mod types;

pub use error::{AuthError, Result};
pub use oauth1::{OAuth1Signer, OAuthParams, SIGNATURE_METHOD};
pub use types::{ConsumerCredentials, TokenCredentials};
