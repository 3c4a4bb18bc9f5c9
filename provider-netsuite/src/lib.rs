//! # NetSuite Provider
//!
//! Implements the `CustomerSource` trait over the SuiteQL REST query service.
//!
//! ## Overview
//!
//! This module provides:
//! - SuiteQL query construction from a change window (day-granular filter)
//! - OAuth 1.0a (HMAC-SHA256) signed `POST .../query/v1/suiteql?limit&offset`
//! - Lenient decoding of customer rows, whose scalar columns may arrive as
//!   strings or numbers

pub mod connector;
pub mod error;
pub mod types;

pub use connector::NetSuiteConnector;
pub use error::{NetSuiteError, Result};
