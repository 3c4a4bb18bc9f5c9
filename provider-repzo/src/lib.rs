//! # Repzo Provider
//!
//! Implements the CRM contracts (`ClientService`, `IntegrationConfigStore`,
//! `CommandLogStore`) over the Repzo REST API.
//!
//! ## Overview
//!
//! This module provides:
//! - Environment-specific base URLs (production, staging, local)
//! - `api-key` authenticated JSON requests
//! - Paged client listing, client create and partial update
//! - Dotted-path option updates on integration instances
//! - Command log load and save

pub mod client;
pub mod error;

pub use client::RepzoClient;
pub use error::{RepzoError, Result};
