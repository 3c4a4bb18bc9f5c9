//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the NetSuite sync job:
//! - Logging and tracing infrastructure
//! - Inbound command payload and its validation
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that other modules depend on.
//! It establishes the logging conventions and turns the raw command event a
//! host hands us into validated, typed job settings.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{CommandEvent, Environment, JobSettings, NetSuiteAccess};
pub use error::{Error, Result};
