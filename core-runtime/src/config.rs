//! # Command Event Configuration
//!
//! Typed view of the command event a host process hands to the sync job, and
//! its validation into [`JobSettings`].
//!
//! ## Overview
//!
//! The payload is produced by the integration platform and carries the
//! integration instance (`app`), its stored credentials (`app.formData`), its
//! option bag (`app.options_formData`, where the watermark lives), the command
//! to run, the company namespace and the run's sync id.
//!
//! Validation is fail-fast: every credential must be present and non-empty
//! before any network call is made.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CommandEvent;
//!
//! let event = CommandEvent::from_json(&raw)?;
//! let settings = event.settings("bench_time_client")?;
//! assert_eq!(settings.namespace, "acme_main");
//! ```

use crate::error::{Error, Result};
use crate::logging::redact_if_sensitive;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Target CRM deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Staging,
    Local,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Staging => "staging",
            Environment::Local => "local",
        }
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "production" => Ok(Environment::Production),
            "staging" => Ok(Environment::Staging),
            "local" => Ok(Environment::Local),
            other => Err(Error::Config(format!("Unknown environment: {}", other))),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Credentials and endpoints stored on the integration instance.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormData {
    #[serde(default)]
    pub repzo_api_key: Option<String>,
    #[serde(default)]
    pub suite_talk_url: Option<String>,
    #[serde(default)]
    pub consumer_key: Option<String>,
    #[serde(default)]
    pub consumer_secret: Option<String>,
    #[serde(default)]
    pub token_key: Option<String>,
    #[serde(default)]
    pub token_secret: Option<String>,
    #[serde(default)]
    pub realm: Option<String>,
}

impl fmt::Debug for FormData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |name: &str, value: &Option<String>| {
            value.as_deref().map(|v| redact_if_sensitive(name, v))
        };

        f.debug_struct("FormData")
            .field("repzo_api_key", &redact("repzo_api_key", &self.repzo_api_key))
            .field("suite_talk_url", &self.suite_talk_url)
            .field("consumer_key", &redact("consumer_key", &self.consumer_key))
            .field(
                "consumer_secret",
                &redact("consumer_secret", &self.consumer_secret),
            )
            .field("token_key", &redact("token_key", &self.token_key))
            .field("token_secret", &redact("token_secret", &self.token_secret))
            .field("realm", &self.realm)
            .finish()
    }
}

/// Integration instance the command runs for.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppInstance {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "formData", default)]
    pub form_data: FormData,
    #[serde(rename = "options_formData", default)]
    pub options_form_data: Map<String, Value>,
}

/// Inbound command payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandEvent {
    pub app: AppInstance,
    pub command: String,
    /// Company namespace segments, joined with `_`
    #[serde(rename = "nameSpace", default)]
    pub namespace: Vec<String>,
    #[serde(default)]
    pub sync_id: Option<String>,
    #[serde(default)]
    pub env: Option<String>,
}

/// ERP access parameters extracted from a validated event.
#[derive(Clone, PartialEq, Eq)]
pub struct NetSuiteAccess {
    /// Account REST root, e.g. `https://1234567.suitetalk.api.netsuite.com`
    pub suite_talk_url: String,
    pub realm: String,
    pub consumer_key: String,
    pub consumer_secret: String,
    pub token_key: String,
    pub token_secret: String,
}

impl fmt::Debug for NetSuiteAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetSuiteAccess")
            .field("suite_talk_url", &self.suite_talk_url)
            .field("realm", &self.realm)
            .field("consumer_key", &redact_if_sensitive("consumer_key", &self.consumer_key))
            .field(
                "consumer_secret",
                &redact_if_sensitive("consumer_secret", &self.consumer_secret),
            )
            .field("token_key", &redact_if_sensitive("token_key", &self.token_key))
            .field("token_secret", &redact_if_sensitive("token_secret", &self.token_secret))
            .finish()
    }
}

/// Everything a sync run needs, validated.
#[derive(Clone)]
pub struct JobSettings {
    pub app_id: String,
    pub command: String,
    /// `nameSpace` joined with `_`
    pub namespace: String,
    /// Stored watermark, empty when the integration never synced
    pub watermark: String,
    pub environment: Environment,
    /// Run identity for the command log, empty when the host sent none
    pub sync_id: String,
    pub repzo_api_key: String,
    pub netsuite: NetSuiteAccess,
}

impl fmt::Debug for JobSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobSettings")
            .field("app_id", &self.app_id)
            .field("command", &self.command)
            .field("namespace", &self.namespace)
            .field("watermark", &self.watermark)
            .field("environment", &self.environment)
            .field("sync_id", &self.sync_id)
            .field(
                "repzo_api_key",
                &redact_if_sensitive("repzo_api_key", &self.repzo_api_key),
            )
            .field("netsuite", &self.netsuite)
            .finish()
    }
}

fn required(field: &str, value: &Option<String>) -> Result<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(Error::Config(format!("{} is required", field))),
    }
}

impl CommandEvent {
    /// Parse a command event from raw JSON.
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Stored option value as text; missing or null reads as empty.
    pub fn option(&self, key: &str) -> String {
        match self.app.options_form_data.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    /// Validate the event into [`JobSettings`].
    ///
    /// `watermark_key` names the option holding the run watermark.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when a credential is missing or empty, or the
    /// environment is unknown.
    pub fn settings(&self, watermark_key: &str) -> Result<JobSettings> {
        let form = &self.app.form_data;

        let netsuite = NetSuiteAccess {
            suite_talk_url: required("suiteTalkUrl", &form.suite_talk_url)?
                .trim_end_matches('/')
                .to_string(),
            realm: required("realm", &form.realm)?,
            consumer_key: required("consumerKey", &form.consumer_key)?,
            consumer_secret: required("consumerSecret", &form.consumer_secret)?,
            token_key: required("tokenKey", &form.token_key)?,
            token_secret: required("tokenSecret", &form.token_secret)?,
        };
        let repzo_api_key = required("repzoApiKey", &form.repzo_api_key)?;

        if self.app.id.trim().is_empty() {
            return Err(Error::Config("app._id is required".to_string()));
        }

        let environment = match self.env.as_deref() {
            None | Some("") => Environment::default(),
            Some(env) => env.parse()?,
        };

        let settings = JobSettings {
            app_id: self.app.id.clone(),
            command: self.command.clone(),
            namespace: self.namespace.join("_"),
            watermark: self.option(watermark_key),
            environment,
            sync_id: self.sync_id.clone().unwrap_or_default(),
            repzo_api_key,
            netsuite,
        };

        debug!(
            app_id = %settings.app_id,
            namespace = %settings.namespace,
            environment = %settings.environment,
            "Command event validated"
        );

        Ok(settings)
    }
}
