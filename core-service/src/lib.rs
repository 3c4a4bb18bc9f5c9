//! Core service façade and bootstrap helpers.
//!
//! This crate routes inbound command events to the sync job and wires the
//! host-provided bridges (HTTP transport, clock) into the NetSuite and Repzo
//! providers. Server and CLI hosts enable the `native-shims` feature, which
//! pulls in the `reqwest` transport from `bridge-native`.

pub mod cli;
pub mod error;

pub use error::{CoreError, Result};

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use bridge_traits::{
    http::HttpClient,
    time::Clock,
};
use core_runtime::config::CommandEvent;
use core_sync::{ClientSyncCoordinator, SyncConfig, SyncRequest, SyncResult};
use provider_netsuite::NetSuiteConnector;
use provider_repzo::RepzoClient;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Commands this service answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandRoute {
    /// Sync NetSuite customers into Repzo clients
    AddClient,
}

impl CommandRoute {
    pub const ALL: &'static [CommandRoute] = &[CommandRoute::AddClient];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommandRoute::AddClient => "add_client",
        }
    }

    pub fn descriptor(&self) -> CommandDescriptor {
        match self {
            CommandRoute::AddClient => CommandDescriptor {
                command: self.as_str().to_string(),
                name: "Sync Clients".to_string(),
                description: String::new(),
            },
        }
    }
}

impl FromStr for CommandRoute {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "add_client" => Ok(CommandRoute::AddClient),
            other => Err(CoreError::UnknownRoute(other.to_string())),
        }
    }
}

impl fmt::Display for CommandRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Catalogue entry shown to integration hosts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDescriptor {
    pub command: String,
    pub name: String,
    pub description: String,
}

/// Descriptors of every supported command.
pub fn commands_list() -> Vec<CommandDescriptor> {
    CommandRoute::ALL.iter().map(CommandRoute::descriptor).collect()
}

/// Aggregated handle to the bridge dependencies the core requires.
pub struct CoreDependencies {
    pub http_client: Arc<dyn HttpClient>,
    pub clock: Arc<dyn Clock>,
}

impl CoreDependencies {
    /// Construct a dependency bundle from explicit bridge handles.
    pub fn new(http_client: Arc<dyn HttpClient>, clock: Arc<dyn Clock>) -> Self {
        Self { http_client, clock }
    }

    /// `reqwest` transport and the system clock.
    #[cfg(feature = "native-shims")]
    pub fn native() -> Result<Self> {
        let http = bridge_native::ReqwestHttpClient::new()
            .map_err(|err| CoreError::InitializationFailed(err.to_string()))?;
        Ok(Self::new(Arc::new(http), Arc::new(bridge_traits::time::SystemClock)))
    }
}

impl fmt::Debug for CoreDependencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoreDependencies").finish_non_exhaustive()
    }
}

/// Primary façade exposed to hosts.
#[derive(Clone)]
pub struct CoreService {
    deps: Arc<CoreDependencies>,
    sync_config: SyncConfig,
}

impl CoreService {
    /// Create a new service from the provided dependencies.
    pub fn new(deps: CoreDependencies) -> Self {
        Self {
            deps: Arc::new(deps),
            sync_config: SyncConfig::default(),
        }
    }

    pub fn with_sync_config(mut self, config: SyncConfig) -> Self {
        self.sync_config = config;
        self
    }

    /// Access the bridge dependencies being used by the service.
    pub fn dependencies(&self) -> Arc<CoreDependencies> {
        Arc::clone(&self.deps)
    }

    /// Parse a raw JSON event and dispatch it.
    pub async fn dispatch_json(&self, raw: &str) -> Result<SyncResult> {
        let event = CommandEvent::from_json(raw)?;
        self.dispatch(&event).await
    }

    /// Route `event` to its command.
    ///
    /// The route is resolved before the payload is validated, so an unknown
    /// command fails with [`CoreError::UnknownRoute`] regardless of its
    /// settings.
    #[instrument(skip_all, fields(command = %event.command))]
    pub async fn dispatch(&self, event: &CommandEvent) -> Result<SyncResult> {
        match event.command.parse::<CommandRoute>()? {
            CommandRoute::AddClient => self.sync_clients(event).await,
        }
    }

    async fn sync_clients(&self, event: &CommandEvent) -> Result<SyncResult> {
        let settings = event.settings(&self.sync_config.watermark_key)?;
        info!(
            app_id = %settings.app_id,
            environment = %settings.environment,
            namespace = %settings.namespace,
            "Dispatching client sync"
        );

        let netsuite = NetSuiteConnector::from_access(
            self.deps.http_client.clone(),
            &settings.netsuite,
            self.deps.clock.clone(),
        )?;
        let repzo = Arc::new(RepzoClient::new(
            self.deps.http_client.clone(),
            settings.repzo_api_key.clone(),
            settings.environment,
        ));

        let coordinator = ClientSyncCoordinator::new(
            self.sync_config.clone(),
            Arc::new(netsuite),
            repzo.clone(),
            repzo.clone(),
            repzo,
            self.deps.clock.clone(),
        );

        Ok(coordinator.run(&SyncRequest::from(&settings)).await?)
    }
}
