//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::ExtractorConfig;
use crate::engine::{Extractor, InboundEvent};
use crate::error::{Error, Result, ResultExt};
use crate::http::SentryClient;
use crate::loading::{self, LoadRequest};
use crate::repository::JsonlRepository;
use crate::state::StateManager;
use crate::types::ConnectionContext;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Extract {
                event,
                state,
                output,
                timeout,
            } => {
                self.extract(event.as_deref(), state.as_deref(), output, *timeout)
                    .await
            }
            Commands::Check { token, org } => self.check(token, org).await,
            Commands::Load { request } => self.load(request.as_deref()).await,
            Commands::Serve { port, output } => {
                let config = crate::cli::ServerConfig {
                    extractor: self.load_config()?,
                    output_dir: output.clone(),
                };
                crate::cli::serve(config, *port).await
            }
        }
    }

    /// Load extractor config, falling back to defaults
    fn load_config(&self) -> Result<ExtractorConfig> {
        match &self.cli.config {
            Some(path) => ExtractorConfig::from_file(path),
            None => Ok(ExtractorConfig::default()),
        }
    }

    /// Read a JSON request from a file or stdin
    async fn read_request<T: DeserializeOwned>(path: Option<&Path>) -> Result<T> {
        let raw = match path {
            Some(path) => tokio::fs::read_to_string(path)
                .await
                .context("Failed to read request file")?,
            None => {
                let mut buf = String::new();
                tokio::io::stdin()
                    .read_to_string(&mut buf)
                    .await
                    .context("Failed to read request from stdin")?;
                buf
            }
        };

        serde_json::from_str(&raw).map_err(|e| Error::invalid_event(e.to_string()))
    }

    /// Run one invocation
    async fn extract(
        &self,
        event_path: Option<&Path>,
        state_path: Option<&Path>,
        output: &Path,
        timeout: Option<u64>,
    ) -> Result<()> {
        let config = self.load_config()?;
        let mut event: InboundEvent = Self::read_request(event_path).await?;

        if event.deadline.is_none() {
            if let Some(secs) = timeout {
                let budget = chrono::Duration::from_std(Duration::from_secs(secs))
                    .map_err(|e| Error::invalid_value("timeout", e.to_string()))?;
                event = event.with_deadline(Utc::now() + budget);
            }
        }

        let manager = match state_path {
            Some(path) => {
                let existed = path.exists();
                let manager = StateManager::from_file(path)?;
                if existed {
                    tracing::debug!("Resuming from state file {}", path.display());
                    event = event.with_state(manager.snapshot().await);
                }
                manager
            }
            None => StateManager::in_memory(),
        };

        let repository = JsonlRepository::new(output)?;
        let extractor = Extractor::new(config, Arc::new(repository));
        let signal = extractor.handle(event).await;

        manager.replace(signal.state.clone()).await?;
        self.output_message(&signal);
        Ok(())
    }

    /// Apply one reverse-sync request
    async fn load(&self, request_path: Option<&Path>) -> Result<()> {
        let config = self.load_config()?;
        let request: LoadRequest = Self::read_request(request_path).await?;
        let client = SentryClient::new(&request.connection, &config)?;

        let response = loading::load(&client, &request).await;
        self.output_message(&response);
        Ok(())
    }

    /// Check connection
    async fn check(&self, token: &str, org: &str) -> Result<()> {
        let config = self.load_config()?;
        let client = SentryClient::new(&ConnectionContext::new(token, org), &config)?;

        match client.list_projects().await {
            Ok(projects) => {
                self.output_message(&json!({
                    "type": "CONNECTION_STATUS",
                    "status": "SUCCEEDED",
                    "organization": org,
                    "projects": projects.len()
                }));
                Ok(())
            }
            Err(e) => {
                self.output_message(&json!({
                    "type": "CONNECTION_STATUS",
                    "status": "FAILED",
                    "organization": org,
                    "message": e.to_string()
                }));
                Err(e)
            }
        }
    }

    /// Output a message
    fn output_message<T: Serialize>(&self, msg: &T) {
        let rendered = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(msg),
            OutputFormat::Pretty => serde_json::to_string_pretty(msg),
        };
        println!("{}", rendered.unwrap_or_default());
    }
}
