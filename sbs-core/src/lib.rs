//! SBS Core - comment and user models for the SmileBASIC Source content API
//!
//! This crate follows hexagonal architecture:
//!
//! - **domain**: Comment, User and the metadata codec that packs display
//!   settings into a comment's text content
//! - **ports**: the `CommentTransport` trait the models talk through
//! - **adapters**: concrete transports (HTTP, in-memory)
//! - **config**: API URL and auth token settings

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use adapters::http::HttpTransport;
use config::Config;

// Re-export commonly used types at crate root
pub use domain::result::{Error, Result as CoreResult};
pub use domain::{Comment, CommentDraft, RawComment, RawUser, Settings, User};
pub use ports::CommentTransport;

/// Main context for SBS operations
///
/// Holds the loaded configuration and the transport every model operation
/// goes through.
pub struct SbsContext {
    pub config: Config,
    pub transport: Arc<dyn CommentTransport>,
}

impl SbsContext {
    /// Create a context talking HTTP to the configured API
    pub fn new(config_dir: &Path) -> Result<Self> {
        let config = Config::load(config_dir)?;
        let transport = Arc::new(HttpTransport::new(&config.api_url)?);

        tracing::debug!(api_url = %config.api_url, "context ready");
        Ok(Self { config, transport })
    }

    /// Create a context over an existing transport
    pub fn with_transport(config: Config, transport: Arc<dyn CommentTransport>) -> Self {
        Self { config, transport }
    }

    pub fn api_url(&self) -> &str {
        &self.config.api_url
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.config.auth_token.as_deref()
    }
}
