// ── Runtime catalogue configuration ──
//
// Describes how to reach the catalogue service. Never touches disk: the
// CLI/TUI resolve profiles and environment through refcat-config and hand
// a `CatalogueConfig` in.

use std::path::PathBuf;
use std::time::Duration;

use refcat_api::{CatalogueClient, TlsMode, TransportConfig};

use crate::error::CoreError;

/// Base URL used when neither a profile nor the environment sets one.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Environment variable that overrides the base URL.
pub const API_BASE_URL_ENV: &str = "REFCAT_API_BASE_URL";

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed development servers).
    DangerAcceptInvalid,
}

/// Connection settings for a single catalogue service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogueConfig {
    /// API root, e.g. `http://localhost:8000/api/v1`. The client appends
    /// `/dynamic-data/...` itself.
    pub api_base_url: String,
    pub tls: TlsVerification,
    pub timeout: Duration,
}

impl Default for CatalogueConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl CatalogueConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            ..Self::default()
        }
    }

    /// Defaults, with the base URL taken from `REFCAT_API_BASE_URL` when set
    /// and non-empty.
    pub fn from_env() -> Self {
        match std::env::var(API_BASE_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Self::new(url.trim()),
            _ => Self::default(),
        }
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig::default()
            .with_timeout(self.timeout)
            .with_tls(match &self.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            })
    }

    /// Build a catalogue client for this configuration.
    pub fn client(&self) -> Result<CatalogueClient, CoreError> {
        Ok(CatalogueClient::new(&self.api_base_url, &self.transport())?)
    }
}
