//! CLI configuration: thin wrapper around `refcat_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--api-url, --insecure, --timeout).

use std::time::Duration;

use refcat_core::{CatalogueConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use refcat_config::{Config, Profile, config_path, load_config_or_default, save_config};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.profile_name(global.profile.as_deref()).to_owned()
}

/// Build the `CatalogueConfig` for this invocation.
///
/// Base URL: `--api-url` / `REFCAT_API_BASE_URL` > profile > default.
pub fn resolve(global: &GlobalOpts) -> Result<CatalogueConfig, CliError> {
    let cfg = load_config_or_default();
    resolve_with(&cfg, global)
}

pub fn resolve_with(cfg: &Config, global: &GlobalOpts) -> Result<CatalogueConfig, CliError> {
    let mut resolved = refcat_config::resolve_with_override(
        cfg,
        global.profile.as_deref(),
        global.api_url.as_deref().filter(|u| !u.trim().is_empty()),
    )?;

    if global.insecure {
        resolved.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        resolved.timeout = Duration::from_secs(secs);
    }
    Ok(resolved)
}
