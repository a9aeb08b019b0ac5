//! Shared helpers for command handlers.

use std::future::Future;
use std::path::Path;

use refcat_core::{Catalogue, CoreError, DataType};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

/// Await `fut` behind a spinner.
pub async fn with_spinner<T>(message: &str, global: &GlobalOpts, fut: impl Future<Output = T>) -> T {
    let bar = output::spinner(message, global);
    let out = fut.await;
    bar.finish_and_clear();
    out
}

/// Look a data type up by name among the active types.
pub async fn resolve_type(
    catalogue: &Catalogue,
    name: &str,
    global: &GlobalOpts,
) -> Result<DataType, CliError> {
    let types = with_spinner("Loading data types", global, catalogue.client().list_types())
        .await
        .map_err(CoreError::from)?;
    types
        .into_iter()
        .find(|t| t.name == name)
        .ok_or_else(|| CliError::NotFound {
            resource_type: "data type".into(),
            identifier: name.into(),
            list_command: "types list".into(),
        })
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Read and parse a JSON file for `--from-file` flags.
pub fn read_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "from-file".into(),
        reason: format!("invalid JSON: {e}"),
    })
}

/// Print a status line on stderr unless `--quiet`.
pub fn note(message: &str, global: &GlobalOpts) {
    if !global.quiet {
        eprintln!("{message}");
    }
}
