//! Command dispatch: bridges CLI args -> catalogue calls -> output formatting.

pub mod choices;
pub mod config_cmd;
pub mod points;
pub mod status;
pub mod types;
pub mod util;

use refcat_core::Catalogue;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a catalogue-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    catalogue: &Catalogue,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Types(args) => types::handle(catalogue, args, global).await,
        Command::Points(args) => points::handle(catalogue, args, global).await,
        Command::Choices(args) => choices::handle(catalogue, args, global).await,
        Command::Status => status::handle(catalogue, global).await,
        // Config and Completions never reach dispatch.
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
