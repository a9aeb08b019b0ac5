//! Reference-data logic between `refcat-api` and UI consumers (CLI / TUI).
//!
//! - **[`Catalogue`]**: Facade holding one shared [`CatalogueSource`] and
//!   vending per-consumer state machines.
//!
//! - **[`Retrieval`]**: Fetch-state machine for one data-type name
//!   (`Idle -> Loading -> Ready | Degraded`). Falls back to the built-in
//!   [`fallback`] snapshot when the service is unreachable and drops
//!   results that arrive after the key changed.
//!
//! - **[`ChoiceControl`]**: Select and radio variants of a form field whose
//!   options come from a retrieval, with an optional free-text "Other".
//!
//! - **[`CatalogueConsole`]**: Administrative two-pane state with
//!   optimistic add / edit / delete that rolls back on failure.

pub mod catalogue;
pub mod choice;
pub mod config;
pub mod console;
pub mod error;
pub mod fallback;
pub mod model;
pub mod retrieval;
pub mod source;

#[cfg(test)]
mod testing;

/// The HTTP client crate, for endpoints only one-shot consumers need
/// (search, bulk create, status).
pub use refcat_api as api;

// ── Primary re-exports ──────────────────────────────────────────────
pub use catalogue::Catalogue;
pub use choice::{
    ChoiceControl, ChoiceEvent, ChoiceOption, ChoiceProps, ChoiceVariant, ChoiceView, RadioLayout,
};
pub use config::{CatalogueConfig, TlsVerification};
pub use console::{
    CatalogueConsole, ConsoleRow, EditDraft, LoadTicket, Mutation, PendingMutation, PointDraft,
    RowKey,
};
pub use error::CoreError;
pub use retrieval::{Phase, Retrieval, RetrievalSnapshot, RetrievalStream};
pub use source::CatalogueSource;

pub use model::{
    CatalogueStatus, CreateDataPointRequest, DataPoint, DataType, EntityId,
    UpdateDataPointRequest,
};
