//! All UI actions. Actions are the only way state changes.

use refcat_core::{
    CoreError, DataPoint, DataType, LoadTicket, PendingMutation, RetrievalSnapshot,
};

use crate::screen::ScreenId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A toast shown above the status bar for a few seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Warning,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Info,
        }
    }
}

/// Which of the two preview controls a snapshot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewSlot {
    Select,
    Radio,
}

#[derive(Debug, Clone)]
pub enum Action {
    // ── App ──
    Quit,
    Tick,
    Render,
    Resize(u16, u16),
    SwitchScreen(ScreenId),
    GoBack,
    ToggleHelp,
    Notify(Notification),

    // ── Catalogue results ──
    /// Result of listing the data types; every screen receives it.
    TypesLoaded(Result<Vec<DataType>, CoreError>),
    PointsLoaded {
        ticket: LoadTicket,
        result: Result<Vec<DataPoint>, CoreError>,
    },
    MutationSettled {
        pending: PendingMutation,
        result: Result<Option<DataPoint>, CoreError>,
    },

    // ── Preview ──
    PreviewUpdated {
        slot: PreviewSlot,
        snapshot: RetrievalSnapshot,
    },
}
