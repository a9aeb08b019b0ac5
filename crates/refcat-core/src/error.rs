// ── Core error types ──
//
// User-facing errors from refcat-core. Consumers never see reqwest errors
// or raw JSON failures. The `From<refcat_api::Error>` impl folds
// transport-layer errors into the three cases the UI distinguishes:
// no response, a rejected request, and an unreadable response.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach catalogue service at {url}: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("Catalogue request timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Malformed catalogue response: {message}")]
    Malformed { message: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Rejected by catalogue service (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }

    /// Returns `true` if the catalogue service never answered.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable { .. } | Self::Timeout)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Short message suitable for an inline error slot or alert.
    ///
    /// Offline and unreadable responses get fixed wording; rejections and
    /// validation failures carry the server's or validator's own text.
    pub fn user_message(&self) -> String {
        match self {
            Self::Unreachable { .. } | Self::Timeout => {
                "Catalogue service is offline or unreachable".into()
            }
            Self::NotFound { message }
            | Self::Rejected { message, .. }
            | Self::ValidationFailed { message } => message.clone(),
            Self::Malformed { .. } | Self::Internal(_) => {
                "Unexpected response from the catalogue service".into()
            }
            Self::Config { message } => format!("Configuration error: {message}"),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<refcat_api::Error> for CoreError {
    fn from(err: refcat_api::Error) -> Self {
        match err {
            refcat_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_decode() {
                    CoreError::Malformed {
                        message: e.to_string(),
                    }
                } else {
                    CoreError::Unreachable {
                        url: e
                            .url()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                }
            }
            refcat_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            refcat_api::Error::UnusableBaseUrl(url) => CoreError::Config {
                message: format!("Base URL cannot be used for catalogue requests: {url}"),
            },
            refcat_api::Error::Tls(msg) => CoreError::Unreachable {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            refcat_api::Error::Http {
                status: 404,
                detail,
            } => CoreError::NotFound { message: detail },
            refcat_api::Error::Http { status, detail } => CoreError::Rejected {
                status,
                message: detail,
            },
            refcat_api::Error::Deserialization { message, body: _ } => {
                CoreError::Malformed { message }
            }
            refcat_api::Error::InvalidArgument(message) => CoreError::ValidationFailed { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_surfaces_server_detail() {
        let err = CoreError::from(refcat_api::Error::Http {
            status: 409,
            detail: "Data point with this name already exists in this data type".into(),
        });
        assert!(matches!(err, CoreError::Rejected { status: 409, .. }));
        assert_eq!(
            err.user_message(),
            "Data point with this name already exists in this data type"
        );
    }

    #[test]
    fn http_404_maps_to_not_found() {
        let err = CoreError::from(refcat_api::Error::Http {
            status: 404,
            detail: "Data point not found".into(),
        });
        assert!(err.is_not_found());
    }

    #[test]
    fn offline_message_is_fixed() {
        let err = CoreError::Unreachable {
            url: "http://localhost:8000/api/v1".into(),
            reason: "connection refused".into(),
        };
        assert!(err.is_unreachable());
        assert_eq!(
            err.user_message(),
            "Catalogue service is offline or unreachable"
        );
    }

    #[test]
    fn deserialization_is_generic_for_users() {
        let err = CoreError::from(refcat_api::Error::Deserialization {
            message: "expected value at line 1 column 1".into(),
            body: "<html>".into(),
        });
        assert!(matches!(err, CoreError::Malformed { .. }));
        assert_eq!(
            err.user_message(),
            "Unexpected response from the catalogue service"
        );
    }
}
