//! Error types for settings draft operations.
//!
//! # Design
//! - Keep error messages constant while carrying context fields for debugging.
//! - Wrap transport failures untouched so the view layer can surface server messages.
//! - Every variant is recoverable; callers retry by re-invoking the operation.

use thiserror::Error;

use crate::schema::FieldKind;

/// Primary error type for settings form operations.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A save was requested while another save was still in flight.
    #[error("settings save already in progress")]
    SaveInProgress,
    /// The save transport reported a failure; drafts were preserved.
    #[error("settings save failed")]
    SaveFailed {
        /// Underlying transport failure.
        source: TransportError,
    },
    /// Fetching a fresh settings snapshot failed.
    #[error("settings request failed")]
    RequestFailed {
        /// Underlying transport failure.
        source: TransportError,
    },
    /// Field is not declared in the form schema.
    #[error("unknown settings field")]
    UnknownField {
        /// Name of the unexpected field.
        field: String,
    },
    /// Field value does not match the kind declared in the schema.
    #[error("invalid settings field value")]
    InvalidValue {
        /// Name of the offending field.
        field: String,
        /// Kind declared by the schema.
        expected: FieldKind,
        /// Kind of the value that was supplied.
        found: &'static str,
    },
    /// A snapshot document could not be mapped onto a field set.
    #[error("invalid settings snapshot")]
    InvalidSnapshot {
        /// Field (or `$` for the document root) that failed to map.
        field: String,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
    /// The form was torn down; late results were discarded.
    #[error("settings form disposed")]
    Disposed,
}

impl SettingsError {
    /// Transport failure carried by this error, if any.
    #[must_use]
    pub const fn transport(&self) -> Option<&TransportError> {
        match self {
            Self::SaveFailed { source } | Self::RequestFailed { source } => Some(source),
            _ => None,
        }
    }
}

/// Convenience alias for settings results.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Structured failure reported by a save transport or snapshot provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The settings endpoint could not be reached.
    #[error("settings endpoint unavailable")]
    Unavailable {
        /// Human-readable failure detail.
        message: String,
    },
    /// The settings endpoint refused the request.
    #[error("settings endpoint rejected the request")]
    Rejected {
        /// Machine-readable error code returned by the server.
        code: String,
        /// Human-readable failure detail.
        message: String,
    },
    /// The settings endpoint answered with an unreadable payload.
    #[error("settings response could not be decoded")]
    Decode {
        /// Human-readable failure detail.
        message: String,
    },
}

impl TransportError {
    /// Human-readable detail suitable for user-visible messaging.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Unavailable { message }
            | Self::Rejected { message, .. }
            | Self::Decode { message } => message,
        }
    }
}
