//! Boundary error type for remote collaborators and the classified retry failure.

use super::policy::ErrorKind;

pub(crate) const NO_NETWORK_MESSAGE: &str =
    "No network connection available. Please check your connection and try again.";
pub(crate) const TIMEOUT_MESSAGE: &str =
    "Operation timed out. The network connection may be slow or unstable.";
pub(crate) const UNREACHABLE_MESSAGE: &str =
    "Cannot reach server. Please check your internet connection.";

/// Error returned by a remote collaborator (document store, probe, SDK bridge).
///
/// Everything a collaborator can fail with enters the core as one of these,
/// so classification stays in a single place.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The collaborator gave up waiting.
    #[error("operation timed out")]
    Timeout,
    /// DNS resolution or connect failed.
    #[error("cannot reach host: {0}")]
    UnreachableHost(String),
    /// The user dismissed an interactive step.
    #[error("{0}")]
    UserCancelled(String),
    /// The caller's own scope was cancelled. Never classified.
    #[error("cancelled by caller")]
    Cancelled,
    #[error("{collection}/{id} not found")]
    NotFound { collection: String, id: String },
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("malformed document: {0}")]
    Decode(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),
    #[error("http: {0}")]
    Http(#[from] curl::Error),
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for RemoteError {
    fn from(e: serde_json::Error) -> Self {
        RemoteError::Decode(e.to_string())
    }
}

/// Failure surfaced by the retry wrapper.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RetryError {
    /// Classified failure; `kind` is the classification of the last attempt.
    #[error("{message}")]
    Failed {
        kind: ErrorKind,
        message: String,
        attempts: u32,
    },
    /// The caller's cancellation scope fired; passed through unclassified.
    #[error("operation cancelled by caller")]
    Cancelled,
}

/// Result of one top-level call through the retry wrapper.
pub type RetryOutcome<T> = Result<T, RetryError>;

impl RetryError {
    pub(crate) fn no_network() -> Self {
        RetryError::Failed {
            kind: ErrorKind::NoNetwork,
            message: NO_NETWORK_MESSAGE.to_string(),
            attempts: 0,
        }
    }

    pub(crate) fn classified(kind: ErrorKind, err: &RemoteError, attempts: u32) -> Self {
        let message = match kind {
            ErrorKind::NoNetwork => NO_NETWORK_MESSAGE.to_string(),
            ErrorKind::Timeout => TIMEOUT_MESSAGE.to_string(),
            ErrorKind::UnreachableHost => UNREACHABLE_MESSAGE.to_string(),
            ErrorKind::UserCancelled => err.to_string(),
            ErrorKind::Other => format!(
                "Operation failed after {} attempts. Please try again later.",
                attempts
            ),
        };
        RetryError::Failed {
            kind,
            message,
            attempts,
        }
    }

    /// Classification, or `None` for caller cancellation.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            RetryError::Failed { kind, .. } => Some(*kind),
            RetryError::Cancelled => None,
        }
    }

    /// Number of attempts made before giving up (0 for the no-network short-circuit).
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Failed { attempts, .. } => *attempts,
            RetryError::Cancelled => 0,
        }
    }

    /// Message to show the user, or `None` when the failure should be silent
    /// (the user or the caller initiated the abort).
    pub fn user_message(&self) -> Option<&str> {
        match self {
            RetryError::Failed {
                kind: ErrorKind::UserCancelled,
                ..
            }
            | RetryError::Cancelled => None,
            RetryError::Failed { message, .. } => Some(message),
        }
    }
}
