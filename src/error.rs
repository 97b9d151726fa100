//! Error types for forum protocol operations.

use thiserror::Error;

/// Result type alias for forum protocol operations.
pub type Result<T> = std::result::Result<T, ForumError>;

/// Main error type for forum protocol operations.
///
/// Parse-level conditions (malformed cards, orphaned parent references) are
/// never represented here: they are recovered locally by the search and
/// pagination layers, which skip the offending message and keep going. Only
/// transport-level failures and invalid caller input surface as errors.
#[derive(Error, Debug)]
pub enum ForumError {
    /// A transport request failed (network, rate limit, server rejection).
    #[error("Transport error: {0}")]
    Transport(String),

    /// Establishing the transport connection failed.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The transport refused an in-place message edit because its edit
    /// window has elapsed. The edit must not be reissued as delete+recreate:
    /// that changes the message identity and breaks grouped-media links.
    #[error("Edit window expired: the message can no longer be edited in place")]
    EditWindowExpired,

    /// A card send failed after the transport may already have committed it
    /// server-side. Retrying blindly could create a duplicate entity, so the
    /// caller must re-confirm with the user before sending again.
    #[error("Ambiguous send outcome: {0}")]
    AmbiguousSend(String),

    /// Serialization/deserialization errors at the transport boundary.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid input or arguments from the caller.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ForumError {
    /// Creates a new transport error.
    pub fn transport<T: ToString>(msg: T) -> Self {
        Self::Transport(msg.to_string())
    }

    /// Creates a new connection error.
    pub fn connection<T: ToString>(msg: T) -> Self {
        Self::Connection(msg.to_string())
    }

    /// Creates a new ambiguous-send error.
    pub fn ambiguous_send<T: ToString>(msg: T) -> Self {
        Self::AmbiguousSend(msg.to_string())
    }

    /// Creates a new serialization error.
    pub fn serialization<T: ToString>(msg: T) -> Self {
        Self::Serialization(msg.to_string())
    }

    /// Creates a new invalid input error.
    pub fn invalid_input<T: ToString>(msg: T) -> Self {
        Self::InvalidInput(msg.to_string())
    }

    /// Returns true if this error is the typed edit-window-expired failure.
    pub fn is_edit_window_expired(&self) -> bool {
        matches!(self, Self::EditWindowExpired)
    }
}
