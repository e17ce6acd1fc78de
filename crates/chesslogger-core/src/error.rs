//! Error types for the move-tree core
//!
//! Provides custom error types for move ingestion, navigation and
//! document loading.

/// Errors that can occur while logging or replaying a game
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// Move rejected by the rules engine; the caller should snap the
    /// board back. The tree is unchanged.
    #[error("invalid move: {message}")]
    InvalidMove { message: String },

    /// Navigation command issued against an empty tree. Harmless.
    #[error("no moves have been recorded")]
    NoSelection,

    /// A promotion choice is outstanding; the suspended move must be
    /// resolved or cancelled before anything else touches the tree.
    #[error("a promotion choice is pending")]
    PromotionPending,

    /// A persisted game document is structurally inconsistent. The
    /// pre-load tree is left untouched.
    #[error("malformed game document: {reason}")]
    MalformedDocument { reason: String },

    /// The rules engine could not process a position it was handed.
    #[error("rules engine failure: {message}")]
    Engine { message: String },
}

impl GameError {
    /// Convenience constructor for [`GameError::InvalidMove`]
    pub fn invalid_move(message: impl Into<String>) -> Self {
        GameError::InvalidMove {
            message: message.into(),
        }
    }

    /// Convenience constructor for [`GameError::MalformedDocument`]
    pub fn malformed(reason: impl Into<String>) -> Self {
        GameError::MalformedDocument {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for [`GameError::Engine`]
    pub fn engine(message: impl Into<String>) -> Self {
        GameError::Engine {
            message: message.into(),
        }
    }
}

/// Result type alias for game operations
pub type GameResult<T> = Result<T, GameError>;
