use serde::{Deserialize, Serialize};

use crate::types::{PieceCode, Square};

/// A piece-drop reported by the board surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoveAttempt {
    pub from: Square,
    pub to: Square,
    pub piece: PieceCode,
}

/// Command produced for the board surface to execute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BoardCommand {
    /// Show `fen`. `animate: false` means hard-set: the position cannot
    /// be derived from a simple piece slide (capture, castle, en
    /// passant, promotion) or is an arbitrary jump.
    SetPosition { fen: String, animate: bool },
    /// Turn the board around
    Flip,
}

impl BoardCommand {
    pub fn set_position(fen: impl Into<String>, animate: bool) -> Self {
        BoardCommand::SetPosition {
            fen: fen.into(),
            animate,
        }
    }
}
