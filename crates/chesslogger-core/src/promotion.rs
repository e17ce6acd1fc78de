//! Pending pawn promotion tracking
//!
//! When a move attempt drops a pawn on the last rank without naming a
//! piece, ingestion suspends: the attempt is parked here while an
//! external selector asks the player for their choice. Resolving or
//! cancelling the choice is the only way forward; every other tree
//! operation is rejected while a promotion is outstanding.

use crate::types::{Color, PieceCode, PieceType, Square};

/// A suspended move attempt waiting on a promotion choice
///
/// Two-phase request/continuation: `start` captures everything needed
/// to re-apply the move once a piece letter arrives, `clear` forgets it
/// (selection made or cancelled).
#[derive(Debug, Clone, Default)]
pub struct PendingPromotion {
    /// Source square of the suspended move
    pub from: Option<Square>,
    /// Target square (on the last rank)
    pub to: Option<Square>,
    /// The color of the pawn being promoted
    pub color: Option<Color>,
    /// Position the move is attempted from
    pub base_fen: Option<String>,
    /// Whether a promotion is currently pending
    pub is_pending: bool,
}

impl PendingPromotion {
    /// Park a move attempt until a piece is chosen
    pub fn start(&mut self, from: Square, to: Square, color: Color, base_fen: String) {
        self.from = Some(from);
        self.to = Some(to);
        self.color = Some(color);
        self.base_fen = Some(base_fen);
        self.is_pending = true;
    }

    /// Clear the pending promotion (after the player selects or cancels)
    pub fn clear(&mut self) {
        self.from = None;
        self.to = None;
        self.color = None;
        self.base_fen = None;
        self.is_pending = false;
    }

    /// Check if a promotion is pending
    pub fn is_active(&self) -> bool {
        self.is_pending
    }
}

/// Check if a piece drop results in promotion: a pawn landing on the
/// last rank for its color
pub fn is_promotion_move(piece: PieceCode, target: Square) -> bool {
    if piece.piece != PieceType::Pawn {
        return false;
    }
    match piece.color {
        Color::White => target.rank.index() == 7,
        Color::Black => target.rank.index() == 0,
    }
}
