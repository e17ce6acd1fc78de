//! Rules engine interface
//!
//! The move-tree core treats chess itself as a black box: legality,
//! SAN generation and position encoding are delegated to an engine
//! behind this trait. Implementations are stateless over FEN strings;
//! the tree derives every working position from the cursor's FEN and
//! hands it back in.

use crate::error::GameResult;
use crate::types::{Color, PieceCode, PromotionChoice, Square};

/// What distinguishes a move whose resulting position the board surface
/// cannot derive from a simple piece slide
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveFlags {
    pub capture: bool,
    pub castle: bool,
    pub en_passant: bool,
    pub promotion: bool,
}

impl MoveFlags {
    /// True when the board surface must hard-set the position instead
    /// of animating the slide
    pub fn needs_hard_set(&self) -> bool {
        self.capture || self.castle || self.en_passant || self.promotion
    }
}

/// A move the rules engine validated and applied
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedMove {
    /// Short algebraic notation of the move, including check/mate suffix
    pub san: String,
    /// Position after the move
    pub resulting_fen: String,
    /// Side that made the move
    pub color: Color,
    pub flags: MoveFlags,
}

/// The consumed chess-rules interface
///
/// Errors are reserved for positions the engine cannot process at all
/// (unparseable FEN); an illegal but well-formed move attempt is the
/// `Ok(false)` / `Ok(None)` case, not an error.
pub trait RulesEngine {
    /// Whether any legal move goes from `from` to `to` in `fen`
    fn is_legal(&self, fen: &str, from: Square, to: Square) -> GameResult<bool>;

    /// Validate and apply a move, returning `None` if it is illegal.
    /// Promotion moves require `promotion` to pick the piece.
    fn apply_move(
        &self,
        fen: &str,
        from: Square,
        to: Square,
        promotion: Option<PromotionChoice>,
    ) -> GameResult<Option<AppliedMove>>;

    /// Side to move in `fen`
    fn current_turn(&self, fen: &str) -> GameResult<Color>;

    /// Whether the game has ended in `fen` (no legal moves, or a dead
    /// position)
    fn is_game_over(&self, fen: &str) -> GameResult<bool>;

    /// Piece standing on `square` in `fen`, if any
    fn piece_at(&self, fen: &str, square: Square) -> GameResult<Option<PieceCode>>;
}
