//! Shakmaty-backed rules engine
//!
//! Implements the [`RulesEngine`] interface the move-tree core consumes.
//! The adapter is stateless: every call parses the FEN it is handed,
//! answers against that position, and encodes the result back to
//! strings. Castling is matched both by the king's destination square
//! (the form a board surface reports, e.g. e1-g1) and by the rook
//! square shakmaty uses internally.

use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::{CastlingMode, Chess, EnPassantMode, Move, Position, Role};

use chesslogger_core::{
    AppliedMove, Color, GameError, GameResult, MoveFlags, PieceCode, PieceType, PromotionChoice,
    RulesEngine, Square,
};

/// Errors from position parsing and validation
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("unreadable FEN {fen:?}: {message}")]
    BadFen { fen: String, message: String },

    #[error("illegal position {fen:?}: {message}")]
    BadPosition { fen: String, message: String },
}

impl From<EngineError> for GameError {
    fn from(err: EngineError) -> Self {
        GameError::engine(err.to_string())
    }
}

/// The rules engine used by real games
#[derive(Debug, Clone, Copy, Default)]
pub struct ShakmatyEngine;

impl ShakmatyEngine {
    pub fn new() -> Self {
        ShakmatyEngine
    }

    fn position(fen: &str) -> Result<Chess, EngineError> {
        let setup: Fen = fen.parse().map_err(|err| EngineError::BadFen {
            fen: fen.to_string(),
            message: format!("{err}"),
        })?;
        setup
            .into_position(CastlingMode::Standard)
            .map_err(|err| EngineError::BadPosition {
                fen: fen.to_string(),
                message: format!("{err}"),
            })
    }

    fn to_engine_square(square: Square) -> shakmaty::Square {
        shakmaty::Square::from_coords(
            shakmaty::File::new(square.file.index() as u32),
            shakmaty::Rank::new(square.rank.index() as u32),
        )
    }

    fn to_color(color: shakmaty::Color) -> Color {
        match color {
            shakmaty::Color::White => Color::White,
            shakmaty::Color::Black => Color::Black,
        }
    }

    fn to_role(choice: PromotionChoice) -> Role {
        match choice {
            PromotionChoice::Queen => Role::Queen,
            PromotionChoice::Rook => Role::Rook,
            PromotionChoice::Bishop => Role::Bishop,
            PromotionChoice::Knight => Role::Knight,
        }
    }

    fn to_piece_type(role: Role) -> PieceType {
        match role {
            Role::Pawn => PieceType::Pawn,
            Role::Knight => PieceType::Knight,
            Role::Bishop => PieceType::Bishop,
            Role::Rook => PieceType::Rook,
            Role::Queen => PieceType::Queen,
            Role::King => PieceType::King,
        }
    }

    /// Where the king ends up if `m` is a castling move
    fn castle_king_target(m: &Move) -> Option<shakmaty::Square> {
        match *m {
            Move::Castle { king, rook } => {
                let file = if rook > king {
                    shakmaty::File::G
                } else {
                    shakmaty::File::C
                };
                Some(shakmaty::Square::from_coords(file, king.rank()))
            }
            _ => None,
        }
    }

    fn matches_squares(m: &Move, from: shakmaty::Square, to: shakmaty::Square) -> bool {
        if m.from() != Some(from) {
            return false;
        }
        m.to() == to || Self::castle_king_target(m) == Some(to)
    }

    /// The legal move the attempt describes, if there is one. A
    /// promotion move is only produced when a piece was chosen; the
    /// choice is ignored for non-promotion moves.
    fn find_move(
        pos: &Chess,
        from: Square,
        to: Square,
        promotion: Option<PromotionChoice>,
    ) -> Option<Move> {
        let from = Self::to_engine_square(from);
        let to = Self::to_engine_square(to);
        let mut candidates = pos
            .legal_moves()
            .into_iter()
            .filter(|m| Self::matches_squares(m, from, to));

        match promotion {
            Some(choice) => {
                let role = Self::to_role(choice);
                candidates.find(|m| m.promotion() == Some(role) || m.promotion().is_none())
            }
            None => candidates.next().filter(|m| !m.is_promotion()),
        }
    }
}

impl RulesEngine for ShakmatyEngine {
    fn is_legal(&self, fen: &str, from: Square, to: Square) -> GameResult<bool> {
        let pos = Self::position(fen)?;
        let from = Self::to_engine_square(from);
        let to = Self::to_engine_square(to);
        Ok(pos
            .legal_moves()
            .iter()
            .any(|m| Self::matches_squares(m, from, to)))
    }

    fn apply_move(
        &self,
        fen: &str,
        from: Square,
        to: Square,
        promotion: Option<PromotionChoice>,
    ) -> GameResult<Option<AppliedMove>> {
        let pos = Self::position(fen)?;
        let Some(m) = Self::find_move(&pos, from, to, promotion) else {
            return Ok(None);
        };

        let color = Self::to_color(pos.turn());
        let flags = MoveFlags {
            capture: m.is_capture(),
            castle: matches!(m, Move::Castle { .. }),
            en_passant: m.is_en_passant(),
            promotion: m.is_promotion(),
        };

        let mut next = pos;
        let san = SanPlus::from_move_and_play_unchecked(&mut next, &m).to_string();
        let resulting_fen = Fen::from_position(next, EnPassantMode::Legal).to_string();

        Ok(Some(AppliedMove {
            san,
            resulting_fen,
            color,
            flags,
        }))
    }

    fn current_turn(&self, fen: &str) -> GameResult<Color> {
        Ok(Self::to_color(Self::position(fen)?.turn()))
    }

    fn is_game_over(&self, fen: &str) -> GameResult<bool> {
        Ok(Self::position(fen)?.is_game_over())
    }

    fn piece_at(&self, fen: &str, square: Square) -> GameResult<Option<PieceCode>> {
        let pos = Self::position(fen)?;
        Ok(pos
            .board()
            .piece_at(Self::to_engine_square(square))
            .map(|piece| PieceCode::new(Self::to_color(piece.color), Self::to_piece_type(piece.role))))
    }
}
