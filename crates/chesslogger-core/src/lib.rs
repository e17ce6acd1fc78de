//! Branching move-tree manager for logging and replaying chess games
//!
//! Tracks every move ever played in every explored variation, the cursor
//! identifying the displayed position, the reuse-vs-branch rules for
//! re-entered moves, and the lossless round-trip of the whole tree
//! through a flat storage document. Chess itself (legality, SAN, FEN) is
//! consumed as a black box behind [`RulesEngine`]; the board surface is
//! driven through [`BoardCommand`] values.

pub mod engine;
pub mod error;
pub mod events;
pub mod promotion;
pub mod session;
pub mod tree;
pub mod types;
pub mod wire;

/// The standard chess starting position
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

pub use engine::{AppliedMove, MoveFlags, RulesEngine};
pub use error::{GameError, GameResult};
pub use events::{BoardCommand, MoveAttempt};
pub use promotion::{is_promotion_move, PendingPromotion};
pub use session::{GameSession, MoveOutcome, SessionConfig};
pub use tree::{Cursor, Line, LineId, MoveTree, Recorded, Tempo, TempoId};
pub use types::{Color, PieceCode, PieceType, PromotionChoice, Square};
pub use wire::{GameDocument, GameInfo, LineRecord, TempoRecord};
