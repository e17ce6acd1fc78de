//! Game session - coordinates the rules engine, the move tree and the
//! board surface
//!
//! One session owns one tree. Move attempts from the board surface come
//! in through [`GameSession::try_move`]; navigation commands re-derive
//! the displayed position from the cursor; the whole game round-trips
//! through the storage document of [`crate::wire`].
//!
//! The one suspension point is a pawn promotion without a chosen piece:
//! ingestion parks the attempt and answers
//! [`MoveOutcome::PromotionPending`]; until the choice is resolved or
//! cancelled every other mutating or navigating call fails with
//! [`GameError::PromotionPending`].

use tracing::{debug, info};

use crate::engine::{AppliedMove, RulesEngine};
use crate::error::{GameError, GameResult};
use crate::events::{BoardCommand, MoveAttempt};
use crate::promotion::{is_promotion_move, PendingPromotion};
use crate::tree::{Cursor, MoveTree, Recorded, TempoId};
use crate::types::{PieceCode, PromotionChoice};
use crate::wire::{self, GameDocument, GameInfo};
use crate::START_FEN;

/// Session settings
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Allow opening variations from mid-line positions. When false the
    /// session only ever extends the mainline.
    pub allow_multiple_lines: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            allow_multiple_lines: true,
        }
    }
}

/// What a move attempt did
#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    /// The move was newly recorded (possibly opening a variation)
    Recorded { tempo: TempoId, board: BoardCommand },
    /// The move was already recorded as a continuation; the cursor moved
    /// onto the existing Tempo and nothing was allocated
    Reused { tempo: TempoId, board: BoardCommand },
    /// A promotion choice is required before the move can be applied
    PromotionPending,
}

/// One logged game: rules engine, move tree, cursor, header and the
/// pending-promotion slot
pub struct GameSession<R> {
    engine: R,
    tree: MoveTree,
    game_info: GameInfo,
    game_id: Option<String>,
    pending: PendingPromotion,
    config: SessionConfig,
}

impl<R: RulesEngine> GameSession<R> {
    /// Start an empty game at the standard initial position
    pub fn new(engine: R, config: SessionConfig) -> Self {
        GameSession {
            engine,
            tree: MoveTree::new(START_FEN),
            game_info: GameInfo::default(),
            game_id: None,
            pending: PendingPromotion::default(),
            config,
        }
    }

    /// Start from a persisted game document
    pub fn from_document(
        engine: R,
        config: SessionConfig,
        doc: &GameDocument,
        id: Option<String>,
    ) -> GameResult<Self> {
        let mut session = GameSession::new(engine, config);
        session.load_document(doc, id)?;
        Ok(session)
    }

    pub fn tree(&self) -> &MoveTree {
        &self.tree
    }

    pub fn engine(&self) -> &R {
        &self.engine
    }

    pub fn game_info(&self) -> &GameInfo {
        &self.game_info
    }

    pub fn set_game_info(&mut self, info: GameInfo) {
        self.game_info = info;
    }

    pub fn game_id(&self) -> Option<&str> {
        self.game_id.as_deref()
    }

    pub fn set_game_id(&mut self, id: Option<String>) {
        self.game_id = id;
    }

    /// FEN of the position the cursor selects
    pub fn selected_fen(&self) -> &str {
        self.tree.selected_fen()
    }

    pub fn promotion_pending(&self) -> bool {
        self.pending.is_active()
    }

    // ------------------------------------------------------------------
    // Move ingestion
    // ------------------------------------------------------------------

    /// Handle a piece drop reported by the board surface
    ///
    /// Validates against the rules engine, then either appends at the
    /// end of the active line, reuses an already-recorded continuation,
    /// or opens a new variation. An attempt that needs a promotion
    /// choice suspends instead (see [`GameSession::resolve_promotion`]).
    /// On `InvalidMove` nothing changed and the caller should snap the
    /// piece back.
    pub fn try_move(&mut self, attempt: MoveAttempt) -> GameResult<MoveOutcome> {
        self.ensure_unlocked()?;

        if !self.tree.at_end_of_active_line() && !self.config.allow_multiple_lines {
            return Err(GameError::invalid_move("variations are disabled"));
        }

        let base_fen = self.tree.selected_fen().to_string();
        if !self.engine.is_legal(&base_fen, attempt.from, attempt.to)? {
            return Err(GameError::invalid_move(format!(
                "{}-{} is not legal here",
                attempt.from, attempt.to
            )));
        }

        if is_promotion_move(attempt.piece, attempt.to) {
            info!(
                "[PROMOTION] {} pawn reaches {}; awaiting piece choice",
                attempt.piece.color, attempt.to
            );
            self.pending
                .start(attempt.from, attempt.to, attempt.piece.color, base_fen);
            return Ok(MoveOutcome::PromotionPending);
        }

        let applied = self
            .engine
            .apply_move(&base_fen, attempt.from, attempt.to, None)?
            .ok_or_else(|| {
                GameError::invalid_move(format!("{}-{} was rejected", attempt.from, attempt.to))
            })?;
        self.commit(applied)
    }

    /// Resume a suspended promotion with the chosen piece
    pub fn resolve_promotion(&mut self, choice: PromotionChoice) -> GameResult<MoveOutcome> {
        if !self.pending.is_active() {
            return Err(GameError::invalid_move("no promotion is pending"));
        }
        let (from, to, base_fen) = (
            self.pending.from,
            self.pending.to,
            self.pending.base_fen.clone(),
        );
        self.pending.clear();
        let (Some(from), Some(to), Some(base_fen)) = (from, to, base_fen) else {
            return Err(GameError::invalid_move("no promotion is pending"));
        };

        let applied = self
            .engine
            .apply_move(&base_fen, from, to, Some(choice))?
            .ok_or_else(|| GameError::invalid_move("promotion was rejected"))?;
        self.commit(applied)
    }

    /// Abandon a suspended promotion; the tree is untouched
    pub fn cancel_promotion(&mut self) {
        if self.pending.is_active() {
            info!("[PROMOTION] choice cancelled; move abandoned");
        }
        self.pending.clear();
    }

    fn commit(&mut self, applied: AppliedMove) -> GameResult<MoveOutcome> {
        // capture, castle, en passant and promotion cannot be shown as a
        // simple piece slide
        let animate = !applied.flags.needs_hard_set();
        let recorded = self
            .tree
            .record(&applied.san, &applied.resulting_fen, applied.color)?;
        let board = BoardCommand::set_position(self.tree.selected_fen(), animate);

        match recorded {
            Recorded::Reused(tempo) => {
                debug!("[INGEST] {} reused an existing continuation", applied.san);
                Ok(MoveOutcome::Reused { tempo, board })
            }
            Recorded::Appended(tempo) => Ok(MoveOutcome::Recorded { tempo, board }),
            Recorded::Branched { tempo, .. } => {
                info!("[INGEST] {} opened a new variation", applied.san);
                Ok(MoveOutcome::Recorded { tempo, board })
            }
        }
    }

    /// Whether the board surface should let the player pick up `piece`
    /// at the displayed position
    pub fn can_pick_up(&self, piece: PieceCode) -> GameResult<bool> {
        if self.pending.is_active() {
            return Ok(false);
        }
        let fen = self.tree.selected_fen();
        if piece.color != self.engine.current_turn(fen)? {
            return Ok(false);
        }
        if self.tree.at_end_of_active_line() {
            Ok(!self.engine.is_game_over(fen)?)
        } else {
            // picking up mid-line starts a variation
            Ok(self.config.allow_multiple_lines)
        }
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    pub fn go_to_start(&mut self) -> GameResult<BoardCommand> {
        self.ensure_unlocked()?;
        self.tree.go_to_start();
        Ok(self.board_at_cursor())
    }

    pub fn go_to_end(&mut self) -> GameResult<BoardCommand> {
        self.ensure_unlocked()?;
        self.tree.go_to_end()?;
        Ok(self.board_at_cursor())
    }

    pub fn go_forward_one(&mut self) -> GameResult<BoardCommand> {
        self.ensure_unlocked()?;
        self.tree.go_forward_one()?;
        Ok(self.board_at_cursor())
    }

    pub fn go_back_one(&mut self) -> GameResult<BoardCommand> {
        self.ensure_unlocked()?;
        self.tree.go_back_one()?;
        Ok(self.board_at_cursor())
    }

    /// Jump the cursor to any recorded Tempo (entering its variation)
    /// or back to the sentinel
    pub fn set_position(&mut self, cursor: Cursor) -> GameResult<BoardCommand> {
        self.ensure_unlocked()?;
        self.tree.set_position(cursor);
        Ok(self.board_at_cursor())
    }

    pub fn flip_board(&self) -> BoardCommand {
        BoardCommand::Flip
    }

    // ------------------------------------------------------------------
    // Undo
    // ------------------------------------------------------------------

    /// Undo and erase the last move of the current line
    ///
    /// A silent no-op when the current line has nothing to revert.
    /// Variations hanging off earlier Tempos survive; if the pop empties
    /// a variation the cursor falls back to its parent Tempo.
    pub fn undo(&mut self) -> GameResult<Option<BoardCommand>> {
        self.ensure_unlocked()?;
        if self.tree.pop_last_tempo().is_none() {
            return Ok(None);
        }
        Ok(Some(self.board_at_cursor()))
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Snapshot the whole game as its storage document
    pub fn to_document(&self) -> GameDocument {
        GameDocument {
            game_info: self.game_info.clone(),
            pgn: wire::mainline_pgn(&self.tree, &self.game_info.result),
            line: wire::flatten(&self.tree),
        }
    }

    /// Replace this session's game with a persisted one
    ///
    /// All-or-nothing: a malformed document leaves the current game
    /// untouched.
    pub fn load_document(&mut self, doc: &GameDocument, id: Option<String>) -> GameResult<BoardCommand> {
        self.ensure_unlocked()?;
        let tree = wire::rehydrate(&doc.line)?;
        self.tree = tree;
        self.game_info = doc.game_info.clone();
        self.game_id = id;
        info!("[SESSION] loaded game ({} tempos)", self.tree.tempo_count());
        Ok(self.board_at_cursor())
    }

    /// Discard the current game and start a fresh one
    pub fn new_game(&mut self) -> BoardCommand {
        self.tree = MoveTree::new(START_FEN);
        self.game_info = GameInfo::default();
        self.game_id = None;
        self.pending.clear();
        info!("[SESSION] new game");
        self.board_at_cursor()
    }

    fn board_at_cursor(&self) -> BoardCommand {
        BoardCommand::set_position(self.tree.selected_fen(), true)
    }

    fn ensure_unlocked(&self) -> GameResult<()> {
        if self.pending.is_active() {
            return Err(GameError::PromotionPending);
        }
        Ok(())
    }
}
