//! Branching move-tree
//!
//! Tracks every move ever played in every explored variation of a game,
//! plus the single cursor identifying the position currently displayed.
//! The tree is self-referential (a Tempo's branches point at Lines whose
//! parent is that Tempo), so Lines and Tempos live in id-keyed arenas and
//! every back-reference is an id, never a pointer.
//!
//! # Architecture
//!
//! - [`Line`] - a contiguous run of half-moves sharing one branch point
//! - [`Tempo`] - one half-move with its resulting position
//! - [`Cursor`] - the selected position: the pre-game sentinel or a Tempo
//! - [`MoveTree`] - the arenas, the cursor, and every operation over them
//!
//! Navigation moves only the cursor; the tree itself is mutated solely by
//! [`MoveTree::record`] (append / reuse / branch) and
//! [`MoveTree::pop_last_tempo`] (undo).

use tracing::{debug, info};

use crate::error::{GameError, GameResult};
use crate::types::Color;

#[cfg(test)]
mod tests;

/// Arena id of a [`Line`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineId(u32);

/// Arena id of a [`Tempo`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TempoId(u32);

/// The selected position: before move one, or at a recorded half-move
///
/// A tagged variant instead of a shared "tempo zero" sentinel object, so
/// branching logic is exhaustive rather than relying on reference
/// identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    /// The pre-game position. Implies the current line is the root line.
    Start,
    At(TempoId),
}

impl Cursor {
    pub fn is_start(self) -> bool {
        matches!(self, Cursor::Start)
    }
}

/// One half-move and the position it produced
///
/// Immutable once appended, except for `branches`, which grows as
/// variations are opened from this Tempo.
#[derive(Debug, Clone)]
pub struct Tempo {
    /// Position after this move (FEN)
    pub fen: String,
    /// This move in short algebraic notation
    pub san: String,
    /// Side that made this move
    pub color: Color,
    /// 1-based count of half-moves from the game root up to and
    /// including this one
    pub number: u32,
    /// The line this Tempo is an element of
    pub owning_line: LineId,
    /// Variations beginning immediately after this move, in creation
    /// order (order is significant for display)
    pub branches: Vec<LineId>,
}

/// A contiguous run of Tempos sharing one branch point
#[derive(Debug, Clone)]
pub struct Line {
    /// Position at the beginning of the line; equals the parent Tempo's
    /// `fen`, or the game's initial position for the root line
    pub starting_fen: String,
    /// Count of half-moves that exist in the game before this line begins
    pub prior_tempos: u32,
    /// The Tempo this line deviates from; `None` only for the root line
    pub parent_tempo: Option<TempoId>,
    /// The moves in this line; no gaps, only the tail may be removed
    pub tempos: Vec<TempoId>,
}

/// What [`MoveTree::record`] did with a move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recorded {
    /// Appended to the end of the current line
    Appended(TempoId),
    /// The move was already recorded as a continuation of the cursor;
    /// nothing was allocated, the cursor moved onto the existing Tempo
    Reused(TempoId),
    /// A new variation was opened and the move became its first Tempo
    Branched { line: LineId, tempo: TempoId },
}

impl Recorded {
    /// The Tempo the cursor ended on
    pub fn tempo(self) -> TempoId {
        match self {
            Recorded::Appended(t) | Recorded::Reused(t) | Recorded::Branched { tempo: t, .. } => t,
        }
    }

    pub fn is_reuse(self) -> bool {
        matches!(self, Recorded::Reused(_))
    }
}

/// The whole branching history of one game, plus its cursor
#[derive(Debug, Clone)]
pub struct MoveTree {
    lines: Vec<Option<Line>>,
    tempos: Vec<Option<Tempo>>,
    root: LineId,
    current_line: LineId,
    cursor: Cursor,
}

impl MoveTree {
    /// Create an empty tree rooted at `start_fen`, cursor at the sentinel
    pub fn new(start_fen: impl Into<String>) -> Self {
        let root = Line {
            starting_fen: start_fen.into(),
            prior_tempos: 0,
            parent_tempo: None,
            tempos: Vec::new(),
        };
        MoveTree {
            lines: vec![Some(root)],
            tempos: Vec::new(),
            root: LineId(0),
            current_line: LineId(0),
            cursor: Cursor::Start,
        }
    }

    pub fn root(&self) -> LineId {
        self.root
    }

    pub fn current_line(&self) -> LineId {
        self.current_line
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Resolve a line id. Ids handed out by this tree stay valid until
    /// the node is removed by an undo.
    pub fn line(&self, id: LineId) -> &Line {
        self.lines[id.0 as usize].as_ref().expect("stale line id")
    }

    /// Resolve a tempo id
    pub fn tempo(&self, id: TempoId) -> &Tempo {
        self.tempos[id.0 as usize].as_ref().expect("stale tempo id")
    }

    fn line_mut(&mut self, id: LineId) -> &mut Line {
        self.lines[id.0 as usize].as_mut().expect("stale line id")
    }

    fn tempo_mut(&mut self, id: TempoId) -> &mut Tempo {
        self.tempos[id.0 as usize].as_mut().expect("stale tempo id")
    }

    /// FEN of the position the cursor selects
    pub fn selected_fen(&self) -> &str {
        match self.cursor {
            Cursor::Start => &self.line(self.root).starting_fen,
            Cursor::At(id) => &self.tempo(id).fen,
        }
    }

    /// True when no move has been recorded anywhere in the tree
    ///
    /// Branches hang off Tempos, so an empty root line means an empty
    /// tree.
    pub fn is_empty(&self) -> bool {
        self.line(self.root).tempos.is_empty()
    }

    /// Number of live Tempos across all variations
    pub fn tempo_count(&self) -> usize {
        self.tempos.iter().flatten().count()
    }

    /// Number of live Lines, the root included
    pub fn line_count(&self) -> usize {
        self.lines.iter().flatten().count()
    }

    // ------------------------------------------------------------------
    // Navigation: moves the cursor, never mutates nodes
    // ------------------------------------------------------------------

    /// Select the pre-game sentinel. Always succeeds.
    pub fn go_to_start(&mut self) {
        self.cursor = Cursor::Start;
        self.current_line = self.root;
    }

    /// Select the last Tempo of the current line
    pub fn go_to_end(&mut self) -> GameResult<()> {
        if self.is_empty() {
            return Err(GameError::NoSelection);
        }
        if let Some(&last) = self.line(self.current_line).tempos.last() {
            self.cursor = Cursor::At(last);
        }
        Ok(())
    }

    /// Advance one Tempo within the current line
    ///
    /// No-op at the end of the line: the tree never auto-chooses among
    /// branches, entering one goes through [`MoveTree::set_position`].
    pub fn go_forward_one(&mut self) -> GameResult<()> {
        if self.is_empty() {
            return Err(GameError::NoSelection);
        }
        let line = self.line(self.current_line);
        let next = match self.cursor {
            Cursor::Start => line.tempos.first().copied(),
            Cursor::At(id) => line
                .tempos
                .iter()
                .position(|&t| t == id)
                .and_then(|pos| line.tempos.get(pos + 1).copied()),
        };
        if let Some(next) = next {
            self.cursor = Cursor::At(next);
        }
        Ok(())
    }

    /// Step one Tempo back, crossing into the parent line at the top of
    /// a variation
    pub fn go_back_one(&mut self) -> GameResult<()> {
        if self.is_empty() {
            return Err(GameError::NoSelection);
        }
        let Cursor::At(id) = self.cursor else {
            return Ok(()); // already at the sentinel
        };
        let line = self.line(self.current_line);
        match line.tempos.iter().position(|&t| t == id) {
            Some(0) | None => {
                if line.prior_tempos == 0 {
                    self.go_to_start();
                } else if let Some(parent) = line.parent_tempo {
                    self.set_position(Cursor::At(parent));
                }
            }
            Some(pos) => self.cursor = Cursor::At(line.tempos[pos - 1]),
        }
        Ok(())
    }

    /// Jump directly to any recorded Tempo (or back to the sentinel).
    /// This is how a branch is entered: selecting a Tempo of another
    /// line reassigns the current line to that Tempo's owning line.
    pub fn set_position(&mut self, cursor: Cursor) {
        match cursor {
            Cursor::Start => self.go_to_start(),
            Cursor::At(id) => {
                self.current_line = self.tempo(id).owning_line;
                self.cursor = cursor;
            }
        }
    }

    /// True iff the current line is empty or the cursor sits on its
    /// last Tempo
    pub fn at_end_of_active_line(&self) -> bool {
        let line = self.line(self.current_line);
        match self.cursor {
            Cursor::Start => line.tempos.is_empty(),
            Cursor::At(id) => line.tempos.last() == Some(&id),
        }
    }

    /// Cursor for the `n`-th Tempo (1-based) of the current line
    ///
    /// `n < 1` selects the position just before the line: the sentinel
    /// for the root, the parent Tempo for a variation. An `n` past the
    /// end leaves the selection where it is.
    pub fn tempo_by_number(&self, n: i64) -> Cursor {
        let line = self.line(self.current_line);
        if n < 1 {
            return match line.parent_tempo {
                Some(parent) => Cursor::At(parent),
                None => Cursor::Start,
            };
        }
        match line.tempos.get(n as usize - 1) {
            Some(&id) => Cursor::At(id),
            None => self.cursor,
        }
    }

    /// Whether `target` lies on the path from the game root to the
    /// cursor's line
    ///
    /// Walks upward from the current line: the current line counts in
    /// full (independent of where the cursor sits within it); each
    /// ancestor line counts only up to the Tempo its child branched
    /// from.
    pub fn is_on_active_path(&self, target: TempoId) -> bool {
        let mut line_id = self.current_line;
        let mut branch_point: Option<TempoId> = None;
        loop {
            let line = self.line(line_id);
            if self.tempo(target).owning_line == line_id {
                let target_pos = line.tempos.iter().position(|&t| t == target);
                return match (target_pos, branch_point) {
                    (Some(tp), Some(bp)) => {
                        line.tempos.iter().position(|&t| t == bp).is_some_and(|bpos| tp <= bpos)
                    }
                    (Some(_), None) => true,
                    (None, _) => false,
                };
            }
            match line.parent_tempo {
                Some(parent) => {
                    branch_point = Some(parent);
                    line_id = self.tempo(parent).owning_line;
                }
                None => return false,
            }
        }
    }

    /// Whether a movelist rendering of this Tempo needs a "..." white
    /// placeholder: a black move that opens its line, or that follows a
    /// Tempo with branches
    pub fn needs_white_placeholder(&self, id: TempoId) -> bool {
        let tempo = self.tempo(id);
        if tempo.color != Color::Black {
            return false;
        }
        let line = self.line(tempo.owning_line);
        match line.tempos.iter().position(|&t| t == id) {
            Some(0) | None => true,
            Some(pos) => !self.tempo(line.tempos[pos - 1]).branches.is_empty(),
        }
    }

    // ------------------------------------------------------------------
    // Ingestion
    // ------------------------------------------------------------------

    /// Tempos that are already recorded as continuations of the cursor:
    /// the next Tempo of the current line first, then the first Tempo of
    /// each branch, in creation order
    pub fn continuations(&self) -> Vec<TempoId> {
        match self.cursor {
            Cursor::Start => self.line(self.root).tempos.first().copied().into_iter().collect(),
            Cursor::At(id) => {
                let line = self.line(self.current_line);
                let mut out = Vec::new();
                if let Some(pos) = line.tempos.iter().position(|&t| t == id) {
                    if let Some(&next) = line.tempos.get(pos + 1) {
                        out.push(next);
                    }
                }
                for &branch in &self.tempo(id).branches {
                    if let Some(&first) = self.line(branch).tempos.first() {
                        out.push(first);
                    }
                }
                out
            }
        }
    }

    /// The already-recorded continuation matching `san`, if any
    pub fn find_continuation(&self, san: &str) -> Option<TempoId> {
        self.continuations()
            .into_iter()
            .find(|&id| self.tempo(id).san == san)
    }

    /// Record an applied move at the cursor
    ///
    /// At the end of the active line this appends. Mid-line it first
    /// tries to reuse an existing continuation with the same SAN
    /// (replaying a recorded move never duplicates tree state); failing
    /// that it opens a new variation at the selected Tempo and appends
    /// there. The cursor ends on the resulting Tempo in every case.
    pub fn record(&mut self, san: &str, fen: &str, color: Color) -> GameResult<Recorded> {
        if self.at_end_of_active_line() {
            let id = self.append(self.current_line, san, fen, color);
            self.cursor = Cursor::At(id);
            return Ok(Recorded::Appended(id));
        }

        if let Some(existing) = self.find_continuation(san) {
            debug!("[TREE] reusing recorded continuation {san}");
            self.set_position(Cursor::At(existing));
            return Ok(Recorded::Reused(existing));
        }

        let Cursor::At(parent) = self.cursor else {
            // The tree is rooted at exactly one line, so there is no
            // variation of the very first recorded move.
            return Err(GameError::invalid_move(
                "cannot open a variation before the first recorded move",
            ));
        };
        let line = self.new_branch(parent);
        self.current_line = line;
        let id = self.append(line, san, fen, color);
        self.cursor = Cursor::At(id);
        Ok(Recorded::Branched { line, tempo: id })
    }

    /// Append a Tempo to the tail of `line_id` and return its id.
    /// Callers keep the cursor invariants; `record` and rehydration are
    /// the only users.
    pub(crate) fn append(&mut self, line_id: LineId, san: &str, fen: &str, color: Color) -> TempoId {
        let number = {
            let line = self.line(line_id);
            line.prior_tempos + line.tempos.len() as u32 + 1
        };
        let id = TempoId(self.tempos.len() as u32);
        self.tempos.push(Some(Tempo {
            fen: fen.to_string(),
            san: san.to_string(),
            color,
            number,
            owning_line: line_id,
            branches: Vec::new(),
        }));
        self.line_mut(line_id).tempos.push(id);
        debug!("[TREE] recorded {san} as tempo {number}");
        id
    }

    /// Open an empty variation at `parent` and register it in the
    /// parent's branch set, preserving creation order
    pub(crate) fn new_branch(&mut self, parent: TempoId) -> LineId {
        let (starting_fen, prior_tempos) = {
            let tempo = self.tempo(parent);
            (tempo.fen.clone(), tempo.number)
        };
        let id = LineId(self.lines.len() as u32);
        self.lines.push(Some(Line {
            starting_fen,
            prior_tempos,
            parent_tempo: Some(parent),
            tempos: Vec::new(),
        }));
        self.tempo_mut(parent).branches.push(id);
        info!("[TREE] opened variation after tempo {prior_tempos}");
        id
    }

    // ------------------------------------------------------------------
    // Undo
    // ------------------------------------------------------------------

    /// Remove the last Tempo of the current line, if it has one
    ///
    /// Only the current line's tail is ever removed; variations hanging
    /// off earlier Tempos stay reachable. If the removed Tempo was
    /// selected, the cursor lands on the new last Tempo, or falls back
    /// to the line's parent Tempo when the pop emptied a variation (the
    /// sentinel only at the root).
    pub fn pop_last_tempo(&mut self) -> Option<TempoId> {
        let line_id = self.current_line;
        let popped = self.line_mut(line_id).tempos.pop()?;
        let was_selected = self.cursor == Cursor::At(popped);
        self.remove_subtree(popped);
        debug!("[TREE] undid last tempo of current line");

        if was_selected {
            match self.line(line_id).tempos.last().copied() {
                Some(last) => self.cursor = Cursor::At(last),
                None => match self.line(line_id).parent_tempo {
                    Some(parent) => self.set_position(Cursor::At(parent)),
                    None => self.go_to_start(),
                },
            }
        }
        Some(popped)
    }

    /// Free a Tempo and every variation hanging off it. The caller has
    /// already detached `id` from its line.
    fn remove_subtree(&mut self, id: TempoId) {
        let tempo = self.tempos[id.0 as usize].take().expect("stale tempo id");
        for line_id in tempo.branches {
            let line = self.lines[line_id.0 as usize].take().expect("stale line id");
            for t in line.tempos {
                self.remove_subtree(t);
            }
        }
    }
}
