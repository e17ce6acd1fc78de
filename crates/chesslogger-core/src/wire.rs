//! Storage document shape and tree serialization
//!
//! The whole tree round-trips through a flat, cycle-free document: each
//! Line becomes an ordered array of per-Tempo records, each record
//! carrying the flattened variations that branch off it. Back-references
//! (`owning_line`, `parent_tempo`) are structural and are never stored;
//! rehydration recomputes them.
//!
//! Field names are bit-relevant: persisted games use the camelCase keys
//! (`gameInfo`, `priorTempos`, `tempoNum`, `lines`) and omit `lines`
//! when a Tempo has no variations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};
use crate::tree::{LineId, MoveTree};
use crate::types::Color;
use crate::START_FEN;

/// Header information for a game, attached to the whole tree and not to
/// any node. Carried through serialization untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameInfo {
    pub event: String,
    pub date: NaiveDate,
    pub location: String,
    pub white: String,
    pub black: String,
    /// Standard result notation ("1-0", "0-1", "1/2-1/2", "*")
    pub result: String,
}

impl Default for GameInfo {
    fn default() -> Self {
        GameInfo {
            event: "Casual Game".to_string(),
            date: chrono::Local::now().date_naive(),
            location: String::new(),
            white: String::new(),
            black: String::new(),
            result: "*".to_string(),
        }
    }
}

/// One flattened half-move
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TempoRecord {
    pub fen: String,
    pub san: String,
    pub tempo_num: u32,
    pub color: Color,
    /// Variations branching off this Tempo, each itself a flattened
    /// Line's tempo array. Omitted when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<Vec<TempoRecord>>,
}

/// A flattened Line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineRecord {
    /// Position at the start of the line; an empty string means the
    /// standard initial position
    pub fen: String,
    pub prior_tempos: u32,
    pub tempos: Vec<TempoRecord>,
}

/// The persisted body of one game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDocument {
    pub game_info: GameInfo,
    pub pgn: String,
    pub line: LineRecord,
}

/// Flatten the whole tree to its storage form
pub fn flatten(tree: &MoveTree) -> LineRecord {
    let root = tree.line(tree.root());
    LineRecord {
        fen: root.starting_fen.clone(),
        prior_tempos: root.prior_tempos,
        tempos: flatten_line(tree, tree.root()),
    }
}

fn flatten_line(tree: &MoveTree, line: LineId) -> Vec<TempoRecord> {
    tree.line(line)
        .tempos
        .iter()
        .map(|&id| {
            let tempo = tree.tempo(id);
            TempoRecord {
                fen: tempo.fen.clone(),
                san: tempo.san.clone(),
                tempo_num: tempo.number,
                color: tempo.color,
                // variations emptied by undo leave stub lines behind;
                // those are not worth persisting
                lines: tempo
                    .branches
                    .iter()
                    .map(|&b| flatten_line(tree, b))
                    .filter(|records| !records.is_empty())
                    .collect(),
            }
        })
        .collect()
}

/// Rebuild a tree from its storage form
///
/// All-or-nothing: a structurally inconsistent document fails with
/// [`GameError::MalformedDocument`] and no tree is produced, so a loader
/// can keep its previous tree on failure. The cursor of the rebuilt
/// tree is at the sentinel.
pub fn rehydrate(doc: &LineRecord) -> GameResult<MoveTree> {
    if doc.prior_tempos != 0 {
        return Err(GameError::malformed(format!(
            "root line declares {} prior tempos",
            doc.prior_tempos
        )));
    }
    let start_fen = if doc.fen.is_empty() {
        START_FEN
    } else {
        doc.fen.as_str()
    };
    let mut tree = MoveTree::new(start_fen);
    let root = tree.root();
    rehydrate_line(&mut tree, root, &doc.tempos)?;
    Ok(tree)
}

fn rehydrate_line(tree: &mut MoveTree, line: LineId, records: &[TempoRecord]) -> GameResult<()> {
    for (i, record) in records.iter().enumerate() {
        let expected = tree.line(line).prior_tempos + i as u32 + 1;
        if record.tempo_num != expected {
            return Err(GameError::malformed(format!(
                "tempo {:?} numbered {}, expected {}",
                record.san, record.tempo_num, expected
            )));
        }
        let id = tree.append(line, &record.san, &record.fen, record.color);
        for branch in &record.lines {
            if branch.is_empty() {
                return Err(GameError::malformed(format!(
                    "empty variation after tempo {:?}",
                    record.san
                )));
            }
            let branch_line = tree.new_branch(id);
            rehydrate_line(tree, branch_line, branch)?;
        }
    }
    Ok(())
}

/// Movetext of the root line, with move numbers and the result tag
///
/// A root line that opens with a black move (a game logged from a
/// mid-game position) gets the "..." lead-in.
pub fn mainline_pgn(tree: &MoveTree, result: &str) -> String {
    let mut tokens: Vec<String> = Vec::new();
    for (i, &id) in tree.line(tree.root()).tempos.iter().enumerate() {
        let tempo = tree.tempo(id);
        let move_number = (tempo.number + 1) / 2;
        match tempo.color {
            Color::White => tokens.push(format!("{move_number}.")),
            Color::Black if i == 0 => tokens.push(format!("{move_number}...")),
            Color::Black => {}
        }
        tokens.push(tempo.san.clone());
    }
    if !result.is_empty() {
        tokens.push(result.to_string());
    }
    tokens.join(" ")
}
