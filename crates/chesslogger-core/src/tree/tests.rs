//! Move-tree unit tests
//!
//! FEN and SAN strings are opaque to the tree, so these tests use short
//! placeholders and real square counts: what matters is the shape of the
//! tree, the cursor, and the numbering invariants.

use super::*;
use crate::error::GameError;
use crate::types::Color;

const F0: &str = "fen-start w";

/// 1. e4 e5 2. Nf3 on the mainline
fn mainline() -> MoveTree {
    let mut tree = MoveTree::new(F0);
    tree.record("e4", "fen-e4 b", Color::White).unwrap();
    tree.record("e5", "fen-e5 w", Color::Black).unwrap();
    tree.record("Nf3", "fen-nf3 b", Color::White).unwrap();
    tree
}

/// The mainline plus a Sicilian variation: back at the position after
/// e4, 1...c5 2.Nc3 is explored instead of e5
fn branched() -> MoveTree {
    let mut tree = mainline();
    tree.go_back_one().unwrap();
    tree.go_back_one().unwrap(); // cursor on e4
    tree.record("c5", "fen-c5 w", Color::Black).unwrap();
    tree.record("Nc3", "fen-nc3 b", Color::White).unwrap();
    tree
}

fn nth_of_root(tree: &MoveTree, n: usize) -> TempoId {
    tree.line(tree.root()).tempos[n]
}

// ============================================================================
// Construction and appending
// ============================================================================

#[test]
fn test_new_tree_is_empty() {
    let tree = MoveTree::new(F0);

    assert!(tree.is_empty());
    assert_eq!(tree.cursor(), Cursor::Start);
    assert_eq!(tree.current_line(), tree.root());
    assert_eq!(tree.selected_fen(), F0);
    assert_eq!(tree.tempo_count(), 0);
    assert_eq!(tree.line_count(), 1);

    let root = tree.line(tree.root());
    assert_eq!(root.prior_tempos, 0);
    assert!(root.parent_tempo.is_none());
}

#[test]
fn test_append_assigns_absolute_numbers() {
    let tree = mainline();

    assert_eq!(tree.tempo_count(), 3);
    assert_eq!(tree.line_count(), 1);
    for (i, &id) in tree.line(tree.root()).tempos.iter().enumerate() {
        let tempo = tree.tempo(id);
        assert_eq!(tempo.number, i as u32 + 1);
        assert_eq!(tempo.owning_line, tree.root());
    }
    assert_eq!(tree.cursor(), Cursor::At(nth_of_root(&tree, 2)));
    assert!(tree.at_end_of_active_line());
}

#[test]
fn test_absolute_index_invariant_holds_in_branches() {
    let tree = branched();

    // every tempo: number == owning line's prior_tempos + 1-based position
    for line_id in [tree.root(), tree.current_line()] {
        let line = tree.line(line_id);
        for (i, &id) in line.tempos.iter().enumerate() {
            assert_eq!(tree.tempo(id).number, line.prior_tempos + i as u32 + 1);
        }
    }
}

// ============================================================================
// Navigation
// ============================================================================

#[test]
fn test_forward_then_back_restores_cursor() {
    let mut tree = mainline();
    tree.set_position(Cursor::At(nth_of_root(&tree, 1)));

    let before = tree.cursor();
    tree.go_forward_one().unwrap();
    tree.go_back_one().unwrap();
    assert_eq!(tree.cursor(), before);

    tree.go_back_one().unwrap();
    tree.go_forward_one().unwrap();
    assert_eq!(tree.cursor(), before);
}

#[test]
fn test_forward_from_sentinel_selects_first_tempo() {
    let mut tree = mainline();
    tree.go_to_start();
    tree.go_forward_one().unwrap();
    assert_eq!(tree.cursor(), Cursor::At(nth_of_root(&tree, 0)));
}

#[test]
fn test_forward_at_line_end_is_noop() {
    let mut tree = mainline();
    let end = tree.cursor();
    tree.go_forward_one().unwrap();
    assert_eq!(tree.cursor(), end);
}

#[test]
fn test_back_at_sentinel_is_noop() {
    let mut tree = mainline();
    tree.go_to_start();
    tree.go_back_one().unwrap();
    assert_eq!(tree.cursor(), Cursor::Start);
}

#[test]
fn test_back_from_first_root_tempo_reaches_sentinel() {
    let mut tree = mainline();
    tree.set_position(Cursor::At(nth_of_root(&tree, 0)));
    tree.go_back_one().unwrap();
    assert_eq!(tree.cursor(), Cursor::Start);
    assert_eq!(tree.current_line(), tree.root());
}

#[test]
fn test_back_crosses_into_parent_line() {
    let mut tree = branched();
    let branch = tree.current_line();
    let first_of_branch = tree.line(branch).tempos[0];
    tree.set_position(Cursor::At(first_of_branch));

    tree.go_back_one().unwrap();

    // from the top of the variation, back lands on the branch point e4
    let e4 = nth_of_root(&tree, 0);
    assert_eq!(tree.cursor(), Cursor::At(e4));
    assert_eq!(tree.current_line(), tree.root());
}

#[test]
fn test_navigation_on_empty_tree_is_no_selection() {
    let mut tree = MoveTree::new(F0);
    assert!(matches!(tree.go_to_end(), Err(GameError::NoSelection)));
    assert!(matches!(tree.go_forward_one(), Err(GameError::NoSelection)));
    assert!(matches!(tree.go_back_one(), Err(GameError::NoSelection)));
    tree.go_to_start(); // always succeeds
    assert_eq!(tree.cursor(), Cursor::Start);
}

#[test]
fn test_go_to_end_selects_line_tail() {
    let mut tree = mainline();
    tree.go_to_start();
    tree.go_to_end().unwrap();
    assert_eq!(tree.cursor(), Cursor::At(nth_of_root(&tree, 2)));
}

#[test]
fn test_set_position_switches_current_line() {
    let mut tree = branched();
    let branch = tree.current_line();
    assert_ne!(branch, tree.root());

    let e5 = nth_of_root(&tree, 1);
    tree.set_position(Cursor::At(e5));
    assert_eq!(tree.current_line(), tree.root());

    tree.set_position(Cursor::Start);
    assert_eq!(tree.cursor(), Cursor::Start);
    assert_eq!(tree.current_line(), tree.root());
}

#[test]
fn test_at_end_of_active_line() {
    let mut tree = MoveTree::new(F0);
    assert!(tree.at_end_of_active_line()); // empty line

    tree.record("e4", "fen-e4 b", Color::White).unwrap();
    assert!(tree.at_end_of_active_line());

    tree.go_to_start();
    assert!(!tree.at_end_of_active_line());
}

#[test]
fn test_tempo_by_number() {
    let mut tree = branched();
    let branch = tree.current_line();

    // within the variation: 1-based offsets, n < 1 selects the parent
    assert_eq!(tree.tempo_by_number(1), Cursor::At(tree.line(branch).tempos[0]));
    assert_eq!(tree.tempo_by_number(0), Cursor::At(nth_of_root(&tree, 0)));
    let current = tree.cursor();
    assert_eq!(tree.tempo_by_number(99), current);

    tree.go_to_start();
    assert_eq!(tree.tempo_by_number(0), Cursor::Start);
    assert_eq!(tree.tempo_by_number(2), Cursor::At(nth_of_root(&tree, 1)));
}

// ============================================================================
// Reuse vs branch
// ============================================================================

#[test]
fn test_branch_invariants() {
    let tree = branched();
    let branch = tree.current_line();
    let e4 = nth_of_root(&tree, 0);

    let line = tree.line(branch);
    assert_eq!(line.parent_tempo, Some(e4));
    assert_eq!(line.prior_tempos, tree.tempo(e4).number);
    assert_eq!(line.starting_fen, tree.tempo(e4).fen);
    assert_eq!(tree.tempo(e4).branches, vec![branch]);

    // the displaced e5 continuation is still the root line's second move
    assert_eq!(tree.tempo(nth_of_root(&tree, 1)).san, "e5");
    assert_eq!(tree.tempo_count(), 5);
    assert_eq!(tree.line_count(), 2);
}

#[test]
fn test_replaying_next_tempo_is_reused() {
    let mut tree = mainline();
    let e5 = nth_of_root(&tree, 1);
    tree.set_position(Cursor::At(e5));

    // "Nf3" already follows e5 in this line
    let before = tree.tempo_count();
    let recorded = tree.record("Nf3", "fen-nf3 b", Color::White).unwrap();

    assert!(recorded.is_reuse());
    assert_eq!(recorded.tempo(), nth_of_root(&tree, 2));
    assert_eq!(tree.cursor(), Cursor::At(nth_of_root(&tree, 2)));
    assert_eq!(tree.tempo_count(), before);
    assert_eq!(tree.line_count(), 1);
}

#[test]
fn test_replaying_branch_first_tempo_is_reused() {
    let mut tree = branched();
    let branch = tree.current_line();
    let e4 = nth_of_root(&tree, 0);
    tree.set_position(Cursor::At(e4));

    let before = (tree.tempo_count(), tree.line_count());
    let recorded = tree.record("c5", "fen-c5 w", Color::Black).unwrap();

    assert!(recorded.is_reuse());
    assert_eq!((tree.tempo_count(), tree.line_count()), before);
    // reuse entered the variation
    assert_eq!(tree.current_line(), branch);
    assert_eq!(tree.cursor(), Cursor::At(tree.line(branch).tempos[0]));
}

#[test]
fn test_distinct_move_mid_line_opens_branch() {
    let mut tree = mainline();
    let e5 = nth_of_root(&tree, 1);
    tree.set_position(Cursor::At(e5));

    let recorded = tree.record("Nc3", "fen-alt b", Color::White).unwrap();
    let Recorded::Branched { line, tempo } = recorded else {
        panic!("expected a new variation, got {recorded:?}");
    };
    assert_eq!(tree.current_line(), line);
    assert_eq!(tree.cursor(), Cursor::At(tempo));
    assert_eq!(tree.tempo(tempo).number, 3);
    assert_eq!(tree.line(line).prior_tempos, 2);
}

#[test]
fn test_second_branch_preserves_creation_order() {
    let mut tree = branched();
    let e4 = nth_of_root(&tree, 0);
    tree.set_position(Cursor::At(e4));
    let first_branch = tree.tempo(e4).branches[0];

    tree.record("d5", "fen-d5 w", Color::Black).unwrap();
    let branches = &tree.tempo(e4).branches;
    assert_eq!(branches.len(), 2);
    assert_eq!(branches[0], first_branch);
    assert_eq!(tree.tempo(tree.line(branches[1]).tempos[0]).san, "d5");
}

#[test]
fn test_no_variation_of_the_first_move() {
    let mut tree = mainline();
    tree.go_to_start();

    // replaying the recorded first move is a reuse...
    let recorded = tree.record("e4", "fen-e4 b", Color::White).unwrap();
    assert!(recorded.is_reuse());

    // ...but a different first move has nowhere to branch from
    tree.go_to_start();
    let err = tree.record("d4", "fen-d4 b", Color::White).unwrap_err();
    assert!(matches!(err, GameError::InvalidMove { .. }));
    assert_eq!(tree.tempo_count(), 3);
}

// ============================================================================
// Undo
// ============================================================================

#[test]
fn test_undo_pops_tail_and_reselects() {
    let mut tree = mainline();
    tree.pop_last_tempo().unwrap();

    assert_eq!(tree.tempo_count(), 2);
    assert_eq!(tree.cursor(), Cursor::At(nth_of_root(&tree, 1)));
}

#[test]
fn test_undo_on_empty_tree_is_none() {
    let mut tree = MoveTree::new(F0);
    assert!(tree.pop_last_tempo().is_none());
}

#[test]
fn test_undo_keeps_cursor_when_elsewhere() {
    let mut tree = mainline();
    let e4 = nth_of_root(&tree, 0);
    tree.set_position(Cursor::At(e4));

    tree.pop_last_tempo().unwrap(); // pops Nf3
    assert_eq!(tree.cursor(), Cursor::At(e4));
    assert_eq!(tree.tempo_count(), 2);
}

#[test]
fn test_undo_emptying_variation_falls_back_to_parent_tempo() {
    let mut tree = branched();
    tree.pop_last_tempo().unwrap(); // Nc3
    tree.pop_last_tempo().unwrap(); // c5 - the variation is now empty

    // cursor lands on the branch point, not the sentinel
    let e4 = nth_of_root(&tree, 0);
    assert_eq!(tree.cursor(), Cursor::At(e4));
    assert_eq!(tree.current_line(), tree.root());

    // the emptied variation stays attached to e4
    assert_eq!(tree.tempo(e4).branches.len(), 1);
    assert_eq!(tree.tempo_count(), 3);
}

#[test]
fn test_undo_emptying_root_reaches_sentinel() {
    let mut tree = MoveTree::new(F0);
    tree.record("e4", "fen-e4 b", Color::White).unwrap();
    tree.pop_last_tempo().unwrap();

    assert_eq!(tree.cursor(), Cursor::Start);
    assert!(tree.is_empty());
}

#[test]
fn test_undo_frees_the_popped_subtree() {
    let mut tree = branched();
    tree.set_position(Cursor::Start);
    tree.go_to_end().unwrap();

    // popping the whole root line takes the e4 variation with e4
    tree.pop_last_tempo().unwrap(); // Nf3
    tree.pop_last_tempo().unwrap(); // e5
    tree.pop_last_tempo().unwrap(); // e4 and its c5/Nc3 subtree

    assert_eq!(tree.tempo_count(), 0);
    assert_eq!(tree.line_count(), 1);
    assert_eq!(tree.cursor(), Cursor::Start);
}

// ============================================================================
// Active path and movelist queries
// ============================================================================

#[test]
fn test_active_path_within_single_line() {
    let mut tree = mainline();
    tree.set_position(Cursor::At(nth_of_root(&tree, 1)));

    // the whole current line counts, wherever the cursor sits in it
    for n in 0..3 {
        assert!(tree.is_on_active_path(nth_of_root(&tree, n)));
    }
}

#[test]
fn test_active_path_from_variation() {
    let tree = branched(); // cursor at the end of the c5 variation
    let branch = tree.current_line();

    let e4 = nth_of_root(&tree, 0);
    let e5 = nth_of_root(&tree, 1);
    let nf3 = nth_of_root(&tree, 2);

    assert!(tree.is_on_active_path(e4)); // at the branch point
    assert!(!tree.is_on_active_path(e5)); // displaced continuation
    assert!(!tree.is_on_active_path(nf3)); // strictly after the branch point

    for &id in &tree.line(branch).tempos {
        assert!(tree.is_on_active_path(id));
    }
}

#[test]
fn test_needs_white_placeholder() {
    let tree = branched();
    let branch = tree.current_line();

    // c5 is black and opens its line
    assert!(tree.needs_white_placeholder(tree.line(branch).tempos[0]));
    // Nc3 is white
    assert!(!tree.needs_white_placeholder(tree.line(branch).tempos[1]));
    // e5 is black and follows e4, which now carries a variation
    assert!(tree.needs_white_placeholder(nth_of_root(&tree, 1)));

    // without the variation e5 needs no placeholder
    let plain = mainline();
    assert!(!plain.needs_white_placeholder(nth_of_root(&plain, 1)));
}
