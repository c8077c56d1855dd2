// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::ops::Index;

use crate::types::{CastleSide, Color, Piece, PieceKind, Square, TableIndex};

bitflags! {
    /// Has-moved facts derived from the move history: one bit per king and
    /// per home-corner rook. A set bit never clears, so lost castling
    /// eligibility is permanent.
    pub struct MovedFlags: u8 {
        const NONE = 0;
        const WHITE_KING = 0b0000_0001;
        const WHITE_QUEENSIDE_ROOK = 0b0000_0010;
        const WHITE_KINGSIDE_ROOK = 0b0000_0100;
        const BLACK_KING = 0b0000_1000;
        const BLACK_QUEENSIDE_ROOK = 0b0001_0000;
        const BLACK_KINGSIDE_ROOK = 0b0010_0000;
    }
}

fn king_flag(color: Color) -> MovedFlags {
    match color {
        Color::White => MovedFlags::WHITE_KING,
        Color::Black => MovedFlags::BLACK_KING,
    }
}

fn rook_flag(color: Color, side: CastleSide) -> MovedFlags {
    match (color, side) {
        (Color::White, CastleSide::Queenside) => MovedFlags::WHITE_QUEENSIDE_ROOK,
        (Color::White, CastleSide::Kingside) => MovedFlags::WHITE_KINGSIDE_ROOK,
        (Color::Black, CastleSide::Queenside) => MovedFlags::BLACK_QUEENSIDE_ROOK,
        (Color::Black, CastleSide::Kingside) => MovedFlags::BLACK_KINGSIDE_ROOK,
    }
}

/// What a committed move did, beyond relocating the acting piece.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveKind {
    Simple,
    /// `square` is where the captured piece actually stood. For en passant
    /// it is not the destination square of the capturing move.
    Capture {
        captured: Piece,
        square: Square,
        en_passant: bool,
    },
    Castle {
        rook: Piece,
        rook_start: Square,
        rook_end: Square,
    },
}

/// An immutable record of one committed move. `piece` is a frozen copy of
/// the acting piece as it stood before execution; mutating the live piece
/// later cannot corrupt history.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Move {
    pub piece: Piece,
    pub start: Square,
    pub end: Square,
    pub kind: MoveKind,
    /// Set when this move pushed a pawn onto its terminal rank.
    pub promotion: bool,
}

impl Move {
    pub fn is_capture(&self) -> bool {
        match self.kind {
            MoveKind::Capture { .. } => true,
            _ => false,
        }
    }

    pub fn is_en_passant(&self) -> bool {
        match self.kind {
            MoveKind::Capture { en_passant, .. } => en_passant,
            _ => false,
        }
    }

    pub fn is_castle(&self) -> bool {
        match self.kind {
            MoveKind::Castle { .. } => true,
            _ => false,
        }
    }

    /// True for a pawn's two-square advance, the only move that can enable
    /// an en-passant reply.
    pub fn is_double_pawn_push(&self) -> bool {
        self.piece.kind == PieceKind::Pawn
            && (self.start.rank().as_index() as i32 - self.end.rank().as_index() as i32).abs() == 2
    }
}

/// Append-only move history. Entries are never removed or rewritten; the
/// has-moved flags are folded in incrementally as moves land.
#[derive(Clone, Debug)]
pub struct Ledger {
    moves: Vec<Move>,
    moved: MovedFlags,
}

impl Ledger {
    pub fn new() -> Ledger {
        Ledger {
            moves: Vec::new(),
            moved: MovedFlags::NONE,
        }
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn last(&self) -> Option<&Move> {
        self.moves.last()
    }

    /// Appends a committed move and folds its has-moved facts into the
    /// flags.
    pub fn push(&mut self, mv: Move) {
        let color = mv.piece.color;
        match mv.piece.kind {
            PieceKind::King => self.moved |= king_flag(color),
            PieceKind::Rook => {
                for &side in &[CastleSide::Queenside, CastleSide::Kingside] {
                    if mv.start == side.rook_home(color) {
                        self.moved |= rook_flag(color, side);
                    }
                }
            }
            _ => {}
        }
        self.moves.push(mv);
    }

    pub fn has_king_moved(&self, color: Color) -> bool {
        self.moved.contains(king_flag(color))
    }

    pub fn has_rook_moved(&self, color: Color, side: CastleSide) -> bool {
        self.moved.contains(rook_flag(color, side))
    }

    /// Castling eligibility as far as the move history is concerned. The
    /// engine still checks board geometry and attack safety on top of this.
    pub fn can_castle(&self, color: Color, side: CastleSide) -> bool {
        !self.has_king_moved(color) && !self.has_rook_moved(color, side)
    }
}

impl Default for Ledger {
    fn default() -> Ledger {
        Ledger::new()
    }
}

impl Index<usize> for Ledger {
    type Output = Move;

    fn index(&self, idx: usize) -> &Move {
        &self.moves[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Color, Piece, PieceKind, Square};

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    fn simple(kind: PieceKind, color: Color, start: &str, end: &str) -> Move {
        Move {
            piece: Piece::new(kind, color, sq(start)),
            start: sq(start),
            end: sq(end),
            kind: MoveKind::Simple,
            promotion: false,
        }
    }

    #[test]
    fn king_move_forfeits_both_wings() {
        let mut ledger = Ledger::new();
        assert!(ledger.can_castle(Color::White, CastleSide::Kingside));
        ledger.push(simple(PieceKind::King, Color::White, "e1", "e2"));
        assert!(ledger.has_king_moved(Color::White));
        assert!(!ledger.can_castle(Color::White, CastleSide::Kingside));
        assert!(!ledger.can_castle(Color::White, CastleSide::Queenside));
        // Black is unaffected.
        assert!(ledger.can_castle(Color::Black, CastleSide::Kingside));
    }

    #[test]
    fn rook_move_forfeits_its_wing_only() {
        let mut ledger = Ledger::new();
        ledger.push(simple(PieceKind::Rook, Color::Black, "a8", "a5"));
        assert!(ledger.has_rook_moved(Color::Black, CastleSide::Queenside));
        assert!(!ledger.has_rook_moved(Color::Black, CastleSide::Kingside));
        assert!(!ledger.can_castle(Color::Black, CastleSide::Queenside));
        assert!(ledger.can_castle(Color::Black, CastleSide::Kingside));
    }

    #[test]
    fn rook_move_off_home_square_changes_nothing() {
        let mut ledger = Ledger::new();
        ledger.push(simple(PieceKind::Rook, Color::White, "d4", "d8"));
        assert!(ledger.can_castle(Color::White, CastleSide::Queenside));
        assert!(ledger.can_castle(Color::White, CastleSide::Kingside));
    }

    #[test]
    fn double_push_detection() {
        let push = simple(PieceKind::Pawn, Color::White, "e2", "e4");
        assert!(push.is_double_pawn_push());
        let single = simple(PieceKind::Pawn, Color::White, "e2", "e3");
        assert!(!single.is_double_pawn_push());
        let rook = simple(PieceKind::Rook, Color::White, "a1", "a3");
        assert!(!rook.is_double_pawn_push());
    }

    #[test]
    fn ledger_is_append_only() {
        let mut ledger = Ledger::new();
        assert!(ledger.is_empty());
        ledger.push(simple(PieceKind::Pawn, Color::White, "e2", "e4"));
        ledger.push(simple(PieceKind::Pawn, Color::Black, "d7", "d5"));
        assert_eq!(2, ledger.len());
        assert_eq!(sq("d5"), ledger.last().unwrap().end);
        assert_eq!(sq("e4"), ledger[0].end);
    }
}
