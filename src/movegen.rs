// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Per-kind movement rules: geometric pseudo-moves, board-aware legal
//! moves, and attack detection. Dispatch goes through a single immutable
//! table built once at startup; nothing in here mutates the board.
use arrayvec::ArrayVec;
use hashbrown::HashSet;

use crate::board::Board;
use crate::ledger::Ledger;
use crate::types::{
    squares, CastleSide, Color, File, PieceKind, Square, TableIndex, CASTLE_SIDES,
};

/// A set of destination squares.
pub type SquareSet = HashSet<Square>;

type PseudoFn = fn(Square, Color) -> SquareSet;
type LegalFn = fn(Square, Color, &Board, &Ledger) -> SquareSet;

static KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

static KING_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
];

static ROOK_VECTORS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
static BISHOP_VECTORS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

struct PatternTable {
    knight: Vec<SquareSet>,
    king: Vec<SquareSet>,
}

impl PatternTable {
    fn new() -> PatternTable {
        let mut pt = PatternTable {
            knight: Vec::with_capacity(64),
            king: Vec::with_capacity(64),
        };

        for sq in squares() {
            let knight = KNIGHT_OFFSETS
                .iter()
                .filter_map(|&(df, dr)| sq.try_offset(df, dr))
                .collect();
            let king = KING_OFFSETS
                .iter()
                .filter_map(|&(df, dr)| sq.try_offset(df, dr))
                .collect();
            pt.knight.push(knight);
            pt.king.push(king);
        }

        pt
    }
}

/// kind -> (pseudo, legal) function pair. The king's legal entry covers
/// only its attacking moves; castle destinations are layered on by
/// `legal_moves`, since a castle never attacks a square.
struct MoveTable {
    rules: [(PseudoFn, LegalFn); 6],
}

impl MoveTable {
    fn new() -> MoveTable {
        let mut rules: [(PseudoFn, LegalFn); 6] = [(pawn_pseudo, pawn_legal); 6];
        rules[PieceKind::Knight.as_index()] = (knight_pseudo, knight_legal);
        rules[PieceKind::Bishop.as_index()] = (bishop_pseudo, bishop_legal);
        rules[PieceKind::Rook.as_index()] = (rook_pseudo, rook_legal);
        rules[PieceKind::Queen.as_index()] = (queen_pseudo, queen_legal);
        rules[PieceKind::King.as_index()] = (king_pseudo, king_legal);
        MoveTable { rules }
    }

    fn rule(&self, kind: PieceKind) -> (PseudoFn, LegalFn) {
        self.rules[kind.as_index()]
    }
}

lazy_static! {
    static ref PATTERNS: PatternTable = PatternTable::new();
    static ref MOVE_TABLE: MoveTable = MoveTable::new();
}

/// Destinations reachable by the kind's geometric pattern alone, clipped to
/// the board and blind to occupancy except where the pattern itself depends
/// on it (the pawn double push exists only from the start rank).
pub fn pseudo_moves(kind: PieceKind, square: Square, color: Color) -> SquareSet {
    (MOVE_TABLE.rule(kind).0)(square, color)
}

/// Occupancy- and blocking-aware destinations for the occupant of `square`,
/// including en passant and eligible castles. Empty if the square is empty.
/// Self-check is not considered here; that is the engine's transaction.
pub fn legal_moves(square: Square, board: &Board, ledger: &Ledger) -> SquareSet {
    let piece = match board.piece_at(square) {
        Some(piece) => *piece,
        None => return SquareSet::new(),
    };

    let mut moves = (MOVE_TABLE.rule(piece.kind).1)(square, piece.color, board, ledger);
    if piece.kind == PieceKind::King {
        for &side in &CASTLE_SIDES {
            if castle_legal(piece.color, side, board, ledger) {
                moves.insert(side.king_destination(piece.color));
            }
        }
    }

    moves
}

/// True iff any piece of `attacker` reaches `target` from where it stands.
/// Used for check testing and castling-path safety. Pawns are special-cased:
/// they attack only their two capture diagonals, occupied or not, and a push
/// is never an attack.
pub fn attacks_square(target: Square, board: &Board, ledger: &Ledger, attacker: Color) -> bool {
    board
        .pieces_of_color(attacker)
        .any(|(sq, piece)| match piece.kind {
            PieceKind::Pawn => pawn_attacks(sq, attacker).contains(&target),
            _ => (MOVE_TABLE.rule(piece.kind).1)(sq, attacker, board, ledger).contains(&target),
        })
}

/// The en-passant test: the last ledger entry must be the enemy pawn's own
/// double push landing beside the mover, and `end` must step diagonally
/// behind it. The captured pawn stands on `last.end`, not on `end`.
pub fn is_en_passant(
    start: Square,
    end: Square,
    color: Color,
    ledger: &Ledger,
) -> bool {
    let last = match ledger.last() {
        Some(last) => last,
        None => return false,
    };

    if last.piece.kind != PieceKind::Pawn || last.piece.color == color {
        return false;
    }
    if !last.is_double_pawn_push() {
        return false;
    }

    last.end.rank() == start.rank()
        && last.end.file() == end.file()
        && end.rank().as_index() as i32 - start.rank().as_index() as i32 == color.pawn_direction()
}

/// Full castling eligibility: unmoved king on its home square, unmoved
/// home-corner rook, an empty lane between them, and no attacked square
/// among the king's start, intermediate, and destination squares.
pub fn castle_legal(color: Color, side: CastleSide, board: &Board, ledger: &Ledger) -> bool {
    let king = match board.king(color) {
        Some(id) => board.piece(id),
        None => return false,
    };
    if king.square != Square::of(File::E, color.back_rank()) || king.has_moved {
        return false;
    }
    if !ledger.can_castle(color, side) {
        return false;
    }

    let rook = match board.rook(color, side) {
        Some(id) => board.piece(id),
        None => return false,
    };
    if rook.has_moved {
        return false;
    }

    let lane = lane_between(king.square, rook.square);
    if lane.iter().any(|&sq| board.piece_at(sq).is_some()) {
        return false;
    }

    let path = king_path(color, side);
    !path
        .iter()
        .any(|&sq| attacks_square(sq, board, ledger, color.toggle()))
}

// Squares strictly between two squares on the same rank.
fn lane_between(a: Square, b: Square) -> ArrayVec<[Square; 6]> {
    debug_assert_eq!(a.rank(), b.rank());
    let mut lane = ArrayVec::new();
    let step = if b.file().as_index() > a.file().as_index() {
        1
    } else {
        -1
    };
    let mut cur = a;
    loop {
        cur = cur.try_offset(step, 0).expect("lane endpoints share a rank");
        if cur == b {
            break;
        }
        lane.push(cur);
    }
    lane
}

// The squares the king occupies or passes through while castling.
fn king_path(color: Color, side: CastleSide) -> ArrayVec<[Square; 3]> {
    let start = Square::of(File::E, color.back_rank());
    let step = match side {
        CastleSide::Queenside => -1,
        CastleSide::Kingside => 1,
    };
    let mut path = ArrayVec::new();
    path.push(start);
    let mid = start.try_offset(step, 0).expect("king path stays on board");
    path.push(mid);
    path.push(mid.try_offset(step, 0).expect("king path stays on board"));
    path
}

//
// Pawn
//

fn pawn_pseudo(square: Square, color: Color) -> SquareSet {
    let dir = color.pawn_direction();
    let mut moves = SquareSet::new();
    if let Some(fwd) = square.try_offset(0, dir) {
        moves.insert(fwd);
    }
    if square.rank() == color.pawn_start_rank() {
        if let Some(two) = square.try_offset(0, 2 * dir) {
            moves.insert(two);
        }
    }
    for &df in &[-1, 1] {
        if let Some(diag) = square.try_offset(df, dir) {
            moves.insert(diag);
        }
    }
    moves
}

// The two squares a pawn threatens, regardless of occupancy.
fn pawn_attacks(square: Square, color: Color) -> SquareSet {
    let dir = color.pawn_direction();
    [-1, 1]
        .iter()
        .filter_map(|&df| square.try_offset(df, dir))
        .collect()
}

fn pawn_legal(square: Square, color: Color, board: &Board, ledger: &Ledger) -> SquareSet {
    let dir = color.pawn_direction();
    let mut moves = SquareSet::new();

    if let Some(fwd) = square.try_offset(0, dir) {
        if board.piece_at(fwd).is_none() {
            moves.insert(fwd);
            // The double push needs the intermediate and destination squares
            // both empty, and only exists from the start rank.
            if square.rank() == color.pawn_start_rank() {
                if let Some(two) = square.try_offset(0, 2 * dir) {
                    if board.piece_at(two).is_none() {
                        moves.insert(two);
                    }
                }
            }
        }
    }

    // Diagonals move only by capturing: an enemy occupant, or the en-passant
    // pawn that just double-pushed past us.
    for &df in &[-1, 1] {
        if let Some(diag) = square.try_offset(df, dir) {
            match board.piece_at(diag) {
                Some(other) => {
                    if other.color != color {
                        moves.insert(diag);
                    }
                }
                None => {
                    if is_en_passant(square, diag, color, ledger) {
                        moves.insert(diag);
                    }
                }
            }
        }
    }

    moves
}

//
// Knight
//

fn knight_pseudo(square: Square, _: Color) -> SquareSet {
    PATTERNS.knight[square.index()].clone()
}

fn knight_legal(square: Square, color: Color, board: &Board, _: &Ledger) -> SquareSet {
    PATTERNS.knight[square.index()]
        .iter()
        .cloned()
        .filter(|&sq| match board.piece_at(sq) {
            Some(other) => other.color != color,
            None => true,
        })
        .collect()
}

//
// Sliders
//

fn ray_pseudo(square: Square, vectors: &[(i32, i32)]) -> SquareSet {
    let mut moves = SquareSet::new();
    for &(df, dr) in vectors {
        let mut cur = square;
        while let Some(next) = cur.try_offset(df, dr) {
            moves.insert(next);
            cur = next;
        }
    }
    moves
}

// A ray terminates at the first occupied square, which is a destination
// only when the occupant is an enemy.
fn ray_legal(square: Square, color: Color, board: &Board, vectors: &[(i32, i32)]) -> SquareSet {
    let mut moves = SquareSet::new();
    for &(df, dr) in vectors {
        let mut cur = square;
        while let Some(next) = cur.try_offset(df, dr) {
            match board.piece_at(next) {
                None => {
                    moves.insert(next);
                    cur = next;
                }
                Some(other) => {
                    if other.color != color {
                        moves.insert(next);
                    }
                    break;
                }
            }
        }
    }
    moves
}

fn rook_pseudo(square: Square, _: Color) -> SquareSet {
    ray_pseudo(square, &ROOK_VECTORS)
}

fn rook_legal(square: Square, color: Color, board: &Board, _: &Ledger) -> SquareSet {
    ray_legal(square, color, board, &ROOK_VECTORS)
}

fn bishop_pseudo(square: Square, _: Color) -> SquareSet {
    ray_pseudo(square, &BISHOP_VECTORS)
}

fn bishop_legal(square: Square, color: Color, board: &Board, _: &Ledger) -> SquareSet {
    ray_legal(square, color, board, &BISHOP_VECTORS)
}

fn queen_pseudo(square: Square, color: Color) -> SquareSet {
    let mut moves = rook_pseudo(square, color);
    moves.extend(bishop_pseudo(square, color));
    moves
}

fn queen_legal(square: Square, color: Color, board: &Board, ledger: &Ledger) -> SquareSet {
    let mut moves = rook_legal(square, color, board, ledger);
    moves.extend(bishop_legal(square, color, board, ledger));
    moves
}

//
// King
//

fn king_pseudo(square: Square, _: Color) -> SquareSet {
    let mut moves = PATTERNS.king[square.index()].clone();
    // The two castle hops are part of the king's pattern; their legality is
    // decided elsewhere.
    for &df in &[-2, 2] {
        if let Some(hop) = square.try_offset(df, 0) {
            moves.insert(hop);
        }
    }
    moves
}

fn king_legal(square: Square, color: Color, board: &Board, _: &Ledger) -> SquareSet {
    PATTERNS.king[square.index()]
        .iter()
        .cloned()
        .filter(|&sq| match board.piece_at(sq) {
            Some(other) => other.color != color,
            None => true,
        })
        .collect()
}
