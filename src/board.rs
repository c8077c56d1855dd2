// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::fmt;

use crate::types::{
    squares, CastleSide, Color, Error, Piece, PieceKind, Square, TableIndex, FILES, RANKS,
};

/// A stable identifier for a piece in the board's arena. Identifiers are
/// never reused; a captured piece's entry stays in the arena but is no
/// longer referenced by the grid or the caches.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PieceId(u32);

/// The board: an arena of pieces plus a 64-slot grid of occupants.
///
/// The grid and the caches hold `PieceId`s rather than references, so the
/// whole structure is a plain value. Cloning it is the snapshot primitive
/// the engine's speculative move window relies on.
///
/// Invariants:
/// - for every occupied grid slot, the arena piece's `square` equals that
///   slot;
/// - at most one king per color is attached at a time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    grid: [Option<PieceId>; 64],
    arena: Vec<Piece>,
    kings: [Option<PieceId>; 2],
    // Indexed by [color][side]; filled only by rooks attached on their home
    // corners, which are the only rooks that can ever castle.
    rooks: [[Option<PieceId>; 2]; 2],
}

impl Board {
    /// An empty board. Populate it with `attach`.
    pub fn new() -> Board {
        Board {
            grid: [None; 64],
            arena: Vec::new(),
            kings: [None; 2],
            rooks: [[None; 2]; 2],
        }
    }

    /// The standard initial position: back ranks R N B Q K B N R, pawns on
    /// ranks two and seven.
    pub fn from_start_position() -> Board {
        let mut board = Board::new();
        let back_rank: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];

        for (idx, &file) in FILES.iter().enumerate() {
            for &color in &[Color::White, Color::Black] {
                board
                    .attach(Square::of(file, color.back_rank()), back_rank[idx], color)
                    .expect("attach on an empty board cannot collide");
                board
                    .attach(
                        Square::of(file, color.pawn_start_rank()),
                        PieceKind::Pawn,
                        color,
                    )
                    .expect("attach on an empty board cannot collide");
            }
        }

        board
    }

    /// Places a new piece on the board. Fails with `OccupiedSquare`, without
    /// mutating anything, if the square already holds a piece or if the
    /// piece is a second king for its color.
    pub fn attach(&mut self, square: Square, kind: PieceKind, color: Color) -> Result<PieceId, Error> {
        if self.grid[square.index()].is_some() {
            return Err(Error::OccupiedSquare);
        }
        if kind == PieceKind::King && self.kings[color.as_index()].is_some() {
            return Err(Error::OccupiedSquare);
        }

        let id = PieceId(self.arena.len() as u32);
        self.arena.push(Piece::new(kind, color, square));
        self.grid[square.index()] = Some(id);

        match kind {
            PieceKind::King => self.kings[color.as_index()] = Some(id),
            PieceKind::Rook => {
                for &side in &[CastleSide::Queenside, CastleSide::Kingside] {
                    if square == side.rook_home(color) {
                        let slot = &mut self.rooks[color.as_index()][side.as_index()];
                        if slot.is_none() {
                            *slot = Some(id);
                        }
                    }
                }
            }
            _ => {}
        }

        Ok(id)
    }

    pub fn piece(&self, id: PieceId) -> &Piece {
        &self.arena[id.0 as usize]
    }

    pub fn id_at(&self, square: Square) -> Option<PieceId> {
        self.grid[square.index()]
    }

    pub fn piece_at(&self, square: Square) -> Option<&Piece> {
        self.id_at(square).map(move |id| self.piece(id))
    }

    /// Removes the occupant of `square` from the grid and the caches. The
    /// arena entry survives so outstanding identifiers stay valid.
    pub fn remove(&mut self, square: Square) -> Option<PieceId> {
        let id = self.grid[square.index()].take()?;
        let piece = self.arena[id.0 as usize];
        match piece.kind {
            PieceKind::King => self.kings[piece.color.as_index()] = None,
            PieceKind::Rook => {
                for slot in self.rooks[piece.color.as_index()].iter_mut() {
                    if *slot == Some(id) {
                        *slot = None;
                    }
                }
            }
            _ => {}
        }
        Some(id)
    }

    /// Relocates the occupant of `from` to the empty square `to`, marking it
    /// as having moved. The caller is responsible for having vacated `to`.
    pub fn move_piece(&mut self, from: Square, to: Square) {
        debug_assert!(self.grid[to.index()].is_none(), "destination is occupied");
        let id = self.grid[from.index()]
            .take()
            .expect("move_piece from an empty square");
        self.grid[to.index()] = Some(id);
        let piece = &mut self.arena[id.0 as usize];
        piece.square = to;
        piece.has_moved = true;
    }

    /// Replaces the kind of the piece with `id`, for promotion resolution.
    pub fn replace_kind(&mut self, id: PieceId, kind: PieceKind) {
        self.arena[id.0 as usize].kind = kind;
    }

    pub fn king(&self, color: Color) -> Option<PieceId> {
        self.kings[color.as_index()]
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.king(color).map(|id| self.piece(id).square)
    }

    /// The rook eligible to castle on the given wing, if one was ever
    /// attached on that wing's home corner.
    pub fn rook(&self, color: Color, side: CastleSide) -> Option<PieceId> {
        self.rooks[color.as_index()][side.as_index()]
    }

    /// Iterates every occupied square as (square, piece), the renderer's
    /// read surface.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, &Piece)> {
        squares().filter_map(move |sq| self.piece_at(sq).map(|piece| (sq, piece)))
    }

    /// Iterates occupied squares holding pieces of the given color.
    pub fn pieces_of_color(&self, color: Color) -> impl Iterator<Item = (Square, &Piece)> {
        self.pieces().filter(move |(_, piece)| piece.color == color)
    }
}

impl Default for Board {
    fn default() -> Board {
        Board::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for &rank in RANKS.iter().rev() {
            for &file in &FILES {
                let sq = Square::of(file, rank);
                if let Some(piece) = self.piece_at(sq) {
                    write!(f, " {} ", piece)?;
                } else {
                    write!(f, " . ")?;
                }
            }

            writeln!(f, "| {}", rank)?;
        }

        for _ in &FILES {
            write!(f, "---")?;
        }

        writeln!(f)?;
        for &file in &FILES {
            write!(f, " {} ", file)?;
        }

        writeln!(f)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Color, PieceKind};

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    #[test]
    fn attach_collision_leaves_board_unchanged() {
        let mut board = Board::new();
        board.attach(sq("e4"), PieceKind::Pawn, Color::White).unwrap();
        let before = board.clone();
        assert_eq!(
            Err(Error::OccupiedSquare),
            board.attach(sq("e4"), PieceKind::Queen, Color::Black)
        );
        assert_eq!(before, board);
    }

    #[test]
    fn one_king_per_color() {
        let mut board = Board::new();
        board.attach(sq("e1"), PieceKind::King, Color::White).unwrap();
        assert_eq!(
            Err(Error::OccupiedSquare),
            board.attach(sq("d4"), PieceKind::King, Color::White)
        );
        // The other color's king is unaffected.
        board.attach(sq("e8"), PieceKind::King, Color::Black).unwrap();
        assert_eq!(Some(sq("e1")), board.king_square(Color::White));
        assert_eq!(Some(sq("e8")), board.king_square(Color::Black));
    }

    #[test]
    fn grid_and_arena_agree_after_moves() {
        let mut board = Board::from_start_position();
        board.move_piece(sq("e2"), sq("e4"));
        for (square, piece) in board.pieces() {
            assert_eq!(square, piece.square);
        }
        let pawn = board.piece_at(sq("e4")).unwrap();
        assert!(pawn.has_moved);
        assert_eq!(PieceKind::Pawn, pawn.kind);
        assert!(board.piece_at(sq("e2")).is_none());
    }

    #[test]
    fn start_position_census() {
        let board = Board::from_start_position();
        assert_eq!(32, board.pieces().count());
        assert_eq!(16, board.pieces_of_color(Color::White).count());
        assert_eq!(Some(sq("e1")), board.king_square(Color::White));
        assert_eq!(Some(sq("e8")), board.king_square(Color::Black));
        let qs_rook = board.rook(Color::White, CastleSide::Queenside).unwrap();
        assert_eq!(sq("a1"), board.piece(qs_rook).square);
    }

    #[test]
    fn captured_rook_drops_out_of_the_cache() {
        let mut board = Board::new();
        board.attach(sq("h1"), PieceKind::Rook, Color::White).unwrap();
        assert!(board.rook(Color::White, CastleSide::Kingside).is_some());
        board.remove(sq("h1"));
        assert!(board.rook(Color::White, CastleSide::Kingside).is_none());
        assert!(board.piece_at(sq("h1")).is_none());
    }
}
