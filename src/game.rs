// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The move orchestrator: turn management and the transactional move
//! window. Every mutation of the board funnels through `make_move` (or
//! `attach`, before play begins), so a failing call can guarantee it left
//! no trace.
use std::fmt;

use crate::board::Board;
use crate::ledger::{Ledger, Move, MoveKind};
use crate::movegen::{self, SquareSet};
use crate::types::{CastleSide, Color, Error, Piece, PieceKind, Square};

#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    ledger: Ledger,
    side_to_move: Color,
    // Square of a pawn awaiting its replacement kind. While set, the engine
    // refuses every move.
    pending_promotion: Option<Square>,
}

impl Game {
    /// A game over an empty board; use `attach` to set up a position.
    pub fn new() -> Game {
        Game {
            board: Board::new(),
            ledger: Ledger::new(),
            side_to_move: Color::White,
            pending_promotion: None,
        }
    }

    /// A game from the standard initial position.
    pub fn from_start_position() -> Game {
        Game {
            board: Board::from_start_position(),
            ledger: Ledger::new(),
            side_to_move: Color::White,
            pending_promotion: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn pending_promotion(&self) -> Option<Square> {
        self.pending_promotion
    }

    /// Places a piece for a test or puzzle position. Fails with
    /// `OccupiedSquare`, mutating nothing, on a collision.
    pub fn attach(&mut self, square: Square, kind: PieceKind, color: Color) -> Result<(), Error> {
        self.board.attach(square, kind, color).map(|_| ())
    }

    /// The legal destinations of the occupant of `square`, before the
    /// self-check filter. Collaborators (replay, rendering) read this; the
    /// transaction applies the self-check filter on top.
    pub fn legal_moves_from(&self, square: Square) -> SquareSet {
        movegen::legal_moves(square, &self.board, &self.ledger)
    }

    /// Iterates every occupied square as (square, piece).
    pub fn pieces(&self) -> impl Iterator<Item = (Square, &Piece)> {
        self.board.pieces()
    }

    /// Makes a move given algebraic square names, e.g. `("e2", "e4")`.
    pub fn make_move(&mut self, start: &str, end: &str) -> Result<(), Error> {
        self.make_move_squares(start.parse()?, end.parse()?)
    }

    /// The move transaction. Checks turn order and rule legality, applies
    /// the move speculatively against a snapshot, rejects it if the mover's
    /// own king ends up attacked, and otherwise commits: ledger append,
    /// has-moved updates, turn flip.
    ///
    /// A failing call leaves board, pieces, caches and ledger exactly as
    /// they were.
    pub fn make_move_squares(&mut self, start: Square, end: Square) -> Result<(), Error> {
        if self.pending_promotion.is_some() {
            return Err(Error::PendingPromotionViolation);
        }

        let piece = match self.board.piece_at(start) {
            Some(piece) => *piece,
            None => return Err(Error::IllegalMove),
        };
        if piece.color != self.side_to_move {
            return Err(Error::IllegalMove);
        }
        if !self.legal_moves_from(start).contains(&end) {
            return Err(Error::IllegalMove);
        }

        let kind = classify(&self.board, &self.ledger, &piece, start, end);

        // Speculative window: snapshot, apply, test, commit or restore.
        let snapshot = self.board.clone();
        apply(&mut self.board, start, end, &kind);

        if in_check(&self.board, &self.ledger, piece.color) {
            self.board = snapshot;
            debug!("{}: {}{} rejected, would leave own king attacked", piece.color, start, end);
            return Err(Error::IllegalMove);
        }

        let promotion =
            piece.kind == PieceKind::Pawn && end.rank() == piece.color.promotion_rank();
        self.ledger.push(Move {
            piece,
            start,
            end,
            kind,
            promotion,
        });
        if promotion {
            self.pending_promotion = Some(end);
        }
        self.side_to_move = self.side_to_move.toggle();
        debug!("{}: committed {}{}", piece.color, start, end);
        Ok(())
    }

    /// Resolves an outstanding promotion by choosing the replacement kind.
    /// Fails with `IllegalMove` when no promotion is pending or the kind is
    /// not one a pawn may become.
    pub fn promote(&mut self, kind: PieceKind) -> Result<(), Error> {
        let square = self.pending_promotion.ok_or(Error::IllegalMove)?;
        match kind {
            PieceKind::Queen | PieceKind::Rook | PieceKind::Bishop | PieceKind::Knight => {}
            PieceKind::Pawn | PieceKind::King => return Err(Error::IllegalMove),
        }

        let id = self
            .board
            .id_at(square)
            .expect("a pending promotion square always holds the pawn");
        self.board.replace_kind(id, kind);
        self.pending_promotion = None;
        debug!("promotion on {} resolved to {:?}", square, kind);
        Ok(())
    }

    /// True iff `color`'s king currently stands attacked.
    pub fn is_check(&self, color: Color) -> bool {
        in_check(&self.board, &self.ledger, color)
    }

    /// True iff `color` has at least one move that survives the self-check
    /// filter. Derived by simulating every candidate through the same
    /// snapshot machinery the transaction uses.
    pub fn has_legal_move(&self, color: Color) -> bool {
        let froms: Vec<Square> = self
            .board
            .pieces_of_color(color)
            .map(|(sq, _)| sq)
            .collect();

        for start in froms {
            let piece = *self.board.piece_at(start).expect("iterated an occupant");
            for end in movegen::legal_moves(start, &self.board, &self.ledger) {
                let kind = classify(&self.board, &self.ledger, &piece, start, end);
                let mut scratch = self.board.clone();
                apply(&mut scratch, start, end, &kind);
                if !in_check(&scratch, &self.ledger, color) {
                    return true;
                }
            }
        }

        false
    }

    /// The side to move has no legal move and is in check.
    pub fn is_checkmate(&self) -> bool {
        self.is_check(self.side_to_move) && !self.has_legal_move(self.side_to_move)
    }

    /// The side to move has no legal move but is not in check.
    pub fn is_stalemate(&self) -> bool {
        !self.is_check(self.side_to_move) && !self.has_legal_move(self.side_to_move)
    }
}

impl Default for Game {
    fn default() -> Game {
        Game::new()
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.board)
    }
}

fn in_check(board: &Board, ledger: &Ledger, color: Color) -> bool {
    match board.king_square(color) {
        Some(sq) => movegen::attacks_square(sq, board, ledger, color.toggle()),
        // No king attached: nothing to protect. Test positions allow this.
        None => false,
    }
}

// Decides what the already-legality-checked move (start, end) will do. The
// ledger record is built from this before any mutation happens.
fn classify(board: &Board, ledger: &Ledger, piece: &Piece, start: Square, end: Square) -> MoveKind {
    if piece.kind == PieceKind::King {
        let file_delta =
            end.file() as i32 - start.file() as i32;
        if file_delta.abs() == 2 {
            let side = if file_delta < 0 {
                CastleSide::Queenside
            } else {
                CastleSide::Kingside
            };
            let rook_id = board
                .rook(piece.color, side)
                .expect("a castle destination implies an eligible rook");
            return MoveKind::Castle {
                rook: *board.piece(rook_id),
                rook_start: side.rook_home(piece.color),
                rook_end: side.rook_destination(piece.color),
            };
        }
    }

    if let Some(victim) = board.piece_at(end) {
        return MoveKind::Capture {
            captured: *victim,
            square: end,
            en_passant: false,
        };
    }

    if piece.kind == PieceKind::Pawn && movegen::is_en_passant(start, end, piece.color, ledger) {
        let victim_square = ledger
            .last()
            .expect("en passant implies a previous move")
            .end;
        let victim = board
            .piece_at(victim_square)
            .expect("en passant implies the double-pushed pawn is present");
        return MoveKind::Capture {
            captured: *victim,
            square: victim_square,
            en_passant: true,
        };
    }

    MoveKind::Simple
}

// Mutates the board per the classified move. Callers own the snapshot.
fn apply(board: &mut Board, start: Square, end: Square, kind: &MoveKind) {
    match kind {
        MoveKind::Simple => {}
        MoveKind::Capture { square, .. } => {
            board.remove(*square);
        }
        MoveKind::Castle {
            rook_start,
            rook_end,
            ..
        } => {
            board.move_piece(*rook_start, *rook_end);
        }
    }
    board.move_piece(start, end);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    #[test]
    fn turn_order_is_enforced() {
        let mut game = Game::from_start_position();
        assert_eq!(Err(Error::IllegalMove), game.make_move("e7", "e5"));
        game.make_move("e2", "e4").unwrap();
        assert_eq!(Color::Black, game.side_to_move());
        assert_eq!(Err(Error::IllegalMove), game.make_move("d2", "d4"));
    }

    #[test]
    fn moving_an_empty_square_is_illegal() {
        let mut game = Game::from_start_position();
        assert_eq!(Err(Error::IllegalMove), game.make_move("e4", "e5"));
    }

    #[test]
    fn notation_errors_surface() {
        let mut game = Game::from_start_position();
        assert_eq!(Err(Error::InvalidNotation), game.make_move("e9", "e4"));
        assert_eq!(Err(Error::InvalidNotation), game.make_move("e2", "z4"));
    }

    #[test]
    fn scripted_capture_reports_a_capture() {
        let mut game = Game::from_start_position();
        game.make_move("e2", "e4").unwrap();
        game.make_move("d7", "d5").unwrap();
        game.make_move("e4", "d5").unwrap();

        let last = game.ledger().last().unwrap();
        assert!(last.is_capture());
        assert!(!last.is_en_passant());
        assert_eq!(PieceKind::Pawn, game.board().piece_at(sq("d5")).unwrap().kind);
        assert_eq!(Color::White, game.board().piece_at(sq("d5")).unwrap().color);
    }

    #[test]
    fn castle_relocates_king_and_rook_atomically() {
        let mut game = Game::new();
        game.attach(sq("e1"), PieceKind::King, Color::White).unwrap();
        game.attach(sq("a1"), PieceKind::Rook, Color::White).unwrap();
        game.make_move("e1", "c1").unwrap();

        assert_eq!(Some(sq("c1")), game.board().king_square(Color::White));
        let rook = game.board().piece_at(sq("d1")).unwrap();
        assert_eq!(PieceKind::Rook, rook.kind);
        assert_eq!(sq("d1"), rook.square);
        assert!(game.board().piece_at(sq("a1")).is_none());
        assert!(game.ledger().last().unwrap().is_castle());
    }

    #[test]
    fn promotion_blocks_until_resolved() {
        let mut game = Game::new();
        game.attach(sq("a7"), PieceKind::Pawn, Color::White).unwrap();
        game.attach(sq("h7"), PieceKind::Pawn, Color::Black).unwrap();
        game.make_move("a7", "a8").unwrap();

        assert_eq!(Some(sq("a8")), game.pending_promotion());
        assert_eq!(
            Err(Error::PendingPromotionViolation),
            game.make_move("h7", "h6")
        );
        assert_eq!(Err(Error::IllegalMove), game.promote(PieceKind::King));
        assert_eq!(Err(Error::IllegalMove), game.promote(PieceKind::Pawn));
        game.promote(PieceKind::Queen).unwrap();
        assert_eq!(
            PieceKind::Queen,
            game.board().piece_at(sq("a8")).unwrap().kind
        );
        game.make_move("h7", "h6").unwrap();
    }

    #[test]
    fn rejected_move_leaves_no_trace() {
        let mut game = Game::from_start_position();
        game.make_move("e2", "e4").unwrap();
        let board_before = game.board().clone();
        let ledger_len = game.ledger().len();
        let turn = game.side_to_move();

        // Out of the legal set.
        assert!(game.make_move("d7", "d3").is_err());
        assert_eq!(&board_before, game.board());
        assert_eq!(ledger_len, game.ledger().len());
        assert_eq!(turn, game.side_to_move());
    }

    #[test]
    fn self_check_rollback_restores_the_board() {
        let mut game = Game::new();
        game.attach(sq("e1"), PieceKind::King, Color::White).unwrap();
        game.attach(sq("e8"), PieceKind::King, Color::Black).unwrap();
        game.attach(sq("e2"), PieceKind::Rook, Color::White).unwrap();
        game.attach(sq("e7"), PieceKind::Rook, Color::Black).unwrap();
        let board_before = game.board().clone();

        // The white rook is pinned to its king.
        assert_eq!(Err(Error::IllegalMove), game.make_move("e2", "a2"));
        assert_eq!(&board_before, game.board());
        assert_eq!(0, game.ledger().len());
        assert_eq!(Color::White, game.side_to_move());

        // Sliding along the pin is fine.
        game.make_move("e2", "e5").unwrap();
    }

    #[test]
    fn fools_mate_is_checkmate() {
        let mut game = Game::from_start_position();
        game.make_move("f2", "f3").unwrap();
        game.make_move("e7", "e5").unwrap();
        game.make_move("g2", "g4").unwrap();
        game.make_move("d8", "h4").unwrap();

        assert!(game.is_check(Color::White));
        assert!(game.is_checkmate());
        assert!(!game.is_stalemate());
    }

    #[test]
    fn bare_kings_corner_stalemate() {
        let mut game = Game::new();
        game.attach(sq("a8"), PieceKind::King, Color::Black).unwrap();
        game.attach(sq("b6"), PieceKind::King, Color::White).unwrap();
        game.attach(sq("c7"), PieceKind::Queen, Color::White).unwrap();
        // Black to move: not in check, but every king move is covered.
        game.make_move("b6", "c6").unwrap();

        assert!(!game.is_check(Color::Black));
        assert!(!game.has_legal_move(Color::Black));
        assert!(game.is_stalemate());
        assert!(!game.is_checkmate());
    }
}
