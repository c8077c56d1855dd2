// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! caissa is a chess rules engine: a canonical board plus a transactional
//! move-legality procedure covering piece movement, captures, en passant,
//! castling, promotion gating and self-check prevention, with a PGN
//! movetext replay driver on top.

#[macro_use]
extern crate num_derive;
#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;
#[macro_use]
extern crate pest_derive;

mod board;
mod game;
mod ledger;
pub mod movegen;
pub mod pgn;
mod types;

pub use crate::board::{Board, PieceId};
pub use crate::game::Game;
pub use crate::ledger::{Ledger, Move, MoveKind, MovedFlags};
pub use crate::movegen::SquareSet;
pub use crate::types::{
    CastleSide, Color, Error, File, Piece, PieceKind, Rank, Square,
};
