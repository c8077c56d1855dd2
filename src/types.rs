// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use num_traits::{FromPrimitive, ToPrimitive};
use std::convert::TryFrom;
use std::error;
use std::fmt::{self, Display, Write};
use std::str::FromStr;

// TableIndex is a trait for all types that can serve as an index into a table.
// It is common to use these types as indices into tables, so this trait allows
// any type implementing To and FromPrimitive to be used as table indices.
pub trait TableIndex {
    fn as_index(self) -> usize;
    fn from_index(idx: usize) -> Self;
}

impl<T> TableIndex for T
where
    T: FromPrimitive + ToPrimitive,
{
    fn as_index(self) -> usize {
        self.to_u32().unwrap() as usize
    }

    fn from_index(idx: usize) -> T {
        <T as FromPrimitive>::from_u64(idx as u64).unwrap()
    }
}

/// Errors produced by the rules engine and its replay collaborator. All of
/// them are recoverable: a failing operation leaves the engine untouched.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// A square string outside `a`-`h` / `1`-`8`, or movetext the grammar
    /// rejects.
    InvalidNotation,
    /// An `attach` onto a square (or a per-color king slot) that is already
    /// occupied.
    OccupiedSquare,
    /// Wrong turn, destination not in the legal move set, self-check, or an
    /// ineligible castle.
    IllegalMove,
    /// A move was attempted while a promotion choice is outstanding.
    PendingPromotionViolation,
    /// A SAN token that still matches more than one piece after file and
    /// rank disambiguation.
    AmbiguousNotation,
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let msg = match self {
            Error::InvalidNotation => "invalid algebraic notation",
            Error::OccupiedSquare => "square is already occupied",
            Error::IllegalMove => "illegal move",
            Error::PendingPromotionViolation => "a promotion choice is outstanding",
            Error::AmbiguousNotation => "ambiguous movetext token",
        };
        f.write_str(msg)
    }
}

impl error::Error for Error {}

/// A square on the board, packed as `rank * 8 + file`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    pub fn of(file: File, rank: Rank) -> Square {
        Square((rank.as_index() * 8 + file.as_index()) as u8)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn file(self) -> File {
        File::from_index(self.0 as usize & 7)
    }

    pub fn rank(self) -> Rank {
        Rank::from_index(self.0 as usize >> 3)
    }

    /// The square displaced from this one by file and rank deltas, or None
    /// if the result falls off the board. Off-board candidates are culled
    /// here, before any occupancy test anywhere else in the crate.
    pub fn try_offset(self, file_delta: i32, rank_delta: i32) -> Option<Square> {
        let file = self.0 as i32 % 8 + file_delta;
        let rank = self.0 as i32 / 8 + rank_delta;
        if file < 0 || file > 7 || rank < 0 || rank > 7 {
            return None;
        }
        Some(Square((rank * 8 + file) as u8))
    }
}

impl FromStr for Square {
    type Err = Error;

    fn from_str(s: &str) -> Result<Square, Error> {
        let mut chars = s.chars();
        let file_chr = chars.next().ok_or(Error::InvalidNotation)?;
        let rank_chr = chars.next().ok_or(Error::InvalidNotation)?;
        if chars.next().is_some() {
            return Err(Error::InvalidNotation);
        }

        let file = File::try_from(file_chr).map_err(|_| Error::InvalidNotation)?;
        let rank = Rank::try_from(rank_chr).map_err(|_| Error::InvalidNotation)?;
        Ok(Square::of(file, rank))
    }
}

impl Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

/// Iterates all 64 squares, a1 through h8.
pub fn squares() -> impl Iterator<Item = Square> {
    (0..64u8).map(Square)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, FromPrimitive, ToPrimitive)]
pub enum Rank {
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
}

impl Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let chr = match self {
            Rank::One => '1',
            Rank::Two => '2',
            Rank::Three => '3',
            Rank::Four => '4',
            Rank::Five => '5',
            Rank::Six => '6',
            Rank::Seven => '7',
            Rank::Eight => '8',
        };
        f.write_char(chr)
    }
}

impl TryFrom<char> for Rank {
    type Error = ();

    fn try_from(value: char) -> Result<Self, Self::Error> {
        let res = match value {
            '1' => Rank::One,
            '2' => Rank::Two,
            '3' => Rank::Three,
            '4' => Rank::Four,
            '5' => Rank::Five,
            '6' => Rank::Six,
            '7' => Rank::Seven,
            '8' => Rank::Eight,
            _ => return Err(()),
        };
        Ok(res)
    }
}

pub static RANKS: [Rank; 8] = [
    Rank::One,
    Rank::Two,
    Rank::Three,
    Rank::Four,
    Rank::Five,
    Rank::Six,
    Rank::Seven,
    Rank::Eight,
];

#[derive(Copy, Clone, Debug, PartialEq, Eq, FromPrimitive, ToPrimitive)]
pub enum File {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
}

impl Display for File {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let chr = match self {
            File::A => 'a',
            File::B => 'b',
            File::C => 'c',
            File::D => 'd',
            File::E => 'e',
            File::F => 'f',
            File::G => 'g',
            File::H => 'h',
        };
        f.write_char(chr)
    }
}

impl TryFrom<char> for File {
    type Error = ();

    fn try_from(value: char) -> Result<Self, Self::Error> {
        let res = match value {
            'a' => File::A,
            'b' => File::B,
            'c' => File::C,
            'd' => File::D,
            'e' => File::E,
            'f' => File::F,
            'g' => File::G,
            'h' => File::H,
            _ => return Err(()),
        };
        Ok(res)
    }
}

pub static FILES: [File; 8] = [
    File::A,
    File::B,
    File::C,
    File::D,
    File::E,
    File::F,
    File::G,
    File::H,
];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn toggle(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// The direction this color's pawns advance in, as a rank delta.
    pub fn pawn_direction(self) -> i32 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// The rank this color's pawns start on.
    pub fn pawn_start_rank(self) -> Rank {
        match self {
            Color::White => Rank::Two,
            Color::Black => Rank::Seven,
        }
    }

    /// The terminal rank at which this color's pawns promote.
    pub fn promotion_rank(self) -> Rank {
        match self {
            Color::White => Rank::Eight,
            Color::Black => Rank::One,
        }
    }

    /// The rank this color's back-rank pieces start on.
    pub fn back_rank(self) -> Rank {
        match self {
            Color::White => Rank::One,
            Color::Black => Rank::Eight,
        }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let chr = match self {
            Color::White => 'w',
            Color::Black => 'b',
        };
        f.write_char(chr)
    }
}

pub static COLORS: [Color; 2] = [Color::White, Color::Black];

#[derive(Copy, Clone, Debug, PartialEq, Eq, FromPrimitive, ToPrimitive)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Conventional material value. The king has none; it is never traded.
    pub fn value(self) -> Option<u32> {
        match self {
            PieceKind::Pawn => Some(1),
            PieceKind::Knight => Some(3),
            PieceKind::Bishop => Some(3),
            PieceKind::Rook => Some(5),
            PieceKind::Queen => Some(10),
            PieceKind::King => None,
        }
    }
}

impl Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let chr = match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        };
        f.write_char(chr)
    }
}

pub static PIECE_KINDS: [PieceKind; 6] = [
    PieceKind::Pawn,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Rook,
    PieceKind::Queen,
    PieceKind::King,
];

/// The two castling wings, named by the rook's home file.
#[derive(Copy, Clone, Debug, PartialEq, Eq, FromPrimitive, ToPrimitive)]
pub enum CastleSide {
    Queenside,
    Kingside,
}

impl CastleSide {
    /// The home file of this wing's rook.
    pub fn rook_home_file(self) -> File {
        match self {
            CastleSide::Queenside => File::A,
            CastleSide::Kingside => File::H,
        }
    }

    pub fn rook_home(self, color: Color) -> Square {
        Square::of(self.rook_home_file(), color.back_rank())
    }

    /// Where the king lands when castling on this wing.
    pub fn king_destination(self, color: Color) -> Square {
        let file = match self {
            CastleSide::Queenside => File::C,
            CastleSide::Kingside => File::G,
        };
        Square::of(file, color.back_rank())
    }

    /// Where the rook lands when castling on this wing.
    pub fn rook_destination(self, color: Color) -> Square {
        let file = match self {
            CastleSide::Queenside => File::D,
            CastleSide::Kingside => File::F,
        };
        Square::of(file, color.back_rank())
    }
}

pub static CASTLE_SIDES: [CastleSide; 2] = [CastleSide::Queenside, CastleSide::Kingside];

/// A live piece. The board's arena owns these; `square` mirrors the grid
/// slot the piece currently occupies.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
    pub square: Square,
    pub has_moved: bool,
}

impl Piece {
    pub fn new(kind: PieceKind, color: Color, square: Square) -> Piece {
        Piece {
            kind,
            color,
            square,
            has_moved: false,
        }
    }

    pub fn value(&self) -> Option<u32> {
        self.kind.value()
    }
}

impl Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let chr = match (self.kind, self.color) {
            (PieceKind::Pawn, Color::White) => 'P',
            (PieceKind::Knight, Color::White) => 'N',
            (PieceKind::Bishop, Color::White) => 'B',
            (PieceKind::Rook, Color::White) => 'R',
            (PieceKind::Queen, Color::White) => 'Q',
            (PieceKind::King, Color::White) => 'K',
            (PieceKind::Pawn, Color::Black) => 'p',
            (PieceKind::Knight, Color::Black) => 'n',
            (PieceKind::Bishop, Color::Black) => 'b',
            (PieceKind::Rook, Color::Black) => 'r',
            (PieceKind::Queen, Color::Black) => 'q',
            (PieceKind::King, Color::Black) => 'k',
        };
        f.write_char(chr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn algebraic_round_trip() {
        for sq in squares() {
            let name = sq.to_string();
            assert_eq!(sq, name.parse::<Square>().unwrap());
        }
    }

    #[test]
    fn algebraic_corners() {
        assert_eq!(
            Square::of(File::A, Rank::One),
            "a1".parse::<Square>().unwrap()
        );
        assert_eq!(
            Square::of(File::H, Rank::Eight),
            "h8".parse::<Square>().unwrap()
        );
    }

    #[test]
    fn invalid_notation() {
        assert_eq!(Err(Error::InvalidNotation), "i1".parse::<Square>());
        assert_eq!(Err(Error::InvalidNotation), "a9".parse::<Square>());
        assert_eq!(Err(Error::InvalidNotation), "a".parse::<Square>());
        assert_eq!(Err(Error::InvalidNotation), "a10".parse::<Square>());
        assert_eq!(Err(Error::InvalidNotation), "".parse::<Square>());
    }

    #[test]
    fn offsets_clip_to_board() {
        let a1: Square = "a1".parse().unwrap();
        assert_eq!(None, a1.try_offset(-1, 0));
        assert_eq!(None, a1.try_offset(0, -1));
        assert_eq!(Some("b2".parse().unwrap()), a1.try_offset(1, 1));

        let h8: Square = "h8".parse().unwrap();
        assert_eq!(None, h8.try_offset(1, 0));
        assert_eq!(None, h8.try_offset(0, 1));
    }
}
