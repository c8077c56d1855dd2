// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! PGN movetext replay: parse SAN tokens, resolve each to a concrete
//! (start, end) pair against the live game, and drive the engine with it.
//! Resolution is three-staged: legality filter, then the token's embedded
//! source file, then its embedded source rank. Anything still ambiguous is
//! an error back to the caller, never a silent no-op.
use std::convert::TryFrom;

use pest::Parser;

use crate::game::Game;
use crate::types::{CastleSide, Error, File, PieceKind, Rank, Square};

#[derive(Parser)]
#[grammar = "pgn.pest"]
struct PgnParser;

/// Replays every move of the first-to-last games in `movetext` onto `game`,
/// in order. Tag pairs and game results are accepted and ignored. The game
/// is left at the position after the last token that applied cleanly; the
/// first failing token aborts the replay with its error.
pub fn replay(game: &mut Game, movetext: &str) -> Result<(), Error> {
    let mut parsed = PgnParser::parse(Rule::lines, movetext).map_err(|e| {
        warn!("movetext rejected by the grammar: {}", e);
        Error::InvalidNotation
    })?;

    let lines = parsed.next().expect("a successful parse yields a lines pair");
    for line in lines.into_inner() {
        if line.as_rule() != Rule::line {
            continue;
        }
        for part in line.into_inner() {
            if part.as_rule() != Rule::moves {
                continue;
            }
            for mov in part.into_inner() {
                if mov.as_rule() != Rule::mov {
                    continue;
                }
                for turn in mov.into_inner() {
                    match turn.as_rule() {
                        Rule::castle | Rule::normal_move => apply_san(game, turn.as_str())?,
                        _ => {}
                    }
                }
            }
        }
    }

    Ok(())
}

/// Resolves one SAN token and makes the move, resolving a promotion suffix
/// in the same step.
pub fn apply_san(game: &mut Game, token: &str) -> Result<(), Error> {
    let (start, end, promotion) = resolve_san(game, token)?;
    debug!("{}: {} resolved to {}{}", game.side_to_move(), token, start, end);
    game.make_move_squares(start, end)?;
    if game.pending_promotion().is_some() {
        // Movetext that pushes to the terminal rank without naming the
        // replacement piece is corrupt.
        let kind = promotion.ok_or(Error::InvalidNotation)?;
        game.promote(kind)?;
    }
    Ok(())
}

/// Resolves a SAN token against the current position without mutating it.
/// Returns the concrete (start, end) pair and the promotion kind, if the
/// token carries one.
pub fn resolve_san(
    game: &Game,
    token: &str,
) -> Result<(Square, Square, Option<PieceKind>), Error> {
    let color = game.side_to_move();
    let decoded = decode_san(token)?;

    let tok = match decoded {
        SanMove::Castle(side) => {
            let start = game
                .board()
                .king_square(color)
                .ok_or(Error::IllegalMove)?;
            return Ok((start, side.king_destination(color), None));
        }
        SanMove::Normal(tok) => tok,
    };

    // Stage one: pieces of the right kind and color that can reach the
    // destination. Candidates are vetted through a probe transaction so a
    // pinned twin never shadows the piece the token means.
    let mut candidates: Vec<Square> = game
        .pieces()
        .filter(|(_, piece)| piece.color == color && piece.kind == tok.kind)
        .map(|(sq, _)| sq)
        .filter(|&sq| game.legal_moves_from(sq).contains(&tok.dest))
        .filter(|&sq| {
            let mut probe = game.clone();
            probe.make_move_squares(sq, tok.dest).is_ok()
        })
        .collect();

    // Stage two: the token's embedded source file.
    if candidates.len() > 1 {
        if let Some(file) = tok.from_file {
            candidates.retain(|sq| sq.file() == file);
        }
    }

    // Stage three: the token's embedded source rank.
    if candidates.len() > 1 {
        if let Some(rank) = tok.from_rank {
            candidates.retain(|sq| sq.rank() == rank);
        }
    }

    match candidates.len() {
        0 => Err(Error::IllegalMove),
        1 => Ok((candidates[0], tok.dest, tok.promotion)),
        _ => Err(Error::AmbiguousNotation),
    }
}

enum SanMove {
    Castle(CastleSide),
    Normal(SanToken),
}

struct SanToken {
    kind: PieceKind,
    dest: Square,
    from_file: Option<File>,
    from_rank: Option<Rank>,
    promotion: Option<PieceKind>,
}

fn promotion_kind(chr: char) -> Option<PieceKind> {
    match chr {
        'Q' => Some(PieceKind::Queen),
        'R' => Some(PieceKind::Rook),
        'B' => Some(PieceKind::Bishop),
        'N' => Some(PieceKind::Knight),
        _ => None,
    }
}

fn decode_san(token: &str) -> Result<SanMove, Error> {
    let body = token.trim_end_matches(|c| c == '+' || c == '#');

    if body == "O-O-O" {
        return Ok(SanMove::Castle(CastleSide::Queenside));
    }
    if body == "O-O" {
        return Ok(SanMove::Castle(CastleSide::Kingside));
    }

    // Split off a promotion suffix, `=Q` and friends.
    let (body, promotion) = match body.find('=') {
        Some(idx) => {
            let suffix = &body[idx + 1..];
            let mut chars = suffix.chars();
            let kind = chars
                .next()
                .and_then(promotion_kind)
                .ok_or(Error::InvalidNotation)?;
            if chars.next().is_some() {
                return Err(Error::InvalidNotation);
            }
            (&body[..idx], Some(kind))
        }
        None => (body, None),
    };

    let mut chars: Vec<char> = body.chars().collect();
    if chars.len() < 2 {
        return Err(Error::InvalidNotation);
    }

    let kind = match chars.first().and_then(|&c| match c {
        'K' => Some(PieceKind::King),
        c => promotion_kind(c),
    }) {
        Some(kind) => {
            chars.remove(0);
            kind
        }
        None => PieceKind::Pawn,
    };

    // The capture marker carries no information the resolver needs.
    chars.retain(|&c| c != 'x');

    if chars.len() < 2 {
        return Err(Error::InvalidNotation);
    }
    let dest: Square = chars[chars.len() - 2..]
        .iter()
        .collect::<String>()
        .parse()?;
    let disambig = &chars[..chars.len() - 2];

    let mut from_file = None;
    let mut from_rank = None;
    for &chr in disambig {
        if let Ok(file) = File::try_from(chr) {
            if from_file.is_some() {
                return Err(Error::InvalidNotation);
            }
            from_file = Some(file);
        } else if let Ok(rank) = Rank::try_from(chr) {
            if from_rank.is_some() {
                return Err(Error::InvalidNotation);
            }
            from_rank = Some(rank);
        } else {
            return Err(Error::InvalidNotation);
        }
    }

    Ok(SanMove::Normal(SanToken {
        kind,
        dest,
        from_file,
        from_rank,
        promotion,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    fn normal(token: &str) -> SanToken {
        match decode_san(token).unwrap() {
            SanMove::Normal(tok) => tok,
            SanMove::Castle(_) => panic!("expected a normal move"),
        }
    }

    #[test]
    fn decode_pawn_push() {
        let tok = normal("e4");
        assert_eq!(PieceKind::Pawn, tok.kind);
        assert_eq!(sq("e4"), tok.dest);
        assert_eq!(None, tok.from_file);
        assert_eq!(None, tok.from_rank);
    }

    #[test]
    fn decode_piece_capture_with_check() {
        let tok = normal("Nxf7+");
        assert_eq!(PieceKind::Knight, tok.kind);
        assert_eq!(sq("f7"), tok.dest);
    }

    #[test]
    fn decode_disambiguations() {
        let tok = normal("Rad1");
        assert_eq!(Some(File::A), tok.from_file);
        assert_eq!(None, tok.from_rank);

        let tok = normal("R1d4");
        assert_eq!(Some(Rank::One), tok.from_rank);

        let tok = normal("Qh4e1");
        assert_eq!(Some(File::H), tok.from_file);
        assert_eq!(Some(Rank::Four), tok.from_rank);
        assert_eq!(sq("e1"), tok.dest);
    }

    #[test]
    fn decode_promotion() {
        let tok = normal("e8=Q");
        assert_eq!(PieceKind::Pawn, tok.kind);
        assert_eq!(sq("e8"), tok.dest);
        assert_eq!(Some(PieceKind::Queen), tok.promotion);

        let tok = normal("exd8=N#");
        assert_eq!(Some(File::E), tok.from_file);
        assert_eq!(Some(PieceKind::Knight), tok.promotion);
    }

    #[test]
    fn decode_castles() {
        match decode_san("O-O").unwrap() {
            SanMove::Castle(CastleSide::Kingside) => {}
            _ => panic!("expected kingside castle"),
        }
        match decode_san("O-O-O+").unwrap() {
            SanMove::Castle(CastleSide::Queenside) => {}
            _ => panic!("expected queenside castle"),
        }
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode_san("").is_err());
        assert!(decode_san("Z4").is_err());
        assert!(decode_san("e9").is_err());
        assert!(decode_san("e8=K").is_err());
        assert!(decode_san("Qxx4").is_err());
    }
}
