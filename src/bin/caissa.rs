// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

#[macro_use]
extern crate clap;

use std::fs;
use std::io::{self, BufRead, Write};
use std::process;

use caissa::{pgn, Game, PieceKind};
use clap::{App, Arg, ArgMatches, SubCommand};

fn main() {
    env_logger::init();
    let matches = App::new(crate_name!())
        .version(crate_version!())
        .author(crate_authors!())
        .about("A chess rules engine console and PGN replayer")
        .subcommand(
            SubCommand::with_name("replay")
                .about("Replay a PGN movetext file and print the final position")
                .arg(
                    Arg::with_name("FILE")
                        .help("PGN file to replay")
                        .required(true)
                        .index(1),
                ),
        )
        .get_matches();

    if let Some(matches) = matches.subcommand_matches("replay") {
        run_replay(matches);
    }

    run_console().unwrap()
}

fn run_replay(matches: &ArgMatches) -> ! {
    let path = matches.value_of("FILE").unwrap();
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            println!("can't read {}: {}", path, e);
            process::exit(1);
        }
    };

    let mut game = Game::from_start_position();
    if let Err(e) = pgn::replay(&mut game, &contents) {
        println!("replay failed after {} moves: {}", game.ledger().len(), e);
        process::exit(1);
    }

    println!("{}", game);
    println!(
        "{} moves recorded, {} to move",
        game.ledger().len(),
        game.side_to_move()
    );
    if game.is_checkmate() {
        println!("checkmate");
    } else if game.is_stalemate() {
        println!("stalemate");
    } else if game.is_check(game.side_to_move()) {
        println!("check");
    }
    process::exit(0);
}

fn promotion_choice(letter: &str) -> Option<PieceKind> {
    match letter {
        "q" => Some(PieceKind::Queen),
        "r" => Some(PieceKind::Rook),
        "b" => Some(PieceKind::Bishop),
        "n" => Some(PieceKind::Knight),
        _ => None,
    }
}

fn run_console() -> io::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut game = Game::from_start_position();
    writeln!(out, "{}", game)?;

    for maybe_line in stdin.lock().lines() {
        let line = maybe_line?;
        let components: Vec<_> = line.split_whitespace().collect();
        match components.as_slice() {
            ["quit"] => break,
            ["promote", letter] => {
                let result = match promotion_choice(letter) {
                    Some(kind) => game.promote(kind),
                    None => {
                        writeln!(out, "promote to one of: q r b n")?;
                        continue;
                    }
                };
                match result {
                    Ok(()) => writeln!(out, "{}", game)?,
                    Err(e) => writeln!(out, "{}", e)?,
                }
            }
            [start, end] => match game.make_move(start, end) {
                Ok(()) => {
                    writeln!(out, "{}", game)?;
                    if game.pending_promotion().is_some() {
                        writeln!(out, "promotion pending: promote <q|r|b|n>")?;
                    } else if game.is_checkmate() {
                        writeln!(out, "checkmate")?;
                    } else if game.is_stalemate() {
                        writeln!(out, "stalemate")?;
                    } else if game.is_check(game.side_to_move()) {
                        writeln!(out, "check")?;
                    }
                }
                Err(e) => writeln!(out, "{}", e)?,
            },
            [] => {}
            _ => writeln!(out, "usage: <from> <to> | promote <q|r|b|n> | quit")?,
        }
    }

    Ok(())
}
