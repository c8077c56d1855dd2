// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

#[macro_use]
extern crate criterion;

use caissa::{movegen, pgn, Color, Game, PieceKind, Square, SquareSet};
use criterion::black_box;
use criterion::Criterion;

fn sq(name: &str) -> Square {
    name.parse().unwrap()
}

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("queen pseudo moves d4", |b| {
        b.iter(|| -> SquareSet {
            movegen::pseudo_moves(PieceKind::Queen, black_box(sq("d4")), Color::White)
        })
    });

    c.bench_function("legal moves knight b1 start", |b| {
        let game = Game::from_start_position();
        b.iter(|| game.legal_moves_from(black_box(sq("b1"))))
    });

    c.bench_function("attack scan e4 start", |b| {
        let game = Game::from_start_position();
        b.iter(|| {
            movegen::attacks_square(
                black_box(sq("e4")),
                game.board(),
                game.ledger(),
                Color::Black,
            )
        })
    });

    c.bench_function("game clone", |b| {
        let game = Game::from_start_position();
        b.iter(|| black_box(&game).clone())
    });

    c.bench_function("make move and rollback probe", |b| {
        let game = Game::from_start_position();
        b.iter(|| {
            let mut probe = game.clone();
            probe.make_move_squares(sq("e2"), sq("e4")).unwrap();
        })
    });

    c.bench_function("replay scholars mate", |b| {
        b.iter(|| {
            let mut game = Game::from_start_position();
            pgn::replay(&mut game, "1. e4 e5 2. Bc4 Nc6 3. Qh5 Nf6 4. Qxf7# 1-0")
                .unwrap();
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
