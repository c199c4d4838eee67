#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tilematch_core::game::Game;
use tilematch_core::layout::Difficulty;
use tilematch_core::rng::seeded;
use tilematch_core::time::secs;

/// A structured input operation for fuzzing.
#[derive(Arbitrary, Debug)]
enum FuzzOp {
    Reveal { position: u8 },
    Advance { centis: u8 },
    Settle,
    Save,
    Restart,
}

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    seed: u64,
    hard: bool,
    ops: Vec<FuzzOp>,
}

fuzz_target!(|input: FuzzInput| {
    let mut game = Game::default();
    let difficulty = if input.hard {
        Difficulty::Hard
    } else {
        Difficulty::Medium
    };
    let mut rng = seeded(input.seed);
    game.start_level(difficulty, &mut rng).unwrap();
    game.settle();

    // Limit operations to prevent timeouts.
    let max_ops = input.ops.len().min(300);

    for op in &input.ops[..max_ops] {
        match op {
            FuzzOp::Reveal { position } => {
                game.reveal_at(*position as usize);
            }
            FuzzOp::Advance { centis } => game.advance(secs(f64::from(*centis) / 100.0)),
            FuzzOp::Settle => {
                game.settle();
            }
            FuzzOp::Save => {
                if let Ok(record) = game.save() {
                    let mut copy = Game::default();
                    copy.load(&record).unwrap();
                }
            }
            FuzzOp::Restart => {
                game.restart_level(&mut rng).unwrap();
            }
        }

        // Matched tiles always come in pairs.
        let matched = game.board().matched_count();
        assert_eq!(matched % 2, 0);
        assert_eq!(matched, game.score().matches as usize * 2);
    }
});
