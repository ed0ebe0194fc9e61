use crate::solve::PuzzleType;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::mpsc::{self, Sender};
use std::thread;
use tracing::{debug, warn};

const MODIFIERS: [&str; 3] = ["", "'", "2"];

const CUBE_FACES: [&str; 6] = ["R", "L", "U", "D", "F", "B"];
const BIG_CUBE_MOVES: [&str; 12] = [
    "R", "L", "U", "D", "F", "B", "Rw", "Lw", "Uw", "Dw", "Fw", "Bw",
];

/// Produces scramble strings for a puzzle.
pub trait ScrambleGenerator {
    fn generate(&mut self, puzzle: PuzzleType) -> String;
}

/// Random move sequences from a per-puzzle move set. Moves are not checked
/// for legality beyond never turning the same face twice in a row.
#[derive(Debug, Clone)]
pub struct RandomMoveScrambler {
    rng: StdRng,
}

impl RandomMoveScrambler {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn moves(puzzle: PuzzleType) -> &'static [&'static str] {
        match puzzle {
            PuzzleType::TwoByTwo => &["R", "U", "F"],
            PuzzleType::ThreeByThree => &CUBE_FACES,
            PuzzleType::FourByFour | PuzzleType::FiveByFive => &BIG_CUBE_MOVES,
            PuzzleType::Pyraminx => &["U", "L", "R", "B"],
            PuzzleType::Megaminx => &["R", "D"],
            PuzzleType::Skewb => &["R", "L", "U", "B"],
        }
    }

    pub fn length(puzzle: PuzzleType) -> usize {
        match puzzle {
            PuzzleType::TwoByTwo => 9,
            PuzzleType::ThreeByThree => 20,
            PuzzleType::FourByFour => 40,
            PuzzleType::FiveByFive => 60,
            PuzzleType::Pyraminx => 10,
            PuzzleType::Megaminx => 7,
            PuzzleType::Skewb => 9,
        }
    }
}

impl Default for RandomMoveScrambler {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrambleGenerator for RandomMoveScrambler {
    fn generate(&mut self, puzzle: PuzzleType) -> String {
        let moves = Self::moves(puzzle);
        let mut last: Option<&str> = None;
        let mut out = Vec::with_capacity(Self::length(puzzle));

        for _ in 0..Self::length(puzzle) {
            let face = loop {
                let candidate = moves[self.rng.gen_range(0..moves.len())];
                if last != Some(candidate) {
                    break candidate;
                }
            };
            let modifier = MODIFIERS[self.rng.gen_range(0..MODIFIERS.len())];
            out.push(format!("{face}{modifier}"));
            last = Some(face);
        }

        out.join(" ")
    }
}

/// A finished scramble, tagged with the request it answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrambleResult {
    pub seq: u64,
    pub puzzle: PuzzleType,
    pub scramble: String,
}

/// Background thread answering scramble requests. Results are delivered on
/// the sink channel; callers compare `seq` against [`ScrambleWorker::latest`]
/// and drop anything stale.
pub struct ScrambleWorker {
    requests: Sender<(u64, PuzzleType)>,
    latest: u64,
}

impl ScrambleWorker {
    pub fn spawn<G, T>(mut generator: G, sink: Sender<T>) -> Self
    where
        G: ScrambleGenerator + Send + 'static,
        T: From<ScrambleResult> + Send + 'static,
    {
        let (requests, rx) = mpsc::channel::<(u64, PuzzleType)>();

        thread::spawn(move || {
            for (seq, puzzle) in rx {
                let scramble = generator.generate(puzzle);
                debug!(seq, %puzzle, "scramble generated");
                let result = ScrambleResult {
                    seq,
                    puzzle,
                    scramble,
                };
                if sink.send(T::from(result)).is_err() {
                    break;
                }
            }
        });

        Self {
            requests,
            latest: 0,
        }
    }

    /// Queues a request and returns its sequence number. Never blocks.
    pub fn request(&mut self, puzzle: PuzzleType) -> u64 {
        self.latest += 1;
        if self.requests.send((self.latest, puzzle)).is_err() {
            warn!(seq = self.latest, "scramble worker has stopped");
        }
        self.latest
    }

    pub fn latest(&self) -> u64 {
        self.latest
    }

    pub fn is_current(&self, result: &ScrambleResult) -> bool {
        result.seq == self.latest
    }
}
