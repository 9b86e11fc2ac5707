use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::engine::{Board, Direction};

/// An immutable `{board, score}` pair stored in the undo history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Snapshot {
    board: Board,
    score: u64,
}

/// The puzzle state machine: a board, an accumulated score, and an undo
/// history, mutated only through [`apply`](Game::apply), [`undo`](Game::undo)
/// and [`reset`](Game::reset).
///
/// A game starts with two spawned tiles on an empty board. Every attempted
/// move pushes a snapshot first, even a move that changes nothing, so undo
/// steps back through attempts, not just through effective moves.
///
/// ```
/// use twenty48_core::engine::Direction;
/// use twenty48_core::Game;
///
/// let mut game = Game::from_seed(42);
/// let before = (game.board(), game.score());
/// game.apply(Direction::Left);
/// game.undo();
/// assert_eq!((game.board(), game.score()), before);
/// ```
#[derive(Debug)]
pub struct Game {
    board: Board,
    score: u64,
    history: Vec<Snapshot>,
    rng: StdRng,
}

impl Game {
    /// Start a game with entropy-seeded spawns.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Start a game with a deterministic spawn sequence.
    pub fn from_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(mut rng: StdRng) -> Self {
        let board = Board::EMPTY
            .with_spawned_tile(&mut rng)
            .with_spawned_tile(&mut rng);
        Game {
            board,
            score: 0,
            history: Vec::new(),
            rng,
        }
    }

    /// Attempt a move. A snapshot is pushed before resolving, whether or not
    /// the move changes anything. When the board changed, the merge points
    /// accrue to the score and exactly one tile spawns; otherwise board and
    /// score are untouched. Returns whether the board changed.
    pub fn apply(&mut self, dir: Direction) -> bool {
        self.history.push(Snapshot {
            board: self.board,
            score: self.score,
        });
        let (slid, points) = self.board.slide(dir);
        if slid == self.board {
            return false;
        }
        self.score += points;
        self.board = slid.with_spawned_tile(&mut self.rng);
        true
    }

    /// Pop the latest snapshot and restore board and score from it. An empty
    /// history is a no-op, not an error. Returns whether a snapshot was
    /// restored.
    pub fn undo(&mut self) -> bool {
        match self.history.pop() {
            Some(snapshot) => {
                self.board = snapshot.board;
                self.score = snapshot.score;
                true
            }
            None => false,
        }
    }

    /// True iff no move can change the board: every cell is occupied and no
    /// two adjacent cells are equal in any row or column. Pure query.
    pub fn is_over(&self) -> bool {
        self.board.is_stuck()
    }

    /// Discard board, score, and history; respawn two tiles. The owned RNG
    /// stream continues where it left off.
    pub fn reset(&mut self) {
        self.board = Board::EMPTY
            .with_spawned_tile(&mut self.rng)
            .with_spawned_tile(&mut self.rng);
        self.score = 0;
        self.history.clear();
    }

    /// The current board, as a copy.
    pub fn board(&self) -> Board {
        self.board
    }

    /// The accumulated score.
    pub fn score(&self) -> u64 {
        self.score
    }

    /// Number of snapshots available to undo.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
