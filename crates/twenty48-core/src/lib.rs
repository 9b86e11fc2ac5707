//! twenty48-core: a 4x4 tile-merging puzzle engine.
//!
//! This crate provides:
//! - A compact [`Board`](engine::Board) type packed into a `u64`, with
//!   slide/merge resolution driven by precomputed per-line tables
//! - A [`Game`] state machine owning the board, the accumulated score, the
//!   undo history, and the tile spawner's RNG
//!
//! Quick start:
//! ```
//! use twenty48_core::engine::Direction;
//! use twenty48_core::Game;
//!
//! // Deterministic spawns from a seed; `Game::new()` seeds from entropy.
//! let mut game = Game::from_seed(42);
//! let before = (game.board(), game.score());
//! game.apply(Direction::Left);
//! game.undo();
//! assert_eq!((game.board(), game.score()), before);
//! ```
//!
//! The engine is synchronous and single-threaded; randomness is its only
//! external dependency. Hosts read state through copying accessors and drive
//! it exclusively through `apply`, `undo`, and `reset`.

pub mod engine;
pub mod game;

pub use game::Game;
