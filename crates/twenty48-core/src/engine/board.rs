use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::slide;

// Internal type aliases for the packed representation
pub(crate) type BoardRaw = u64;
pub(crate) type Line = u64;
pub(crate) type Score = u64;

/// A direction to slide/merge tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Parse a direction word. Anything outside the closed set is `None`;
    /// invalid input never reaches the engine as a `Direction`.
    pub fn from_text(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            _ => None,
        }
    }

    /// The geometrically opposite direction.
    pub fn inverse(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Packed 4x4 board as 16 4-bit exponent nibbles in a `u64`, row-major.
/// A nibble of 0 is an empty cell; a nibble of n is the tile 2^n.
///
/// Public accessors speak in actual cell values (0, 2, 4, ...); the packed
/// form stays an escape hatch for advanced use. `Board` is `Copy`, so every
/// value handed out is a snapshot the caller cannot corrupt engine state
/// through.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board(pub(crate) BoardRaw);

impl Board {
    /// A constant empty board (all zeros).
    pub const EMPTY: Board = Board(0);

    /// Construct a `Board` from its raw packed representation.
    #[inline]
    pub fn from_raw(raw: BoardRaw) -> Self {
        Board(raw)
    }

    /// Borrow the raw packed `u64` for this `Board`.
    #[inline]
    pub fn raw(&self) -> BoardRaw {
        self.0
    }

    /// Construct a board from rows of actual cell values.
    ///
    /// Panics if a cell is neither 0 nor a power of two >= 2; the type
    /// carries powers of two only (up to 32768, the packing limit).
    ///
    /// ```
    /// use twenty48_core::engine::Board;
    /// let b = Board::from_rows([[2, 4, 0, 0], [0; 4], [0; 4], [0; 4]]);
    /// assert_eq!(b.count_empty(), 14);
    /// ```
    pub fn from_rows(rows: [[u16; 4]; 4]) -> Self {
        let mut raw: BoardRaw = 0;
        for (r, row) in rows.iter().enumerate() {
            for (c, &val) in row.iter().enumerate() {
                let exp = match val {
                    0 => 0,
                    v => {
                        assert!(
                            v.is_power_of_two() && v >= 2,
                            "cell values must be 0 or a power of two >= 2, got {v}"
                        );
                        v.trailing_zeros() as u64
                    }
                };
                raw |= exp << (60 - 4 * (4 * r + c));
            }
        }
        Board(raw)
    }

    /// The board as rows of actual cell values (0 for empty).
    pub fn rows(self) -> [[u16; 4]; 4] {
        let mut rows = [[0u16; 4]; 4];
        for idx in 0..16 {
            rows[idx / 4][idx % 4] = self.tile_value(idx);
        }
        rows
    }

    /// Actual value of the cell at `idx` (row-major 0..16), 0 if empty.
    #[inline]
    pub fn tile_value(self, idx: usize) -> u16 {
        let exp = (self.0 >> (60 - 4 * idx)) & 0xf;
        if exp == 0 {
            0
        } else {
            1 << exp
        }
    }

    /// Slide/merge tiles in `dir` without spawning. Returns the resulting
    /// board and the points produced by this slide's merges.
    ///
    /// ```
    /// use twenty48_core::engine::{Board, Direction};
    /// let b = Board::from_rows([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
    /// let (slid, points) = b.slide(Direction::Left);
    /// assert_eq!(slid.rows()[0], [4, 0, 0, 0]);
    /// assert_eq!(points, 4);
    /// ```
    #[inline]
    pub fn slide(self, dir: Direction) -> (Board, Score) {
        slide::slide(self, dir)
    }

    /// Place a 2 (probability 0.9) or a 4 (0.1) in a uniformly chosen empty
    /// cell. A full board is returned unchanged.
    #[inline]
    pub fn with_spawned_tile<R: Rng + ?Sized>(self, rng: &mut R) -> Self {
        slide::with_spawned_tile(self, rng)
    }

    /// True iff no cell is empty and no two adjacent cells (in any row or
    /// column) are equal. A board with an empty cell is never stuck.
    #[inline]
    pub fn is_stuck(self) -> bool {
        slide::is_stuck(self)
    }

    /// Count the empty cells.
    #[inline]
    pub fn count_empty(self) -> u32 {
        slide::count_empty(self)
    }

    /// The largest cell value on the board, 0 if the board is empty.
    pub fn highest_tile(self) -> u16 {
        let max_exp = self.exponents().max().unwrap_or(0);
        if max_exp == 0 {
            0
        } else {
            1 << max_exp
        }
    }

    /// Iterate over cell exponents (0 for empty, 1 for 2, 2 for 4, ...) in
    /// row-major order.
    #[inline]
    pub fn exponents(self) -> Exponents {
        Exponents { raw: self.0, idx: 0 }
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({:#018x})", self.0)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.rows().iter().enumerate() {
            if r > 0 {
                writeln!(f, "{}", "-".repeat(27))?;
            }
            for (c, &val) in row.iter().enumerate() {
                if c > 0 {
                    write!(f, "|")?;
                }
                if val == 0 {
                    write!(f, "{:6}", "")?;
                } else {
                    write!(f, "{:^6}", val)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl From<BoardRaw> for Board {
    fn from(v: BoardRaw) -> Self {
        Board::from_raw(v)
    }
}

impl From<Board> for BoardRaw {
    fn from(b: Board) -> Self {
        b.0
    }
}

/// Iterator over cell exponents in row-major order.
pub struct Exponents {
    raw: BoardRaw,
    idx: usize,
}

impl Iterator for Exponents {
    type Item = u8;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.idx >= 16 {
            return None;
        }
        let n = ((self.raw >> (60 - (4 * self.idx))) & 0xf) as u8;
        self.idx += 1;
        Some(n)
    }
}

impl IntoIterator for Board {
    type Item = u8;
    type IntoIter = Exponents;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.exponents()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_round_trip() {
        let rows = [
            [2, 4, 8, 16],
            [32, 64, 128, 256],
            [512, 1024, 2048, 4096],
            [8192, 16384, 32768, 0],
        ];
        let board = Board::from_rows(rows);
        assert_eq!(board.rows(), rows);
        assert_eq!(board.count_empty(), 1);
        assert_eq!(board.highest_tile(), 32768);
    }

    #[test]
    fn tile_value_reads_actual_values() {
        let board = Board::from_raw(0x0123456789abcdef);
        assert_eq!(board.tile_value(0), 0);
        assert_eq!(board.tile_value(3), 8);
        assert_eq!(board.tile_value(10), 1024);
        assert_eq!(board.tile_value(15), 32768);
    }

    #[test]
    fn empty_board_has_no_highest_tile() {
        assert_eq!(Board::EMPTY.highest_tile(), 0);
        assert_eq!(Board::EMPTY.count_empty(), 16);
    }

    #[test]
    #[should_panic(expected = "power of two")]
    fn from_rows_rejects_non_powers() {
        let _ = Board::from_rows([[3, 0, 0, 0], [0; 4], [0; 4], [0; 4]]);
    }

    #[test]
    fn direction_parsing_is_closed() {
        assert_eq!(Direction::from_text("left"), Some(Direction::Left));
        assert_eq!(Direction::from_text(" Up "), Some(Direction::Up));
        assert_eq!(Direction::from_text("DOWN"), Some(Direction::Down));
        assert_eq!(Direction::from_text("sideways"), None);
        assert_eq!(Direction::from_text(""), None);
    }

    #[test]
    fn inverse_pairs() {
        for dir in Direction::ALL {
            assert_eq!(dir.inverse().inverse(), dir);
        }
        assert_eq!(Direction::Left.inverse(), Direction::Right);
        assert_eq!(Direction::Up.inverse(), Direction::Down);
    }
}
