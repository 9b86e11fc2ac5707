use rand::Rng;

use super::board::{Board, BoardRaw, Direction, Line, Score};
use super::tables::{line_entry, tables};

/// Slide/merge tiles in `dir`. Returns the resulting board and the points
/// produced by this slide's merges. No randomness.
pub(crate) fn slide(board: Board, dir: Direction) -> (Board, Score) {
    match dir {
        Direction::Left | Direction::Right => slide_rows(board, dir),
        Direction::Up | Direction::Down => slide_cols(board, dir),
    }
}

fn slide_rows(board: Board, dir: Direction) -> (Board, Score) {
    let t = tables();
    let table: &[u64] = match dir {
        Direction::Left => &t.slide_left,
        Direction::Right => &t.slide_right,
        _ => unreachable!("slide_rows only handles horizontal directions"),
    };
    let mut raw: BoardRaw = 0;
    let mut points: Score = 0;
    for row_idx in 0..4 {
        let line = extract_line(board.0, row_idx) as u16;
        raw |= line_entry(table, line) << (48 - 16 * row_idx);
        points += line_entry(&t.merge_points, line);
    }
    (Board(raw), points)
}

fn slide_cols(board: Board, dir: Direction) -> (Board, Score) {
    let transposed = transpose(board.0);
    let t = tables();
    let table: &[u64] = match dir {
        Direction::Up => &t.slide_up,
        Direction::Down => &t.slide_down,
        _ => unreachable!("slide_cols only handles vertical directions"),
    };
    let mut raw: BoardRaw = 0;
    let mut points: Score = 0;
    for col_idx in 0..4 {
        let line = extract_line(transposed, col_idx) as u16;
        raw |= line_entry(table, line) << (12 - 4 * col_idx);
        points += line_entry(&t.merge_points, line);
    }
    (Board(raw), points)
}

// Credit to Nneonneo
pub(crate) fn transpose(x: BoardRaw) -> BoardRaw {
    let a1 = x & 0xF0F00F0FF0F00F0F;
    let a2 = x & 0x0000F0F00000F0F0;
    let a3 = x & 0x0F0F00000F0F0000;
    let a = a1 | (a2 << 12) | (a3 >> 12);
    let b1 = a & 0xFF00FF0000FF00FF;
    let b2 = a & 0x00FF00FF00000000;
    let b3 = a & 0x00000000FF00FF00;
    b1 | (b2 >> 24) | (b3 << 24)
}

pub(crate) fn extract_line(raw: BoardRaw, line_idx: u64) -> Line {
    (raw >> ((3 - line_idx) * 16)) & 0xffff
}

/// Place a 2 (probability 0.9) or a 4 (0.1) in a uniformly chosen empty
/// cell. A full board is returned unchanged.
pub(crate) fn with_spawned_tile<R: Rng + ?Sized>(board: Board, rng: &mut R) -> Board {
    let empty = count_empty(board);
    if empty == 0 {
        return board;
    }
    let mut index = rng.gen_range(0..empty);
    let mut tmp = board.0;
    let mut tile = spawn_exponent(rng);
    loop {
        while (tmp & 0xf) != 0 {
            tmp >>= 4;
            tile <<= 4;
        }
        if index == 0 {
            break;
        }
        index -= 1;
        tmp >>= 4;
        tile <<= 4;
    }
    Board(board.0 | tile)
}

fn spawn_exponent<R: Rng + ?Sized>(rng: &mut R) -> u64 {
    if rng.gen_range(0..10) < 9 {
        1
    } else {
        2
    }
}

/// True iff the board is full and no two adjacent cells in any row or
/// column are equal. A board with an empty cell is never stuck.
pub(crate) fn is_stuck(board: Board) -> bool {
    if count_empty(board) > 0 {
        return false;
    }
    // The board is full here, so equal adjacent nibbles are a mergeable pair.
    !has_adjacent_pair(board.0) && !has_adjacent_pair(transpose(board.0))
}

fn has_adjacent_pair(raw: BoardRaw) -> bool {
    (0..4).any(|line_idx| {
        let line = extract_line(raw, line_idx);
        (0..3).any(|k| (line >> (12 - 4 * k)) & 0xf == (line >> (8 - 4 * k)) & 0xf)
    })
}

// https://stackoverflow.com/questions/38225571/count-number-of-zero-nibbles-in-an-unsigned-64-bit-integer
/// Count the empty cells.
pub(crate) fn count_empty(board: Board) -> u32 {
    let mut raw = board.0;
    raw |= raw >> 1;
    raw |= raw >> 2;
    raw &= 0x1111111111111111;
    16 - raw.count_ones()
}
