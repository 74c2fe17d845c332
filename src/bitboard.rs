//! Bitboard representation and board geometry.
//!
//! A bitboard is a 64-bit integer where each bit represents a square on the chess board.
//! Square indexing: a1 = 0, b1 = 1, ..., h1 = 7, a2 = 8, ..., h8 = 63
//! This corresponds to: square_index = rank * 8 + file where rank/file are 0-indexed.

use std::fmt::Write;

use crate::error::{Error, Result};
use crate::types::{Color, Square};

pub type Bitboard = u64;

pub const FILE_A: Bitboard = 0x0101_0101_0101_0101;
pub const FILE_H: Bitboard = FILE_A << 7;
pub const RANK_1: Bitboard = 0xFF;
pub const RANK_2: Bitboard = RANK_1 << 8;
pub const RANK_7: Bitboard = RANK_1 << 48;
pub const RANK_8: Bitboard = RANK_1 << 56;

/// File masks, a-file first
pub const FILE_BB: [Bitboard; 8] = [
    FILE_A,
    FILE_A << 1,
    FILE_A << 2,
    FILE_A << 3,
    FILE_A << 4,
    FILE_A << 5,
    FILE_A << 6,
    FILE_H,
];

/// Rank masks, first rank first
pub const RANK_BB: [Bitboard; 8] = [
    RANK_1,
    RANK_2,
    RANK_1 << 16,
    RANK_1 << 24,
    RANK_1 << 32,
    RANK_1 << 40,
    RANK_7,
    RANK_8,
];

/// Convert a square index to a bitboard with that single bit set
#[inline(always)]
pub const fn sq_to_bb(sq: Square) -> Bitboard {
    1u64 << sq
}

/// Get the file (0-7) from a square index
#[inline(always)]
pub const fn file_of(sq: Square) -> u8 {
    sq & 7
}

/// Get the rank (0-7) from a square index
#[inline(always)]
pub const fn rank_of(sq: Square) -> u8 {
    sq >> 3
}

/// Convert a 0-indexed file and rank to a square index
#[inline(always)]
pub const fn make_square(file: u8, rank: u8) -> Square {
    rank * 8 + file
}

/// Rank as seen from `color`'s side of the board
#[inline(always)]
pub const fn relative_rank(color: Color, rank: u8) -> u8 {
    match color {
        Color::White => rank,
        Color::Black => 7 - rank,
    }
}

/// Number of king moves between two squares
#[inline]
pub fn distance(a: Square, b: Square) -> u8 {
    let files = file_of(a).abs_diff(file_of(b));
    let ranks = rank_of(a).abs_diff(rank_of(b));
    files.max(ranks)
}

/// The files next to `sq`'s file
#[inline]
pub fn adjacent_files_bb(sq: Square) -> Bitboard {
    let file = FILE_BB[file_of(sq) as usize];
    ((file << 1) & !FILE_A) | ((file >> 1) & !FILE_H)
}

/// Square reached by a single step of `step` index units, or `None` if the step
/// leaves the board. A step that wraps from one edge file to the other moves
/// more than two files and is rejected by the distance check.
#[inline]
pub fn landing_square(sq: Square, step: i8) -> Option<Square> {
    let to = sq as i8 + step;
    if (0..64).contains(&to) && distance(sq, to as Square) <= 2 {
        Some(to as Square)
    } else {
        None
    }
}

pub fn parse_square(s: &str) -> Result<Square> {
    match s.as_bytes() {
        [file @ b'a'..=b'h', rank @ b'1'..=b'8'] => Ok(make_square(file - b'a', rank - b'1')),
        _ => Err(Error::InvalidSquare(s.to_owned())),
    }
}

pub fn square_name(sq: Square) -> String {
    format!(
        "{}{}",
        (b'a' + file_of(sq)) as char,
        (b'1' + rank_of(sq)) as char
    )
}

/// Draw a bitboard as an 8x8 diagram, rank 8 at the top
pub fn format_bitboard(bb: Bitboard) -> String {
    let mut out = String::new();
    for rank in (0..8).rev() {
        let _ = write!(out, "{} ", rank + 1);
        for file in 0..8 {
            let c = if bb & sq_to_bb(make_square(file, rank)) != 0 {
                'x'
            } else {
                '.'
            };
            out.push(' ');
            out.push(c);
        }
        out.push('\n');
    }
    out.push_str("   a b c d e f g h\n");
    out
}

/// Iterate over set bits in a bitboard, returning square indices
pub struct BitboardIter(pub Bitboard);

impl Iterator for BitboardIter {
    type Item = Square;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        if self.0 == 0 {
            None
        } else {
            let sq = self.0.trailing_zeros() as Square;
            self.0 &= self.0 - 1; // Clear the lowest set bit
            Some(sq)
        }
    }
}
