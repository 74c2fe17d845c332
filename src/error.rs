//! Error type shared by the parsing helpers and the table self-verification.
//!
//! The attack lookups themselves never fail; a broken table is a logic defect
//! that `AttackTables::verify` reports through this type.

use std::fmt;

use crate::bitboard::Bitboard;
use crate::magic::Slider;
use crate::types::{PieceType, Square};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Cannot parse a FEN string
    ParseError,
    /// Square name is not of the form `[a-h][1-8]`
    InvalidSquare(String),
    /// Character does not name a piece
    UnrecognizedPiece(char),
    /// Missing king or multiple kings of the same color
    InvalidKingCount,
    /// Shared slider buffer does not hold the expected number of entries
    TableSize {
        slider: Slider,
        expected: usize,
        found: usize,
    },
    /// Relevant occupancy mask differs from the one derived from the rays
    MaskMismatch { slider: Slider, square: Square },
    /// Stored attack set differs from the ray trace
    AttackMismatch {
        slider: Slider,
        square: Square,
        occupied: Bitboard,
    },
    /// Two occupancies with different attack sets share a multiply-shift index
    IndexCollision {
        slider: Slider,
        square: Square,
        occupied: Bitboard,
    },
    /// Bit-gather index is not the subset's position in enumeration order
    GatherOrder {
        slider: Slider,
        square: Square,
        occupied: Bitboard,
    },
    /// Two tables built with different indexing return different attacks
    IndexingDisagreement {
        slider: Slider,
        square: Square,
        occupied: Bitboard,
    },
    /// A king or knight table reaches farther than the piece can move
    NonSliderReach {
        piece_type: PieceType,
        square: Square,
    },
    /// Between masks are not symmetric, or nonzero for unaligned squares
    BetweenMask { from: Square, to: Square },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Error::*;

        match self {
            ParseError => write!(f, "cannot parse FEN string"),
            InvalidSquare(name) => write!(f, "invalid square `{}`", name),
            UnrecognizedPiece(c) => write!(f, "unrecognized piece `{}`", c),
            InvalidKingCount => write!(f, "missing king or multiple kings of the same color"),
            TableSize {
                slider,
                expected,
                found,
            } => write!(
                f,
                "{} table has {} entries, expected {}",
                slider, found, expected
            ),
            MaskMismatch { slider, square } => {
                write!(f, "{} mask for square {} is wrong", slider, square)
            }
            AttackMismatch {
                slider,
                square,
                occupied,
            } => write!(
                f,
                "{} attacks from square {} with occupancy {:#018x} differ from the ray trace",
                slider, square, occupied
            ),
            IndexCollision {
                slider,
                square,
                occupied,
            } => write!(
                f,
                "{} multiplier for square {} collides on occupancy {:#018x}",
                slider, square, occupied
            ),
            GatherOrder {
                slider,
                square,
                occupied,
            } => write!(
                f,
                "{} gather index for square {} is out of order at occupancy {:#018x}",
                slider, square, occupied
            ),
            IndexingDisagreement {
                slider,
                square,
                occupied,
            } => write!(
                f,
                "{} magic and gather lookups disagree on square {} with occupancy {:#018x}",
                slider, square, occupied
            ),
            NonSliderReach { piece_type, square } => write!(
                f,
                "{} attacks from square {} wrap around the board",
                piece_type.to_human(),
                square
            ),
            BetweenMask { from, to } => {
                write!(f, "between mask for squares {} and {} is wrong", from, to)
            }
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
