//! What the attack queries need to know about a position.
//!
//! Engines keep their own board representation; anything that can hand out
//! per-piece bitboards implements [`PieceBoard`]. [`Board`] is a minimal
//! implementation built from the placement field of a FEN string.

use crate::bitboard::{make_square, sq_to_bb, Bitboard, RANK_2, RANK_7};
use crate::error::{Error, Result};
use crate::types::{Color, PieceType, Square};

pub const STARTING_POSITION_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Read-only view of a position's piece bitboards
pub trait PieceBoard {
    /// Pieces of one type and color
    fn color_pieces(&self, color: Color, piece_type: PieceType) -> Bitboard;

    /// All pieces of one color
    fn color_bb(&self, color: Color) -> Bitboard;

    /// Square of `color`'s king. Only meaningful when that king is on the board.
    fn king_square(&self, color: Color) -> Square;

    /// Pieces of one type, both colors
    #[inline(always)]
    fn pieces(&self, piece_type: PieceType) -> Bitboard {
        self.color_pieces(Color::White, piece_type) | self.color_pieces(Color::Black, piece_type)
    }

    #[inline(always)]
    fn occupied(&self) -> Bitboard {
        self.color_bb(Color::White) | self.color_bb(Color::Black)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// pieces[color][piece_type]
    pieces: [[Bitboard; 6]; 2],
    colors: [Bitboard; 2],
    side_to_move: Color,
}

impl Board {
    pub fn empty() -> Board {
        Board {
            pieces: [[0; 6]; 2],
            colors: [0; 2],
            side_to_move: Color::White,
        }
    }

    pub fn new() -> Board {
        let mut board = Board::empty();
        let white = [
            (PieceType::Pawn, RANK_2),
            (PieceType::Rook, 0x81),
            (PieceType::Knight, 0x42),
            (PieceType::Bishop, 0x24),
            (PieceType::Queen, 0x08),
            (PieceType::King, 0x10),
        ];
        for (piece_type, bb) in white {
            let black = if piece_type == PieceType::Pawn {
                RANK_7
            } else {
                bb << 56
            };
            board.pieces[Color::White.index()][piece_type.index()] = bb;
            board.pieces[Color::Black.index()][piece_type.index()] = black;
            board.colors[Color::White.index()] |= bb;
            board.colors[Color::Black.index()] |= black;
        }
        board
    }

    /// Parse the placement and side-to-move fields of a FEN string. The
    /// remaining fields carry nothing the attack queries use and are ignored.
    pub fn from_fen(fen: &str) -> Result<Board> {
        let mut fields = fen.split_whitespace();
        let placement = fields.next().ok_or(Error::ParseError)?;

        let rows: Vec<&str> = placement.split('/').collect();
        if rows.len() != 8 {
            return Err(Error::ParseError);
        }

        let mut board = Board::empty();
        for (i, row) in rows.iter().enumerate() {
            let rank = 7 - i as u8;
            let mut file = 0u8;
            for c in row.chars() {
                if let Some(skip) = c.to_digit(10) {
                    if !(1..=8).contains(&skip) {
                        return Err(Error::ParseError);
                    }
                    file += skip as u8;
                } else {
                    let piece_type = PieceType::from_char(c)?;
                    if file >= 8 {
                        return Err(Error::ParseError);
                    }
                    board.put(Color::from_case(c), piece_type, make_square(file, rank));
                    file += 1;
                }
                if file > 8 {
                    return Err(Error::ParseError);
                }
            }
            if file != 8 {
                return Err(Error::ParseError);
            }
        }

        if let Some(side) = fields.next() {
            let mut chars = side.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => board.side_to_move = Color::from_char(c)?,
                _ => return Err(Error::ParseError),
            }
        }

        for color in Color::ALL {
            if board.color_pieces(color, PieceType::King).count_ones() != 1 {
                return Err(Error::InvalidKingCount);
            }
        }
        Ok(board)
    }

    /// Place a piece on an empty square
    pub fn put(&mut self, color: Color, piece_type: PieceType, sq: Square) {
        debug_assert!(self.occupied() & sq_to_bb(sq) == 0);
        self.pieces[color.index()][piece_type.index()] |= sq_to_bb(sq);
        self.colors[color.index()] |= sq_to_bb(sq);
    }

    pub fn piece_at(&self, sq: Square) -> Option<(Color, PieceType)> {
        let bb = sq_to_bb(sq);
        let color = Color::ALL
            .into_iter()
            .find(|&color| self.colors[color.index()] & bb != 0)?;
        PieceType::ALL
            .into_iter()
            .find(|&piece_type| self.pieces[color.index()][piece_type.index()] & bb != 0)
            .map(|piece_type| (color, piece_type))
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}

impl PieceBoard for Board {
    #[inline(always)]
    fn color_pieces(&self, color: Color, piece_type: PieceType) -> Bitboard {
        self.pieces[color.index()][piece_type.index()]
    }

    #[inline(always)]
    fn color_bb(&self, color: Color) -> Bitboard {
        self.colors[color.index()]
    }

    #[inline(always)]
    fn king_square(&self, color: Color) -> Square {
        let kings = self.color_pieces(color, PieceType::King);
        debug_assert!(kings != 0, "no {} king on the board", color.to_human());
        kings.trailing_zeros() as Square
    }
}
