pub mod types;
pub mod error;
pub mod bitboard;
pub mod magic;
pub mod attacks;
pub mod board;
pub mod query;
pub mod verify;

pub use attacks::{
    attack_bb, between_bb, file_bb, initialize, isolated_mask, passed_mask, pawn_attack_bb,
    rank_bb, tables, AttackTables,
};
pub use bitboard::Bitboard;
pub use board::{Board, PieceBoard};
pub use error::{Error, Result};
pub use query::{attackers, king_attacked, sq_attacked};
pub use types::{Color, PieceType, Square};
