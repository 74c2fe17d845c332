//! Attack queries against a position.

use crate::attacks::tables;
use crate::bitboard::Bitboard;
use crate::board::PieceBoard;
use crate::types::{Color, PieceType, Square};

/// All pieces of both colors attacking `sq`, with sliders evaluated against
/// `occupied` rather than the board's own occupancy. Callers doing exchange
/// evaluation pass an occupancy with captured pieces removed.
#[inline]
pub fn attackers<B: PieceBoard + ?Sized>(board: &B, sq: Square, occupied: Bitboard) -> Bitboard {
    debug_assert!(sq < 64);
    let t = tables();

    let bishops = board.pieces(PieceType::Bishop) | board.pieces(PieceType::Queen);
    let rooks = board.pieces(PieceType::Rook) | board.pieces(PieceType::Queen);

    (t.pawn_attack_bb(Color::White, sq) & board.color_pieces(Color::Black, PieceType::Pawn))
        | (t.pawn_attack_bb(Color::Black, sq) & board.color_pieces(Color::White, PieceType::Pawn))
        | (t.knight[sq as usize] & board.pieces(PieceType::Knight))
        | (t.king[sq as usize] & board.pieces(PieceType::King))
        | (t.bishop.attacks(sq, occupied) & bishops)
        | (t.rook.attacks(sq, occupied) & rooks)
}

/// Is `sq` attacked by any piece of `color`? Pawns, knights and kings are
/// tried before the slider lookups.
#[inline]
pub fn sq_attacked<B: PieceBoard + ?Sized>(board: &B, sq: Square, color: Color) -> bool {
    debug_assert!(sq < 64);
    let t = tables();

    let own = board.color_bb(color);
    let bishops = own & (board.pieces(PieceType::Bishop) | board.pieces(PieceType::Queen));
    let rooks = own & (board.pieces(PieceType::Rook) | board.pieces(PieceType::Queen));
    let occupied = board.occupied();

    t.pawn_attack_bb(!color, sq) & board.color_pieces(color, PieceType::Pawn) != 0
        || t.knight[sq as usize] & board.color_pieces(color, PieceType::Knight) != 0
        || t.king[sq as usize] & board.color_pieces(color, PieceType::King) != 0
        || t.bishop.attacks(sq, occupied) & bishops != 0
        || t.rook.attacks(sq, occupied) & rooks != 0
}

/// Is `color`'s king in check?
#[inline]
pub fn king_attacked<B: PieceBoard + ?Sized>(board: &B, color: Color) -> bool {
    sq_attacked(board, board.king_square(color), !color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitboard::sq_to_bb;
    use crate::board::Board;
    use crate::types::*;
    use pretty_assertions::assert_eq;

    fn bb(squares: &[Square]) -> Bitboard {
        squares.iter().fold(0, |acc, &sq| acc | sq_to_bb(sq))
    }

    #[test]
    fn test_attackers_starting_position() {
        let board = Board::new();
        // f3 is covered by the g1 knight and the e2 and g2 pawns
        assert_eq!(attackers(&board, F3, board.occupied()), bb(&[E2, G2, G1]));
        // nothing reaches the middle of the board
        assert_eq!(attackers(&board, E4, board.occupied()), 0);
        assert_eq!(attackers(&board, D6, board.occupied()), bb(&[C7, E7]));
    }

    #[test]
    fn test_attackers_hypothetical_occupancy() {
        let board = Board::from_fen("3rk3/8/8/3p4/8/8/3R4/3RK3 w - - 0 1").unwrap();
        let occupied = board.occupied();
        assert_eq!(attackers(&board, D5, occupied), bb(&[D2, D8]));
        assert_eq!(attackers(&board, D4, occupied), bb(&[D2]));

        // with d2 gone the d1 rook x-rays through
        let without_d2 = occupied & !sq_to_bb(D2);
        assert_eq!(attackers(&board, D5, without_d2) & without_d2, bb(&[D1, D8]));

        // the black rook reaches d4 once the pawn on d5 is out of the way
        assert_eq!(attackers(&board, D4, occupied & !sq_to_bb(D5)), bb(&[D2, D8]));
    }

    #[test]
    fn test_sq_attacked_by_pawns() {
        let board = Board::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
        assert!(sq_attacked(&board, D5, Color::White));
        assert!(sq_attacked(&board, F5, Color::White));
        assert!(!sq_attacked(&board, E5, Color::White));
        assert!(sq_attacked(&board, E4, Color::Black));
        assert!(sq_attacked(&board, C4, Color::Black));
        assert!(!sq_attacked(&board, D4, Color::Black));
    }

    #[test]
    fn test_sq_attacked_blocked_slider() {
        let board = Board::from_fen("4k3/8/8/8/8/2N5/8/B3K3 w - - 0 1").unwrap();
        assert!(sq_attacked(&board, B2, Color::White));
        // defended pieces count as attacked
        assert!(sq_attacked(&board, C3, Color::White));
        assert!(sq_attacked(&board, D5, Color::White));
        assert!(!sq_attacked(&board, D4, Color::White));

        let without_c3 = board.occupied() & !sq_to_bb(C3);
        assert_eq!(attackers(&board, D4, without_c3), bb(&[A1]));
    }

    #[test]
    fn test_king_attacked() {
        let quiet = Board::new();
        assert!(!king_attacked(&quiet, Color::White));
        assert!(!king_attacked(&quiet, Color::Black));

        // Scholar's mate
        let mated =
            Board::from_fen("r1bqkb1r/pppp1Qpp/2n2n2/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 4")
                .unwrap();
        assert!(king_attacked(&mated, Color::Black));
        assert!(!king_attacked(&mated, Color::White));

        let knight_check = Board::from_fen("4k3/8/3N4/8/8/8/8/4K3 b - - 0 1").unwrap();
        assert!(king_attacked(&knight_check, Color::Black));
    }

    #[test]
    fn test_trait_object() {
        let board: Box<dyn PieceBoard> = Box::new(Board::new());
        assert!(!king_attacked(board.as_ref(), Color::White));
        assert!(sq_attacked(board.as_ref(), F6, Color::Black));
    }
}
