//! Precomputed attack tables and the pawn-structure masks derived from them.
//!
//! Everything is built once by [`initialize`] and lives for the rest of the
//! process. The free functions in this module read the global tables and are
//! safe to call from any number of threads.

use std::sync::OnceLock;
use std::time::Instant;

use itertools::iproduct;
use log::{debug, info};

use crate::bitboard::{
    adjacent_files_bb, file_of, landing_square, rank_of, relative_rank, sq_to_bb, Bitboard,
    FILE_BB, RANK_1, RANK_8, RANK_BB,
};
use crate::magic::{Indexing, Slider, SliderTable};
use crate::types::{Color, PieceType, Square};

const KING_STEPS: [i8; 8] = [-9, -8, -7, -1, 1, 7, 8, 9];
const KNIGHT_STEPS: [i8; 8] = [-17, -15, -10, -6, 6, 10, 15, 17];
/// Capture steps, indexed by color
const PAWN_STEPS: [[i8; 2]; 2] = [[7, 9], [-9, -7]];

/// Precomputed attack tables
pub struct AttackTables {
    /// Knight attacks for each square
    pub knight: [Bitboard; 64],
    /// King attacks for each square
    pub king: [Bitboard; 64],
    /// Pawn attacks for each color and square: pawn[color as usize][square]
    pub pawn: [[Bitboard; 64]; 2],
    pub bishop: SliderTable,
    pub rook: SliderTable,
    /// Squares strictly between two aligned squares: between[from][to]
    pub between: Vec<[Bitboard; 64]>,
    /// Squares a pawn must pass on its way to promotion: passed[color][square]
    pub passed: [[Bitboard; 64]; 2],
    pub isolated: [Bitboard; 64],
}

impl AttackTables {
    /// Build every table using the indexing compiled in for this target
    pub fn new() -> Self {
        Self::with_indexing(Indexing::NATIVE)
    }

    pub fn with_indexing(indexing: Indexing) -> Self {
        let mut knight = [0u64; 64];
        let mut king = [0u64; 64];
        let mut pawn = [[0u64; 64]; 2];

        for sq in 0..64u8 {
            for i in 0..8 {
                king[sq as usize] |= step_bb(sq, KING_STEPS[i]);
                knight[sq as usize] |= step_bb(sq, KNIGHT_STEPS[i]);
            }
            for color in Color::ALL {
                for step in PAWN_STEPS[color.index()] {
                    pawn[color.index()][sq as usize] |= step_bb(sq, step);
                }
            }
        }
        debug!("built king, knight and pawn attacks");

        let mut tables = AttackTables {
            knight,
            king,
            pawn,
            bishop: SliderTable::new(Slider::Bishop, indexing),
            rook: SliderTable::new(Slider::Rook, indexing),
            between: vec![[0u64; 64]; 64],
            passed: [[0u64; 64]; 2],
            isolated: [0u64; 64],
        };
        tables.init_between();
        tables.init_pawn_masks();
        tables
    }

    /// Needs the slider tables
    fn init_between(&mut self) {
        for (from, to) in iproduct!(0..64u8, 0..64u8) {
            for slider in Slider::ALL {
                let table = self.slider(slider);
                let ray = table.attacks(from, sq_to_bb(to));
                if ray & sq_to_bb(to) != 0 {
                    let between = ray & table.attacks(to, sq_to_bb(from));
                    self.between[from as usize][to as usize] = between;
                }
            }
        }
        debug!("built between masks");
    }

    fn init_pawn_masks(&mut self) {
        for sq in 0..64u8 {
            let files = FILE_BB[file_of(sq) as usize] | adjacent_files_bb(sq);

            self.isolated[sq as usize] = adjacent_files_bb(sq);
            self.passed[Color::White.index()][sq as usize] =
                (!RANK_1 << (8 * relative_rank(Color::White, rank_of(sq)))) & files;
            self.passed[Color::Black.index()][sq as usize] =
                (!RANK_8 >> (8 * relative_rank(Color::Black, rank_of(sq)))) & files;
        }
        debug!("built passed and isolated pawn masks");
    }

    #[inline(always)]
    pub fn slider(&self, slider: Slider) -> &SliderTable {
        match slider {
            Slider::Bishop => &self.bishop,
            Slider::Rook => &self.rook,
        }
    }

    /// Attacks of a piece on `sq` given the occupied squares. Kings and
    /// knights ignore the occupancy. Pawns depend on their color and must go
    /// through [`AttackTables::pawn_attack_bb`].
    #[inline(always)]
    pub fn attack_bb(&self, piece_type: PieceType, sq: Square, occupied: Bitboard) -> Bitboard {
        debug_assert!(sq < 64);
        match piece_type {
            PieceType::Knight => self.knight[sq as usize],
            PieceType::King => self.king[sq as usize],
            PieceType::Bishop => self.bishop.attacks(sq, occupied),
            PieceType::Rook => self.rook.attacks(sq, occupied),
            PieceType::Queen => self.bishop.attacks(sq, occupied) | self.rook.attacks(sq, occupied),
            PieceType::Pawn => {
                debug_assert!(false, "pawn attacks need a color");
                0
            }
        }
    }

    #[inline(always)]
    pub fn pawn_attack_bb(&self, color: Color, sq: Square) -> Bitboard {
        self.pawn[color.index()][sq as usize]
    }
}

impl Default for AttackTables {
    fn default() -> Self {
        AttackTables::new()
    }
}

/// Landing square of a single step as a bitboard, empty if it leaves the board
#[inline]
fn step_bb(sq: Square, step: i8) -> Bitboard {
    landing_square(sq, step).map_or(0, sq_to_bb)
}

/// Global attack tables, built on first use
static TABLES: OnceLock<AttackTables> = OnceLock::new();

/// Build the global tables. Call once during startup, before spawning search
/// threads; later calls return the same tables. Debug builds check every
/// slider entry against a ray trace and panic on a defect.
pub fn initialize() -> &'static AttackTables {
    TABLES.get_or_init(|| {
        let start = Instant::now();
        let tables = AttackTables::new();

        if cfg!(debug_assertions) {
            if let Err(e) = tables.verify() {
                panic!("attack tables failed self-verification: {}", e);
            }
        }

        info!(
            "attack tables ready in {:.3}s ({} bishop + {} rook entries, {} indexing)",
            start.elapsed().as_secs_f64(),
            tables.bishop.len(),
            tables.rook.len(),
            Indexing::NATIVE.to_human()
        );
        tables
    })
}

/// Get the global attack tables, initializing if needed
#[inline(always)]
pub fn tables() -> &'static AttackTables {
    initialize()
}

#[inline(always)]
pub fn attack_bb(piece_type: PieceType, sq: Square, occupied: Bitboard) -> Bitboard {
    tables().attack_bb(piece_type, sq, occupied)
}

#[inline(always)]
pub fn pawn_attack_bb(color: Color, sq: Square) -> Bitboard {
    tables().pawn_attack_bb(color, sq)
}

#[inline(always)]
pub fn between_bb(from: Square, to: Square) -> Bitboard {
    tables().between[from as usize][to as usize]
}

#[inline(always)]
pub fn passed_mask(color: Color, sq: Square) -> Bitboard {
    tables().passed[color.index()][sq as usize]
}

#[inline(always)]
pub fn isolated_mask(sq: Square) -> Bitboard {
    tables().isolated[sq as usize]
}

#[inline(always)]
pub fn file_bb(file: u8) -> Bitboard {
    FILE_BB[file as usize]
}

#[inline(always)]
pub fn rank_bb(rank: u8) -> Bitboard {
    RANK_BB[rank as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitboard::{distance, BitboardIter, FILE_A};
    use crate::magic::slider_attacks_slow;
    use crate::types::*;
    use pretty_assertions::assert_eq;

    fn bb(squares: &[Square]) -> Bitboard {
        squares.iter().fold(0, |acc, &sq| acc | sq_to_bb(sq))
    }

    #[test]
    fn test_knight_attacks() {
        // Knight on e4 should attack d2, f2, c3, g3, c5, g5, d6, f6
        let attacks = attack_bb(PieceType::Knight, E4, 0);
        assert_eq!(attacks, bb(&[D2, F2, C3, G3, C5, G5, D6, F6]));
    }

    #[test]
    fn test_knight_corner() {
        // Knight on a1 should only attack b3 and c2
        assert_eq!(attack_bb(PieceType::Knight, A1, 0), bb(&[C2, B3]));
        assert_eq!(attack_bb(PieceType::Knight, H8, 0), bb(&[G6, F7]));
    }

    #[test]
    fn test_king_attacks() {
        assert_eq!(attack_bb(PieceType::King, E4, 0).count_ones(), 8);
        assert_eq!(attack_bb(PieceType::King, A1, 0), bb(&[B1, A2, B2]));
        assert_eq!(attack_bb(PieceType::King, H4, 0), bb(&[G3, H3, G4, G5, H5]));
    }

    #[test]
    fn test_non_sliders_ignore_occupancy() {
        assert_eq!(attack_bb(PieceType::King, D5, !0), attack_bb(PieceType::King, D5, 0));
        assert_eq!(attack_bb(PieceType::Knight, D5, !0), attack_bb(PieceType::Knight, D5, 0));
    }

    #[test]
    fn test_non_sliders_do_not_wrap() {
        let t = tables();
        for sq in 0..64u8 {
            assert!(BitboardIter(t.king[sq as usize]).all(|to| distance(sq, to) == 1));
            assert!(BitboardIter(t.knight[sq as usize]).all(|to| distance(sq, to) == 2));
            for color in Color::ALL {
                assert!(BitboardIter(t.pawn_attack_bb(color, sq)).all(|to| distance(sq, to) == 1));
            }
        }
    }

    #[test]
    fn test_pawn_attacks() {
        assert_eq!(pawn_attack_bb(Color::White, E4), bb(&[D5, F5]));
        assert_eq!(pawn_attack_bb(Color::Black, E5), bb(&[D4, F4]));
        assert_eq!(pawn_attack_bb(Color::White, A2), bb(&[B3]));
        assert_eq!(pawn_attack_bb(Color::Black, H7), bb(&[G6]));
        assert_eq!(pawn_attack_bb(Color::White, C8), 0);
        assert_eq!(pawn_attack_bb(Color::Black, C1), 0);
    }

    #[test]
    fn test_rook_on_a1() {
        let rook = sq_to_bb(A1);
        assert_eq!(attack_bb(PieceType::Rook, A1, rook), (FILE_A | RANK_1) & !rook);

        let occupied = rook | sq_to_bb(A4);
        assert_eq!(
            attack_bb(PieceType::Rook, A1, occupied),
            bb(&[A2, A3, A4]) | (RANK_1 & !rook)
        );
    }

    #[test]
    fn test_rook_attacks_empty_board() {
        // Should attack 14 squares (7 on rank, 7 on file)
        assert_eq!(attack_bb(PieceType::Rook, E4, 0).count_ones(), 14);
    }

    #[test]
    fn test_bishop_attacks_with_blockers() {
        // Bishop on e4, with pieces on c2 and g6
        let attacks = attack_bb(PieceType::Bishop, E4, bb(&[C2, G6]));

        assert_eq!(attacks, bb(&[D3, C2, F5, G6, F3, G2, H1, D5, C6, B7, A8]));
        assert_eq!(attack_bb(PieceType::Bishop, E4, 0).count_ones(), 13);
    }

    #[test]
    fn test_queen_attacks() {
        assert_eq!(attack_bb(PieceType::Queen, E4, 0).count_ones(), 27);
        let occupied = bb(&[E6, C2, B4]);
        assert_eq!(
            attack_bb(PieceType::Queen, E4, occupied),
            attack_bb(PieceType::Bishop, E4, occupied) | attack_bb(PieceType::Rook, E4, occupied)
        );
    }

    #[test]
    fn test_sliders_match_ray_trace_on_sample_boards() {
        let boards = [0, bb(&[E2, E6, C2, G6]), bb(&[B2, G7, D4, D5, E4, E5]), !0];
        for sq in 0..64u8 {
            for &occupied in &boards {
                for slider in Slider::ALL {
                    assert_eq!(
                        tables().slider(slider).attacks(sq, occupied),
                        slider_attacks_slow(sq, occupied, slider.steps()),
                        "{} on {} with {:#x}",
                        slider,
                        sq,
                        occupied
                    );
                }
            }
        }
    }

    #[test]
    fn test_between() {
        assert_eq!(between_bb(A1, H8), bb(&[B2, C3, D4, E5, F6, G7]));
        assert_eq!(between_bb(E1, E4), bb(&[E2, E3]));
        assert_eq!(between_bb(H3, C3), bb(&[D3, E3, F3, G3]));
        assert_eq!(between_bb(A1, C2), 0);
        assert_eq!(between_bb(D4, D5), 0);
        assert_eq!(between_bb(D4, D4), 0);
    }

    #[test]
    fn test_between_symmetric_and_aligned() {
        for (a, b) in iproduct!(0..64u8, 0..64u8) {
            let df = file_of(a).abs_diff(file_of(b));
            let dr = rank_of(a).abs_diff(rank_of(b));
            let aligned = df == 0 || dr == 0 || df == dr;

            assert_eq!(between_bb(a, b), between_bb(b, a));
            assert_eq!(between_bb(a, b) != 0, aligned && distance(a, b) > 1);
            if aligned && a != b {
                assert_eq!(between_bb(a, b).count_ones(), distance(a, b) as u32 - 1);
            }
        }
    }

    #[test]
    fn test_passed_mask() {
        let files = FILE_BB[3] | FILE_BB[4] | FILE_BB[5];
        let ahead = RANK_BB[4] | RANK_BB[5] | RANK_BB[6] | RANK_BB[7];
        assert_eq!(passed_mask(Color::White, E4), files & ahead);

        let behind = RANK_BB[0] | RANK_BB[1] | RANK_BB[2];
        assert_eq!(passed_mask(Color::Black, E4), files & behind);

        assert_eq!(passed_mask(Color::White, A7), (FILE_BB[0] | FILE_BB[1]) & RANK_8);
        assert_eq!(passed_mask(Color::White, H8), 0);
        assert_eq!(passed_mask(Color::Black, C1), 0);
    }

    #[test]
    fn test_isolated_mask() {
        assert_eq!(isolated_mask(A5), file_bb(1));
        assert_eq!(isolated_mask(E2), file_bb(3) | file_bb(5));
        assert_eq!(isolated_mask(H7), file_bb(6));
        assert_eq!(rank_bb(0), RANK_1);
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let first = initialize() as *const AttackTables;
        let second = initialize() as *const AttackTables;
        assert_eq!(first, second);
    }

    #[test]
    fn test_concurrent_initialize() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| initialize() as *const AttackTables as usize))
            .collect();
        let addresses: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(addresses.windows(2).all(|w| w[0] == w[1]));
    }
}
