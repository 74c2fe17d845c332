//! Magic bitboards for O(1) sliding piece attack lookups.
//!
//! For every square a slider has a relevant occupancy mask: the squares on its
//! rays whose occupancy can change the attack set. Each subset of the mask is
//! mapped to a slot in a per-square range of one shared attack buffer, either
//! by multiplying with a precomputed magic number and keeping the top bits, or
//! by gathering the mask bits into a dense integer (PEXT).

use std::fmt;

use log::debug;

use crate::bitboard::{
    file_of, landing_square, rank_of, sq_to_bb, Bitboard, FILE_A, FILE_BB, FILE_H, RANK_1,
    RANK_8, RANK_BB,
};
use crate::types::Square;

/// Total bishop entries over all squares, sum of 2^popcount(mask)
pub const BISHOP_TABLE_SIZE: usize = 5248;
/// Total rook entries over all squares, sum of 2^popcount(mask)
pub const ROOK_TABLE_SIZE: usize = 102_400;

const BISHOP_STEPS: [i8; 4] = [7, 9, -7, -9];
const ROOK_STEPS: [i8; 4] = [8, 1, -8, -1];

/// Precomputed magic numbers for bishop attacks.
/// These are well-known magic numbers that produce collision-free hashing.
const BISHOP_MAGICS: [u64; 64] = [
    0x0002020202020200, 0x0002020202020000, 0x0004010202000000, 0x0004040080000000,
    0x0001104000000000, 0x0000821040000000, 0x0000410410400000, 0x0000104104104000,
    0x0000040404040400, 0x0000020202020200, 0x0000040102020000, 0x0000040400800000,
    0x0000011040000000, 0x0000008210400000, 0x0000004104104000, 0x0000002082082000,
    0x0004000808080800, 0x0002000404040400, 0x0001000202020200, 0x0000800802004000,
    0x0000800400A00000, 0x0000200100884000, 0x0000400082082000, 0x0000200041041000,
    0x0002080010101000, 0x0001040008080800, 0x0000208004010400, 0x0000404004010200,
    0x0000840000802000, 0x0000404002011000, 0x0000808001041000, 0x0000404000820800,
    0x0001041000202000, 0x0000820800101000, 0x0000104400080800, 0x0000020080080080,
    0x0000404040040100, 0x0000808100020100, 0x0001010100020800, 0x0000808080010400,
    0x0000820820004000, 0x0000410410002000, 0x0000082088001000, 0x0000002011000800,
    0x0000080100400400, 0x0001010101000200, 0x0002020202000400, 0x0001010101000200,
    0x0000410410400000, 0x0000208208200000, 0x0000002084100000, 0x0000000020880000,
    0x0000001002020000, 0x0000040408020000, 0x0004040404040000, 0x0002020202020000,
    0x0000104104104000, 0x0000002082082000, 0x0000000020841000, 0x0000000000208800,
    0x0000000010020200, 0x0000000404080200, 0x0000040404040400, 0x0002020202020200,
];

/// Precomputed magic numbers for rook attacks.
const ROOK_MAGICS: [u64; 64] = [
    0x0080001020400080, 0x0040001000200040, 0x0080081000200080, 0x0080040800100080,
    0x0080020400080080, 0x0080010200040080, 0x0080008001000200, 0x0080002040800100,
    0x0000800020400080, 0x0000400020005000, 0x0000801000200080, 0x0000800800100080,
    0x0000800400080080, 0x0000800200040080, 0x0000800100020080, 0x0000800040800100,
    0x0000208000400080, 0x0000404000201000, 0x0000808010002000, 0x0000808008001000,
    0x0000808004000800, 0x0000808002000400, 0x0000010100020004, 0x0000020000408104,
    0x0000208080004000, 0x0000200040005000, 0x0000100080200080, 0x0000080080100080,
    0x0000040080080080, 0x0000020080040080, 0x0000010080800200, 0x0000800080004100,
    0x0000204000800080, 0x0000200040401000, 0x0000100080802000, 0x0000080080801000,
    0x0000040080800800, 0x0000020080800400, 0x0000020001010004, 0x0000800040800100,
    0x0000204000808000, 0x0000200040008080, 0x0000100020008080, 0x0000080010008080,
    0x0000040008008080, 0x0000020004008080, 0x0000010002008080, 0x0000004081020004,
    0x0000204000800080, 0x0000200040008080, 0x0000100020008080, 0x0000080010008080,
    0x0000040008008080, 0x0000020004008080, 0x0000800100020080, 0x0000800041000080,
    0x00FFFCDDFCED714A, 0x007FFCDDFCED714A, 0x003FFFCDFFD88096, 0x0000040810002101,
    0x0001000204080011, 0x0001000204000801, 0x0001000082000401, 0x0001FFFAABFAD1A2,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slider {
    Bishop,
    Rook,
}

impl Slider {
    pub const ALL: [Slider; 2] = [Slider::Bishop, Slider::Rook];

    #[inline(always)]
    pub fn steps(self) -> &'static [i8; 4] {
        match self {
            Slider::Bishop => &BISHOP_STEPS,
            Slider::Rook => &ROOK_STEPS,
        }
    }

    pub fn magics(self) -> &'static [u64; 64] {
        match self {
            Slider::Bishop => &BISHOP_MAGICS,
            Slider::Rook => &ROOK_MAGICS,
        }
    }

    pub fn table_size(self) -> usize {
        match self {
            Slider::Bishop => BISHOP_TABLE_SIZE,
            Slider::Rook => ROOK_TABLE_SIZE,
        }
    }

    /// Squares whose occupancy can change the attack set from `sq`.
    /// A blocker on the last square of a ray blocks nothing, so board edges
    /// are dropped unless the square itself sits on that edge's rank or file.
    pub fn relevant_mask(self, sq: Square) -> Bitboard {
        let edges = ((RANK_1 | RANK_8) & !RANK_BB[rank_of(sq) as usize])
            | ((FILE_A | FILE_H) & !FILE_BB[file_of(sq) as usize]);
        slider_attacks_slow(sq, 0, self.steps()) & !edges
    }

    pub fn to_human(&self) -> &str {
        match self {
            Slider::Bishop => "bishop",
            Slider::Rook => "rook",
        }
    }
}

impl fmt::Display for Slider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_human())
    }
}

/// How an occupancy is turned into a slot of a square's attack range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indexing {
    /// `((occupied & mask) * magic) >> shift`
    Magic,
    /// PEXT of the occupancy over the mask
    Gather,
}

impl Indexing {
    /// Indexing compiled in as the default for this target
    #[cfg(all(target_arch = "x86_64", target_feature = "bmi2"))]
    pub const NATIVE: Indexing = Indexing::Gather;
    #[cfg(not(all(target_arch = "x86_64", target_feature = "bmi2")))]
    pub const NATIVE: Indexing = Indexing::Magic;

    pub fn to_human(&self) -> &str {
        match self {
            Indexing::Magic => "multiply-shift",
            Indexing::Gather => "bit-gather",
        }
    }
}

/// Hardware bit-gather
#[cfg(all(target_arch = "x86_64", target_feature = "bmi2"))]
#[inline(always)]
pub fn pext(src: u64, mask: u64) -> u64 {
    // SAFETY: this build targets a CPU with BMI2.
    unsafe { std::arch::x86_64::_pext_u64(src, mask) }
}

/// Bit-gather without BMI2
#[cfg(not(all(target_arch = "x86_64", target_feature = "bmi2")))]
#[inline(always)]
pub fn pext(src: u64, mask: u64) -> u64 {
    pext_soft(src, mask)
}

/// Portable bit-gather: the bits of `src` selected by `mask`, packed into the
/// low bits of the result in mask order.
#[inline]
pub fn pext_soft(src: u64, mask: u64) -> u64 {
    let mut result = 0u64;
    let mut bit = 1u64;
    let mut remaining = mask;
    while remaining != 0 {
        let lowest = remaining & remaining.wrapping_neg();
        if src & lowest != 0 {
            result |= bit;
        }
        bit <<= 1;
        remaining &= remaining - 1;
    }
    result
}

/// Generate all subsets of a mask using Carry-Rippler technique
pub fn subsets(mask: Bitboard) -> impl Iterator<Item = Bitboard> {
    let mut subset = 0u64;
    let mut done = false;
    std::iter::from_fn(move || {
        if done {
            return None;
        }
        let current = subset;
        // Carry-Rippler: next subset
        subset = subset.wrapping_sub(mask) & mask;
        if subset == 0 {
            done = true;
        }
        Some(current)
    })
}

/// Ray-traced slider attacks: each ray stops at and includes the first
/// occupied square.
pub fn slider_attacks_slow(sq: Square, occupied: Bitboard, steps: &[i8; 4]) -> Bitboard {
    let mut attacks = 0u64;

    for &step in steps {
        let mut s = sq;
        while let Some(to) = landing_square(s, step) {
            attacks |= sq_to_bb(to);
            if occupied & sq_to_bb(to) != 0 {
                break;
            }
            s = to;
        }
    }
    attacks
}

/// Per-square lookup parameters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Magic {
    /// Relevant occupancy
    pub mask: Bitboard,
    pub magic: u64,
    /// 64 - popcount(mask)
    pub shift: u32,
    /// Start of this square's range in the shared buffer
    pub offset: usize,
}

impl Magic {
    /// Number of slots owned by the square
    #[inline(always)]
    pub fn len(&self) -> usize {
        1 << self.mask.count_ones()
    }

    #[inline(always)]
    pub fn magic_index(&self, occupied: Bitboard) -> usize {
        ((occupied & self.mask).wrapping_mul(self.magic) >> self.shift) as usize
    }

    #[inline(always)]
    pub fn gather_index(&self, occupied: Bitboard) -> usize {
        pext(occupied, self.mask) as usize
    }

    #[inline(always)]
    pub fn index(&self, occupied: Bitboard, indexing: Indexing) -> usize {
        match indexing {
            Indexing::Magic => self.magic_index(occupied),
            Indexing::Gather => self.gather_index(occupied),
        }
    }
}

/// Attack lookup table for one slider, all 64 squares sharing one buffer
pub struct SliderTable {
    pub(crate) slider: Slider,
    pub(crate) indexing: Indexing,
    pub(crate) magics: [Magic; 64],
    pub(crate) attacks: Vec<Bitboard>,
}

impl SliderTable {
    pub fn new(slider: Slider, indexing: Indexing) -> Self {
        let mut magics = [Magic::default(); 64];
        let mut attacks = Vec::with_capacity(slider.table_size());

        for sq in 0..64u8 {
            let mask = slider.relevant_mask(sq);
            let entry = Magic {
                mask,
                magic: slider.magics()[sq as usize],
                shift: 64 - mask.count_ones(),
                offset: attacks.len(),
            };
            attacks.resize(entry.offset + entry.len(), 0);

            for occupied in subsets(mask) {
                attacks[entry.offset + entry.index(occupied, indexing)] =
                    slider_attacks_slow(sq, occupied, slider.steps());
            }
            magics[sq as usize] = entry;
        }
        debug_assert_eq!(attacks.len(), slider.table_size());

        debug!(
            "built {} table: {} entries, {} indexing",
            slider,
            attacks.len(),
            indexing.to_human()
        );

        SliderTable {
            slider,
            indexing,
            magics,
            attacks,
        }
    }

    /// Attacks from `sq` given the occupied squares. Occupancy outside the
    /// square's mask is ignored.
    #[inline(always)]
    pub fn attacks(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        let entry = &self.magics[sq as usize];
        self.attacks[entry.offset + entry.index(occupied, self.indexing)]
    }

    #[inline(always)]
    pub fn entry(&self, sq: Square) -> &Magic {
        &self.magics[sq as usize]
    }

    /// The slice of the shared buffer owned by `sq`
    pub fn square_attacks(&self, sq: Square) -> &[Bitboard] {
        let entry = self.entry(sq);
        &self.attacks[entry.offset..entry.offset + entry.len()]
    }

    pub fn slider(&self) -> Slider {
        self.slider
    }

    pub fn indexing(&self) -> Indexing {
        self.indexing
    }

    /// Total entries in the shared buffer
    pub fn len(&self) -> usize {
        self.attacks.len()
    }
}
