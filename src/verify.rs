//! Exhaustive self-verification of the attack tables.
//!
//! A wrong magic number or mask does not fail loudly; it returns a wrong
//! attack set. These checks walk every occupancy subset of every square and
//! compare against the ray trace, so a table that passes is correct for all
//! positions.

use std::fmt;

use itertools::iproduct;
use rayon::prelude::*;

use crate::attacks::AttackTables;
use crate::bitboard::{distance, file_of, rank_of, BitboardIter};
use crate::error::{Error, Result};
use crate::magic::{slider_attacks_slow, subsets, Indexing, Slider, SliderTable};
use crate::types::{PieceType, Square};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyReport {
    pub indexing: Indexing,
    pub bishop_entries: usize,
    pub rook_entries: usize,
    /// Occupancy subsets traced, both sliders
    pub subsets_checked: usize,
}

impl fmt::Display for VerifyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} indexing: {} bishop + {} rook entries, {} occupancies checked",
            self.indexing.to_human(),
            self.bishop_entries,
            self.rook_entries,
            self.subsets_checked
        )
    }
}

impl AttackTables {
    /// Check every table. Sliders are checked exhaustively, including both
    /// indexing schemes regardless of which one the table was built with.
    pub fn verify(&self) -> Result<VerifyReport> {
        self.verify_non_sliders()?;
        let bishop = verify_slider(&self.bishop)?;
        let rook = verify_slider(&self.rook)?;
        self.verify_between()?;

        Ok(VerifyReport {
            indexing: self.bishop.indexing(),
            bishop_entries: self.bishop.len(),
            rook_entries: self.rook.len(),
            subsets_checked: bishop + rook,
        })
    }

    /// Compare slider lookups against tables built with another indexing.
    /// Returns the number of occupancies compared.
    pub fn compare(&self, other: &AttackTables) -> Result<usize> {
        let mut checked = 0;
        for slider in Slider::ALL {
            let ours = self.slider(slider);
            let theirs = other.slider(slider);
            checked += (0..64u8)
                .into_par_iter()
                .map(|sq| compare_square(ours, theirs, sq))
                .collect::<Result<Vec<usize>>>()?
                .into_iter()
                .sum::<usize>();
        }
        Ok(checked)
    }

    fn verify_non_sliders(&self) -> Result<()> {
        for sq in 0..64u8 {
            for (piece_type, attacks, reach) in [
                (PieceType::King, self.king[sq as usize], 1),
                (PieceType::Knight, self.knight[sq as usize], 2),
            ] {
                if BitboardIter(attacks).any(|to| distance(sq, to) != reach) {
                    return Err(Error::NonSliderReach {
                        piece_type,
                        square: sq,
                    });
                }
            }
            for pawn in self.pawn {
                if BitboardIter(pawn[sq as usize]).any(|to| distance(sq, to) != 1) {
                    return Err(Error::NonSliderReach {
                        piece_type: PieceType::Pawn,
                        square: sq,
                    });
                }
            }
        }
        Ok(())
    }

    fn verify_between(&self) -> Result<()> {
        for (from, to) in iproduct!(0..64u8, 0..64u8) {
            let between = self.between[from as usize][to as usize];
            let files = file_of(from).abs_diff(file_of(to));
            let ranks = rank_of(from).abs_diff(rank_of(to));
            let aligned = files == 0 || ranks == 0 || files == ranks;

            if between != self.between[to as usize][from as usize]
                || (between != 0) != (aligned && distance(from, to) > 1)
            {
                return Err(Error::BetweenMask { from, to });
            }
        }
        Ok(())
    }
}

/// Returns the number of occupancies checked
fn verify_slider(table: &SliderTable) -> Result<usize> {
    let slider = table.slider();
    if table.len() != slider.table_size() {
        return Err(Error::TableSize {
            slider,
            expected: slider.table_size(),
            found: table.len(),
        });
    }

    let mut next_offset = 0;
    for sq in 0..64u8 {
        let entry = table.entry(sq);
        if entry.mask != slider.relevant_mask(sq) {
            return Err(Error::MaskMismatch { slider, square: sq });
        }
        if entry.offset != next_offset {
            return Err(Error::TableSize {
                slider,
                expected: next_offset,
                found: entry.offset,
            });
        }
        next_offset += entry.len();
    }

    Ok((0..64u8)
        .into_par_iter()
        .map(|sq| verify_square(table, sq))
        .collect::<Result<Vec<usize>>>()?
        .into_iter()
        .sum())
}

fn verify_square(table: &SliderTable, sq: Square) -> Result<usize> {
    let slider = table.slider();
    let entry = table.entry(sq);
    // multiply-shift slots seen so far for this square
    let mut seen: Vec<Option<u64>> = vec![None; entry.len()];
    let mut checked = 0;

    for (k, occupied) in subsets(entry.mask).enumerate() {
        let expected = slider_attacks_slow(sq, occupied, slider.steps());

        if table.attacks(sq, occupied) != expected {
            return Err(Error::AttackMismatch {
                slider,
                square: sq,
                occupied,
            });
        }

        if entry.gather_index(occupied) != k {
            return Err(Error::GatherOrder {
                slider,
                square: sq,
                occupied,
            });
        }

        let slot = &mut seen[entry.magic_index(occupied)];
        if slot.is_some_and(|attacks| attacks != expected) {
            return Err(Error::IndexCollision {
                slider,
                square: sq,
                occupied,
            });
        }
        *slot = Some(expected);
        checked += 1;
    }
    Ok(checked)
}

fn compare_square(ours: &SliderTable, theirs: &SliderTable, sq: Square) -> Result<usize> {
    let mut checked = 0;
    for occupied in subsets(ours.entry(sq).mask) {
        if ours.attacks(sq, occupied) != theirs.attacks(sq, occupied) {
            return Err(Error::IndexingDisagreement {
                slider: ours.slider(),
                square: sq,
                occupied,
            });
        }
        checked += 1;
    }
    Ok(checked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitboard::sq_to_bb;
    use crate::types::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_magic_tables_verify() {
        let report = AttackTables::with_indexing(Indexing::Magic).verify().unwrap();
        assert_eq!(report.bishop_entries, 5248);
        assert_eq!(report.rook_entries, 102_400);
        assert_eq!(report.subsets_checked, 5248 + 102_400);
    }

    #[test]
    fn test_gather_tables_verify() {
        let report = AttackTables::with_indexing(Indexing::Gather).verify().unwrap();
        assert_eq!(report.indexing, Indexing::Gather);
        assert_eq!(report.subsets_checked, 5248 + 102_400);
    }

    #[test]
    fn test_indexing_parity() {
        let magic = AttackTables::with_indexing(Indexing::Magic);
        let gather = AttackTables::with_indexing(Indexing::Gather);
        assert_eq!(magic.compare(&gather), Ok(5248 + 102_400));
        assert_eq!(gather.compare(&magic), Ok(5248 + 102_400));
    }

    #[test]
    fn test_global_tables_verify() {
        assert!(crate::attacks::tables().verify().is_ok());
    }

    #[test]
    fn test_corrupt_entry_is_detected() {
        let mut tables = AttackTables::with_indexing(Indexing::Magic);
        let entry = *tables.rook.entry(A1);
        let slot = entry.offset + entry.index(0, Indexing::Magic);
        tables.rook.attacks[slot] ^= sq_to_bb(H8);

        assert_eq!(
            tables.verify(),
            Err(Error::AttackMismatch {
                slider: Slider::Rook,
                square: A1,
                occupied: 0,
            })
        );
    }

    #[test]
    fn test_bad_multiplier_is_detected() {
        let mut tables = AttackTables::with_indexing(Indexing::Gather);
        tables.rook.magics[A1 as usize].magic = 1;

        match tables.verify() {
            Err(Error::IndexCollision { slider, square, .. }) => {
                assert_eq!(slider, Slider::Rook);
                assert_eq!(square, A1);
            }
            other => panic!("expected an index collision, got {:?}", other),
        }
    }

    #[test]
    fn test_truncated_buffer_is_detected() {
        let mut tables = AttackTables::with_indexing(Indexing::Gather);
        tables.bishop.attacks.pop();

        assert_eq!(
            tables.verify(),
            Err(Error::TableSize {
                slider: Slider::Bishop,
                expected: 5248,
                found: 5247,
            })
        );
    }

    #[test]
    fn test_parity_detects_disagreement() {
        let magic = AttackTables::with_indexing(Indexing::Magic);
        let mut gather = AttackTables::with_indexing(Indexing::Gather);
        let entry = *gather.bishop.entry(E4);
        gather.bishop.attacks[entry.offset] = 0;

        match magic.compare(&gather) {
            Err(Error::IndexingDisagreement { slider, square, occupied }) => {
                assert_eq!(slider, Slider::Bishop);
                assert_eq!(square, E4);
                assert_eq!(occupied, 0);
            }
            other => panic!("expected a disagreement, got {:?}", other),
        }
    }

    #[test]
    fn test_report_display() {
        let report = VerifyReport {
            indexing: Indexing::Magic,
            bishop_entries: 5248,
            rook_entries: 102_400,
            subsets_checked: 107_648,
        };
        assert_eq!(
            report.to_string(),
            "multiply-shift indexing: 5248 bishop + 102400 rook entries, 107648 occupancies checked"
        );
    }
}
