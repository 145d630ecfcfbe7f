use std::ops::Deref;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, trace};

use super::error::{QRError, QRResult};
use super::metadata::Color;
use crate::builder::QR;

#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord, Hash)]
pub struct MaskPattern(u8);

impl MaskPattern {
    pub fn new(pattern: u8) -> Self {
        debug_assert!(pattern < 8, "Invalid masking pattern");
        Self(pattern)
    }

    pub fn all() -> impl Iterator<Item = MaskPattern> {
        (0..8).map(Self)
    }
}

impl TryFrom<u8> for MaskPattern {
    type Error = QRError;
    fn try_from(pattern: u8) -> QRResult<Self> {
        if pattern < 8 {
            Ok(Self(pattern))
        } else {
            Err(QRError::InvalidMaskingPattern)
        }
    }
}

impl Deref for MaskPattern {
    type Target = u8;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

// Each predicate takes (row, column) and returns true where the module is flipped
mod mask_functions {
    pub fn checkerboard(r: i16, c: i16) -> bool {
        (r + c) & 1 == 0
    }

    pub fn horizontal_lines(r: i16, _: i16) -> bool {
        r & 1 == 0
    }

    pub fn vertical_lines(_: i16, c: i16) -> bool {
        c % 3 == 0
    }

    pub fn diagonal_lines(r: i16, c: i16) -> bool {
        (r + c) % 3 == 0
    }

    pub fn large_checkerboard(r: i16, c: i16) -> bool {
        ((r >> 1) + (c / 3)) & 1 == 0
    }

    pub fn fields(r: i16, c: i16) -> bool {
        let p = r * c;
        (p & 1) + (p % 3) == 0
    }

    pub fn diamonds(r: i16, c: i16) -> bool {
        let p = r * c;
        ((p & 1) + (p % 3)) & 1 == 0
    }

    pub fn meadow(r: i16, c: i16) -> bool {
        (((r + c) & 1) + ((r * c) % 3)) & 1 == 0
    }
}

impl MaskPattern {
    pub fn mask_function(self) -> fn(i16, i16) -> bool {
        debug_assert!(*self < 8, "Invalid pattern");

        match *self {
            0b000 => mask_functions::checkerboard,
            0b001 => mask_functions::horizontal_lines,
            0b010 => mask_functions::vertical_lines,
            0b011 => mask_functions::diagonal_lines,
            0b100 => mask_functions::large_checkerboard,
            0b101 => mask_functions::fields,
            0b110 => mask_functions::diamonds,
            0b111 => mask_functions::meadow,
            _ => unreachable!(),
        }
    }
}

// Mask selection
//------------------------------------------------------------------------------

// Scores every candidate on a copy of the symbol and commits the cheapest one. Keys are
// (penalty, pattern) so equal penalties resolve to the lowest pattern on either code path.
pub fn apply_best_mask(qr: &mut QR) -> MaskPattern {
    let base: &QR = qr;
    let score = |m: MaskPattern| {
        let mut candidate = base.clone();
        candidate.apply_mask(m);
        let pen = compute_total_penalty(&candidate);
        trace!("Mask {} penalty {pen}", *m);
        (pen, m)
    };

    #[cfg(feature = "parallel")]
    let best = (0..8u8).into_par_iter().map(MaskPattern).map(score).min();
    #[cfg(not(feature = "parallel"))]
    let best = MaskPattern::all().map(score).min();

    let (pen, best_mask) = best.unwrap_or((0, MaskPattern(0)));
    debug!("Selected mask {} with penalty {pen}", *best_mask);
    qr.apply_mask(best_mask);
    best_mask
}

// Penalty scoring
//------------------------------------------------------------------------------

pub fn compute_total_penalty(qr: &QR) -> u32 {
    let w = qr.width() as i16;
    let mut pen = 0;
    for i in 0..w {
        let row = |j: i16| *qr.get(i, j);
        let col = |j: i16| *qr.get(j, i);
        pen += compute_adjacent_penalty(w, row) + compute_adjacent_penalty(w, col);
        pen += compute_finder_pattern_penalty(w, row) + compute_finder_pattern_penalty(w, col);
    }
    pen + compute_block_penalty(qr) + compute_balance_penalty(qr)
}

// Each maximal run of 5 or more equal modules costs its length minus 2
fn compute_adjacent_penalty(w: i16, get: impl Fn(i16) -> Color) -> u32 {
    let mut pen = 0;
    let mut last = get(0);
    let mut run = 1;
    for j in 1..w {
        let clr = get(j);
        if clr == last {
            run += 1;
            continue;
        }
        if run >= 5 {
            pen += run - 2;
        }
        last = clr;
        run = 1;
    }
    if run >= 5 {
        pen += run - 2;
    }
    pen
}

fn compute_block_penalty(qr: &QR) -> u32 {
    let mut pen = 0;
    let w = qr.width() as i16;
    for r in 0..w - 1 {
        for c in 0..w - 1 {
            let clr = *qr.get(r, c);
            if clr == *qr.get(r + 1, c) && clr == *qr.get(r, c + 1) && clr == *qr.get(r + 1, c + 1)
            {
                pen += 3;
            }
        }
    }
    pen
}

// 1:1:3:1:1 finder look-alike with 4 light modules on one side
fn compute_finder_pattern_penalty(w: i16, get: impl Fn(i16) -> Color) -> u32 {
    let mut pen = 0;
    for j in 0..=w - FINDER_LIKE_LEN {
        let window = (j..j + FINDER_LIKE_LEN).map(&get);
        if window.clone().eq(FINDER_LIKE_LEAD.iter().copied()) {
            pen += 40;
        }
        if window.eq(FINDER_LIKE_TRAIL.iter().copied()) {
            pen += 40;
        }
    }
    pen
}

// Steps of 5% away from an even split cost 10 each
fn compute_balance_penalty(qr: &QR) -> u32 {
    let dark = qr.count_dark_modules();
    let w = qr.width();
    let total = w * w;
    ((dark * 100).abs_diff(total * 50) / (total * 5) * 10) as u32
}

const FINDER_LIKE_LEN: i16 = 11;

static FINDER_LIKE_LEAD: [Color; 11] = {
    use Color::{Dark as D, Light as L};
    [D, L, D, D, D, L, D, L, L, L, L]
};

static FINDER_LIKE_TRAIL: [Color; 11] = {
    use Color::{Dark as D, Light as L};
    [L, L, L, L, D, L, D, D, D, L, D]
};

#[cfg(test)]
mod mask_tests {
    use test_case::test_case;

    use super::{
        compute_adjacent_penalty, compute_finder_pattern_penalty, mask_functions, MaskPattern,
    };
    use crate::common::error::QRError;
    use crate::common::metadata::Color;

    fn line(bits: &str) -> impl Fn(i16) -> Color + '_ {
        move |j| Color::from(bits.as_bytes()[j as usize] == b'1')
    }

    #[test_case("11111", 3)]
    #[test_case("1111", 0)]
    #[test_case("000000", 4)]
    #[test_case("0000011111", 6)]
    #[test_case("1111101111111", 8)]
    #[test_case("1010101010", 0)]
    fn test_adjacent_penalty(bits: &str, exp: u32) {
        assert_eq!(compute_adjacent_penalty(bits.len() as i16, line(bits)), exp);
    }

    #[test_case("10111010000", 40)]
    #[test_case("00001011101", 40)]
    #[test_case("000010111010000", 80)]
    #[test_case("10111011000", 0)]
    #[test_case("1011101", 0)]
    fn test_finder_pattern_penalty(bits: &str, exp: u32) {
        assert_eq!(compute_finder_pattern_penalty(bits.len() as i16, line(bits)), exp);
    }

    #[test]
    fn test_mask_functions_at_origin() {
        // Every pattern flips (0, 0)
        for m in MaskPattern::all() {
            assert!(m.mask_function()(0, 0), "Mask {}", *m);
        }
    }

    #[test_case(0, 1, 1, true)]
    #[test_case(1, 1, 0, false)]
    #[test_case(2, 4, 3, true)]
    #[test_case(3, 1, 2, true)]
    #[test_case(4, 2, 3, true)]
    #[test_case(5, 2, 3, true)]
    #[test_case(6, 1, 3, false)]
    #[test_case(7, 1, 2, false)]
    fn test_mask_function(pattern: u8, r: i16, c: i16, exp: bool) {
        assert_eq!(MaskPattern::new(pattern).mask_function()(r, c), exp);
    }

    #[test]
    fn test_named_functions() {
        assert!(mask_functions::horizontal_lines(2, 1));
        assert!(!mask_functions::vertical_lines(0, 1));
    }

    #[test]
    fn test_try_from() {
        assert_eq!(MaskPattern::try_from(7), Ok(MaskPattern::new(7)));
        assert_eq!(MaskPattern::try_from(8), Err(QRError::InvalidMaskingPattern));
    }
}
