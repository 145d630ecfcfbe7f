use std::fmt::{Display, Formatter};
use std::ops::{Deref, Not};

use super::error::{QRError, QRResult};
use super::mask::MaskPattern;

// Metadata
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metadata {
    ver: Version,
    ecl: ECLevel,
    mask: Option<MaskPattern>,
}

impl Metadata {
    pub fn new(ver: Version, ecl: ECLevel, mask: Option<MaskPattern>) -> Self {
        Self { ver, ecl, mask }
    }

    pub fn version(&self) -> Version {
        self.ver
    }

    pub fn ec_level(&self) -> ECLevel {
        self.ecl
    }

    pub fn mask(&self) -> Option<MaskPattern> {
        self.mask
    }
}

impl Display for Metadata {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.mask {
            Some(m) => {
                write!(f, "{{ Version: {}, Ec level: {:?}, Mask: {} }}", self.ver, self.ecl, *m)
            }
            None => write!(f, "{{ Version: {}, Ec level: {:?}, Mask: None }}", self.ver, self.ecl),
        }
    }
}

// Version
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord, Hash)]
pub struct Version(usize);

impl Deref for Version {
    type Target = usize;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Version {
    pub const MIN: Version = Version(1);
    pub const MAX: Version = Version(10);

    pub fn new(ver: usize) -> QRResult<Self> {
        if (*Self::MIN..=*Self::MAX).contains(&ver) {
            Ok(Self(ver))
        } else {
            Err(QRError::InvalidVersion)
        }
    }

    pub fn all() -> impl Iterator<Item = Version> {
        (*Self::MIN..=*Self::MAX).map(Version)
    }

    pub fn from_grid_size(size: usize) -> Option<Self> {
        if size < 21 || (size - 17) % 4 != 0 {
            return None;
        }
        Self::new((size - 17) / 4).ok()
    }

    pub const fn width(self) -> usize {
        self.0 * 4 + 17
    }

    pub fn alignment_pattern(self) -> &'static [i16] {
        ALIGNMENT_PATTERN_POSITIONS[self.0 - 1]
    }

    pub fn total_codewords(self) -> usize {
        TOTAL_CODEWORDS[self.0 - 1]
    }

    pub fn ecc_per_block(self, ecl: ECLevel) -> usize {
        EC_BLOCK_TABLE[self.0 - 1][ecl as usize].0
    }

    // (block1_size, block1_count, block2_size, block2_count)
    pub fn data_codewords_per_block(self, ecl: ECLevel) -> (usize, usize, usize, usize) {
        let (_, b1s, b1c, b2s, b2c) = EC_BLOCK_TABLE[self.0 - 1][ecl as usize];
        (b1s, b1c, b2s, b2c)
    }

    pub fn block_count(self, ecl: ECLevel) -> usize {
        let (_, b1c, _, b2c) = self.data_codewords_per_block(ecl);
        b1c + b2c
    }

    pub fn data_codewords(self, ecl: ECLevel) -> usize {
        let (b1s, b1c, b2s, b2c) = self.data_codewords_per_block(ecl);
        b1s * b1c + b2s * b2c
    }

    pub fn data_bit_capacity(self, ecl: ECLevel) -> usize {
        self.data_codewords(ecl) << 3
    }

    pub fn mode_bits(self) -> usize {
        4
    }

    // Length field of byte mode
    pub fn char_cnt_bits(self) -> usize {
        match self.0 {
            1..=9 => 8,
            _ => 16,
        }
    }

    // Max payload bytes after byte mode header overhead
    pub fn byte_capacity(self, ecl: ECLevel) -> usize {
        (self.data_bit_capacity(ecl) - self.mode_bits() - self.char_cnt_bits()) >> 3
    }

    pub fn remainder_bits(self) -> usize {
        match self.0 {
            2..=6 => 7,
            _ => 0,
        }
    }

    pub fn info(self) -> u32 {
        debug_assert!(self.0 >= 7, "Version info only exists from version 7: Version {}", self.0);
        version_info(self.0 as u32)
    }
}


// Error correction level
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord, Hash, Default)]
pub enum ECLevel {
    #[default]
    L = 0,
    M = 1,
    Q = 2,
    H = 3,
}

impl ECLevel {
    // Two bit indicator used in format info
    pub const fn format_bits(self) -> u32 {
        match self {
            Self::L => 0b01,
            Self::M => 0b00,
            Self::Q => 0b11,
            Self::H => 0b10,
        }
    }

    pub const fn from_format_bits(bits: u32) -> Self {
        match bits & 0b11 {
            0b01 => Self::L,
            0b00 => Self::M,
            0b11 => Self::Q,
            _ => Self::H,
        }
    }
}

// Color
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Color {
    Light,
    Dark,
}

impl Not for Color {
    type Output = Self;
    fn not(self) -> Self::Output {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl From<bool> for Color {
    fn from(dark: bool) -> Self {
        if dark {
            Self::Dark
        } else {
            Self::Light
        }
    }
}

impl From<Color> for u32 {
    fn from(clr: Color) -> Self {
        (clr == Color::Dark) as u32
    }
}

impl Color {
    pub fn select<T>(self, dark: T, light: T) -> T {
        match self {
            Self::Dark => dark,
            Self::Light => light,
        }
    }
}

// Format info
//------------------------------------------------------------------------------

pub static FORMAT_INFO_BIT_LEN: usize = 15;

pub const FORMAT_MASK: u32 = 0x5412;

pub static FORMAT_ERROR_CAPACITY: u32 = 3;

const FORMAT_GENERATOR: u32 = 0x537;

// BCH(15,5) codeword of ec level & mask, xored with the format mask
pub const fn format_info(data: u32) -> u32 {
    let mut rem = data;
    let mut i = 0;
    while i < 10 {
        rem = (rem << 1) ^ ((rem >> 9) * FORMAT_GENERATOR);
        i += 1;
    }
    ((data << 10) | (rem & 0x3FF)) ^ FORMAT_MASK
}

pub fn generate_format_info_qr(ecl: ECLevel, mask: MaskPattern) -> u32 {
    format_info((ecl.format_bits() << 3) | *mask as u32)
}

pub fn parse_format_info_qr(info: u32) -> (ECLevel, MaskPattern) {
    let data = (info ^ FORMAT_MASK) >> 10;
    (ECLevel::from_format_bits(data >> 3), MaskPattern::new((data & 0b111) as u8))
}

// Every valid format codeword as it appears in the symbol, indexed by its 5 bit data
pub static FORMAT_INFOS_QR: [u32; 32] = {
    let mut infos = [0; 32];
    let mut i = 0;
    while i < 32 {
        infos[i] = format_info(i as u32);
        i += 1;
    }
    infos
};

// Coordinates are listed from the most significant bit. Negative indices wrap from the far edge.
pub static FORMAT_INFO_COORDS_QR_MAIN: [(i16, i16); 15] = [
    (8, 0),
    (8, 1),
    (8, 2),
    (8, 3),
    (8, 4),
    (8, 5),
    (8, 7),
    (8, 8),
    (7, 8),
    (5, 8),
    (4, 8),
    (3, 8),
    (2, 8),
    (1, 8),
    (0, 8),
];

pub static FORMAT_INFO_COORDS_QR_SIDE: [(i16, i16); 15] = [
    (-1, 8),
    (-2, 8),
    (-3, 8),
    (-4, 8),
    (-5, 8),
    (-6, 8),
    (-7, 8),
    (8, -8),
    (8, -7),
    (8, -6),
    (8, -5),
    (8, -4),
    (8, -3),
    (8, -2),
    (8, -1),
];

// Version info
//------------------------------------------------------------------------------

pub static VERSION_INFO_BIT_LEN: usize = 18;

pub static VERSION_ERROR_BIT_LEN: usize = 12;

pub static VERSION_ERROR_CAPACITY: u32 = 3;

const VERSION_GENERATOR: u32 = 0x1F25;

// BCH(18,6) codeword of the version number
pub const fn version_info(ver: u32) -> u32 {
    let mut rem = ver;
    let mut i = 0;
    while i < 12 {
        rem = (rem << 1) ^ ((rem >> 11) * VERSION_GENERATOR);
        i += 1;
    }
    (ver << 12) | (rem & 0xFFF)
}

// Valid version codewords for versions 7..=10
pub static VERSION_INFOS: [u32; 4] =
    [version_info(7), version_info(8), version_info(9), version_info(10)];

const fn version_info_coords(bottom_left: bool) -> [(i16, i16); 18] {
    let mut coords = [(0, 0); 18];
    let mut i = 0;
    while i < 18 {
        // Bit 17 comes first
        let bit = 17 - i;
        let near = (bit / 3) as i16;
        let far = (bit % 3) as i16 - 11;
        coords[i] = if bottom_left { (far, near) } else { (near, far) };
        i += 1;
    }
    coords
}

pub static VERSION_INFO_COORDS_BL: [(i16, i16); 18] = version_info_coords(true);

pub static VERSION_INFO_COORDS_TR: [(i16, i16); 18] = version_info_coords(false);

#[cfg(test)]
mod info_tests {
    use super::{
        format_info, generate_format_info_qr, parse_format_info_qr, version_info, ECLevel,
        FORMAT_INFOS_QR, VERSION_INFOS, VERSION_INFO_COORDS_BL, VERSION_INFO_COORDS_TR,
    };
    use crate::common::mask::MaskPattern;

    #[test]
    fn test_format_info_known_values() {
        assert_eq!(generate_format_info_qr(ECLevel::L, MaskPattern::new(0)), 0x77C4);
        assert_eq!(generate_format_info_qr(ECLevel::M, MaskPattern::new(0)), 0x5412);
        assert_eq!(generate_format_info_qr(ECLevel::Q, MaskPattern::new(7)), 0x2BED);
        assert_eq!(generate_format_info_qr(ECLevel::H, MaskPattern::new(7)), 0x083B);
    }

    #[test]
    fn test_format_info_round_trip() {
        for ecl in [ECLevel::L, ECLevel::M, ECLevel::Q, ECLevel::H] {
            for m in 0..8 {
                let mask = MaskPattern::new(m);
                let info = generate_format_info_qr(ecl, mask);
                assert!(info < 1 << 15);
                assert_eq!(parse_format_info_qr(info), (ecl, mask));
            }
        }
    }

    #[test]
    fn test_format_infos_are_distant() {
        for (i, a) in FORMAT_INFOS_QR.iter().enumerate() {
            assert_eq!(*a, format_info(i as u32));
            for b in FORMAT_INFOS_QR.iter().skip(i + 1) {
                assert!((a ^ b).count_ones() >= 7);
            }
        }
    }

    #[test]
    fn test_version_info_known_values() {
        assert_eq!(version_info(7), 0x07C94);
        assert_eq!(version_info(8), 0x085BC);
        assert_eq!(version_info(9), 0x09A99);
        assert_eq!(version_info(10), 0x0A4D3);
        assert_eq!(VERSION_INFOS[0] >> 12, 7);
    }

    #[test]
    fn test_version_info_coords_mirror() {
        for ((r1, c1), (r2, c2)) in VERSION_INFO_COORDS_BL.iter().zip(&VERSION_INFO_COORDS_TR) {
            assert_eq!((r1, c1), (c2, r2));
        }
        assert_eq!(VERSION_INFO_COORDS_TR[0], (5, -9));
        assert_eq!(VERSION_INFO_COORDS_TR[17], (0, -11));
    }
}

// Global constants
//------------------------------------------------------------------------------

static TOTAL_CODEWORDS: [usize; 10] = [26, 44, 70, 100, 134, 172, 196, 242, 292, 346];

static ALIGNMENT_PATTERN_POSITIONS: [&[i16]; 10] = [
    &[],
    &[6, 18],
    &[6, 22],
    &[6, 26],
    &[6, 30],
    &[6, 34],
    &[6, 22, 38],
    &[6, 24, 42],
    &[6, 26, 46],
    &[6, 28, 50],
];

// (ecc_per_block, block1_size, block1_count, block2_size, block2_count) for L, M, Q, H
static EC_BLOCK_TABLE: [[(usize, usize, usize, usize, usize); 4]; 10] = [
    [(7, 19, 1, 0, 0), (10, 16, 1, 0, 0), (13, 13, 1, 0, 0), (17, 9, 1, 0, 0)],
    [(10, 34, 1, 0, 0), (16, 28, 1, 0, 0), (22, 22, 1, 0, 0), (28, 16, 1, 0, 0)],
    [(15, 55, 1, 0, 0), (26, 44, 1, 0, 0), (18, 17, 2, 0, 0), (22, 13, 2, 0, 0)],
    [(20, 80, 1, 0, 0), (18, 32, 2, 0, 0), (26, 24, 2, 0, 0), (16, 9, 4, 0, 0)],
    [(26, 108, 1, 0, 0), (24, 43, 2, 0, 0), (18, 15, 2, 16, 2), (22, 11, 2, 12, 2)],
    [(18, 68, 2, 0, 0), (16, 27, 4, 0, 0), (24, 19, 4, 0, 0), (28, 15, 4, 0, 0)],
    [(20, 78, 2, 0, 0), (18, 31, 4, 0, 0), (18, 14, 2, 15, 4), (26, 13, 4, 14, 1)],
    [(24, 97, 2, 0, 0), (22, 38, 2, 39, 2), (22, 18, 4, 19, 2), (26, 14, 4, 15, 2)],
    [(30, 116, 2, 0, 0), (22, 36, 3, 37, 2), (20, 16, 4, 17, 4), (24, 12, 4, 13, 4)],
    [(18, 68, 2, 69, 2), (26, 43, 4, 44, 1), (24, 19, 6, 20, 2), (28, 15, 6, 16, 2)],
];
