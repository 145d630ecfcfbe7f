use std::ops::{Deref, Not};

use tracing::trace;

use crate::common::{
    ec::rectify_info,
    error::{QRError, QRResult},
    iter::EncRegionIter,
    mask::MaskPattern,
    metadata::{
        parse_format_info_qr, Color, ECLevel, Metadata, Version, FORMAT_ERROR_CAPACITY,
        FORMAT_INFOS_QR, FORMAT_INFO_COORDS_QR_MAIN, FORMAT_INFO_COORDS_QR_SIDE,
        VERSION_ERROR_BIT_LEN, VERSION_ERROR_CAPACITY, VERSION_INFOS, VERSION_INFO_COORDS_BL,
        VERSION_INFO_COORDS_TR,
    },
};
use crate::token::Token;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DeModule {
    Unmarked(Color),
    Marked,
}

impl Deref for DeModule {
    type Target = Color;
    fn deref(&self) -> &Self::Target {
        match self {
            DeModule::Unmarked(c) => c,
            DeModule::Marked => &Color::Dark,
        }
    }
}

impl Not for DeModule {
    type Output = DeModule;
    fn not(self) -> Self::Output {
        match self {
            DeModule::Unmarked(c) => DeModule::Unmarked(!c),
            DeModule::Marked => DeModule::Marked,
        }
    }
}

// QR type for reader
//------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DeQR {
    width: usize,
    grid: Vec<DeModule>,
    version: Version,
    ec_level: Option<ECLevel>,
    mask: Option<MaskPattern>,
}

impl DeQR {
    // Version is inferred from the grid size, the token has no quiet zone
    pub fn from_token(token: &Token) -> QRResult<Self> {
        if token.width() != token.height() {
            return Err(QRError::InvalidVersion);
        }
        let version = Version::from_grid_size(token.width()).ok_or(QRError::InvalidVersion)?;
        let grid = token.modules().iter().map(|&b| DeModule::Unmarked(Color::from(b))).collect();

        Ok(Self { width: token.width(), grid, version, ec_level: None, mask: None })
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn ec_level(&self) -> Option<ECLevel> {
        self.ec_level
    }

    pub fn mask(&self) -> Option<MaskPattern> {
        self.mask
    }

    // Only meaningful once format info has been read
    pub fn metadata(&self) -> Option<Metadata> {
        Some(Metadata::new(self.version, self.ec_level?, self.mask))
    }

    pub fn count_unmarked_modules(&self) -> usize {
        self.grid.iter().filter(|m| matches!(m, DeModule::Unmarked(_))).count()
    }

    #[cfg(test)]
    pub fn to_debug_str(&self) -> String {
        let w = self.width as i16;
        let mut res = String::with_capacity((w * (w + 1)) as usize);
        res.push('\n');
        for i in 0..w {
            for j in 0..w {
                let c = match self.get(i, j) {
                    DeModule::Unmarked(Color::Dark) => 'u',
                    DeModule::Unmarked(Color::Light) => 'U',
                    DeModule::Marked => '.',
                };
                res.push(c);
            }
            res.push('\n');
        }
        res
    }

    fn coord_to_index(&self, r: i16, c: i16) -> usize {
        let w = self.width as i16;
        debug_assert!(-w <= r && r < w, "Row out of bounds: {r}");
        debug_assert!(-w <= c && c < w, "Column out of bounds: {c}");

        let r = if r < 0 { r + w } else { r };
        let c = if c < 0 { c + w } else { c };
        (r * w + c) as _
    }

    pub fn get(&self, r: i16, c: i16) -> DeModule {
        self.grid[self.coord_to_index(r, c)]
    }

    pub fn get_mut(&mut self, r: i16, c: i16) -> &mut DeModule {
        let index = self.coord_to_index(r, c);
        &mut self.grid[index]
    }

    pub fn set(&mut self, r: i16, c: i16, module: DeModule) {
        *self.get_mut(r, c) = module;
    }
}


// Format & version info
//------------------------------------------------------------------------------

impl DeQR {
    // Main copy first, the copy split across the other two finders as fallback
    pub fn read_format_info(&mut self) -> QRResult<(ECLevel, MaskPattern)> {
        let main = self.get_number(&FORMAT_INFO_COORDS_QR_MAIN);
        let f = rectify_info(main, &FORMAT_INFOS_QR, FORMAT_ERROR_CAPACITY)
            .or_else(|_| {
                trace!("Main format info unreadable, trying side copy");
                let side = self.get_number(&FORMAT_INFO_COORDS_QR_SIDE);
                rectify_info(side, &FORMAT_INFOS_QR, FORMAT_ERROR_CAPACITY)
            })
            .or(Err(QRError::InvalidFormatInfo))?;

        self.mark_coords(&FORMAT_INFO_COORDS_QR_MAIN);
        self.mark_coords(&FORMAT_INFO_COORDS_QR_SIDE);
        self.set(-8, 8, DeModule::Marked);

        let (ec_level, mask) = parse_format_info_qr(f);
        self.ec_level = Some(ec_level);
        self.mask = Some(mask);
        Ok((ec_level, mask))
    }

    // Version info must agree with the grid size
    pub fn read_version_info(&mut self) -> QRResult<Version> {
        if *self.version < 7 {
            return Ok(self.version);
        }

        let bl = self.get_number(&VERSION_INFO_COORDS_BL);
        let v = rectify_info(bl, &VERSION_INFOS, VERSION_ERROR_CAPACITY)
            .or_else(|_| {
                trace!("Bottom left version info unreadable, trying top right copy");
                let tr = self.get_number(&VERSION_INFO_COORDS_TR);
                rectify_info(tr, &VERSION_INFOS, VERSION_ERROR_CAPACITY)
            })
            .or(Err(QRError::InvalidVersionInfo))?;

        let ver = Version::new(v as usize >> VERSION_ERROR_BIT_LEN)
            .or(Err(QRError::InvalidVersionInfo))?;
        if ver != self.version {
            return Err(QRError::InvalidVersionInfo);
        }

        self.mark_coords(&VERSION_INFO_COORDS_BL);
        self.mark_coords(&VERSION_INFO_COORDS_TR);
        Ok(ver)
    }

    // Coordinates run from the most significant bit
    pub fn get_number(&self, coords: &[(i16, i16)]) -> u32 {
        coords.iter().fold(0, |n, &(r, c)| (n << 1) | u32::from(*self.get(r, c)))
    }

    pub fn mark_coords(&mut self, coords: &[(i16, i16)]) {
        for &(r, c) in coords {
            self.set(r, c, DeModule::Marked);
        }
    }
}

#[cfg(test)]
mod deqr_infos_tests {
    use super::DeQR;
    use crate::builder::{Module, QRBuilder, QR};
    use crate::common::{
        error::QRError,
        mask::MaskPattern,
        metadata::{
            Color, ECLevel, Version, FORMAT_INFO_COORDS_QR_MAIN, FORMAT_INFO_COORDS_QR_SIDE,
            VERSION_INFO_COORDS_BL, VERSION_INFO_COORDS_TR,
        },
    };

    fn build(ver: usize, ecl: ECLevel, mask: u8) -> QR {
        QRBuilder::new(b"Hello, world!")
            .version(Version::new(ver).unwrap())
            .ec_level(ecl)
            .mask(MaskPattern::new(mask))
            .build()
            .unwrap()
    }

    fn blank(qr: &mut QR, coords: &[(i16, i16)], module: Module) {
        for &(r, c) in coords {
            qr.set(r, c, module);
        }
    }

    #[test]
    fn test_read_format_info() {
        let qr = build(2, ECLevel::Q, 1);
        let mut deqr = DeQR::from_token(&qr.to_token()).unwrap();
        assert_eq!(deqr.read_format_info(), Ok((ECLevel::Q, MaskPattern::new(1))));
        assert_eq!(deqr.ec_level(), Some(ECLevel::Q));
        assert_eq!(deqr.mask(), Some(MaskPattern::new(1)));
    }

    #[test]
    fn test_read_format_info_one_corrupted() {
        let mut qr = build(2, ECLevel::L, 1);
        // Three flipped bits are within capacity
        for (r, c) in [(8, 1), (8, 4), (2, 8)] {
            let m = qr.get(r, c);
            qr.set(r, c, Module::Format(!*m));
        }
        let mut deqr = DeQR::from_token(&qr.to_token()).unwrap();
        assert_eq!(deqr.read_format_info(), Ok((ECLevel::L, MaskPattern::new(1))));
    }

    #[test]
    fn test_read_format_info_main_fully_corrupted() {
        let mut qr = build(2, ECLevel::H, 6);
        blank(&mut qr, &FORMAT_INFO_COORDS_QR_MAIN, Module::Format(Color::Light));
        let mut deqr = DeQR::from_token(&qr.to_token()).unwrap();
        assert_eq!(deqr.read_format_info(), Ok((ECLevel::H, MaskPattern::new(6))));
    }

    #[test]
    fn test_read_format_info_both_fully_corrupted() {
        let mut qr = build(2, ECLevel::L, 1);
        blank(&mut qr, &FORMAT_INFO_COORDS_QR_MAIN, Module::Format(Color::Light));
        blank(&mut qr, &FORMAT_INFO_COORDS_QR_SIDE, Module::Format(Color::Dark));
        let mut deqr = DeQR::from_token(&qr.to_token()).unwrap();
        assert_eq!(deqr.read_format_info(), Err(QRError::InvalidFormatInfo));
    }

    #[test]
    fn test_mark_format_info() {
        let qr = build(1, ECLevel::L, 0);
        let mut deqr = DeQR::from_token(&qr.to_token()).unwrap();
        deqr.read_format_info().unwrap();
        // Two copies of 15 bits & the dark module
        assert_eq!(deqr.count_unmarked_modules(), 21 * 21 - 31);
        let dbg = deqr.to_debug_str();
        let rows = dbg.lines().skip(1).collect::<Vec<_>>();
        assert_eq!(&rows[8][..6], "......");
        assert_eq!(&rows[8][7..9], "..");
        // Timing module between the two format segments
        assert_ne!(&rows[8][6..7], ".");
        assert_eq!(&rows[13][8..9], ".");
    }

    #[test]
    fn test_read_version_info() {
        let qr = build(7, ECLevel::M, 2);
        let mut deqr = DeQR::from_token(&qr.to_token()).unwrap();
        assert_eq!(deqr.read_version_info(), Ok(Version::new(7).unwrap()));
        assert_eq!(deqr.count_unmarked_modules(), 45 * 45 - 36);
    }

    #[test]
    fn test_read_version_info_small() {
        let qr = build(6, ECLevel::M, 2);
        let mut deqr = DeQR::from_token(&qr.to_token()).unwrap();
        assert_eq!(deqr.read_version_info(), Ok(Version::new(6).unwrap()));
        assert_eq!(deqr.count_unmarked_modules(), 41 * 41);
    }

    #[test]
    fn test_read_version_info_one_fully_corrupted() {
        let mut qr = build(8, ECLevel::L, 0);
        blank(&mut qr, &VERSION_INFO_COORDS_BL, Module::Version(Color::Light));
        let mut deqr = DeQR::from_token(&qr.to_token()).unwrap();
        assert_eq!(deqr.read_version_info(), Ok(Version::new(8).unwrap()));
    }

    #[test]
    fn test_read_version_info_both_fully_corrupted() {
        let mut qr = build(8, ECLevel::L, 0);
        blank(&mut qr, &VERSION_INFO_COORDS_BL, Module::Version(Color::Light));
        blank(&mut qr, &VERSION_INFO_COORDS_TR, Module::Version(Color::Light));
        let mut deqr = DeQR::from_token(&qr.to_token()).unwrap();
        assert_eq!(deqr.read_version_info(), Err(QRError::InvalidVersionInfo));
    }
}

// Function patterns
//------------------------------------------------------------------------------

impl DeQR {
    pub fn mark_all_function_patterns(&mut self) {
        self.mark_finder_patterns();
        self.mark_timing_patterns();
        self.mark_alignment_patterns();
    }

    fn mark_finder_patterns(&mut self) {
        self.mark_finder_pattern_at(3, 3);
        self.mark_finder_pattern_at(3, -4);
        self.mark_finder_pattern_at(-4, 3);
    }

    // Finder along with its separator
    fn mark_finder_pattern_at(&mut self, r: i16, c: i16) {
        let (dr_top, dr_bottom) = if r > 0 { (-3, 4) } else { (-4, 3) };
        let (dc_left, dc_right) = if c > 0 { (-3, 4) } else { (-4, 3) };
        for i in dr_top..=dr_bottom {
            for j in dc_left..=dc_right {
                self.set(r + i, c + j, DeModule::Marked);
            }
        }
    }

    fn mark_timing_patterns(&mut self) {
        let last = self.width as i16 - 9;
        for j in 8..=last {
            self.set(6, j, DeModule::Marked);
            self.set(j, 6, DeModule::Marked);
        }
    }

    fn mark_alignment_patterns(&mut self) {
        let positions = self.version.alignment_pattern();
        for &r in positions {
            for &c in positions {
                self.mark_alignment_pattern_at(r, c);
            }
        }
    }

    fn mark_alignment_pattern_at(&mut self, r: i16, c: i16) {
        let w = self.width as i16;
        if (r == 6 && (c == 6 || c - w == -7)) || (r - w == -7 && c == 6) {
            return;
        }
        for i in -2..=2 {
            for j in -2..=2 {
                self.set(r + i, c + j, DeModule::Marked);
            }
        }
    }
}


// Unmask & payload extraction
//------------------------------------------------------------------------------

impl DeQR {
    // Marked modules are never flipped
    pub fn unmask(&mut self, pattern: MaskPattern) {
        let mask_fn = pattern.mask_function();
        let w = self.width as i16;
        for r in 0..w {
            for c in 0..w {
                if mask_fn(r, c) {
                    self.set(r, c, !self.get(r, c))
                }
            }
        }
    }

    // Codewords in placement order, remainder bits are left behind
    pub fn extract_payload(&self) -> Vec<u8> {
        let total_codewords = self.version.total_codewords();
        let mut codewords = Vec::with_capacity(total_codewords);
        let mut coords = EncRegionIter::new(self.version).filter(|&(r, c)| {
            matches!(self.get(r, c), DeModule::Unmarked(_))
        });
        for _ in 0..total_codewords {
            let mut codeword = 0u8;
            for (r, c) in coords.by_ref().take(8) {
                codeword = (codeword << 1) | (*self.get(r, c) == Color::Dark) as u8;
            }
            codewords.push(codeword);
        }
        codewords
    }
}
