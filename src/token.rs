use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::common::error::{QRError, QRResult};

// Text form of a module matrix: "<width>,<height>,<HEX>" where each hex digit holds 4 modules of
// the row-major matrix, dark as 1. The last digit is padded with zero bits on its low end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    width: usize,
    height: usize,
    modules: Vec<bool>,
}

impl Token {
    pub(crate) fn from_modules(width: usize, height: usize, modules: Vec<bool>) -> Self {
        debug_assert_eq!(modules.len(), width * height, "Module count doesn't match dimensions");
        Self { width, height, modules }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn modules(&self) -> &[bool] {
        &self.modules
    }

    pub fn get(&self, r: usize, c: usize) -> bool {
        debug_assert!(r < self.height && c < self.width, "Out of bounds: Row {r}, Column {c}");
        self.modules[r * self.width + c]
    }

    pub fn hex_len(&self) -> usize {
        (self.modules.len() + 3) >> 2
    }

    pub fn to_hex(&self) -> String {
        self.modules
            .chunks(4)
            .map(|nibble| {
                let n = nibble.iter().enumerate().fold(0, |n, (i, &b)| n | (b as usize) << (3 - i));
                HEX_DIGITS[n] as char
            })
            .collect()
    }

    // Modules packed MSB first, the tail of the last byte is zero
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; (self.modules.len() + 7) >> 3];
        for (i, _) in self.modules.iter().enumerate().filter(|(_, &b)| b) {
            bytes[i >> 3] |= 0b10000000 >> (i & 7);
        }
        bytes
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{},{}", self.width, self.height, self.to_hex())
    }
}

impl FromStr for Token {
    type Err = QRError;

    fn from_str(s: &str) -> QRResult<Self> {
        let mut parts = s.trim().splitn(3, ',');
        let mut dimension = || -> QRResult<usize> {
            match parts.next().map(|p| p.trim().parse::<usize>()) {
                Some(Ok(d)) if d > 0 => Ok(d),
                _ => Err(QRError::InvalidToken),
            }
        };
        let width = dimension()?;
        let height = dimension()?;
        let hex = parts.next().ok_or(QRError::InvalidToken)?.trim();

        let total = width.checked_mul(height).ok_or(QRError::InvalidToken)?;
        if hex.len() > (total + 3) >> 2 {
            return Err(QRError::InvalidToken);
        }

        let mut modules = Vec::with_capacity(hex.len() << 2);
        for ch in hex.chars() {
            let n = ch.to_digit(16).ok_or(QRError::InvalidToken)?;
            modules.extend((0..4).rev().map(|i| (n >> i) & 1 == 1));
        }
        if modules.len() < total {
            return Err(QRError::TruncatedToken);
        }
        modules.truncate(total);

        Ok(Self { width, height, modules })
    }
}

static HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";
