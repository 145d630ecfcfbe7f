//! # cardqr
//!
//! A byte-mode QR code encoder for wallet cards. Symbols of versions 1 to 10 are built with
//! Reed-Solomon error correction and serialised as compact hex tokens that a low-power watch
//! can blit straight to its display.
//!
//! ## Features
//!
//! - **QR Code Generation**: Byte mode symbols with automatic or fixed version, error correction
//!   level and mask pattern
//! - **Tokens**: `"<width>,<height>,<HEX>"` text form of the module matrix, row-major, dark = 1
//! - **Reference Reader**: Decodes a token back to its payload, correcting codeword errors
//! - **Card Sync**: Pre-renders QR cards & lays out the messages sent to the watch
//!
//! ## Quick Start
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let token = cardqr::generate(b"TEST")?;
//! assert!(token.starts_with("21,21,"));
//! # Ok(())
//! # }
//! ```
//!
//! ### Full Configuration
//!
//! ```rust
//! use cardqr::{ECLevel, MaskPattern, QRBuilder, Version};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let qr = QRBuilder::new(b"Hello, World!")
//!     .version(Version::new(2)?)   // Smallest fitting version if not provided
//!     .ec_level(ECLevel::M)        // Defaults to ECLevel::L
//!     .mask(MaskPattern::new(3))   // Lowest penalty mask if not provided
//!     .build()?;
//!
//! let token = qr.to_token();
//! println!("{}", qr.to_str(1));
//! assert_eq!(cardqr::reader::decode(&token)?, b"Hello, World!");
//! # Ok(())
//! # }
//! ```
//!
//! ### Cards
//!
//! ```rust
//! use cardqr::card::{sync_messages, BarcodeFormat, Card, RenderPolicy};
//!
//! let mut card = Card::new("Gym", "MEMBER-0042", BarcodeFormat::QR);
//! card.prerender(&RenderPolicy::default());
//! let msgs = sync_messages(&[card]);
//! assert_eq!(msgs.len(), 3);
//! ```
//!
//! ## Error Correction Levels
//! - **L (Low)**: ~7% error correction
//! - **M (Medium)**: ~15% error correction
//! - **Q (Quartile)**: ~25% error correction
//! - **H (High)**: ~30% error correction

#![allow(clippy::items_after_test_module, clippy::suspicious_arithmetic_impl)]

pub mod builder;
pub mod card;
pub mod common;
pub mod reader;
pub mod token;

pub use builder::QRBuilder;
pub use common::error::{QRError, QRResult};
pub use common::mask::MaskPattern;
pub use common::metadata::{ECLevel, Version};
pub use token::Token;

/// Encodes `data` as a byte mode symbol at level L with the smallest fitting version and the
/// lowest penalty mask, returning its token.
///
/// Returns [`QRError::DataTooLong`] when the data exceeds the capacity of version 10.
pub fn generate(data: &[u8]) -> QRResult<String> {
    let qr = QRBuilder::new(data).build()?;
    Ok(qr.to_token().to_string())
}

#[cfg(test)]
mod lib_tests {
    use super::{generate, QRError};

    #[test]
    fn test_generate_test() {
        let token = generate(b"TEST").unwrap();
        let (dims, hex) = token.split_at(6);
        assert_eq!(dims, "21,21,");
        assert_eq!(hex.len(), 111);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn test_generate_empty() {
        assert!(generate(b"").unwrap().starts_with("21,21,"));
    }

    #[test]
    fn test_generate_deterministic() {
        assert_eq!(generate(b"cardqr"), generate(b"cardqr"));
    }

    #[test]
    fn test_generate_capacity() {
        assert!(generate(&[b'x'; 271]).unwrap().starts_with("57,57,"));
        assert_eq!(generate(&[b'x'; 272]), Err(QRError::DataTooLong));
    }
}
