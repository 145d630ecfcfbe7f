use std::fmt::{Debug, Display, Error, Formatter};

// Error
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum QRError {
    // Builder
    DataTooLong,
    InvalidVersion,
    InvalidMaskingPattern,

    // Token
    InvalidToken,
    TruncatedToken,

    // Card
    InvalidBarcodeFormat(u8),
    MalformedBarcodeFormat,

    // Reader
    InvalidFormatInfo,
    InvalidVersionInfo,
    InvalidMode(u8),
    CorruptDataSegment,
    TooManyError,
}

impl Display for QRError {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        let msg = match *self {
            // Builder
            Self::DataTooLong => "Data too long",
            Self::InvalidVersion => "Invalid version",
            Self::InvalidMaskingPattern => "Invalid masking pattern",

            // Token
            Self::InvalidToken => "Malformed symbol token",
            Self::TruncatedToken => "Symbol token data truncated",

            // Card
            Self::InvalidBarcodeFormat(c) => return write!(f, "Unknown barcode format: {c}"),
            Self::MalformedBarcodeFormat => "Barcode format is not a number",

            // Reader
            Self::InvalidFormatInfo => "Invalid format info detected",
            Self::InvalidVersionInfo => "Invalid version info detected",
            Self::InvalidMode(m) => return write!(f, "Unsupported mode indicator: {m:#06b}"),
            Self::CorruptDataSegment => "Corrupt data segment",
            Self::TooManyError => "Too many errors to correct successfully",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for QRError {}

pub type QRResult<T> = Result<T, QRError>;
