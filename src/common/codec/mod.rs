pub mod decoder;
pub mod encoder;

pub use decoder::*;
pub use encoder::*;

// Byte mode indicator
pub const BYTE_MODE: u8 = 0b0100;

// Alternating pad codewords filling unused data capacity
pub static PADDING_CODEWORDS: [u8; 2] = [0b11101100, 0b00010001];

// Codec proptesting
//------------------------------------------------------------------------------
