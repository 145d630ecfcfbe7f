use tracing::trace;

use super::BYTE_MODE;
use crate::common::bit_utils::BitStream;
use crate::common::error::{QRError, QRResult};
use crate::common::metadata::Version;

// Decoder
//------------------------------------------------------------------------------

// Reads consecutive byte mode segments until a terminator or the end of the stream
pub fn decode(inp: &mut BitStream, ver: Version) -> QRResult<Vec<u8>> {
    let mut res = Vec::with_capacity(inp.len() >> 3);
    while let Some(char_cnt) = take_header(inp, ver)? {
        trace!("Byte segment of {char_cnt} bytes");
        take_bytes(inp, char_cnt, &mut res)?;
    }
    Ok(res)
}

fn take_header(inp: &mut BitStream, ver: Version) -> QRResult<Option<usize>> {
    // Fewer than 4 bits left acts as an implicit terminator
    let mode_bits = match inp.take_bits(ver.mode_bits()) {
        None | Some(0) => return Ok(None),
        Some(m) => m as u8,
    };
    if mode_bits != BYTE_MODE {
        return Err(QRError::InvalidMode(mode_bits));
    }
    let char_cnt = inp.take_bits(ver.char_cnt_bits()).ok_or(QRError::CorruptDataSegment)?;
    Ok(Some(char_cnt.into()))
}

fn take_bytes(inp: &mut BitStream, char_cnt: usize, out: &mut Vec<u8>) -> QRResult<()> {
    for _ in 0..char_cnt {
        let byte = inp.take_bits(8).ok_or(QRError::CorruptDataSegment)?;
        out.push(byte as u8);
    }
    Ok(())
}
