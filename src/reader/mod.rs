mod deqr;

pub use deqr::{DeModule, DeQR};

use tracing::{debug, trace};

use crate::common::{
    codec::decode as decode_segments,
    ec::Block,
    error::QRResult,
    metadata::Metadata,
    BitStream,
};
use crate::token::Token;

// Reads a symbol token back into its metadata & byte payload
pub fn read(token: &Token) -> QRResult<(Metadata, Vec<u8>)> {
    let mut deqr = DeQR::from_token(token)?;

    trace!("Reading format info");
    let (ecl, mask) = deqr.read_format_info()?;

    trace!("Reading version info");
    let ver = deqr.read_version_info()?;

    let meta = Metadata::new(ver, ecl, Some(mask));
    debug!("Reading QR {meta}");

    trace!("Marking all function patterns");
    deqr.mark_all_function_patterns();

    trace!("Unmasking & extracting payload");
    deqr.unmask(mask);
    let pld = deqr.extract_payload();

    trace!("Deinterleaving & rectifying payload");
    let blk_info = ver.data_codewords_per_block(ecl);
    let ec_len = ver.ecc_per_block(ecl);
    let mut enc = BitStream::new(ver.data_codewords(ecl) << 3);
    for mut b in deinterleave(&pld, blk_info, ec_len) {
        enc.extend(b.rectify()?);
    }

    trace!("Decoding data segments");
    let msg = decode_segments(&mut enc, ver)?;
    debug!("Decoded {} bytes", msg.len());

    Ok((meta, msg))
}

pub fn decode(token: &Token) -> QRResult<Vec<u8>> {
    read(token).map(|(_, msg)| msg)
}

// Byte mode carries no charset, so anything that isn't UTF-8 is taken as ISO-8859-1
pub fn decode_text(token: &Token) -> QRResult<String> {
    let msg = decode(token)?;
    match String::from_utf8(msg) {
        Ok(s) => Ok(s),
        Err(e) => Ok(encoding_rs::mem::decode_latin1(e.as_bytes()).into_owned()),
    }
}

fn deinterleave(data: &[u8], blk_info: (usize, usize, usize, usize), ec_len: usize) -> Vec<Block> {
    // b1s = block1_size, b1c = block1_count
    let (b1s, b1c, b2s, b2c) = blk_info;

    let total_blks = b1c + b2c;
    let spl = b1s * total_blks;
    let data_sz = b1s * b1c + b2s * b2c;

    let mut dilvd = vec![Vec::with_capacity(b2s.max(b1s) + ec_len); total_blks];

    // Columns shared by every block
    data[..spl]
        .chunks(total_blks)
        .for_each(|ch| ch.iter().enumerate().for_each(|(i, v)| dilvd[i].push(*v)));
    // Extra column of the longer blocks
    if b2c > 0 {
        data[spl..data_sz]
            .chunks(b2c)
            .for_each(|ch| ch.iter().enumerate().for_each(|(i, v)| dilvd[b1c + i].push(*v)));
    }

    data[data_sz..]
        .chunks(total_blks)
        .for_each(|ch| ch.iter().enumerate().for_each(|(i, v)| dilvd[i].push(*v)));

    dilvd.iter().map(|b| Block::with_encoded(b, b.len() - ec_len)).collect()
}
