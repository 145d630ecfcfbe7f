pub use encode::*;

// Encoder
//------------------------------------------------------------------------------

pub mod encode {
    use tracing::debug;

    use crate::common::bit_utils::BitStream;
    use crate::common::error::{QRError, QRResult};
    use crate::common::metadata::{ECLevel, Version};

    use super::writer::{pad_remaining_capacity, push_byte_data, push_header, push_terminator};

    pub fn encode(data: &[u8], ecl: ECLevel) -> QRResult<(BitStream, Version)> {
        let ver = find_version(data.len(), ecl)?;
        let bs = encode_with_version(data, ver, ecl)?;
        Ok((bs, ver))
    }

    pub fn encode_with_version(data: &[u8], ver: Version, ecl: ECLevel) -> QRResult<BitStream> {
        if data.len() > ver.byte_capacity(ecl) {
            return Err(QRError::DataTooLong);
        }
        let bcap = ver.data_bit_capacity(ecl);
        let mut bs = BitStream::new(bcap);
        push_header(data.len(), ver, &mut bs);
        push_byte_data(data, &mut bs);
        push_terminator(&mut bs);
        pad_remaining_capacity(&mut bs);

        debug_assert_eq!(bs.len(), bcap, "Payload doesn't fill data capacity");
        Ok(bs)
    }

    // Smallest version whose byte mode capacity holds the payload
    pub fn find_version(len: usize, ecl: ECLevel) -> QRResult<Version> {
        let ver = Version::all().find(|v| v.byte_capacity(ecl) >= len).ok_or_else(|| {
            debug!("Payload of {len} bytes exceeds capacity of every supported version");
            QRError::DataTooLong
        })?;
        debug!("Selected version {} for {len} bytes at ec level {ecl:?}", *ver);
        Ok(ver)
    }

}

// Writer for encoded data
//------------------------------------------------------------------------------

pub(super) mod writer {
    use crate::common::bit_utils::BitStream;
    use crate::common::codec::{BYTE_MODE, PADDING_CODEWORDS};
    use crate::common::metadata::Version;

    pub fn push_header(char_cnt: usize, ver: Version, out: &mut BitStream) {
        out.push_bits(BYTE_MODE, ver.mode_bits());
        let len_bits = ver.char_cnt_bits();
        debug_assert!(
            char_cnt < (1 << len_bits),
            "Char count exceeds bit length: Char count {char_cnt}, Char count bits {len_bits}"
        );
        out.push_bits(char_cnt as u16, len_bits);
    }

    pub fn push_byte_data(data: &[u8], out: &mut BitStream) {
        out.extend(data);
    }

    pub fn push_terminator(out: &mut BitStream) {
        let bit_len = out.len();
        let bit_capacity = out.capacity();
        if bit_len < bit_capacity {
            let term_len = std::cmp::min(4, bit_capacity - bit_len);
            out.push_bits(0u8, term_len);
        }
    }

    pub fn pad_remaining_capacity(out: &mut BitStream) {
        push_padding_bits(out);
        push_padding_codewords(out);
    }

    fn push_padding_bits(out: &mut BitStream) {
        let offset = out.len() & 7;
        if offset > 0 {
            let padding_bits_len = 8 - offset;
            out.push_bits(0u8, padding_bits_len);
        }
    }

    fn push_padding_codewords(out: &mut BitStream) {
        let offset = out.len() & 7;
        debug_assert!(offset == 0, "Bit offset should be zero before padding codewords: {offset}");

        let remain_byte_capacity = (out.capacity() - out.len()) >> 3;
        PADDING_CODEWORDS.iter().copied().cycle().take(remain_byte_capacity).for_each(|pc| {
            out.push_bits(pc, 8);
        });
    }

    #[cfg(test)]
    mod writer_tests {
        use super::{
            push_byte_data, push_header, push_padding_bits, push_padding_codewords,
            push_terminator,
        };
        use crate::common::bit_utils::BitStream;
        use crate::common::codec::PADDING_CODEWORDS;
        use crate::common::metadata::{ECLevel, Version};

        fn v1_stream() -> BitStream {
            BitStream::new(Version::new(1).unwrap().data_bit_capacity(ECLevel::L))
        }

        #[test]
        fn test_push_header_v1() {
            let mut bs = v1_stream();
            push_header(17, Version::new(1).unwrap(), &mut bs);
            assert_eq!(bs.data(), [0b01000001, 0b00010000]);
            assert_eq!(bs.len(), 12);
        }

        #[test]
        fn test_push_header_v10() {
            let ver = Version::new(10).unwrap();
            let mut bs = BitStream::new(ver.data_bit_capacity(ECLevel::L));
            push_header(271, ver, &mut bs);
            assert_eq!(bs.data(), [0b01000000, 0b00010000, 0b11110000]);
            assert_eq!(bs.len(), 20);
        }

        #[test]
        fn test_push_byte_data() {
            let mut bs = v1_stream();
            push_byte_data("a".as_bytes(), &mut bs);
            assert_eq!(bs.data(), [0b01100001])
        }

        #[test]
        fn test_push_terminator() {
            let mut bs = v1_stream();
            bs.push_bits(0b1u8, 1);
            push_terminator(&mut bs);
            assert_eq!(bs.data(), [0b10000000]);
            assert_eq!(bs.len() & 7, 5);
            for _ in 0..18 {
                bs.push_bits(0b11111111u8, 8);
            }
            push_terminator(&mut bs);
            assert_eq!(bs.len(), bs.capacity());
        }

        #[test]
        fn test_push_padding_bits() {
            let mut bs = v1_stream();
            bs.push_bits(1u8, 1);
            push_padding_bits(&mut bs);
            assert_eq!(bs.data(), [0b10000000]);
            assert_eq!(bs.len() & 7, 0);
        }

        #[test]
        fn test_push_padding_codewords() {
            let mut bs = v1_stream();
            bs.push_bits(1u8, 1);
            push_padding_bits(&mut bs);
            push_padding_codewords(&mut bs);
            let mut output = vec![0b10000000];
            output.extend(PADDING_CODEWORDS.iter().cycle().take(18));
            assert_eq!(bs.data(), output);
        }
    }
}
