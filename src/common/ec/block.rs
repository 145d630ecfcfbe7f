use super::{encoder::ecc, MAX_BLOCK_SIZE};

// Data codewords followed by their error correction codewords
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Block {
    pub data: [u8; MAX_BLOCK_SIZE],
    // Block length
    pub len: usize,
    // Data length
    pub dlen: usize,
}

impl Block {
    pub fn new(raw: &[u8], len: usize) -> Self {
        let dlen = raw.len();
        debug_assert!(
            dlen <= len && len <= MAX_BLOCK_SIZE,
            "Invalid block dimensions: Data len {dlen}, Block len {len}"
        );
        let mut data = [0u8; MAX_BLOCK_SIZE];
        data[..dlen].copy_from_slice(raw);
        let mut block = Self { data, len, dlen };
        block.compute_ecc();
        block
    }

    pub fn with_encoded(encoded: &[u8], dlen: usize) -> Self {
        let len = encoded.len();
        debug_assert!(dlen <= len && len <= MAX_BLOCK_SIZE, "Invalid block dimensions");
        let mut data = [0u8; MAX_BLOCK_SIZE];
        data[..len].copy_from_slice(encoded);
        Self { data, len, dlen }
    }

    fn compute_ecc(&mut self) {
        let ecc = ecc(&self.data[..self.dlen], self.ec_len());
        self.data[self.dlen..self.len].copy_from_slice(&ecc);
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn ec_len(&self) -> usize {
        self.len - self.dlen
    }

    pub fn full(&self) -> &[u8] {
        &self.data[..self.len]
    }

    #[cfg(test)]
    pub fn full_mut(&mut self) -> &mut [u8] {
        &mut self.data[..self.len]
    }

    pub fn data(&self) -> &[u8] {
        &self.data[..self.dlen]
    }

    pub fn ecc(&self) -> &[u8] {
        &self.data[self.dlen..self.len]
    }
}
