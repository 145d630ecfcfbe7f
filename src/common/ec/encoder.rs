use super::galois::GF;

// Generator polynomial
//------------------------------------------------------------------------------

// Product of (x - a^i) for i in 0..ecc_count. Coefficients are in descending order of degree,
// leading coefficient is always 1.
pub fn generator_poly(ecc_count: usize) -> Vec<u8> {
    let mut poly = Vec::with_capacity(ecc_count + 1);
    poly.push(1u8);
    for i in 0..ecc_count {
        let root = GF.exp(i);
        poly.push(0);
        for j in (1..poly.len()).rev() {
            poly[j] ^= GF.multiply(poly[j - 1], root);
        }
    }
    poly
}

// Error correction codewords
//------------------------------------------------------------------------------

// Performs polynomial long division with data polynomial(num)
// and generator polynomial(den) to compute remainder polynomial,
// the coefficients of which are the ecc
pub fn ecc(block: &[u8], ecc_count: usize) -> Vec<u8> {
    let len = block.len();
    let gen_poly = generator_poly(ecc_count);

    let mut res = block.to_vec();
    res.resize(len + ecc_count, 0);

    for i in 0..len {
        let lead_coeff = res[i];
        if lead_coeff == 0 {
            continue;
        }

        for (u, v) in res[i + 1..].iter_mut().zip(gen_poly[1..].iter()) {
            *u ^= GF.multiply(*v, lead_coeff);
        }
    }

    res.split_off(len)
}
