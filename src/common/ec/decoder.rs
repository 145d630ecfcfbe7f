use super::{galois::G, Block, MAX_BLOCK_SIZE, MAX_EC_SIZE};
use crate::common::error::{QRError, QRResult};

// Rectifier
//------------------------------------------------------------------------------

impl Block {
    pub fn rectify(&mut self) -> QRResult<&[u8]> {
        // Compute syndromes
        let synd = match self.syndromes() {
            Ok(()) => return Ok(self.data()),
            Err(s) => s,
        };

        // Error locator polynomial
        let (sig, deg) = self.berlekamp_massey(&synd);
        if 2 * deg > self.ec_len() {
            return Err(QRError::TooManyError);
        }

        let err_loc = self.chien_search(&sig);
        if err_loc[..self.len()].iter().filter(|&&e| e).count() != deg {
            return Err(QRError::TooManyError);
        }

        // Sigma derivative
        let mut dsig = [G(0); MAX_EC_SIZE];
        for i in (1..MAX_EC_SIZE).step_by(2) {
            dsig[i - 1] = sig[i];
        }

        // Error evaluator
        let omg = self.omega(&synd, &sig);

        // Error magnitude
        let err_mag = self.forney(&omg, &dsig, &err_loc);

        // Rectify errors by XORing data with magnitude
        for (i, &g) in err_mag.iter().take(self.len()).enumerate() {
            self.data[i] = (G(self.data[i]) + g).into();
        }

        match self.syndromes() {
            Ok(()) => Ok(self.data()),
            Err(_) => Err(QRError::TooManyError),
        }
    }

    fn syndromes(&self) -> Result<(), [G; MAX_EC_SIZE]> {
        let mut synd = [G(0); MAX_EC_SIZE];

        for (i, s) in synd.iter_mut().take(self.ec_len()).enumerate() {
            // Last codeword is the constant term
            *s = eval_poly(self.full().iter().rev().map(|&b| G(b)), G::gen_pow(i));
        }

        if synd.iter().all(|&s| s.0 == 0) {
            Ok(())
        } else {
            Err(synd)
        }
    }

    // Sigma polynomial & its degree
    fn berlekamp_massey(&self, synd: &[G; MAX_EC_SIZE]) -> ([G; MAX_EC_SIZE], usize) {
        let mut l = 0usize;
        let mut m = 1usize;
        let mut b = G(1);
        let mut cx = [G(0); MAX_EC_SIZE];
        let mut bx = [G(0); MAX_EC_SIZE];
        let mut tx = [G(0); MAX_EC_SIZE];
        cx[0] = G(1);
        bx[0] = G(1);

        for n in 0..self.ec_len() {
            // Calculate discrepancy
            let mut d = synd[n];
            for i in 1..=l {
                d += cx[i] * synd[n - i];
            }

            if d.0 == 0 {
                m += 1;
                continue;
            }

            // Temporary copy
            tx.copy_from_slice(&cx);

            let scale = d / b;
            for i in 0..MAX_EC_SIZE - m {
                cx[i + m] += scale * bx[i];
            }

            if 2 * l <= n {
                bx.copy_from_slice(&tx);
                l = n + 1 - l;
                b = d;
                m = 1;
            } else {
                m += 1;
            }
        }
        (cx, l)
    }

    // Error location polynomial
    fn chien_search(&self, sig: &[G; MAX_EC_SIZE]) -> [bool; MAX_BLOCK_SIZE] {
        let mut err_loc = [false; MAX_BLOCK_SIZE];
        for (i, e) in err_loc[..self.len()].iter_mut().rev().enumerate() {
            *e = eval_poly(sig.iter().copied(), G::gen_pow(255 - i)).0 == 0;
        }
        err_loc
    }

    // Error evaluator polynomial from syndromes S1, S2...
    fn omega(&self, synd: &[G; MAX_EC_SIZE], sig: &[G; MAX_EC_SIZE]) -> [G; MAX_EC_SIZE] {
        let t = self.ec_len() - 1;
        let mut omg = [G(0); MAX_EC_SIZE];
        for i in 0..t {
            let sy = synd[i + 1];
            for j in 0..t - i {
                omg[i + j] += sy * sig[j];
            }
        }
        omg
    }

    fn forney(
        &self,
        omg: &[G; MAX_EC_SIZE],
        dsig: &[G; MAX_EC_SIZE],
        err_loc: &[bool; MAX_BLOCK_SIZE],
    ) -> [G; MAX_BLOCK_SIZE] {
        let mut mag = [G(0); MAX_BLOCK_SIZE];
        for (i, &is_err) in err_loc[..self.len()].iter().rev().enumerate() {
            if !is_err {
                continue;
            }
            let xinv = G::gen_pow(255 - i);
            let omg_x = eval_poly(omg.iter().copied(), xinv);
            let sig_x = eval_poly(dsig.iter().copied(), xinv);
            if sig_x.0 == 0 {
                continue;
            }
            mag[self.len() - 1 - i] = omg_x / sig_x;
        }
        mag
    }
}

// Coefficients are in ascending order of degree
fn eval_poly(poly: impl Iterator<Item = G>, x: G) -> G {
    let mut res = G(0);
    let mut xpow = G(1);
    for coeff in poly {
        res += coeff * xpow;
        xpow *= x;
    }
    res
}



// Rectifier for format and version infos
pub fn rectify_info(info: u32, valid_numbers: &[u32], err_capacity: u32) -> QRResult<u32> {
    let res = valid_numbers
        .iter()
        .copied()
        .min_by_key(|&n| (info ^ n).count_ones())
        .ok_or(QRError::InvalidFormatInfo)?;

    if (info ^ res).count_ones() <= err_capacity {
        Ok(res)
    } else {
        Err(QRError::InvalidFormatInfo)
    }
}

#[cfg(test)]
mod info_rectifier_tests {
    use super::rectify_info;
    use crate::common::metadata::FORMAT_INFOS_QR;

    #[test]
    fn test_rectify_info() {
        let info = FORMAT_INFOS_QR[9];
        assert_eq!(rectify_info(info, &FORMAT_INFOS_QR, 3), Ok(info));
        assert_eq!(rectify_info(info ^ 0b100_0000_0001_0010, &FORMAT_INFOS_QR, 3), Ok(info));
        assert!(rectify_info(info ^ 0b111_1000_0000_0000, &FORMAT_INFOS_QR, 3).is_err());
    }
}
