use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Sub};

// Log & antilog tables of GF(256) over the primitive polynomial x^8 + x^4 + x^3 + x^2 + 1
//------------------------------------------------------------------------------

#[derive(Debug)]
pub struct GaloisField {
    exp: [u8; 256],
    // log[0] is unused, zero has no logarithm
    log: [u8; 256],
}

impl GaloisField {
    pub const fn new() -> Self {
        let mut exp = [0u8; 256];
        let mut log = [0u8; 256];
        let mut x: u16 = 1;
        let mut i = 0;
        while i < 255 {
            exp[i] = x as u8;
            log[x as usize] = i as u8;
            x <<= 1;
            if x & 0x100 != 0 {
                x ^= PRIMITIVE_POLY;
            }
            i += 1;
        }
        // Lets exp be indexed with a log sum that was already reduced to 0..=255
        exp[255] = exp[0];
        Self { exp, log }
    }

    pub fn exp(&self, i: usize) -> u8 {
        self.exp[i % 255]
    }

    pub fn log(&self, x: u8) -> u8 {
        debug_assert!(x != 0, "Log of zero is undefined");
        self.log[x as usize]
    }

    pub fn multiply(&self, a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 {
            return 0;
        }
        self.exp[(self.log(a) as usize + self.log(b) as usize) % 255]
    }

    pub fn divide(&self, a: u8, b: u8) -> u8 {
        debug_assert!(b != 0, "Division by zero in GF(256)");
        if a == 0 {
            return 0;
        }
        self.exp[(self.log(a) as usize + 255 - self.log(b) as usize) % 255]
    }
}

impl Default for GaloisField {
    fn default() -> Self {
        Self::new()
    }
}

pub static GF: GaloisField = GaloisField::new();

const PRIMITIVE_POLY: u16 = 0x11D;

// Field element
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct G(pub u8);

impl G {
    // Power of the generator alpha
    pub fn gen_pow(i: usize) -> Self {
        Self(GF.exp(i))
    }
}

impl From<G> for u8 {
    fn from(g: G) -> Self {
        g.0
    }
}

impl Add for G {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 ^ rhs.0)
    }
}

impl AddAssign for G {
    fn add_assign(&mut self, rhs: Self) {
        self.0 ^= rhs.0;
    }
}

// Subtraction and addition coincide in characteristic 2
impl Sub for G {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 ^ rhs.0)
    }
}

impl Mul for G {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        Self(GF.multiply(self.0, rhs.0))
    }
}

impl MulAssign for G {
    fn mul_assign(&mut self, rhs: Self) {
        self.0 = GF.multiply(self.0, rhs.0);
    }
}

impl Div for G {
    type Output = Self;
    fn div(self, rhs: Self) -> Self::Output {
        Self(GF.divide(self.0, rhs.0))
    }
}

#[cfg(test)]
mod galois_tests {
    use super::{G, GF};

    #[test]
    fn test_tables() {
        assert_eq!(GF.exp(0), 1);
        assert_eq!(GF.exp(1), 2);
        assert_eq!(GF.exp(7), 128);
        assert_eq!(GF.exp(8), 29);
        assert_eq!(GF.exp(255), 1);
        assert_eq!(GF.log(2), 1);
        assert_eq!(GF.log(29), 8);
    }

    #[test]
    fn test_exp_is_a_permutation_of_non_zero_elements() {
        let mut seen = [false; 256];
        for i in 0..255 {
            let x = GF.exp(i);
            assert!(!seen[x as usize], "Duplicate power {x} at {i}");
            seen[x as usize] = true;
            assert_eq!(GF.log(x) as usize, i);
        }
        assert!(!seen[0]);
    }

    #[test]
    fn test_multiply() {
        assert_eq!(GF.multiply(0, 123), 0);
        assert_eq!(GF.multiply(123, 0), 0);
        assert_eq!(GF.multiply(1, 123), 123);
        assert_eq!(GF.multiply(2, 128), 29);
        assert_eq!(GF.multiply(3, 7), 9);
    }

    #[test]
    fn test_divide_inverts_multiply() {
        for a in 0..=255u8 {
            for b in 1..=255u8 {
                assert_eq!(GF.divide(GF.multiply(a, b), b), a);
            }
        }
    }

    #[test]
    fn test_element_ops() {
        let a = G(0x53);
        let b = G(0xCA);
        assert_eq!(a + b, G(0x53 ^ 0xCA));
        assert_eq!(a - b, a + b);
        assert_eq!(a * b / b, a);
        let mut c = a;
        c *= G(1);
        assert_eq!(c, a);
        assert_eq!(G::gen_pow(255), G(1));
    }
}
