//! This file contains simple helper functions and test helpers.

/// Number of explicit mantissa bits in an IEEE double.
pub(crate) const F64_MANTISSA_BITS: u32 = 52;
/// Exponent bias of an IEEE double.
pub(crate) const F64_BIAS: i32 = 1023;

/// Returns a mask full of 1s, of `b` bits.
pub(crate) fn mask(b: u32) -> u64 {
    if b >= 64 {
        return u64::MAX;
    }
    (1u64 << b) - 1
}

#[test]
fn test_masking() {
    assert_eq!(mask(0), 0x0);
    assert_eq!(mask(1), 0x1);
    assert_eq!(mask(8), 255);
    assert_eq!(mask(64), u64::MAX);
}

/// Computes `x * 2^n` by editing the exponent field. The result is exact
/// unless it overflows or lands in the subnormal range.
pub(crate) fn scalbn(mut x: f64, mut n: i32) -> f64 {
    // 2^1023, 2^-1022 and 2^53.
    let exp_max = f64::from_bits(0x7fe0_0000_0000_0000);
    let exp_min = f64::from_bits(0x0010_0000_0000_0000);
    let subnorm = f64::from_bits(0x4340_0000_0000_0000);

    // Pre-scale in up to two steps so the final power of two is
    // representable.
    if n > 1023 {
        x *= exp_max;
        n -= 1023;
        if n > 1023 {
            x *= exp_max;
            n -= 1023;
            n = n.min(1023);
        }
    } else if n < -1022 {
        x *= exp_min * subnorm;
        n += 1022 - 53;
        if n < -1022 {
            x *= exp_min * subnorm;
            n += 1022 - 53;
            n = n.max(-1022);
        }
    }
    x * f64::from_bits(((F64_BIAS + n) as u64) << F64_MANTISSA_BITS)
}

/// Returns the unbiased binary exponent of a finite non-zero double, so that
/// `2^e <= |x| < 2^(e+1)`. Subnormals report their true exponent.
pub(crate) fn ilogb_f64(x: f64) -> i32 {
    debug_assert!(x.is_finite() && x != 0.0);
    let bits = x.to_bits();
    let biased = ((bits >> F64_MANTISSA_BITS) & mask(11)) as i32;
    if biased == 0 {
        // Subnormal: the exponent is fixed, the leading one moves down.
        let m = bits & mask(F64_MANTISSA_BITS);
        let lead = 63 - m.leading_zeros() as i32;
        return lead - F64_MANTISSA_BITS as i32 - (F64_BIAS - 1);
    }
    biased - F64_BIAS
}

/// Splits a finite double into `(sign, significand, exponent)` with
/// `|x| == significand * 2^exponent`. The significand is an integer.
pub(crate) fn decompose_f64(x: f64) -> (bool, u64, i32) {
    let bits = x.to_bits();
    let sign = (bits >> 63) == 1;
    let biased = ((bits >> F64_MANTISSA_BITS) & mask(11)) as i32;
    let frac = bits & mask(F64_MANTISSA_BITS);
    if biased == 0 {
        return (sign, frac, 1 - F64_BIAS - F64_MANTISSA_BITS as i32);
    }
    let m = frac | (1u64 << F64_MANTISSA_BITS);
    (sign, m, biased - F64_BIAS - F64_MANTISSA_BITS as i32)
}

#[test]
fn test_scalbn() {
    assert_eq!(scalbn(1.0, 10), 1024.0);
    assert_eq!(scalbn(3.0, -1), 1.5);
    assert_eq!(scalbn(1.0, 1023), f64::from_bits(0x7fe0_0000_0000_0000));
    assert_eq!(scalbn(1.0, 1024), f64::INFINITY);
    assert_eq!(scalbn(1.0, -1074), f64::from_bits(1));
    assert_eq!(scalbn(f64::from_bits(1), 1074), 1.0);
    assert!(scalbn(f64::NAN, 3).is_nan());
    assert_eq!(scalbn(-0.0, 5).to_bits(), (-0.0f64).to_bits());
}

#[test]
fn test_ilogb_and_decompose() {
    assert_eq!(ilogb_f64(1.0), 0);
    assert_eq!(ilogb_f64(1.5), 0);
    assert_eq!(ilogb_f64(2.0), 1);
    assert_eq!(ilogb_f64(-0.75), -1);
    assert_eq!(ilogb_f64(f64::MIN_POSITIVE), -1022);
    assert_eq!(ilogb_f64(f64::from_bits(1)), -1074);
    assert_eq!(ilogb_f64(f64::from_bits(3)), -1073);

    for v in [1.0, -3.25, 1e300, 5e-324, f64::MAX, 0.1] {
        let (sign, m, e) = decompose_f64(v);
        let back = scalbn(m as f64, e);
        assert_eq!(if sign { -back } else { back }, v);
    }
}

#[allow(dead_code)]
/// Returns list of interesting values that various tests use to catch edge cases.
pub fn get_special_test_values() -> [f64; 20] {
    [
        -f64::NAN,
        f64::NAN,
        f64::INFINITY,
        f64::NEG_INFINITY,
        f64::EPSILON,
        -f64::EPSILON,
        0.000000000000000000000000000000000000001,
        f64::MIN,
        f64::MAX,
        std::f64::consts::PI,
        std::f64::consts::LN_2,
        std::f64::consts::SQRT_2,
        std::f64::consts::E,
        0.0,
        -0.0,
        10.,
        -10.,
        -0.00001,
        0.1,
        355. / 113.,
    ]
}

// Linear-feedback shift register. We use this as a random number generator for
// tests.
#[cfg(test)]
pub struct Lfsr {
    state: u32,
}

#[cfg(test)]
impl Default for Lfsr {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl Lfsr {
    /// Generate a new LFSR number generator.
    pub fn new() -> Lfsr {
        Lfsr { state: 0x13371337 }
    }

    /// Generate a new LFSR number generator that starts with a specific state.
    pub fn new_with_seed(seed: u32) -> Lfsr {
        Lfsr {
            state: 0x13371337 ^ seed,
        }
    }

    pub fn next(&mut self) {
        let a = (self.state >> 24) & 1;
        let b = (self.state >> 23) & 1;
        let c = (self.state >> 22) & 1;
        let d = (self.state >> 17) & 1;
        let n = a ^ b ^ c ^ d ^ 1;
        self.state <<= 1;
        self.state |= n;
    }

    fn get(&mut self) -> u32 {
        let mut res: u32 = 0;
        for _ in 0..32 {
            self.next();
            res <<= 1;
            res ^= self.state & 0x1;
        }
        res
    }

    pub fn get64(&mut self) -> u64 {
        ((self.get() as u64) << 32) | self.get() as u64
    }

    /// Returns a double with a random significand and a binary exponent in
    /// the range `[lo_exp, hi_exp]`.
    pub fn get_f64_in(&mut self, lo_exp: i32, hi_exp: i32) -> f64 {
        let span = (hi_exp - lo_exp + 1) as u64;
        let e = lo_exp + (self.get64() % span) as i32;
        let m = (self.get64() & mask(52)) | (1 << 52);
        scalbn(m as f64, e - 52)
    }
}

// Implement `Iterator` for `Lfsr`.
#[cfg(test)]
impl Iterator for Lfsr {
    type Item = u64;
    fn next(&mut self) -> Option<Self::Item> {
        Some(self.get64())
    }
}

#[test]
fn test_lfsr_balance() {
    let mut lfsr = Lfsr::new();

    // Count the number of items, and the number of 1s.
    let mut items = 0;
    let mut ones = 0;

    for _ in 0..10000 {
        let mut u = lfsr.get();
        for _ in 0..32 {
            items += 1;
            ones += u & 1;
            u >>= 1;
        }
    }
    // Make sure that we have around 50% 1s and 50% zeros.
    assert!((ones as f64) < (0.55 * items as f64));
    assert!((ones as f64) > (0.45 * items as f64));
}

#[test]
fn test_lfsr_exponent_range() {
    let mut lfsr = Lfsr::new_with_seed(7);
    for _ in 0..1000 {
        let v = lfsr.get_f64_in(-3, 4);
        assert!(v >= 0.125 && v < 32.0);
    }
}

/// Returns the relative distance between `actual` and the value parsed from
/// `expected`.
#[cfg(test)]
pub(crate) fn rel_err_to(actual: crate::DDFloat, expected: &str) -> f64 {
    let expected = crate::DDFloat::parse(expected).unwrap();
    if expected.is_zero() {
        return actual.hi().abs();
    }
    ((actual - expected) / expected).hi().abs()
}
