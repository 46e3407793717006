//! Exponent management: split a number into a significand and a power of
//! two, scale by powers of two, and bring groups of operands into a common
//! range before a computation that could overflow or underflow.

use super::float::DDFloat;
use super::utils::{ilogb_f64, scalbn};

impl DDFloat {
    /// Returns the binary exponent of the leading word, so that
    /// `2^e <= |hi| < 2^(e+1)`. Zero and NaN return `i32::MIN`, infinity
    /// returns `i32::MAX`.
    pub fn ilogb(&self) -> i32 {
        if self.is_nan() || self.is_zero() {
            return i32::MIN;
        }
        if self.is_inf() {
            return i32::MAX;
        }
        ilogb_f64(self.hi())
    }

    /// Scale the number by `2^n`. Both words are scaled separately, so the
    /// operation is exact unless the result leaves the normal range.
    pub fn ldexp(&self, n: i32) -> Self {
        let hi = scalbn(self.hi(), n);
        if hi == 0.0 || !hi.is_finite() {
            return Self::raw(hi, 0.0);
        }
        Self::raw(hi, scalbn(self.lo(), n))
    }

    /// Split the number into `(n, f)` such that `self == f * 2^n` and the
    /// value of `f` is in the range `[1, 2)` in magnitude. The leading word of
    /// `f` is usually in the same range, except when it is exactly 1 and the
    /// trailing word pulls the value below one; then `f` is doubled instead.
    /// Zeros return `(0, self)` and keep their sign, NaN and infinity return
    /// `(0, NaN)`.
    pub fn frexp(&self) -> (i32, Self) {
        if self.is_zero() {
            return (0, *self);
        }
        if !self.is_finite() {
            return (0, Self::NAN);
        }
        let n = ilogb_f64(self.hi());
        let f = self.ldexp(-n);
        if f.hi().abs() == 1.0 && f.hi() * f.lo() < 0.0 {
            return (n - 1, f.mul_pow2(2.0));
        }
        (n, f)
    }
}

/// Scale a group of operands by a common power of two so that the largest
/// of them has the binary exponent `target_exp`. Returns the shift `n` that
/// was applied (each result is `operand * 2^n`) and the scaled operands.
/// The caller undoes the shift with `ldexp(-n)` on the final result.
///
/// When one of the operands is NaN or infinite, or when all of them are
/// zero, the operands are returned unchanged with a shift of zero.
pub fn adjust_scale<const N: usize>(
    target_exp: i32,
    operands: [DDFloat; N],
) -> (i32, [DDFloat; N]) {
    if operands.iter().any(|x| !x.is_finite()) {
        return (0, operands);
    }

    let mut largest = 0.0;
    for x in &operands {
        largest = f64::max(largest, x.hi().abs());
    }
    if largest == 0.0 {
        return (0, operands);
    }

    let n = target_exp - ilogb_f64(largest);
    (n, operands.map(|x| x.ldexp(n)))
}

#[test]
fn test_ldexp_and_ilogb() {
    let x = DDFloat::new(3.0, 1e-20);
    let y = x.ldexp(10);
    assert_eq!(y.hi(), 3072.0);
    assert_eq!(y.lo(), 1e-20 * 1024.0);
    assert_eq!(y.ldexp(-10), x);
    assert_eq!(y.ilogb(), 11);

    assert_eq!(DDFloat::ONE.ldexp(1024), f64::INFINITY);
    assert_eq!(DDFloat::ONE.ldexp(-1075).hi(), 0.0);
    assert_eq!(DDFloat::from_f64(f64::MIN_POSITIVE).ilogb(), -1022);
    assert_eq!(DDFloat::from_f64(5e-324).ilogb(), -1074);
    assert_eq!(DDFloat::ZERO.ilogb(), i32::MIN);
    assert_eq!(DDFloat::NAN.ilogb(), i32::MIN);
    assert_eq!(DDFloat::NEG_INFINITY.ilogb(), i32::MAX);
}

#[test]
fn test_frexp() {
    let (n, f) = DDFloat::from(12).frexp();
    assert_eq!(n, 3);
    assert_eq!(f, 1.5);

    let (n, f) = DDFloat::from_f64(-0.375).frexp();
    assert_eq!(n, -2);
    assert_eq!(f, -1.5);

    let (n, f) = DDFloat::ZERO.frexp();
    assert_eq!(n, 0);
    assert!(f.is_zero() && !f.is_negative());
    let (n, f) = DDFloat::NEG_ZERO.frexp();
    assert_eq!(n, 0);
    assert!(f.is_zero() && f.is_negative());

    assert!(DDFloat::INFINITY.frexp().1.is_nan());
    assert!(DDFloat::NAN.frexp().1.is_nan());

    // A leading word of exactly one with a negative trailing word means the
    // value is just below one.
    let x = DDFloat::new(8.0, -1e-20);
    let (n, f) = x.frexp();
    assert_eq!(n, 2);
    assert_eq!(f.hi(), 2.0);
    assert!(f < 2.0 && f >= 1.0);
    assert_eq!(f.ldexp(n), x);

    // Subnormal leading words.
    let x = DDFloat::from_f64(3.0 * 5e-324);
    let (n, f) = x.frexp();
    assert_eq!(n, -1073);
    assert_eq!(f, 1.5);
}

#[test]
fn test_adjust_scale() {
    let a = DDFloat::new(3.0e200, 1e180);
    let b = DDFloat::from_f64(-5.0e190);
    let (n, [sa, sb]) = adjust_scale(0, [a, b]);
    assert_eq!(sa.ilogb(), 0);
    assert_eq!(n, -a.ilogb());
    assert!(sb.hi().abs() < 1.0);

    // Non-finite or all-zero operands are left alone.
    let (n, out) = adjust_scale(0, [a, DDFloat::NAN]);
    assert_eq!(n, 0);
    assert_eq!(out[0], a);
    let (n, out) = adjust_scale(5, [DDFloat::ZERO, DDFloat::NEG_ZERO, DDFloat::ZERO]);
    assert_eq!(n, 0);
    assert!(out[1].is_negative());
}

#[test]
fn test_adjust_scale_is_invertible() {
    use super::utils::Lfsr;

    // Scaling and then scaling back is bit-exact as long as nothing drops
    // out of the normal range.
    let mut lfsr = Lfsr::new();
    for _ in 0..2000 {
        let base = (lfsr.get64() % 1200) as i32 - 600;
        let mut ops = [DDFloat::ZERO; 4];
        for op in ops.iter_mut() {
            let hi = lfsr.get_f64_in(base - 40, base + 40);
            let lo = hi * lfsr.get_f64_in(-60, -54);
            *op = DDFloat::new(hi, lo);
        }
        for target in [-100, 0, 300] {
            let (n, scaled) = adjust_scale(target, ops);
            for (orig, s) in ops.iter().zip(scaled.iter()) {
                assert_eq!(orig.to_bits(), s.ldexp(-n).to_bits());
            }
        }
    }
}
