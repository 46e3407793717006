//! Double-double arithmetic built from error-free transformations.
//!
//! See: Hida, Li and Bailey. "Library for Double-Double and Quad-Double
//! Arithmetic", and Chapter 4 of the Handbook of Floating-Point Arithmetic.

use core::iter::Product;
use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub};
use core::ops::SubAssign;

use super::float::DDFloat;

/// Knuth's TwoSum: returns `(s, e)` with `s = fl(a + b)` and `s + e == a + b`
/// exactly, for any finite `a` and `b`.
#[inline]
pub(crate) fn two_sum(a: f64, b: f64) -> (f64, f64) {
    let s = a + b;
    let bb = s - a;
    let e = (a - (s - bb)) + (b - bb);
    (s, e)
}

/// Dekker's FastTwoSum. Exact only when `|a| >= |b|` (or `a == 0`).
#[inline]
pub(crate) fn quick_two_sum(a: f64, b: f64) -> (f64, f64) {
    let s = a + b;
    let e = b - (s - a);
    (s, e)
}

/// Returns `(p, e)` with `p = fl(a * b)` and `p + e == a * b` exactly, as long
/// as the product does not underflow. The error term comes from one fused
/// multiply-add.
#[inline]
pub(crate) fn two_prod(a: f64, b: f64) -> (f64, f64) {
    let p = a * b;
    let e = a.mul_add(b, -p);
    (p, e)
}

impl DDFloat {
    /// Wrap up the result of an addition. A zero result follows the native
    /// sign-of-zero rules of `native` (the sum of the leading words), and a
    /// non-finite leading word drops the trailing word.
    #[inline]
    fn finish_sum(hi: f64, lo: f64, native: f64) -> Self {
        if hi == 0.0 {
            let zero = if native == 0.0 { native } else { 0.0 };
            return Self::raw(zero, 0.0);
        }
        if !hi.is_finite() {
            return Self::raw(hi, 0.0);
        }
        Self::raw(hi, lo)
    }

    /// Computes a+b. This is the accurate (IEEE-style) variant that adds the
    /// leading and trailing words separately, so cancellation between the
    /// operands does not cost precision.
    pub fn add_dd(a: Self, b: Self) -> Self {
        let (s1, s2) = two_sum(a.hi(), b.hi());
        if !s1.is_finite() {
            return Self::raw(s1, 0.0);
        }
        let (t1, t2) = two_sum(a.lo(), b.lo());
        let s2 = s2 + t1;
        let (s1, s2) = quick_two_sum(s1, s2);
        let s2 = s2 + t2;
        let (hi, lo) = quick_two_sum(s1, s2);
        Self::finish_sum(hi, lo, a.hi() + b.hi())
    }

    /// Computes a+b where `b` is a machine double.
    pub fn add_f64(a: Self, b: f64) -> Self {
        let (s1, s2) = two_sum(a.hi(), b);
        if !s1.is_finite() {
            return Self::raw(s1, 0.0);
        }
        let s2 = s2 + a.lo();
        let (hi, lo) = quick_two_sum(s1, s2);
        Self::finish_sum(hi, lo, a.hi() + b)
    }

    /// Computes a*b.
    pub fn mul_dd(a: Self, b: Self) -> Self {
        let (p1, p2) = two_prod(a.hi(), b.hi());
        if p1 == 0.0 || !p1.is_finite() {
            return Self::raw(p1, 0.0);
        }
        let p2 = p2 + (a.hi() * b.lo() + a.lo() * b.hi());
        let (hi, lo) = quick_two_sum(p1, p2);
        if !hi.is_finite() {
            return Self::raw(hi, 0.0);
        }
        Self::raw(hi, lo)
    }

    /// Computes a*b where `b` is a machine double.
    pub fn mul_f64(a: Self, b: f64) -> Self {
        let (p1, p2) = two_prod(a.hi(), b);
        if p1 == 0.0 || !p1.is_finite() {
            return Self::raw(p1, 0.0);
        }
        let p2 = p2 + a.lo() * b;
        let (hi, lo) = quick_two_sum(p1, p2);
        if !hi.is_finite() {
            return Self::raw(hi, 0.0);
        }
        Self::raw(hi, lo)
    }

    /// Computes a/b. The quotient of the leading words is refined with two
    /// correction steps, each dividing the exact remainder by `b.hi`.
    pub fn div_dd(a: Self, b: Self) -> Self {
        let q1 = a.hi() / b.hi();
        if q1 == 0.0 || !q1.is_finite() {
            return Self::raw(q1, 0.0);
        }
        let r = a - Self::mul_f64(b, q1);
        if !r.is_finite() {
            return Self::raw(q1, 0.0);
        }
        let q2 = r.hi() / b.hi();
        let r = r - Self::mul_f64(b, q2);
        let q3 = r.hi() / b.hi();
        let (q1, q2) = quick_two_sum(q1, q2);
        Self::add_f64(Self::raw(q1, q2), q3)
    }

    /// Computes a/b where `b` is a machine double.
    pub fn div_f64(a: Self, b: f64) -> Self {
        Self::div_dd(a, Self::from_f64(b))
    }

    /// Returns 1/self, computed with one Newton step on the reciprocal of
    /// the leading word: y' = y + y(1 - self*y).
    pub fn recip(&self) -> Self {
        let y = 1.0 / self.hi();
        if y == 0.0 || !y.is_finite() {
            return Self::raw(y, 0.0);
        }
        let y = Self::from_f64(y);
        let e = Self::ONE - *self * y;
        y + y * e
    }

    /// Returns self*self. Cheaper than a general multiplication.
    pub fn sqr(&self) -> Self {
        let (p1, p2) = two_prod(self.hi(), self.hi());
        if p1 == 0.0 || !p1.is_finite() {
            return Self::raw(p1, 0.0);
        }
        let p2 = p2 + 2.0 * self.hi() * self.lo();
        let (hi, lo) = quick_two_sum(p1, p2);
        if !hi.is_finite() {
            return Self::raw(hi, 0.0);
        }
        Self::raw(hi, lo)
    }

    /// Multiplies by a power of two. Exact unless the result leaves the
    /// normal range.
    pub fn mul_pow2(&self, p: f64) -> Self {
        debug_assert!(p.to_bits() & crate::utils::mask(52) == 0);
        let hi = self.hi() * p;
        if hi == 0.0 || !hi.is_finite() {
            return Self::raw(hi, 0.0);
        }
        Self::raw(hi, self.lo() * p)
    }
}

impl Neg for DDFloat {
    type Output = Self;

    fn neg(self) -> Self {
        Self::raw(-self.hi(), -self.lo())
    }
}

macro_rules! declare_operator {
    ($trait_name:ident,
     $func_name:ident,
     $dd_impl:ident,
     $f64_impl:ident) => {
        impl $trait_name for DDFloat {
            type Output = Self;
            fn $func_name(self, rhs: Self) -> Self {
                Self::$dd_impl(self, rhs)
            }
        }

        impl $trait_name<&DDFloat> for DDFloat {
            type Output = Self;
            fn $func_name(self, rhs: &Self) -> Self {
                Self::$dd_impl(self, *rhs)
            }
        }

        impl $trait_name<f64> for DDFloat {
            type Output = Self;
            fn $func_name(self, rhs: f64) -> Self {
                Self::$f64_impl(self, rhs)
            }
        }

        impl $trait_name<DDFloat> for f64 {
            type Output = DDFloat;
            fn $func_name(self, rhs: DDFloat) -> DDFloat {
                DDFloat::$dd_impl(DDFloat::from_f64(self), rhs)
            }
        }
    };
}

impl DDFloat {
    fn sub_dd(a: Self, b: Self) -> Self {
        Self::add_dd(a, -b)
    }
    fn sub_f64(a: Self, b: f64) -> Self {
        Self::add_f64(a, -b)
    }
}

declare_operator!(Add, add, add_dd, add_f64);
declare_operator!(Sub, sub, sub_dd, sub_f64);
declare_operator!(Mul, mul, mul_dd, mul_f64);
declare_operator!(Div, div, div_dd, div_f64);

macro_rules! declare_assign_operator {
    ($trait_name:ident,
     $func_name:ident,
     $op:tt) => {
        impl $trait_name for DDFloat {
            fn $func_name(&mut self, rhs: Self) {
                *self = *self $op rhs;
            }
        }

        impl $trait_name<f64> for DDFloat {
            fn $func_name(&mut self, rhs: f64) {
                *self = *self $op rhs;
            }
        }
    };
}

declare_assign_operator!(AddAssign, add_assign, +);
declare_assign_operator!(SubAssign, sub_assign, -);
declare_assign_operator!(MulAssign, mul_assign, *);
declare_assign_operator!(DivAssign, div_assign, /);

impl Product for DDFloat {
    fn product<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(DDFloat::ONE, |acc, x| acc * x)
    }
}

#[cfg(test)]
fn rel_err(a: DDFloat, b: DDFloat) -> f64 {
    ((a - b) / b).hi().abs()
}

#[test]
fn test_operators() {
    let a = DDFloat::from(8);
    let b = DDFloat::from(2);
    assert_eq!(a + b, 10.0);
    assert_eq!(a - b, 6.0);
    assert_eq!(a * b, 16.0);
    assert_eq!(a / b, 4.0);
    assert_eq!(-a, -8.0);
    assert_eq!(a + 0.5, 8.5);
    assert_eq!(1.0 - a, -7.0);

    let mut c = a;
    c += b;
    c *= 3.0;
    c -= 1.0;
    c /= b;
    assert_eq!(c, 14.5);
}

#[test]
fn test_add_keeps_small_bits() {
    let tiny = crate::utils::scalbn(1.0, -80);
    let x = DDFloat::ONE + tiny;
    assert_eq!(x.hi(), 1.0);
    assert_eq!(x.lo(), tiny);
    assert_eq!(x - 1.0, tiny);

    // Catastrophic cancellation in the leading words is exact.
    let a = DDFloat::new(1.0, 1e-20);
    let b = DDFloat::new(-1.0, 3e-21);
    let c = a + b;
    assert_eq!(c.hi(), 1e-20 + 3e-21);
}

#[test]
fn test_add_matches_two_sum() {
    use crate::utils::Lfsr;

    let mut lfsr = Lfsr::new();
    for _ in 0..20000 {
        let a = lfsr.get_f64_in(-300, 300);
        let b = -lfsr.get_f64_in(-300, 300);
        let x = DDFloat::from_f64(a) + DDFloat::from_f64(b);
        let (s, e) = two_sum(a, b);
        assert_eq!((x.hi(), x.lo()), (s, e));
        assert!(x.is_regular());

        let y = DDFloat::from_f64(a) * DDFloat::from_f64(b);
        let (p, e) = two_prod(a, b);
        assert_eq!((y.hi(), y.lo()), (p, e));
    }
}

#[test]
fn add_special_values() {
    use crate::utils;

    // The leading word of the sum of two promoted doubles is the native sum.
    let values = utils::get_special_test_values();
    for v0 in values {
        for v1 in values {
            let r0 = (DDFloat::from_f64(v0) + DDFloat::from_f64(v1)).hi();
            let r1 = v0 + v1;
            assert_eq!(r0.is_nan(), r1.is_nan());
            assert!(r1.is_nan() || r0.to_bits() == r1.to_bits());

            let r0 = (DDFloat::from_f64(v0) - DDFloat::from_f64(v1)).hi();
            let r1 = v0 - v1;
            assert_eq!(r0.is_nan(), r1.is_nan());
            assert!(r1.is_nan() || r0.to_bits() == r1.to_bits());
        }
    }
}

#[test]
fn test_mul_special_values() {
    use crate::utils;

    let values = utils::get_special_test_values();
    for v0 in values {
        for v1 in values {
            let r0 = (DDFloat::from_f64(v0) * DDFloat::from_f64(v1)).hi();
            let r1 = v0 * v1;
            assert_eq!(r0.is_finite(), r1.is_finite());
            assert_eq!(r0.is_nan(), r1.is_nan());
            assert_eq!(r0.is_infinite(), r1.is_infinite());
            // Check that the results are bit identical, or are both NaN.
            assert!(r1.is_nan() || r0.to_bits() == r1.to_bits());
        }
    }
}

#[test]
fn test_div_special_values() {
    use crate::utils;

    let values = utils::get_special_test_values();
    for v0 in values {
        for v1 in values {
            let r0 = (DDFloat::from_f64(v0) / DDFloat::from_f64(v1)).hi();
            let r1 = v0 / v1;
            assert_eq!(r0.is_nan(), r1.is_nan());
            assert_eq!(r0.is_infinite(), r1.is_infinite());
            assert!(!r1.is_normal() || r0.to_bits() == r1.to_bits());
        }
    }
}

#[test]
fn test_div_accuracy() {
    use crate::utils::Lfsr;

    let third = DDFloat::ONE / 3.0;
    assert_eq!(third.hi(), 1.0 / 3.0);
    assert!(rel_err(third * 3.0, DDFloat::ONE) < 5e-32);

    let mut lfsr = Lfsr::new_with_seed(3);
    for _ in 0..5000 {
        let a = DDFloat::new(lfsr.get_f64_in(-40, 40), lfsr.get_f64_in(-100, -95));
        let b = DDFloat::new(lfsr.get_f64_in(-40, 40), -lfsr.get_f64_in(-100, -95));
        let q = a / b;
        assert!(q.is_regular());
        assert!(rel_err(q * b, a) < 2e-31);
        assert!(rel_err(b.recip() * a, q) < 2e-31);
    }
}

#[test]
fn test_sqr_and_pow2() {
    let x = DDFloat::ONE / 7.0;
    assert!(rel_err(x.sqr(), x * x) < 1e-32);
    assert_eq!(x.mul_pow2(8.0), x * 8.0);
    assert_eq!(x.mul_pow2(0.25).hi(), x.hi() * 0.25);
    assert!(DDFloat::MAX.mul_pow2(2.0).is_inf());

    let p: DDFloat = [2.0, 3.0, 7.0].iter().map(|v| DDFloat::from_f64(*v)).product();
    assert_eq!(p, 42.0);
}

#[test]
fn test_zero_signs() {
    let z = DDFloat::NEG_ZERO + DDFloat::NEG_ZERO;
    assert!(z.is_zero() && z.is_negative());
    let z = DDFloat::NEG_ZERO + DDFloat::ZERO;
    assert!(z.is_zero() && !z.is_negative());
    let z = DDFloat::from_f64(-2.0) * DDFloat::ZERO;
    assert!(z.is_zero() && z.is_negative());
    let z = DDFloat::new(1.0, 1e-20) - DDFloat::new(1.0, 1e-20);
    assert!(z.is_zero() && !z.is_negative());
}
