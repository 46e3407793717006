//! This module contains the implementation of the root kernels and several
//! arithmetic operations.

use crate::scale::adjust_scale;
use crate::DDFloat;

/// The largest degree handled by the Newton-style root kernel. Larger roots
/// go through exp and ln.
pub const MAX_NEWTON_ROOT: u32 = 256;

impl DDFloat {
    /// Return this number raised to the power of 'n'. Negative powers take
    /// the reciprocal of the positive power.
    pub fn powi(&self, n: i32) -> Self {
        // This algorithm is similar to binary conversion. Each bit in 'n'
        // represents a power-of-two number, like 1,2,4,8 ... We generate the
        // even powers by squaring, and multiply together the powers that
        // have their bit set.
        let mut bits = n.unsigned_abs();
        let mut elem = Self::ONE;
        let mut val = *self;
        while bits > 0 {
            if bits & 1 == 1 {
                elem *= val;
            }
            bits >>= 1;
            if bits > 0 {
                val = val.sqr();
            }
        }
        if n < 0 {
            return elem.recip();
        }
        elem
    }

    /// Calculates the square root of the number.
    pub fn sqrt(&self) -> Self {
        if self.is_zero() {
            return *self; // (+/-) zero
        } else if self.is_nan() || self.is_negative() {
            return Self::NAN; // (-/+)Nan, -Number.
        } else if self.is_inf() {
            return *self; // Inf+.
        }

        // Reduce to f in [1, 4) with an even exponent.
        let (mut n, mut f) = self.frexp();
        if n % 2 != 0 {
            f = f.mul_pow2(2.0);
            n -= 1;
        }

        // Refine the inverse square root seed with a cubic correction, then
        // polish the root with one Newton step.
        let a = Self::from_f64(1.0 / f.hi().sqrt());
        let h = Self::ONE - f * a.sqr();
        let a = a + a * h * (h * 0.375 + 0.5);
        let r = f * a;
        let r = r + (f - r.sqr()) * a.mul_pow2(0.5);
        Self::snap_exact_root(r, f, 2).ldexp(n / 2)
    }

    /// Calculates the cube root of the number. Negative numbers have a
    /// negative cube root.
    pub fn cbrt(&self) -> Self {
        if self.is_zero() || !self.is_finite() {
            return *self;
        }

        let sign = self.is_negative();
        let (n, f) = self.abs().frexp();
        // Reduce to f in [1, 8).
        let m = n.rem_euclid(3);
        let f = f.ldexp(m);
        let q = (n - m) / 3;

        let a = Self::from_f64(1.0 / f.hi().cbrt());
        let h = Self::ONE - f * a.powi(3);
        // (1 - h)^(-1/3) = 1 + h/3 + 2h^2/9 + 14h^3/81 + ...
        let poly = ((h * (14.0 / 81.0) + 2.0 / 9.0) * h + Self::ONE / 3.0) * h;
        let a = a + a * poly;
        let a2 = a.sqr();
        let r = f * a2;
        let r = r + (f - r.powi(3)) * a2 / 3.0;
        let r = Self::snap_exact_root(r, f, 3).ldexp(q);
        if sign {
            -r
        } else {
            r
        }
    }

    /// Calculates the n-th root of the number. Odd roots of negative numbers
    /// are negative. Even roots of negative numbers, and the zeroth root, are
    /// NaN.
    pub fn root_n(&self, n: u32) -> Self {
        match n {
            0 => return Self::NAN,
            1 => return *self,
            2 => return self.sqrt(),
            3 => return self.cbrt(),
            _ => {}
        }

        let odd = n % 2 == 1;
        if self.is_nan() {
            return Self::NAN;
        } else if self.is_zero() {
            return if odd { *self } else { Self::ZERO };
        } else if self.is_negative() && !odd {
            return Self::NAN;
        } else if self.is_inf() {
            return *self;
        }

        let sign = self.is_negative();
        let x = self.abs();
        let r = if n > MAX_NEWTON_ROOT {
            (x.ln() / n as f64).exp()
        } else {
            Self::root_kernel(x, n)
        };
        if sign {
            -r
        } else {
            r
        }
    }

    /// The n-th root of a positive finite number, for n <= 256.
    fn root_kernel(x: Self, n: u32) -> Self {
        let (e, f) = x.frexp();
        let ni = n as i32;
        let m = e.rem_euclid(ni);
        let f = f.ldexp(m);
        let q = (e - m) / ni;

        // Seed the inverse root and correct it with the first terms of the
        // binomial series (1 - h)^(-1/n) = sum(c_k h^k), where
        // c_k = (1/n)(1/n + 1)...(1/n + k - 1) / k!.
        let a = Self::from_f64(f.hi().powf(-1.0 / n as f64));
        let h = Self::ONE - f * a.powi(ni);
        let inv_n = Self::ONE / n as f64;
        let mut c = Self::ONE;
        let mut coefficients = [Self::ONE; 5];
        for (k, slot) in coefficients.iter_mut().enumerate().skip(1) {
            c = c * (inv_n + (k - 1) as f64) / k as f64;
            *slot = c;
        }
        let mut poly = Self::ZERO;
        for c in coefficients.iter().rev() {
            poly = poly * h + c;
        }
        let r = (a * poly).recip();
        Self::snap_exact_root(r, f, ni).ldexp(q)
    }

    /// Returns the leading word of `r` when it is the exact n-th root of
    /// `f`, and `r` otherwise. This makes roots of perfect powers exact.
    fn snap_exact_root(r: Self, f: Self, n: i32) -> Self {
        let hi = Self::from_f64(r.hi());
        if hi.powi(n) == f {
            return hi;
        }
        r
    }

    /// Returns sqrt(x^2 + y^2) without overflow or underflow in the
    /// intermediate squares. Infinity wins over NaN.
    pub fn hypot(&self, other: &Self) -> Self {
        if self.is_inf() || other.is_inf() {
            return Self::INFINITY;
        } else if self.is_nan() || other.is_nan() {
            return Self::NAN;
        }
        let (n, [x, y]) = adjust_scale(0, [self.abs(), other.abs()]);
        (x.sqr() + y.sqr()).sqrt().ldexp(-n)
    }

    /// Returns sqrt(x^2 + y^2 + z^2), with the same scaling and special
    /// value rules as `hypot`.
    pub fn hypot3(&self, y: &Self, z: &Self) -> Self {
        if self.is_inf() || y.is_inf() || z.is_inf() {
            return Self::INFINITY;
        } else if self.is_nan() || y.is_nan() || z.is_nan() {
            return Self::NAN;
        }
        let (n, [x, y, z]) = adjust_scale(0, [self.abs(), y.abs(), z.abs()]);
        (x.sqr() + y.sqr() + z.sqr()).sqrt().ldexp(-n)
    }

    /// Returns the absolute value of this number.
    pub fn abs(&self) -> Self {
        if self.is_negative() {
            -*self
        } else {
            *self
        }
    }

    /// Returns the greater of self and `other`.
    pub fn max(&self, other: &Self) -> Self {
        if self.is_nan() {
            return *other;
        } else if other.is_nan() {
            return *self;
        } else if self.is_negative() != other.is_negative() {
            return if self.is_negative() { *other } else { *self }; // Handle (+-)0.
        }
        if self > other {
            *self
        } else {
            *other
        }
    }

    /// Returns the smaller of self and `other`.
    pub fn min(&self, other: &Self) -> Self {
        if self.is_nan() {
            return *other;
        } else if other.is_nan() {
            return *self;
        } else if self.is_negative() != other.is_negative() {
            return if self.is_negative() { *self } else { *other }; // Handle (+-)0.
        }
        if self > other {
            *other
        } else {
            *self
        }
    }
}

#[cfg(test)]
fn rel_err(a: DDFloat, b: DDFloat) -> f64 {
    ((a - b) / b).hi().abs()
}

#[test]
fn test_sqrt() {
    use crate::utils;

    // Try a few perfect squares.
    for i in 0..256 {
        let v = DDFloat::from(i * i);
        assert_eq!(v.sqrt(), i as f64);
    }

    // Test the category and value of the different special values (inf, zero,
    // correct sign, etc).
    for v_f64 in utils::get_special_test_values() {
        let vf = DDFloat::from_f64(v_f64);
        assert_eq!(vf.sqrt().is_inf(), v_f64.sqrt().is_infinite());
        assert_eq!(vf.sqrt().is_nan(), v_f64.sqrt().is_nan());
        if v_f64.is_finite() && v_f64 >= 0.0 {
            assert_eq!(vf.sqrt().is_negative(), v_f64.sqrt().is_sign_negative());
            // The leading word agrees with the native root.
            let r = vf.sqrt().hi();
            assert!((r - v_f64.sqrt()).abs() <= r * f64::EPSILON);
        }
    }

    let s = DDFloat::from(2).sqrt();
    assert!(utils::rel_err_to(s, "1.414213562373095048801688724209698") < 1e-32);
    assert!(rel_err(s, DDFloat::SQRT_2) < 1e-32);
    let s = DDFloat::ONE.ldexp(-1001).sqrt();
    assert!(rel_err(s * DDFloat::SQRT_2, DDFloat::ONE.ldexp(-500)) < 1e-31);
}

#[test]
fn test_sqrt_random() {
    use crate::utils::Lfsr;

    // 2^-100.
    let bound = 7.888609052210118e-31;
    let mut lfsr = Lfsr::new();
    for _ in 0..5000 {
        let hi = lfsr.get_f64_in(-960, 960);
        let x = DDFloat::new(hi, hi * lfsr.get_f64_in(-60, -54));
        let r = x.sqrt();
        assert!(r.is_regular());
        assert!(rel_err(r.sqr(), x) < bound);
    }
}

#[test]
fn test_cbrt() {
    use crate::utils::{rel_err_to, Lfsr};

    let r = DDFloat::from(27).cbrt();
    assert!((r - 3.0).abs() < 1e-31);
    assert_eq!(DDFloat::from(-8).cbrt(), -2.0);
    assert!(rel_err_to(DDFloat::from(2).cbrt(), "1.25992104989487316476721060727822835057") < 1e-32);
    assert!(DDFloat::NEG_ZERO.cbrt().is_negative());
    assert!(DDFloat::NEG_INFINITY.cbrt().is_inf());
    assert!(DDFloat::NAN.cbrt().is_nan());

    let mut lfsr = Lfsr::new_with_seed(5);
    for _ in 0..3000 {
        let hi = lfsr.get_f64_in(-900, 900);
        let x = DDFloat::new(hi, hi * lfsr.get_f64_in(-60, -54));
        let x = if lfsr.get64() % 2 == 0 { x } else { -x };
        let r = x.cbrt();
        assert_eq!(r.is_negative(), x.is_negative());
        assert!(rel_err(r.powi(3), x) < 1e-30);
    }
}

#[test]
fn test_root_n() {
    use crate::utils::{rel_err_to, Lfsr};

    assert_eq!(DDFloat::from(8).root_n(3), 2.0);
    assert_eq!(DDFloat::from(81).root_n(4), 3.0);
    assert!(rel_err_to(DDFloat::from(10).root_n(7), "1.389495494373137637129985217353011622113") < 1e-32);
    assert!(rel_err(DDFloat::from(-128).root_n(7), DDFloat::from(-2)) < 1e-32);

    // Special values.
    assert!(DDFloat::from(5).root_n(0).is_nan());
    assert_eq!(DDFloat::from(5).root_n(1), 5.0);
    assert!(DDFloat::from(-16).root_n(4).is_nan());
    assert!(DDFloat::NAN.root_n(5).is_nan());
    assert!(DDFloat::NEG_ZERO.root_n(5).is_negative());
    let z = DDFloat::NEG_ZERO.root_n(6);
    assert!(z.is_zero() && !z.is_negative());
    assert_eq!(DDFloat::NEG_INFINITY.root_n(7), f64::NEG_INFINITY);
    assert!(DDFloat::NEG_INFINITY.root_n(8).is_nan());

    let mut lfsr = Lfsr::new_with_seed(9);
    for n in [2, 3, 4, 5, 7, 9, 16, 255] {
        for _ in 0..300 {
            let hi = lfsr.get_f64_in(-900, 900);
            let x = DDFloat::new(hi, hi * lfsr.get_f64_in(-60, -54));
            let r = x.root_n(n);
            assert!(rel_err(r.powi(n as i32), x) < 1e-28, "{} {}", x, n);
        }
    }

    // Large degrees go through exp and ln.
    let x = DDFloat::ONE.ldexp(600);
    assert!(rel_err(x.root_n(300), DDFloat::from(4)) < 1e-30);
    let r = DDFloat::from(-3).root_n(1001);
    assert!(r.is_negative());
    assert!(rel_err(r.powi(1001), DDFloat::from(-3)) < 1e-27);
}

#[test]
fn test_hypot() {
    let x = DDFloat::from(3).hypot(&DDFloat::from(-4));
    assert_eq!(x, 5.0);
    let x = DDFloat::from(2).hypot3(&DDFloat::from(3), &DDFloat::from(6));
    assert_eq!(x, 7.0);

    // The squares would overflow or underflow.
    let big = DDFloat::from_f64(1e300);
    let h = big.hypot(&big);
    assert!(h.is_finite());
    assert!(rel_err(h, big * DDFloat::SQRT_2) < 1e-31);
    let tiny = DDFloat::from_f64(3e-300);
    let h = tiny.hypot3(&tiny, &tiny);
    assert!(rel_err(h, tiny * DDFloat::from(3).sqrt()) < 1e-31);

    // Infinity wins over NaN.
    assert!(DDFloat::NAN.hypot(&DDFloat::NEG_INFINITY).is_inf());
    assert!(DDFloat::NAN.hypot3(&DDFloat::ONE, &DDFloat::INFINITY).is_inf());
    assert!(DDFloat::NAN.hypot(&DDFloat::ONE).is_nan());
    assert_eq!(DDFloat::ZERO.hypot(&DDFloat::NEG_ZERO), 0.0);
}

#[test]
fn test_min_max() {
    use crate::utils;

    fn check(v0: f64, v1: f64) {
        // Min.
        let correct = v0.min(v1);
        let test = DDFloat::from_f64(v0).min(&DDFloat::from_f64(v1)).to_f64();
        assert_eq!(test.is_nan(), correct.is_nan());
        if !correct.is_nan() {
            assert_eq!(correct, test);
        }
        // Max.
        let correct = v0.max(v1);
        let test = DDFloat::from_f64(v0).max(&DDFloat::from_f64(v1)).to_f64();
        assert_eq!(test.is_nan(), correct.is_nan());
        if !correct.is_nan() {
            assert_eq!(correct, test);
        }
    }

    // Test a bunch of special values (Inf, Epsilon, Nan, (+-)Zeros).
    for v0 in utils::get_special_test_values() {
        for v1 in utils::get_special_test_values() {
            check(v0, v1);
        }
    }

    let mut lfsr = utils::Lfsr::new();

    for _ in 0..100 {
        let v0 = f64::from_bits(lfsr.get64());
        let v1 = f64::from_bits(lfsr.get64());
        check(v0, v1);
    }

    // The trailing word breaks ties.
    let a = DDFloat::new(1.0, 1e-20);
    let b = DDFloat::new(1.0, -1e-20);
    assert_eq!(a.max(&b), a);
    assert_eq!(a.min(&b), b);
}

#[test]
fn test_abs() {
    use crate::utils;

    for v in utils::get_special_test_values() {
        if !v.is_nan() {
            assert_eq!(DDFloat::from_f64(v).abs().to_f64(), v.abs());
        }
    }
    let x = DDFloat::new(-1.0, 1e-20);
    assert_eq!(x.abs(), DDFloat::new(1.0, -1e-20));
}

#[test]
fn test_powi() {
    assert_eq!(DDFloat::from(2).powi(0), 1.);
    assert_eq!(DDFloat::from(2).powi(1), 2.);
    assert_eq!(DDFloat::from(2).powi(3), 8.);
    assert_eq!(DDFloat::from(2).powi(10), 1024.);
    assert_eq!(DDFloat::from(2).powi(-2), 0.25);
    assert_eq!(DDFloat::from(3).powi(40), DDFloat::from(3u64.pow(40)));
    assert!(DDFloat::NAN.powi(0) == 1.0);
    assert!(DDFloat::from(10).powi(400).is_inf());
    assert!(DDFloat::from(10).powi(-400).is_zero());

    // 0.3 is not exact; compare with the exact decimal expansion.
    let x = DDFloat::parse("0.3").unwrap();
    assert!(crate::utils::rel_err_to(x.powi(3), "0.027") < 1e-31);
}
