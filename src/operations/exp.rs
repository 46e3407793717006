//! This module contains the implementation of log- and exp-related methods.

use super::constants::LN_2_TAIL;
use super::rational::{pade_exp, Bound, RangeDispatch, Segment};
use super::sum::{sum_series, SeriesConfig};
use crate::cache::TableCache;
use crate::DDFloat;
use std::sync::OnceLock;

/// Arguments above this overflow.
const EXP_OVERFLOW: f64 = 709.79;
/// Arguments below this underflow to zero.
const EXP_UNDERFLOW: f64 = -745.2;
/// The degree of the Padé table used on each segment.
const EXP_PADE_DEGREE: usize = 7;

/// The reduced argument in [-ln2/2, ln2/2] is split into segments of width
/// 1/8 around the anchors j/8.
static EXP_SEGMENTS: [Segment; 7] = [
    Segment {
        upper: Bound::Exclusive(-0.3125),
        anchor: -0.375,
        index: 0,
    },
    Segment {
        upper: Bound::Exclusive(-0.1875),
        anchor: -0.25,
        index: 1,
    },
    Segment {
        upper: Bound::Exclusive(-0.0625),
        anchor: -0.125,
        index: 2,
    },
    Segment {
        upper: Bound::Exclusive(0.0625),
        anchor: 0.0,
        index: 3,
    },
    Segment {
        upper: Bound::Exclusive(0.1875),
        anchor: 0.125,
        index: 4,
    },
    Segment {
        upper: Bound::Exclusive(0.3125),
        anchor: 0.25,
        index: 5,
    },
    Segment {
        upper: Bound::Inclusive(0.4375),
        anchor: 0.375,
        index: 6,
    },
];

static EXP_DISPATCH: RangeDispatch = RangeDispatch::new(&EXP_SEGMENTS);

static EXP_ANCHORS: OnceLock<TableCache<usize, DDFloat>> = OnceLock::new();

/// Returns exp(anchor) for the segment, computed once.
fn exp_anchor(seg: &Segment) -> DDFloat {
    let cache = EXP_ANCHORS.get_or_init(|| TableCache::new("exp_anchor"));
    let anchor = seg.anchor;
    *cache.get_or_build(seg.index, || {
        DDFloat::exp_taylor(DDFloat::from_f64(anchor))
    })
}

impl DDFloat {
    /// Computes the taylor series:
    /// exp(x) = 1 + x/1! + x^2/2! + x^3/3! ...
    fn exp_taylor(x: Self) -> Self {
        let terms = (1..).scan(Self::ONE, |t, k: u32| {
            let cur = *t;
            *t = *t * x / k as f64;
            Some(cur)
        });
        sum_series(terms, &SeriesConfig::default()).value
    }

    /// Computes exp(r) for |r| <= ln2/2 from the Padé table of the segment
    /// that contains r.
    fn exp_reduced(r: Self) -> Self {
        let Some((seg, u)) = EXP_DISPATCH.select(r) else {
            return Self::exp_taylor(r);
        };
        match pade_exp(EXP_PADE_DEGREE).and_then(|table| table.evaluate(u)) {
            Ok(p) => exp_anchor(seg) * p,
            Err(err) => {
                log::warn!("exp({}): {}; using the taylor series", r, err);
                Self::exp_taylor(r)
            }
        }
    }

    /// Computes e^self.
    pub fn exp(&self) -> Self {
        if self.is_nan() {
            return Self::NAN;
        } else if self.hi() > EXP_OVERFLOW {
            return Self::INFINITY;
        } else if self.hi() < EXP_UNDERFLOW {
            return Self::ZERO;
        } else if self.is_zero() {
            return Self::ONE;
        }

        // Reduce with x = k*ln2 + r. Both products with the leading words of
        // ln2 are exact.
        let k = (self.hi() / std::f64::consts::LN_2).round();
        let kk = Self::from_f64(k);
        let r = *self - kk * Self::LN_2.hi() - kk * Self::LN_2.lo();
        let r = r - k * LN_2_TAIL;
        Self::exp_reduced(r).ldexp(k as i32)
    }

    /// Computes the taylor series, centered around 1:
    /// z = (x - 1)/(x + 1)
    /// ln(x) = 2 (z + z^3/3 + z^5/5 + z^7/7 ... )
    fn ln_taylor(x: Self) -> Self {
        let z = (x - 1.0) / (x + 1.0);
        let z2 = z.sqr();
        let terms = (0..).scan(z, |top, i: u32| {
            let elem = *top / (2 * i + 1) as f64;
            *top = *top * z2;
            Some(elem)
        });
        sum_series(terms, &SeriesConfig::default()).value.mul_pow2(2.0)
    }

    /// Computes the natural logarithm of the number. Negative numbers return
    /// NaN, and zero returns -inf.
    pub fn ln(&self) -> Self {
        if self.is_nan() {
            return Self::NAN;
        } else if self.is_zero() {
            return Self::NEG_INFINITY;
        } else if self.is_negative() {
            return Self::NAN;
        } else if self.is_inf() {
            return *self;
        } else if *self == 1.0 {
            return Self::ZERO;
        }

        // Split off the exponent of very large and very small numbers, where
        // exp(-y) would not be representable.
        let e = self.ilogb();
        if !(-900..=900).contains(&e) {
            let (n, f) = self.frexp();
            let n = n as f64;
            return f.ln() + Self::LN_2 * n + n * LN_2_TAIL;
        }

        // Near one the Newton step cancels, so use the series instead.
        if (*self - 1.0).abs() < 0.25 {
            return Self::ln_taylor(*self);
        }

        // Newton iteration on exp(y) = x:
        // y' = y + x * exp(-y) - 1
        let mut y = Self::from_f64(self.hi().ln());
        let steps = if y.hi().abs() > 0.5 { 2 } else { 1 };
        for _ in 0..steps {
            y = y + *self * (-y).exp() - 1.0;
        }
        y
    }

    /// Computes the base-10 logarithm of the number.
    pub fn log10(&self) -> Self {
        self.ln() / Self::LN_10
    }

    /// Return this number raised to the power of 'y'. Integral powers are
    /// computed by repeated multiplication, and the rest as exp(y*ln(x)).
    /// The special values follow the native powf.
    pub fn powf(&self, y: &Self) -> Self {
        let x = *self;
        if y.is_zero() || x == 1.0 {
            return Self::ONE;
        } else if x.is_nan() || y.is_nan() {
            return Self::NAN;
        }

        if y.is_inf() {
            let ax = x.abs();
            return if ax == 1.0 {
                Self::ONE
            } else if (ax > 1.0) != y.is_negative() {
                Self::INFINITY
            } else {
                Self::ZERO
            };
        }

        let is_int = y.trunc() == *y;
        if is_int && y.hi().abs() <= i32::MAX as f64 {
            return x.powi(y.to_i64() as i32);
        }
        // Large integers are odd only while they fit in the significand.
        let odd = is_int && y.mul_pow2(0.5).fract() != 0.0;

        if x.is_inf() || x.is_zero() {
            let big = x.is_inf() != y.is_negative();
            let r = if big { Self::INFINITY } else { Self::ZERO };
            return if odd && x.is_negative() { -r } else { r };
        }
        if x.is_negative() && !is_int {
            return Self::NAN;
        } else if *y == 0.5 {
            return x.sqrt();
        }

        let r = (*y * x.abs().ln()).exp();
        if odd && x.is_negative() {
            -r
        } else {
            r
        }
    }
}

#[test]
fn test_exp() {
    use crate::utils::rel_err_to;

    fn check(x: &str, expected: &str, tol: f64) {
        let v = DDFloat::parse(x).unwrap().exp();
        assert!(rel_err_to(v, expected) < tol, "exp({}) = {}", x, v);
    }
    check("0.5", "1.648721270700128146848650787814163571654", 1e-31);
    check("-0.3", "7.408182206817178660668737793178168721823e-1", 1e-31);
    check("0.001", "1.001000500166708341668055753993058311563", 1e-31);
    check("10", "2.202646579480671651695790064528424436635e4", 1e-31);
    check("-20", "2.061153622438557827965940380155820976376e-9", 1e-31);
    check("100", "2.688117141816135448412625551580013587361e43", 1e-31);
    check("700", "1.014232054735004509455329595231267615205e304", 2e-31);
    // The trailing word is subnormal down there.
    check("-700", "9.859676543759770856705372947849465105116e-305", 1e-18);

    assert_eq!(DDFloat::ZERO.exp(), 1.0);
    assert!((DDFloat::ONE.exp() - DDFloat::E).abs() < 1e-31);
    assert!(DDFloat::from(710).exp().is_inf());
    assert!(DDFloat::from(-746).exp().is_zero());
    assert!(DDFloat::INFINITY.exp().is_inf());
    assert!(DDFloat::NEG_INFINITY.exp().is_zero());
    assert!(DDFloat::NAN.exp().is_nan());
}

#[test]
fn test_exp_segments() {
    use crate::utils::Lfsr;

    // exp(a + b) = exp(a) * exp(b) across all of the segments.
    let mut lfsr = Lfsr::new();
    for _ in 0..1000 {
        let a = DDFloat::from_f64(lfsr.get_f64_in(-8, 3));
        let b = DDFloat::from_f64(-lfsr.get_f64_in(-8, 3));
        let lhs = (a + b).exp();
        let rhs = a.exp() * b.exp();
        assert!(((lhs - rhs) / rhs).abs() < 1e-30);
    }

    // The anchors are cached.
    let cache = EXP_ANCHORS.get_or_init(|| TableCache::new("exp_anchor"));
    for seg in EXP_DISPATCH.segments() {
        let v = exp_anchor(seg);
        assert_eq!(cache.get(seg.index).map(|x| *x), Some(v));
    }
}

#[test]
fn test_ln() {
    use crate::utils::rel_err_to;

    fn check(x: &str, expected: &str) {
        let v = DDFloat::parse(x).unwrap().ln();
        assert!(rel_err_to(v, expected) < 1e-31, "ln({}) = {}", x, v);
    }
    check("0.1", "-2.302585092994045684017991454684364207601");
    check("10", "2.302585092994045684017991454684364207601");
    check("1e100", "2.302585092994045684017991454684364207601e2");
    check("1e-300", "-6.907755278982137052053974364053092622803e2");
    check("0.999", "-1.000500333583533500142982254068344960755e-3");
    check("1.5", "4.05465108108164381978013115464349136572e-1");

    assert!((DDFloat::E.ln() - 1.0).abs() < 1e-31);
    assert!((DDFloat::from(2).ln() - DDFloat::LN_2).abs() < 1e-32);
    assert!(rel_err_to(DDFloat::from(1000).log10(), "3") < 1e-31);
    assert_eq!(DDFloat::ONE.ln(), 0.0);
    assert_eq!(DDFloat::ZERO.ln(), f64::NEG_INFINITY);
    assert!(DDFloat::from(-1).ln().is_nan());
    assert!(DDFloat::INFINITY.ln().is_inf());
    assert!(DDFloat::MAX.ln().is_finite());
}

#[test]
fn test_ln_exp_inverse() {
    use crate::utils::Lfsr;

    let mut lfsr = Lfsr::new_with_seed(11);
    for _ in 0..1000 {
        let x = DDFloat::from_f64(lfsr.get_f64_in(-960, 1000));
        let y = x.ln().exp();
        assert!(((y - x) / x).abs() < 1e-28);
    }
}

#[test]
fn test_powf() {
    use crate::utils::rel_err_to;

    let pw = |a: f64, b: f64| DDFloat::from_f64(a).powf(&DDFloat::from_f64(b));
    assert!(rel_err_to(pw(2.5, 0.3), "1.316382204334237413503470220193051434098") < 1e-31);
    assert_eq!(pw(2.0, 10.0), 1024.0);
    assert_eq!(pw(-2.0, 3.0), -8.0);
    assert_eq!(pw(4.0, 0.5), 2.0);
    assert!(pw(-2.0, 0.5).is_nan());

    // Compare the special values with the native powf.
    for i in 0..30 {
        for j in -10..10 {
            let i = i as f64;
            let j = j as f64;
            let res = i.powf(j);
            let res2 = pw(i, j).to_f64();
            if res.is_finite() && res != 0.0 {
                assert!((res - res2).abs() <= res * f64::EPSILON);
            } else {
                assert_eq!(res, res2);
            }
        }
    }
    for v0 in crate::utils::get_special_test_values() {
        let exponents = [0.0, -0.0, 1.0, 2.0, 3.0, -3.0, 0.5, -0.5, f64::INFINITY, f64::NEG_INFINITY, f64::NAN];
        for v1 in exponents {
            let correct = v0.powf(v1);
            let test = pw(v0, v1).to_f64();
            assert_eq!(correct.is_nan(), test.is_nan(), "{} ^ {}", v0, v1);
            if correct.is_infinite() || correct == 0.0 {
                assert_eq!(correct, test, "{} ^ {}", v0, v1);
                assert_eq!(correct.is_sign_negative(), test.is_sign_negative());
            }
        }
    }
}
