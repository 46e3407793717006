//! This module contains the gamma function, its logarithm, and the
//! regularized incomplete gamma functions.

use super::constants::MAX_BERNOULLI;
use super::frac::{evaluate_fraction, FnFraction, FractionConfig};
use super::sum::{sum_series, Evaluation, SeriesConfig};
use crate::DDFloat;

/// The Stirling series is accurate to double-double precision above this.
const STIRLING_MIN: f64 = 20.0;
/// Gamma overflows above this.
const GAMMA_OVERFLOW: f64 = 171.625;
/// Integers up to this use the factorial table.
const GAMMA_EXACT_MAX: f64 = 171.0;
/// The cap on the bisection of the inverse. Each step halves the bracket,
/// which starts at most a factor of two wide.
const BISECTION_STEPS: usize = 128;

impl DDFloat {
    /// Computes the Stirling series for z >= 20:
    /// ln(gamma(z)) = (z - 1/2) ln(z) - z + ln(2 pi)/2
    ///                + sum(B_2k / (2k (2k - 1) z^(2k - 1)))
    fn ln_gamma_stirling(z: Self) -> Self {
        let inv_z = z.recip();
        let inv_z2 = inv_z.sqr();
        let terms = (1..=MAX_BERNOULLI).scan(inv_z, |pow, k| {
            let b = Self::bernoulli(k).ok()?;
            let k2 = (2 * k) as f64;
            let term = b * *pow / (k2 * (k2 - 1.0));
            *pow = *pow * inv_z2;
            Some(term)
        });
        let series = sum_series(terms, &SeriesConfig::default()).value;
        (z - 0.5) * z.ln() - z + Self::HALF_LN_2PI + series
    }

    /// Returns the factorial table entry for an integer argument `x` in
    /// [1, 171], which is gamma(x).
    fn gamma_from_table(x: &Self) -> Option<Self> {
        if *x > GAMMA_EXACT_MAX || x.fract() != 0.0 {
            return None;
        }
        Self::factorial((x.to_i64() - 1) as u32).ok()
    }

    /// Computes the natural logarithm of the gamma function for positive
    /// arguments. Zero and negative arguments return NaN.
    pub fn ln_gamma(&self) -> Self {
        if self.is_nan() || self.is_zero() || self.is_negative() {
            return Self::NAN;
        } else if self.is_inf() {
            return *self;
        }
        if let Some(f) = Self::gamma_from_table(self) {
            return f.ln();
        }

        // Shift the argument up with gamma(z) = gamma(z + n) / (z (z+1) ...).
        let mut z = *self;
        let mut prod = Self::ONE;
        while z < STIRLING_MIN {
            prod *= z;
            z += 1.0;
        }
        Self::ln_gamma_stirling(z) - prod.ln()
    }

    /// Computes the gamma function for positive arguments. Zero and
    /// negative arguments return NaN.
    pub fn gamma(&self) -> Self {
        if self.is_nan() || self.is_zero() || self.is_negative() {
            return Self::NAN;
        } else if *self > GAMMA_OVERFLOW {
            return Self::INFINITY;
        }
        if let Some(f) = Self::gamma_from_table(self) {
            return f;
        }
        self.ln_gamma().exp()
    }

    /// Returns x^a e^-x / gamma(a), the common factor of the series and the
    /// continued fraction.
    fn incomplete_gamma_prefactor(a: Self, x: Self) -> Self {
        (a * x.ln() - x - a.ln_gamma()).exp()
    }

    /// Computes the series:
    /// P(a, x) = x^a e^-x / gamma(a) / a * sum(t_n)
    /// where t_0 = 1 and t_n = t_{n-1} * x / (a + n).
    fn lower_gamma_series(a: Self, x: Self) -> Evaluation {
        let terms = (1..).scan(Self::ONE, |t, n: u32| {
            let cur = *t;
            *t = *t * x / (a + n as f64);
            Some(cur)
        });
        let mut res = sum_series(terms, &SeriesConfig::default());
        res.value = Self::incomplete_gamma_prefactor(a, x) / a * res.value;
        res
    }

    /// Computes the continued fraction:
    /// Q(a, x) = x^a e^-x / gamma(a) *
    ///           1/(x+1-a - 1(1-a)/(x+3-a - 2(2-a)/(x+5-a - ...)))
    fn upper_gamma_fraction(a: Self, x: Self) -> Evaluation {
        let cf = FnFraction::new(Self::ZERO, |n| {
            if n == 1 {
                return (Self::ONE, x + 1.0 - a);
            }
            let m = (n - 1) as f64;
            let an = (a - m) * m;
            (an, x + (2 * n - 1) as f64 - a)
        });
        let config = FractionConfig::default().with_tolerance(1e-31);
        let mut res = evaluate_fraction(&cf, &config);
        res.value = Self::incomplete_gamma_prefactor(a, x) * res.value;
        res
    }

    /// Returns the pair (P(a, x), Q(a, x)). The smaller of the two is
    /// computed directly and the other one as its complement.
    fn incomplete_gamma(a: Self, x: Self) -> (Self, Self) {
        if a.is_nan() || x.is_nan() || a.is_zero() || a.is_negative() {
            return (Self::NAN, Self::NAN);
        } else if x.is_zero() || a.is_inf() {
            return (Self::ZERO, Self::ONE);
        } else if x.is_negative() {
            return (Self::NAN, Self::NAN);
        } else if x.is_inf() {
            return (Self::ONE, Self::ZERO);
        }

        if x < a + 1.0 {
            let res = Self::lower_gamma_series(a, x);
            if res.is_converged() {
                return (res.value, Self::ONE - res.value);
            }
            let alt = Self::upper_gamma_fraction(a, x);
            if alt.is_converged() {
                return (Self::ONE - alt.value, alt.value);
            }
            log::debug!("P({}, {}): using the unconverged series", a, x);
            (res.value, Self::ONE - res.value)
        } else {
            let res = Self::upper_gamma_fraction(a, x);
            if res.is_converged() {
                return (Self::ONE - res.value, res.value);
            }
            let alt = Self::lower_gamma_series(a, x);
            if alt.is_converged() {
                return (alt.value, Self::ONE - alt.value);
            }
            log::debug!("Q({}, {}): using the unconverged fraction", a, x);
            (Self::ONE - res.value, res.value)
        }
    }

    /// Computes the regularized lower incomplete gamma function P(a, x),
    /// where `self` is `a`. Returns NaN unless a > 0 and x >= 0.
    pub fn gamma_p(&self, x: &Self) -> Self {
        Self::incomplete_gamma(*self, *x).0
    }

    /// Computes the regularized upper incomplete gamma function
    /// Q(a, x) = 1 - P(a, x), where `self` is `a`.
    pub fn gamma_q(&self, x: &Self) -> Self {
        Self::incomplete_gamma(*self, *x).1
    }

    /// Returns the x such that Q(a, x) == q, where `self` is `a`. Returns NaN
    /// unless a > 0 and q is in [0, 1].
    ///
    /// The root is bracketed by doubling or halving from x = a, narrowed by
    /// bisection in double precision, and then polished with Newton steps
    /// in double-double precision.
    pub fn inverse_upper_incomplete_gamma(&self, q: &Self) -> Self {
        let a = *self;
        if a.is_nan() || q.is_nan() || a.is_zero() || a.is_negative() || a.is_inf() {
            return Self::NAN;
        } else if q.is_zero() {
            return Self::INFINITY;
        } else if q.is_negative() || *q > 1.0 {
            return Self::NAN;
        } else if *q == 1.0 {
            return Self::ZERO;
        }

        // Q(a, x) decreases from 1 to 0.
        let target = *q;
        let above = |x: f64| a.gamma_q(&Self::from_f64(x)) > target;
        let start = a.hi().max(f64::MIN_POSITIVE);
        let (mut lo, mut hi) = (start, start);
        if above(start) {
            while above(hi) {
                lo = hi;
                hi *= 2.0;
                if !hi.is_finite() {
                    return Self::INFINITY;
                }
            }
        } else {
            while !above(lo) {
                hi = lo;
                lo *= 0.5;
                if lo == 0.0 {
                    return Self::ZERO;
                }
            }
        }

        // Bisect until the bracket is a few ulps wide. Subnormal brackets
        // stop shrinking before that, when the midpoint hits an endpoint.
        for _ in 0..BISECTION_STEPS {
            if hi - lo <= hi * 1e-15 {
                break;
            }
            let mid = lo + (hi - lo) * 0.5;
            if mid <= lo || mid >= hi {
                break;
            }
            if above(mid) {
                lo = mid;
            } else {
                hi = mid;
            }
        }

        // Newton on Q(a, x) - q, with dQ/dx = -x^(a-1) e^-x / gamma(a).
        let mut x = Self::from_f64(lo + (hi - lo) * 0.5);
        let lg = a.ln_gamma();
        for _ in 0..3 {
            let err = a.gamma_q(&x) - target;
            if err.is_zero() {
                break;
            }
            let dq = -((a - 1.0) * x.ln() - x - lg).exp();
            let next = x - err / dq;
            if !next.is_finite() || next.is_zero() || next.is_negative() {
                break;
            }
            x = next;
        }
        x
    }
}

#[test]
fn test_ln_gamma() {
    use crate::utils::rel_err_to;

    fn check(x: &str, expected: &str, tol: f64) {
        let v = DDFloat::parse(x).unwrap().ln_gamma();
        assert!(rel_err_to(v, expected) < tol, "ln_gamma({}) = {}", x, v);
    }
    check("0.5", "5.723649429247000870717136756765293558236e-1", 1e-29);
    check("10.3", "1.348203678613835697061507343257009251868e1", 1e-31);
    check("100.7", "3.623567752034305489588409935447283918144e2", 1e-31);
    check("1e-5", "1.151291969289582570742083393093900480408e1", 1e-30);

    // Integers are exact factorials.
    assert!((DDFloat::from(3).ln_gamma() - DDFloat::LN_2).abs() < 1e-32);
    assert_eq!(DDFloat::ONE.ln_gamma(), 0.0);
    assert_eq!(DDFloat::TWO.ln_gamma(), 0.0);

    assert!(DDFloat::ZERO.ln_gamma().is_nan());
    assert!(DDFloat::from(-2.5).ln_gamma().is_nan());
    assert!(DDFloat::INFINITY.ln_gamma().is_inf());
}

#[test]
fn test_gamma() {
    use crate::utils::rel_err_to;

    fn check(x: &str, expected: &str, tol: f64) {
        let v = DDFloat::parse(x).unwrap().gamma();
        assert!(rel_err_to(v, expected) < tol, "gamma({}) = {}", x, v);
    }
    check("4.5", "1.163172839656744892914422410942626526211e1", 1e-29);
    check("0.1", "9.513507698668731836292487177265402192551", 1e-29);
    check("30.25", "2.062805313775346887037206102371416427715e31", 1e-29);
    check("170.5", "5.562092414559999610705809659357742867669e305", 1e-28);

    assert_eq!(DDFloat::from(5).gamma(), 24.0);
    assert_eq!(DDFloat::from(171).gamma(), DDFloat::factorial(170).unwrap());
    assert!(DDFloat::from(172).gamma().is_inf());
    assert!(DDFloat::ZERO.gamma().is_nan());
    assert!(DDFloat::from(-1).gamma().is_nan());

    // gamma(x + 1) = x gamma(x)
    let x = DDFloat::parse("7.3").unwrap();
    let lhs = (x + 1.0).gamma();
    let rhs = x * x.gamma();
    assert!(((lhs - rhs) / rhs).abs() < 1e-29);
}

#[test]
fn test_incomplete_gamma() {
    use crate::utils::rel_err_to;

    let p = |a: &str, x: &str| {
        let a = DDFloat::parse(a).unwrap();
        a.gamma_p(&DDFloat::parse(x).unwrap())
    };
    let q = |a: &str, x: &str| {
        let a = DDFloat::parse(a).unwrap();
        a.gamma_q(&DDFloat::parse(x).unwrap())
    };

    assert!(rel_err_to(p("2.5", "1.5"), "3.000141641213724909001984483753317788465e-1") < 1e-29);
    assert!(rel_err_to(q("2.5", "1.5"), "6.999858358786275090998015516246682211535e-1") < 1e-29);
    assert!(rel_err_to(p("10", "12"), "7.576078383294876513181001537964349019208e-1") < 1e-29);
    assert!(rel_err_to(q("10", "12"), "2.423921616705123486818998462035650980792e-1") < 1e-29);
    assert!(rel_err_to(q("0.5", "30"), "9.485737571073848388480428948602810130121e-15") < 1e-29);
    assert!(rel_err_to(p("1", "0.25"), "2.211992169285951317548297330216793527032e-1") < 1e-29);
    assert!(rel_err_to(p("50", "45"), "2.468020344001702727143687763792977264703e-1") < 1e-28);
    assert!(rel_err_to(q("50", "45"), "7.531979655998297272856312236207022735297e-1") < 1e-28);

    // Q(1, x) = exp(-x)
    let x = DDFloat::from(3);
    let v = DDFloat::ONE.gamma_q(&x);
    assert!(((v - (-x).exp()) / v).abs() < 1e-30);

    // The edges of the domain.
    assert_eq!(p("2", "0"), 0.0);
    assert_eq!(q("2", "0"), 1.0);
    assert_eq!(DDFloat::TWO.gamma_p(&DDFloat::INFINITY), 1.0);
    assert!(p("0", "1").is_nan());
    assert!(p("-1", "1").is_nan());
    assert!(q("1", "-1").is_nan());
}

#[test]
fn test_inverse_upper_incomplete_gamma() {
    use crate::utils::{rel_err_to, Lfsr};

    let inv = |a: &str, q: &str| {
        let a = DDFloat::parse(a).unwrap();
        a.inverse_upper_incomplete_gamma(&DDFloat::parse(q).unwrap())
    };
    assert!(rel_err_to(inv("3", "0.3"), "3.615567665865990329031993296150921981924") < 1e-29);
    assert!(rel_err_to(inv("0.5", "0.01"), "3.317448300510607569218262966989599062428") < 1e-29);
    // Q(1, x) = exp(-x)
    assert!(rel_err_to(inv("1", "0.25"), "1.386294361119890618834464242916353136151") < 1e-29);

    assert_eq!(inv("2", "1"), 0.0);
    assert!(inv("2", "0").is_inf());
    assert!(inv("2", "1.5").is_nan());
    assert!(inv("2", "-0.5").is_nan());
    assert!(inv("0", "0.5").is_nan());

    // The root is subnormal.
    let a = DDFloat::from_f64(0.01);
    let q = DDFloat::from_f64(0.9992);
    let x = a.inverse_upper_incomplete_gamma(&q);
    assert!(x.is_finite() && !x.is_negative());
    assert!(x < f64::MIN_POSITIVE);
    if !x.is_zero() {
        assert!((a.gamma_q(&x) - q).abs() < 1e-12);
    }
    let x = DDFloat::from_f64(0.005).inverse_upper_incomplete_gamma(&q);
    assert!(x.is_finite() && !x.is_negative());

    let mut lfsr = Lfsr::new_with_seed(17);
    for _ in 0..20 {
        let a = DDFloat::from_f64(lfsr.get_f64_in(-3, 5));
        let q = DDFloat::from_f64(lfsr.get_f64_in(-20, -1));
        let x = a.inverse_upper_incomplete_gamma(&q);
        let back = a.gamma_q(&x);
        assert!(((back - q) / q).abs() < 1e-28, "a = {}, q = {}", a, q);
    }
}
