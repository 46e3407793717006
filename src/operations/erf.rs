//! This module contains the error function and its complement.

use super::frac::{evaluate_fraction, FnFraction, FractionConfig};
use super::sum::{sum_series, SeriesConfig};
use crate::DDFloat;

/// erf uses its power series below this magnitude.
const ERF_SERIES_LIMIT: f64 = 2.0;
/// erfc uses the continued fraction from this argument up.
const ERFC_FRACTION_START: f64 = 1.0;
/// erfc underflows to zero above this argument.
const ERFC_UNDERFLOW: f64 = 27.3;

impl DDFloat {
    /// Computes the series:
    /// erf(x) = 2/sqrt(pi) * exp(-x^2) * sum(t_n)
    /// where t_0 = x and t_n = t_{n-1} * 2x^2 / (2n + 1).
    /// All of the terms have the same sign.
    fn erf_series(x: Self) -> Self {
        let x2 = x.sqr();
        let two_x2 = x2.mul_pow2(2.0);
        let terms = (1..).scan(x, |t, n: u32| {
            let cur = *t;
            *t = *t * two_x2 / (2 * n + 1) as f64;
            Some(cur)
        });
        let sum = sum_series(terms, &SeriesConfig::default()).value;
        Self::FRAC_2_SQRT_PI * (-x2).exp() * sum
    }

    /// Computes the continued fraction, for x > 0:
    /// erfc(x) = exp(-x^2)/sqrt(pi) * 1/(x + (1/2)/(x + 1/(x + (3/2)/(x + ...))))
    /// Returns None if the fraction did not converge.
    fn erfc_fraction(x: Self) -> Option<Self> {
        let cf = FnFraction::new(Self::ZERO, |n| {
            let a = if n == 1 {
                Self::ONE
            } else {
                Self::from_f64((n - 1) as f64 * 0.5)
            };
            (a, x)
        });
        let config = FractionConfig::default().with_tolerance(1e-31);
        let res = evaluate_fraction(&cf, &config);
        if !res.is_converged() {
            log::debug!("erfc({}): no convergence after {} steps", x, res.terms);
            return None;
        }
        Some(Self::FRAC_1_SQRT_PI * (-x.sqr()).exp() * res.value)
    }

    /// Computes the error function.
    pub fn erf(&self) -> Self {
        if self.is_nan() {
            return Self::NAN;
        } else if self.is_zero() {
            return *self;
        }
        let neg = self.is_negative();
        if self.is_inf() {
            return if neg { -Self::ONE } else { Self::ONE };
        }

        let x = self.abs();
        let r = if x < ERF_SERIES_LIMIT {
            Self::erf_series(x)
        } else {
            match Self::erfc_fraction(x) {
                Some(c) => Self::ONE - c,
                None => Self::erf_series(x),
            }
        };
        if neg {
            -r
        } else {
            r
        }
    }

    /// Computes the complementary error function, 1 - erf(x), without the
    /// cancellation for large x.
    pub fn erfc(&self) -> Self {
        if self.is_nan() {
            return Self::NAN;
        } else if self.is_inf() {
            return if self.is_negative() {
                Self::TWO
            } else {
                Self::ZERO
            };
        } else if self.is_negative() {
            return Self::TWO - (-*self).erfc();
        } else if *self > ERFC_UNDERFLOW {
            return Self::ZERO;
        }

        if *self < ERFC_FRACTION_START {
            return Self::ONE - Self::erf_series(*self);
        }
        match Self::erfc_fraction(*self) {
            Some(c) => c,
            None => Self::ONE - Self::erf_series(*self),
        }
    }
}

#[test]
fn test_erf() {
    use crate::utils::rel_err_to;

    fn check(x: &str, expected: &str) {
        let v = DDFloat::parse(x).unwrap().erf();
        assert!(rel_err_to(v, expected) < 1e-31, "erf({}) = {}", x, v);
    }
    check("0.5", "5.204998778130465376827466538919645287365e-1");
    check("1", "8.427007929497148693412206350826092592961e-1");
    check("2.5", "9.995930479825550410604357842600250872797e-1");
    check("-1.5", "-9.661051464753107270669762616459478586814e-1");
    check("4", "9.99999984582742099719981147840326513116e-1");
    check("0.01", "1.12834155558496169159095235480692109491e-2");

    assert!(DDFloat::NEG_ZERO.erf().is_negative());
    assert_eq!(DDFloat::INFINITY.erf(), 1.0);
    assert_eq!(DDFloat::NEG_INFINITY.erf(), -1.0);
    assert_eq!(DDFloat::from(30).erf(), 1.0);
    assert!(DDFloat::NAN.erf().is_nan());
}

#[test]
fn test_erfc() {
    use crate::utils::rel_err_to;

    fn check(x: &str, expected: &str, tol: f64) {
        let v = DDFloat::parse(x).unwrap().erfc();
        assert!(rel_err_to(v, expected) < tol, "erfc({}) = {}", x, v);
    }
    check("0.1", "8.875370839817151077967249282560316167783e-1", 1e-31);
    check("-1", "1.842700792949714869341220635082609259296", 1e-31);
    check("2", "4.677734981047265837930743632747071389108e-3", 2e-31);
    check("3", "2.209049699858544137277612958232037984771e-5", 2e-31);
    check("5.5", "7.357847917974398063068362398570090208223e-15", 2e-31);
    check("10", "2.088487583762544757000786294957788611561e-45", 2e-31);
    // Below 2^-969 the trailing word loses bits.
    check("26", "5.663192408856142846475727896926092580329e-296", 1e-26);

    assert_eq!(DDFloat::ZERO.erfc(), 1.0);
    assert_eq!(DDFloat::from(28).erfc(), 0.0);
    assert_eq!(DDFloat::INFINITY.erfc(), 0.0);
    assert_eq!(DDFloat::NEG_INFINITY.erfc(), 2.0);
    assert!(DDFloat::NAN.erfc().is_nan());
}

#[test]
fn test_erf_identities() {
    use crate::utils::Lfsr;

    let mut lfsr = Lfsr::new();
    for _ in 0..200 {
        let x = DDFloat::from_f64(lfsr.get_f64_in(-6, 2));
        let e = x.erf();
        assert_eq!((-x).erf(), -e);
        let sum = e + x.erfc();
        assert!((sum - 1.0).abs() < 1e-31);
        let sum = (-x).erfc() - e;
        assert!((sum - 1.0).abs() < 1e-31);
    }
}
