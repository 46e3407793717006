//! This module contains the classical orthogonal polynomials and the rising
//! factorial.

use crate::error::{Error, Result};
use crate::DDFloat;

/// The largest supported polynomial degree.
pub const MAX_DEGREE: u32 = 64;
/// The largest supported number of factors in `rising_factorial`.
pub const MAX_POCHHAMMER: u32 = 1000;

/// Runs the three-term recurrence p_{k+1} = next(k, p_k, p_{k-1}) from the
/// first two polynomials up to degree `n`.
fn recurrence(
    n: u32,
    p0: DDFloat,
    p1: DDFloat,
    next: impl Fn(f64, DDFloat, DDFloat) -> DDFloat,
) -> Result<DDFloat> {
    Error::check_range("degree", n as u64, MAX_DEGREE as u64)?;
    if n == 0 {
        return Ok(p0);
    }
    let (mut prev, mut cur) = (p0, p1);
    for k in 1..n {
        let p = next(k as f64, cur, prev);
        prev = cur;
        cur = p;
    }
    Ok(cur)
}

impl DDFloat {
    /// Evaluates the Legendre polynomial P_n at `self`:
    /// (k+1) P_{k+1} = (2k+1) x P_k - k P_{k-1}
    pub fn legendre_p(&self, n: u32) -> Result<Self> {
        let x = *self;
        recurrence(n, Self::ONE, x, |k, cur, prev| {
            (x * cur * (2.0 * k + 1.0) - prev * k) / (k + 1.0)
        })
    }

    /// Evaluates the Chebyshev polynomial of the first kind T_n at `self`:
    /// T_{k+1} = 2x T_k - T_{k-1}
    pub fn chebyshev_t(&self, n: u32) -> Result<Self> {
        let x2 = self.mul_pow2(2.0);
        recurrence(n, Self::ONE, *self, |_, cur, prev| x2 * cur - prev)
    }

    /// Evaluates the physicists' Hermite polynomial H_n at `self`:
    /// H_{k+1} = 2x H_k - 2k H_{k-1}
    pub fn hermite_h(&self, n: u32) -> Result<Self> {
        let x2 = self.mul_pow2(2.0);
        recurrence(n, Self::ONE, x2, |k, cur, prev| {
            x2 * cur - prev * (2.0 * k)
        })
    }

    /// Evaluates the probabilists' Hermite polynomial He_n at `self`:
    /// He_{k+1} = x He_k - k He_{k-1}
    pub fn hermite_he(&self, n: u32) -> Result<Self> {
        let x = *self;
        recurrence(n, Self::ONE, x, |k, cur, prev| x * cur - prev * k)
    }

    /// Evaluates the Laguerre polynomial L_n at `self`:
    /// (k+1) L_{k+1} = (2k+1-x) L_k - k L_{k-1}
    pub fn laguerre_l(&self, n: u32) -> Result<Self> {
        let x = *self;
        recurrence(n, Self::ONE, Self::ONE - x, |k, cur, prev| {
            ((Self::from_f64(2.0 * k + 1.0) - x) * cur - prev * k) / (k + 1.0)
        })
    }

    /// Returns the rising factorial (Pochhammer symbol)
    /// x (x+1) (x+2) ... (x+n-1). Zero factors return one.
    pub fn rising_factorial(&self, n: u32) -> Result<Self> {
        Error::check_range("n", n as u64, MAX_POCHHAMMER as u64)?;
        Ok((0..n).map(|k| *self + k as f64).product())
    }
}

#[test]
fn test_legendre() {
    use crate::utils::rel_err_to;

    let x = DDFloat::parse("0.3").unwrap();
    assert_eq!(x.legendre_p(0).unwrap(), 1.0);
    assert_eq!(x.legendre_p(1).unwrap(), x);
    assert!(rel_err_to(x.legendre_p(5).unwrap(), "0.34538625") < 1e-31);
    let p64 = x.legendre_p(64).unwrap();
    assert!(rel_err_to(p64, "7.059414327358900942063172095772583058603e-2") < 1e-29);

    // P_n(1) = 1
    for n in 0..=MAX_DEGREE {
        assert!((DDFloat::ONE.legendre_p(n).unwrap() - 1.0).abs() < 1e-30);
    }
}

#[test]
fn test_chebyshev() {
    use crate::utils::rel_err_to;

    let x = DDFloat::parse("0.7").unwrap();
    assert!(rel_err_to(x.chebyshev_t(10).unwrap(), "-9.98400512e-2") < 1e-29);

    // T_n(cos t) = cos(n t), so T_n(1/2) cycles with period 6.
    let half = DDFloat::HALF;
    assert_eq!(half.chebyshev_t(3).unwrap(), -1.0);
    assert_eq!(half.chebyshev_t(6).unwrap(), 1.0);
    assert_eq!(half.chebyshev_t(64).unwrap(), -0.5);
}

#[test]
fn test_hermite_and_laguerre() {
    use crate::utils::rel_err_to;

    let x = DDFloat::parse("1.2").unwrap();
    assert!(rel_err_to(x.hermite_h(6).unwrap(), "112.574976") < 1e-30);
    assert!(rel_err_to(x.hermite_he(6).unwrap(), "21.681984") < 1e-30);
    assert_eq!(DDFloat::ZERO.hermite_h(1).unwrap(), 0.0);
    assert_eq!(DDFloat::from(3).hermite_he(2).unwrap(), 8.0);

    let x = DDFloat::parse("2.5").unwrap();
    let l7 = x.laguerre_l(7).unwrap();
    assert!(rel_err_to(l7, "1.079566592261904761904761904761904761905e-1") < 1e-29);
    assert_eq!(DDFloat::ZERO.laguerre_l(9).unwrap(), 1.0);
}

#[test]
fn test_degree_limits() {
    let x = DDFloat::HALF;
    assert!(x.legendre_p(MAX_DEGREE).is_ok());
    assert_eq!(
        x.legendre_p(65).unwrap_err(),
        Error::Range {
            name: "degree",
            value: 65,
            bound: 64
        }
    );
    assert!(x.chebyshev_t(100).is_err());
    assert!(x.hermite_h(65).is_err());
    assert!(x.hermite_he(65).is_err());
    assert!(x.laguerre_l(1000).is_err());
}

#[test]
fn test_rising_factorial() {
    let x = DDFloat::from_f64(1.5);
    assert_eq!(x.rising_factorial(10).unwrap(), 13427061.1083984375);
    assert_eq!(x.rising_factorial(0).unwrap(), 1.0);
    assert_eq!(DDFloat::ONE.rising_factorial(20).unwrap(), DDFloat::factorial(20).unwrap());
    assert_eq!(DDFloat::from(-3).rising_factorial(5).unwrap(), 0.0);
    assert!(x.rising_factorial(1000).is_ok());
    assert!(x.rising_factorial(1001).is_err());
}
