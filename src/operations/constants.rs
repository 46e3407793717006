//! This module contains the mathematical constants and the static tables of
//! factorials and Bernoulli numbers.

use crate::error::{Error, Result};
use crate::DDFloat;
use std::sync::OnceLock;

impl DDFloat {
    /// Archimedes' constant (pi).
    pub const PI: Self = Self::raw(3.141592653589793, 1.2246467991473532e-16);
    /// Euler's number (e).
    pub const E: Self = Self::raw(2.718281828459045, 1.4456468917292502e-16);
    /// ln(2).
    pub const LN_2: Self = Self::raw(0.6931471805599453, 2.3190468138462996e-17);
    /// sqrt(2).
    pub const SQRT_2: Self = Self::raw(1.4142135623730951, -9.667293313452913e-17);
    /// ln(10).
    pub const LN_10: Self = Self::raw(2.302585092994046, -2.1707562233822494e-16);
    /// 1/sqrt(pi).
    pub const FRAC_1_SQRT_PI: Self =
        Self::raw(0.5641895835477563, 7.66772980658294e-18);
    /// 2/sqrt(pi).
    pub const FRAC_2_SQRT_PI: Self =
        Self::raw(1.1283791670955126, 1.533545961316588e-17);
    /// ln(2*pi)/2.
    pub const HALF_LN_2PI: Self =
        Self::raw(0.9189385332046728, -3.8782941580672414e-17);
}

/// The bits of ln(2) that don't fit in `DDFloat::LN_2`. Used by the exp
/// argument reduction, where ln(2) is multiplied by large integers.
pub(crate) const LN_2_TAIL: f64 = 5.707708438416212e-34;

/// The largest argument accepted by the factorial tables.
pub const MAX_FACTORIAL: u32 = 256;

/// The largest index `k` accepted by `bernoulli` (B_30).
pub const MAX_BERNOULLI: u32 = 15;

static FACTORIALS: OnceLock<Vec<DDFloat>> = OnceLock::new();
static INV_FACTORIALS: OnceLock<Vec<DDFloat>> = OnceLock::new();
static BERNOULLI: OnceLock<Vec<DDFloat>> = OnceLock::new();

fn factorial_table() -> &'static [DDFloat] {
    FACTORIALS.get_or_init(|| {
        let mut table = Vec::with_capacity(MAX_FACTORIAL as usize + 1);
        let mut acc = DDFloat::ONE;
        table.push(acc);
        for k in 1..=MAX_FACTORIAL {
            acc *= k as f64;
            table.push(acc);
        }
        log::trace!("built the factorial table");
        table
    })
}

fn inv_factorial_table() -> &'static [DDFloat] {
    INV_FACTORIALS.get_or_init(|| {
        // Divide step by step instead of inverting the factorials, so the
        // entries past 170! (which overflow) stay finite.
        let mut table = Vec::with_capacity(MAX_FACTORIAL as usize + 1);
        let mut acc = DDFloat::ONE;
        table.push(acc);
        for k in 1..=MAX_FACTORIAL {
            acc /= k as f64;
            table.push(acc);
        }
        log::trace!("built the reciprocal factorial table");
        table
    })
}

fn bernoulli_table() -> &'static [DDFloat] {
    // B_2k as exact fractions.
    const FRACTIONS: [(f64, f64); 16] = [
        (1., 1.),
        (1., 6.),
        (-1., 30.),
        (1., 42.),
        (-1., 30.),
        (5., 66.),
        (-691., 2730.),
        (7., 6.),
        (-3617., 510.),
        (43867., 798.),
        (-174611., 330.),
        (854513., 138.),
        (-236364091., 2730.),
        (8553103., 6.),
        (-23749461029., 870.),
        (8615841276005., 14322.),
    ];
    BERNOULLI.get_or_init(|| {
        FRACTIONS
            .iter()
            .map(|&(n, d)| DDFloat::from_f64(n) / d)
            .collect()
    })
}

impl DDFloat {
    /// Returns n!. Entries above 170! overflow to infinity.
    pub fn factorial(n: u32) -> Result<Self> {
        Error::check_range("n", n as u64, MAX_FACTORIAL as u64)?;
        Ok(factorial_table()[n as usize])
    }

    /// Returns 1/n!.
    pub fn inv_factorial(n: u32) -> Result<Self> {
        Error::check_range("n", n as u64, MAX_FACTORIAL as u64)?;
        Ok(inv_factorial_table()[n as usize])
    }

    /// Returns the Bernoulli number B_2k, for k in 0..=15.
    pub fn bernoulli(k: u32) -> Result<Self> {
        Error::check_range("k", k as u64, MAX_BERNOULLI as u64)?;
        Ok(bernoulli_table()[k as usize])
    }
}

#[test]
fn test_constants_parse() {
    let check = |c: DDFloat, text: &str| {
        let parsed = DDFloat::parse(text).unwrap();
        assert_eq!(c.to_bits(), parsed.to_bits(), "{}", text);
    };
    check(DDFloat::PI, "3.14159265358979323846264338327950288");
    check(DDFloat::E, "2.71828182845904523536028747135266250");
    check(DDFloat::LN_2, "0.693147180559945309417232121458176568");
    check(DDFloat::SQRT_2, "1.41421356237309504880168872420969808");
    assert_eq!(DDFloat::PI.hi(), std::f64::consts::PI);
    assert_eq!(DDFloat::E.hi(), std::f64::consts::E);
    assert_eq!(DDFloat::LN_2.hi(), std::f64::consts::LN_2);
    assert_eq!(DDFloat::LN_10.hi(), std::f64::consts::LN_10);
    assert!(DDFloat::PI.is_regular() && DDFloat::HALF_LN_2PI.is_regular());
}

#[test]
fn test_factorials() {
    assert_eq!(DDFloat::factorial(0).unwrap(), 1.0);
    assert_eq!(DDFloat::factorial(5).unwrap(), 120.0);
    // 25! needs 84 bits and is exact.
    let f25 = DDFloat::factorial(25).unwrap();
    assert_eq!(f25.to_string(), "1.5511210043330985984e25");
    assert!(DDFloat::factorial(170).unwrap().is_finite());
    assert!(DDFloat::factorial(171).unwrap().is_inf());
    assert!(DDFloat::factorial(256).unwrap().is_inf());

    assert_eq!(DDFloat::inv_factorial(3).unwrap(), DDFloat::ONE / 6.0);
    assert!(DDFloat::inv_factorial(200).unwrap() > 0.0);

    let err = DDFloat::factorial(257).unwrap_err();
    assert_eq!(
        err,
        Error::Range {
            name: "n",
            value: 257,
            bound: 256
        }
    );
    assert!(DDFloat::inv_factorial(1000).is_err());
}

#[test]
fn test_bernoulli() {
    assert_eq!(DDFloat::bernoulli(0).unwrap(), 1.0);
    assert_eq!(DDFloat::bernoulli(1).unwrap(), DDFloat::ONE / 6.0);
    assert_eq!(DDFloat::bernoulli(7).unwrap(), DDFloat::from(7) / 6.0);
    assert!(DDFloat::bernoulli(15).unwrap() > 6.0e8);
    assert!(DDFloat::bernoulli(16).is_err());
}
