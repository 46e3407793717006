//! Table-driven rational (Padé) approximations and the piecewise range
//! dispatch that selects the table for a given argument.

use crate::cache::TableCache;
use crate::error::{Error, Result};
use crate::DDFloat;
use std::sync::{Arc, OnceLock};

/// A rational approximation `P(u)/Q(u)` stored as `(p_k, q_k)` coefficient
/// pairs from degree zero upward, together with the smallest magnitude the
/// denominator reaches over the interval the table is valid for.
#[derive(Debug, Clone)]
pub struct PadeTable {
    name: &'static str,
    coefficients: Vec<(DDFloat, DDFloat)>,
    min_denominator: f64,
}

impl PadeTable {
    /// Create a new table. `name` identifies the approximation in errors.
    pub fn new(
        name: &'static str,
        coefficients: Vec<(DDFloat, DDFloat)>,
        min_denominator: f64,
    ) -> Self {
        PadeTable {
            name,
            coefficients,
            min_denominator,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the degree of the numerator and the denominator.
    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    pub fn coefficients(&self) -> &[(DDFloat, DDFloat)] {
        &self.coefficients
    }

    pub fn min_denominator(&self) -> f64 {
        self.min_denominator
    }

    /// Evaluate the approximation at `u`. Both polynomials are evaluated in
    /// the same reverse Horner loop. A denominator whose magnitude is below
    /// the documented minimum means that `u` is outside of the interval the
    /// table was built for, and the result is rejected.
    pub fn evaluate(&self, u: DDFloat) -> Result<DDFloat> {
        let mut sc = DDFloat::ZERO;
        let mut sd = DDFloat::ZERO;
        for (c, d) in self.coefficients.iter().rev() {
            sc = sc * u + c;
            sd = sd * u + d;
        }

        let magnitude = sd.hi().abs();
        // NaN fails this test too.
        if !(magnitude >= self.min_denominator) {
            return Err(Error::Computation {
                function: self.name,
                magnitude,
                minimum: self.min_denominator,
            });
        }
        Ok(sc / sd)
    }
}

/// The upper limit of a segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Inclusive(f64),
    Exclusive(f64),
}

impl Bound {
    /// Returns true if `x` is below the bound.
    pub fn admits(&self, x: DDFloat) -> bool {
        match *self {
            Bound::Inclusive(b) => x <= b,
            Bound::Exclusive(b) => x < b,
        }
    }
}

/// One piece of a piecewise approximation. The argument is reduced to
/// `u = x - anchor` and `index` selects the table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub upper: Bound,
    pub anchor: f64,
    pub index: usize,
}

/// An ordered list of segments. Each segment covers the arguments between
/// the upper bound of the previous segment and its own upper bound.
#[derive(Debug, Clone, Copy)]
pub struct RangeDispatch {
    segments: &'static [Segment],
}

impl RangeDispatch {
    /// Create a dispatcher. The segments must be sorted by their bounds.
    pub const fn new(segments: &'static [Segment]) -> Self {
        RangeDispatch { segments }
    }

    pub fn segments(&self) -> &'static [Segment] {
        self.segments
    }

    /// Returns the first segment whose upper bound admits `x`, and the
    /// reduced argument. Returns None for NaN and for arguments above the
    /// last bound.
    pub fn select(&self, x: DDFloat) -> Option<(&'static Segment, DDFloat)> {
        let seg = self.segments.iter().find(|s| s.upper.admits(x))?;
        Some((seg, x - seg.anchor))
    }
}

/// The largest degree supported by `pade_exp`.
pub const MAX_PADE_DEGREE: usize = 16;

static PADE_EXP: OnceLock<TableCache<usize, PadeTable>> = OnceLock::new();

/// Returns the diagonal `[n/n]` Padé approximation of `exp(u)`, with the
/// denominator bound valid for `|u| <= 1`. Tables are built on first use and
/// shared afterwards.
pub fn pade_exp(degree: usize) -> Result<Arc<PadeTable>> {
    Error::check_range("degree", degree as u64, MAX_PADE_DEGREE as u64)?;
    let cache = PADE_EXP.get_or_init(|| TableCache::new("pade_exp"));
    Ok(cache.get_or_build(degree, || build_pade_exp(degree)))
}

/// p_k = C(n,k) / (2n (2n-1) ... (2n-k+1)) and q_k = (-1)^k p_k. Both the
/// binomial and the falling factorial are exact integers for n <= 16.
fn build_pade_exp(n: usize) -> PadeTable {
    let n = n as u128;
    let mut coefficients = Vec::with_capacity(n as usize + 1);
    let mut binomial: u128 = 1;
    let mut falling: u128 = 1;
    for k in 0..=n {
        if k > 0 {
            binomial = binomial * (n - k + 1) / k;
            falling *= 2 * n - k + 1;
        }
        let p = DDFloat::from_u128(binomial) / DDFloat::from_u128(falling);
        let q = if k % 2 == 0 { p } else { -p };
        coefficients.push((p, q));
    }
    PadeTable::new("pade_exp", coefficients, 0.5)
}

#[test]
fn test_pade_exp_coefficients() {
    let table = pade_exp(2).unwrap();
    assert_eq!(table.degree(), 2);
    assert_eq!(table.min_denominator(), 0.5);
    // [2/2]: (1 + u/2 + u^2/12) / (1 - u/2 + u^2/12)
    let c = table.coefficients();
    assert_eq!(c[0], (DDFloat::ONE, DDFloat::ONE));
    assert_eq!(c[1], (DDFloat::HALF, -DDFloat::HALF));
    assert_eq!(c[2].0, DDFloat::ONE / 12.0);
    assert_eq!(c[2].1, DDFloat::ONE / 12.0);

    // Tables are shared.
    let again = pade_exp(2).unwrap();
    assert!(Arc::ptr_eq(&table, &again));

    assert!(pade_exp(MAX_PADE_DEGREE).is_ok());
    assert_eq!(
        pade_exp(17).unwrap_err(),
        Error::Range {
            name: "degree",
            value: 17,
            bound: 16
        }
    );
}

#[test]
fn test_pade_exp_accuracy() {
    use crate::utils::rel_err_to;

    let table = pade_exp(7).unwrap();
    let x = DDFloat::ONE / 16.0;
    let v = table.evaluate(x).unwrap();
    assert!(rel_err_to(v, "1.064494458917859429563390594642889673101") < 1e-32);
    assert_eq!(table.evaluate(DDFloat::ZERO).unwrap(), 1.0);

    let table = pade_exp(16).unwrap();
    let v = table.evaluate(DDFloat::ONE).unwrap();
    assert!((v - DDFloat::E).abs() < 1e-31);
    let v = table.evaluate(DDFloat::from_f64(-0.375)).unwrap();
    assert!(rel_err_to(v, "0.6872892787909721985452023391465135904347") < 1e-31);
}

#[test]
fn test_denominator_check() {
    // 1 / (1 - u) has a pole at u = 1.
    let c = vec![
        (DDFloat::ONE, DDFloat::ONE),
        (DDFloat::ZERO, -DDFloat::ONE),
    ];
    let table = PadeTable::new("pole", c, 0.25);
    assert_eq!(table.evaluate(DDFloat::HALF).unwrap(), 2.0);
    match table.evaluate(DDFloat::from_f64(0.9)) {
        Err(Error::Computation {
            function,
            minimum,
            ..
        }) => {
            assert_eq!(function, "pole");
            assert_eq!(minimum, 0.25);
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(table.evaluate(DDFloat::NAN).is_err());
}

#[test]
fn test_range_dispatch() {
    const SEGMENTS: [Segment; 3] = [
        Segment {
            upper: Bound::Exclusive(-1.0),
            anchor: -2.0,
            index: 0,
        },
        Segment {
            upper: Bound::Exclusive(1.0),
            anchor: 0.0,
            index: 1,
        },
        Segment {
            upper: Bound::Inclusive(3.0),
            anchor: 2.0,
            index: 2,
        },
    ];
    const DISPATCH: RangeDispatch = RangeDispatch::new(&SEGMENTS);

    let index = |x: f64| DISPATCH.select(DDFloat::from_f64(x)).map(|(s, _)| s.index);
    assert_eq!(index(-5.0), Some(0));
    assert_eq!(index(-1.0), Some(1));
    assert_eq!(index(0.999), Some(1));
    assert_eq!(index(1.0), Some(2));
    assert_eq!(index(3.0), Some(2));
    assert_eq!(index(3.0000001), None);
    assert_eq!(index(f64::NAN), None);

    let (seg, u) = DISPATCH.select(DDFloat::from_f64(2.5)).unwrap();
    assert_eq!(seg.anchor, 2.0);
    assert_eq!(u, 0.5);
    assert_eq!(DISPATCH.segments().len(), 3);
}
