//! Compensated summation and the generic series driver.

use crate::DDFloat;
use core::iter::Sum;

/// A term whose magnitude is at most `EPSILON_SUM` times the running sum no
/// longer changes the double-double result (2^-106).
pub const EPSILON_SUM: f64 = 1.232595164407831e-32;

/// A Kahan-style accumulator in double-double precision. The rounding
/// residue of every addition is kept in a separate correction word and fed
/// back into the next addition.
///
/// # Examples
///
/// ```
///    use ddfloat::{CompensatedSum, DDFloat};
///
///    let mut acc = CompensatedSum::new();
///    for k in 1..=10 {
///        acc.add(DDFloat::from(k));
///    }
///    assert_eq!(acc.value(), 55.0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CompensatedSum {
    sum: DDFloat,
    correction: DDFloat,
    last: DDFloat,
    count: usize,
}

impl CompensatedSum {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an accumulator that starts at `x`. The initial value does not
    /// count as a term.
    pub fn with_value(x: DDFloat) -> Self {
        CompensatedSum {
            sum: x,
            ..Self::default()
        }
    }

    /// Add one term.
    pub fn add(&mut self, term: DDFloat) {
        let y = term - self.correction;
        let t = self.sum + y;
        // Infinities and NaN have no rounding residue to carry.
        self.correction = if t.is_finite() {
            (t - self.sum) - y
        } else {
            DDFloat::ZERO
        };
        self.sum = t;
        self.last = term;
        self.count += 1;
    }

    /// Returns the compensated sum.
    pub fn value(&self) -> DDFloat {
        if !self.sum.is_finite() {
            return self.sum;
        }
        self.sum - self.correction
    }

    /// Returns the most recently added term (zero before the first one).
    pub fn last_term(&self) -> DDFloat {
        self.last
    }

    /// Returns the number of terms that were added.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Returns true once the most recent term is too small to move the sum.
    pub fn is_converged(&self) -> bool {
        if self.count == 0 {
            return false;
        }
        let term = self.last.hi().abs();
        term == 0.0 || term <= EPSILON_SUM * self.sum.hi().abs()
    }
}

impl Extend<DDFloat> for CompensatedSum {
    fn extend<I: IntoIterator<Item = DDFloat>>(&mut self, iter: I) {
        for term in iter {
            self.add(term);
        }
    }
}

impl Sum for DDFloat {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        let mut acc = CompensatedSum::new();
        acc.extend(iter);
        acc.value()
    }
}

impl<'a> Sum<&'a DDFloat> for DDFloat {
    fn sum<I: Iterator<Item = &'a DDFloat>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Describes why an iterative evaluation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The stopping criterion was met.
    Converged,
    /// The source ran out of terms before the criterion was met.
    Exhausted,
    /// The iteration cap was reached. The value is the best effort.
    IterationLimit,
}

/// The result of a series or continued fraction evaluation.
#[derive(Debug, Clone, Copy)]
pub struct Evaluation {
    pub value: DDFloat,
    pub outcome: Outcome,
    /// The number of terms (or continued fraction steps) that were consumed.
    pub terms: usize,
}

impl Evaluation {
    pub fn is_converged(&self) -> bool {
        self.outcome == Outcome::Converged
    }
}

/// Controls the series driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesConfig {
    /// The number of terms to consume before convergence is tested.
    pub min_terms: usize,
    /// The iteration cap.
    pub max_terms: usize,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        SeriesConfig {
            min_terms: 1,
            max_terms: 2048,
        }
    }
}

impl SeriesConfig {
    pub fn with_min_terms(mut self, min_terms: usize) -> Self {
        self.min_terms = min_terms;
        self
    }

    pub fn with_max_terms(mut self, max_terms: usize) -> Self {
        self.max_terms = max_terms;
        self
    }
}

/// Sum the terms of a series with compensated summation. Stops when the
/// latest term no longer changes the sum (after `min_terms` terms), when
/// the iterator ends, or at `max_terms`. Reaching the cap is not an error:
/// the partial sum is returned with `Outcome::IterationLimit`.
///
/// # Examples
///
/// ```
///    use ddfloat::{sum_series, DDFloat, SeriesConfig};
///
///    // e = sum(1/k!)
///    let terms = (1..).scan(DDFloat::ONE, |t, k| {
///        let cur = *t;
///        *t = *t / k as f64;
///        Some(cur)
///    });
///    let e = sum_series(terms, &SeriesConfig::default());
///    assert!(e.is_converged());
///    assert!((e.value - DDFloat::E).abs() < 1e-31);
/// ```
pub fn sum_series<I>(terms: I, config: &SeriesConfig) -> Evaluation
where
    I: IntoIterator<Item = DDFloat>,
{
    let mut acc = CompensatedSum::new();
    for term in terms {
        acc.add(term);
        if acc.count() >= config.min_terms && acc.is_converged() {
            return Evaluation {
                value: acc.value(),
                outcome: Outcome::Converged,
                terms: acc.count(),
            };
        }
        if acc.count() >= config.max_terms {
            log::debug!(
                "series stopped at the cap of {} terms, last term {:e}",
                config.max_terms,
                acc.last_term().hi()
            );
            return Evaluation {
                value: acc.value(),
                outcome: Outcome::IterationLimit,
                terms: acc.count(),
            };
        }
    }
    Evaluation {
        value: acc.value(),
        outcome: Outcome::Exhausted,
        terms: acc.count(),
    }
}

#[test]
fn test_compensated_sum() {
    // Naive double-double summation of 0.1 loses bits; the compensated sum
    // matches the exact product.
    let tenth = DDFloat::parse("0.1").unwrap();
    let mut acc = CompensatedSum::new();
    for _ in 0..100_000 {
        acc.add(tenth);
    }
    let expected = tenth * 100_000.0;
    assert!(((acc.value() - expected) / expected).hi().abs() < 1e-31);
    assert_eq!(acc.count(), 100_000);
    assert_eq!(acc.last_term(), tenth);

    let acc = CompensatedSum::with_value(DDFloat::from(5));
    assert_eq!(acc.value(), 5.0);
    assert_eq!(acc.count(), 0);
    assert!(!acc.is_converged());
}

#[test]
fn test_sum_trait() {
    let v: Vec<DDFloat> = (1..=100).map(DDFloat::from).collect();
    let s: DDFloat = v.iter().sum();
    assert_eq!(s, 5050.0);

    // The small terms survive next to a large one.
    let tiny = crate::utils::scalbn(1.0, -90);
    let parts = [DDFloat::ONE, DDFloat::from_f64(tiny), DDFloat::from_f64(-1.0)];
    let s: DDFloat = parts.into_iter().sum();
    assert_eq!(s, tiny);

    let mut acc = CompensatedSum::new();
    acc.extend(v);
    assert_eq!(acc.value(), 5050.0);
}

#[test]
fn test_sum_non_finite() {
    let inf = DDFloat::INFINITY;
    let one = DDFloat::ONE;

    let s: DDFloat = [inf, one].into_iter().sum();
    assert_eq!(s, f64::INFINITY);
    let s: DDFloat = [one, inf, one].into_iter().sum();
    assert_eq!(s, f64::INFINITY);
    let s: DDFloat = [one, -inf, one, one].into_iter().sum();
    assert_eq!(s, f64::NEG_INFINITY);
    let s: DDFloat = [inf, -inf].into_iter().sum();
    assert!(s.is_nan());

    // Overflow from finite terms also saturates.
    let s: DDFloat = [DDFloat::MAX, DDFloat::MAX, -one].into_iter().sum();
    assert_eq!(s, f64::INFINITY);

    let terms = [one, inf, one].into_iter();
    let res = sum_series(terms, &SeriesConfig::default());
    assert!(res.value.is_inf());
}

#[test]
fn test_convergence() {
    let mut acc = CompensatedSum::new();
    acc.add(DDFloat::ONE);
    assert!(!acc.is_converged());
    acc.add(DDFloat::from_f64(1e-33));
    assert!(acc.is_converged());
    acc.add(DDFloat::from_f64(1e-20));
    assert!(!acc.is_converged());
    acc.add(DDFloat::ZERO);
    assert!(acc.is_converged());
}

#[test]
fn test_sum_series() {
    // sum(2^-k) for k >= 0 converges to 2.
    let halves = core::iter::successors(Some(DDFloat::ONE), |t| Some(t.mul_pow2(0.5)));
    let res = sum_series(halves, &SeriesConfig::default());
    assert!(res.is_converged());
    assert!((res.value - 2.0).abs() < 1e-31);
    assert!(res.terms > 100 && res.terms < 120);

    // A finite iterator that never converges.
    let few = (1..=4).map(DDFloat::from);
    let res = sum_series(few, &SeriesConfig::default());
    assert_eq!(res.outcome, Outcome::Exhausted);
    assert_eq!(res.value, 10.0);

    // A divergent series stops at the cap with the partial sum.
    let ones = core::iter::repeat(DDFloat::ONE);
    let config = SeriesConfig::default().with_max_terms(50);
    let res = sum_series(ones, &config);
    assert_eq!(res.outcome, Outcome::IterationLimit);
    assert_eq!(res.value, 50.0);
    assert_eq!(res.terms, 50);

    // A leading zero term does not end the series early.
    let terms = [0.0, 1.0, 0.5, 0.0].map(DDFloat::from_f64);
    let config = SeriesConfig::default().with_min_terms(2);
    let res = sum_series(terms, &config);
    assert!(res.is_converged());
    assert_eq!(res.value, 1.5);
    assert_eq!(res.terms, 4);
}
