//! This module contains the evaluator of continued fractions of the form:
//! b0 + a1/(b1 + a2/(b2 + a3/(b3 + ...))).

use super::sum::{Evaluation, Outcome};
use crate::scale::adjust_scale;
use crate::DDFloat;

/// A source of continued fraction terms.
pub trait ContinuedFraction {
    /// The leading term.
    fn b0(&self) -> DDFloat;
    /// Returns the partial numerator and denominator `(a_n, b_n)`, n >= 1.
    fn term(&self, n: usize) -> (DDFloat, DDFloat);
}

/// Adapts a closure that returns `(a_n, b_n)` to a `ContinuedFraction`.
pub struct FnFraction<F> {
    b0: DDFloat,
    terms: F,
}

impl<F: Fn(usize) -> (DDFloat, DDFloat)> FnFraction<F> {
    pub fn new(b0: DDFloat, terms: F) -> Self {
        FnFraction { b0, terms }
    }
}

impl<F: Fn(usize) -> (DDFloat, DDFloat)> ContinuedFraction for FnFraction<F> {
    fn b0(&self) -> DDFloat {
        self.b0
    }
    fn term(&self, n: usize) -> (DDFloat, DDFloat) {
        (self.terms)(n)
    }
}

/// Controls the continued fraction evaluator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractionConfig {
    /// The iteration cap.
    pub max_iterations: usize,
    /// The relative distance between two successive convergents that ends
    /// the evaluation.
    pub tolerance: f64,
    /// The recurrence values are rescaled every `rescale_interval` steps.
    /// Zero disables the rescaling.
    pub rescale_interval: usize,
}

impl Default for FractionConfig {
    fn default() -> Self {
        FractionConfig {
            max_iterations: 4096,
            tolerance: 1e-30,
            rescale_interval: 4,
        }
    }
}

impl FractionConfig {
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_rescale_interval(mut self, rescale_interval: usize) -> Self {
        self.rescale_interval = rescale_interval;
        self
    }
}

/// Evaluate the continued fraction `cf` from the convergents A_n/B_n:
///   A_n = b_n A_{n-1} + a_n A_{n-2},  A_{-1} = 1, A_0 = b0
///   B_n = b_n B_{n-1} + a_n B_{n-2},  B_{-1} = 0, B_0 = 1
///
/// The recurrence values grow or shrink geometrically, so they are brought
/// back to a common exponent every few steps. The shift cancels in the
/// ratio. The evaluation stops when two successive convergents agree to the
/// configured tolerance. At the iteration cap the last convergent is
/// returned with `Outcome::IterationLimit`. If the recurrence overflows the
/// value is NaN.
///
/// # Examples
///
/// ```
///    use ddfloat::{evaluate_fraction, DDFloat, FnFraction, FractionConfig};
///
///    // sqrt(2) = 1 + 1/(2 + 1/(2 + ...))
///    let cf = FnFraction::new(DDFloat::ONE, |_| (DDFloat::ONE, DDFloat::TWO));
///    let res = evaluate_fraction(&cf, &FractionConfig::default());
///    assert!(res.is_converged());
///    assert!((res.value - DDFloat::SQRT_2).abs() < 1e-30);
/// ```
pub fn evaluate_fraction<C: ContinuedFraction + ?Sized>(
    cf: &C,
    config: &FractionConfig,
) -> Evaluation {
    // The convergents n-1 and n.
    let mut a = (DDFloat::ONE, cf.b0());
    let mut b = (DDFloat::ZERO, DDFloat::ONE);

    for n in 1..=config.max_iterations {
        let (an, bn) = cf.term(n);
        a = (a.1, bn * a.1 + an * a.0);
        b = (b.1, bn * b.1 + an * b.0);

        if config.rescale_interval > 0 && n % config.rescale_interval == 0 {
            let (_, [a0, a1, b0, b1]) = adjust_scale(0, [a.0, a.1, b.0, b.1]);
            a = (a0, a1);
            b = (b0, b1);
        }

        if !a.1.is_finite() || !b.1.is_finite() {
            log::debug!("continued fraction overflowed at step {}", n);
            return Evaluation {
                value: DDFloat::NAN,
                outcome: Outcome::IterationLimit,
                terms: n,
            };
        }

        // A vanishing denominator has no convergent to compare against.
        if b.0.is_zero() || b.1.is_zero() {
            continue;
        }
        let cross = a.1 * b.0;
        let delta = (cross - a.0 * b.1).abs();
        if delta <= cross.abs() * config.tolerance {
            return Evaluation {
                value: a.1 / b.1,
                outcome: Outcome::Converged,
                terms: n,
            };
        }
    }

    log::debug!(
        "continued fraction stopped at the cap of {} steps",
        config.max_iterations
    );
    let value = if b.1.is_zero() { DDFloat::NAN } else { a.1 / b.1 };
    Evaluation {
        value,
        outcome: Outcome::IterationLimit,
        terms: config.max_iterations,
    }
}

#[cfg(test)]
fn sqrt2_fraction() -> FnFraction<impl Fn(usize) -> (DDFloat, DDFloat)> {
    FnFraction::new(DDFloat::ONE, |_| (DDFloat::ONE, DDFloat::TWO))
}

#[test]
fn test_sqrt2_and_golden_ratio() {
    use crate::utils::rel_err_to;

    let res = evaluate_fraction(&sqrt2_fraction(), &FractionConfig::default());
    assert!(res.is_converged());
    assert!(res.terms < 60);
    assert!(rel_err_to(res.value, "1.414213562373095048801688724209698") < 1e-30);

    let phi = FnFraction::new(DDFloat::ONE, |_| (DDFloat::ONE, DDFloat::ONE));
    let res = evaluate_fraction(&phi, &FractionConfig::default());
    assert!(res.is_converged());
    assert!(rel_err_to(res.value, "1.618033988749894848204586834365638") < 1e-30);
}

#[test]
fn test_pi_fraction() {
    // 4/pi = 1 + 1^2/(3 + 2^2/(5 + 3^2/(7 + ...)))
    let cf = FnFraction::new(DDFloat::ONE, |n| {
        let n = n as f64;
        (DDFloat::from_f64(n * n), DDFloat::from_f64(2.0 * n + 1.0))
    });
    let res = evaluate_fraction(&cf, &FractionConfig::default());
    assert!(res.is_converged());
    let pi = DDFloat::from(4) / res.value;
    assert!(((pi - DDFloat::PI) / DDFloat::PI).abs() < 1e-30);
}

#[test]
fn test_iteration_limit() {
    // Convergents: 1, 3/2, 7/5, 17/12, 41/29, 99/70.
    let config = FractionConfig::default().with_max_iterations(5);
    let res = evaluate_fraction(&sqrt2_fraction(), &config);
    assert_eq!(res.outcome, Outcome::IterationLimit);
    assert_eq!(res.terms, 5);
    assert_eq!(res.value, DDFloat::from(99) / 70.0);

    // A looser tolerance stops earlier.
    let config = FractionConfig::default().with_tolerance(1e-6);
    let res = evaluate_fraction(&sqrt2_fraction(), &config);
    assert!(res.is_converged());
    assert!(res.terms < 10);
}

#[test]
fn test_rescaling() {
    // An equivalence transformation of the sqrt(2) fraction with huge terms.
    // The recurrence values overflow unless they are rescaled.
    let c = 1e60;
    let cf = FnFraction::new(DDFloat::ONE, move |n| {
        let a = if n == 1 { c } else { c * c };
        (DDFloat::from_f64(a), DDFloat::from_f64(2.0 * c))
    });
    let res = evaluate_fraction(&cf, &FractionConfig::default());
    assert!(res.is_converged());
    assert!((res.value - DDFloat::SQRT_2).abs() < 1e-30);

    let config = FractionConfig::default().with_rescale_interval(0);
    let res = evaluate_fraction(&cf, &config);
    assert!(!res.is_converged());
    assert!(res.value.is_nan());
}
