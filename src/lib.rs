//! ddfloat is a double-double floating point library. A number is the
//! unevaluated sum of two machine doubles, which gives about 32 decimal
//! digits of precision with the range of a double, at a fraction of the cost
//! of arbitrary precision arithmetic.
//!
//! On top of the number type, the library provides the numerical engines
//! that special functions are built from: compensated summation of series,
//! table-driven rational approximations, and continued fractions. A set of
//! special functions (exp, ln, erf, gamma and the incomplete gamma functions,
//! orthogonal polynomials) is implemented with them.
//!
//! ```
//!    use ddfloat::DDFloat;
//!
//!    let x = DDFloat::parse("0.5").unwrap();
//!    let y = x.erf() + x.erfc();
//!    assert!((y - 1.0).abs() < 1e-31);
//!
//!    // Prints: 1.77245385090551602729816748334115e0
//!    println!("{}", DDFloat::PI.sqrt());
//! ```

mod arithmetic;
mod bigint;
mod cache;
mod cast;
mod error;
mod float;
mod operations;
mod scale;
mod string;
mod utils;

#[cfg(feature = "python")]
mod py;

pub use self::error::{Error, ParseErrorKind, Result};
pub use self::float::{Category, DDFloat, MIN_NORMAL_EXP};
pub use self::operations::{
    evaluate_fraction, pade_exp, sum_series, Bound, CompensatedSum,
    ContinuedFraction, Evaluation, FnFraction, FractionConfig, Outcome,
    PadeTable, RangeDispatch, Segment, SeriesConfig, EPSILON_SUM,
    MAX_BERNOULLI, MAX_DEGREE, MAX_FACTORIAL, MAX_NEWTON_ROOT,
    MAX_PADE_DEGREE, MAX_POCHHAMMER,
};
pub use self::scale::adjust_scale;
pub use self::string::DECIMAL_DIGITS;
