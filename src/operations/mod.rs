//! Contains the numerical evaluation engines and the mathematical functions
//! and constants that are built on them.

mod constants;
mod erf;
mod exp;
mod frac;
mod functions;
mod gamma;
mod poly;
mod rational;
mod sum;

pub use constants::{MAX_BERNOULLI, MAX_FACTORIAL};
pub use frac::{evaluate_fraction, ContinuedFraction, FnFraction, FractionConfig};
pub use functions::MAX_NEWTON_ROOT;
pub use poly::{MAX_DEGREE, MAX_POCHHAMMER};
pub use rational::{
    pade_exp, Bound, PadeTable, RangeDispatch, Segment, MAX_PADE_DEGREE,
};
pub use sum::{
    sum_series, CompensatedSum, Evaluation, Outcome, SeriesConfig, EPSILON_SUM,
};
