use super::arithmetic::two_sum;
use core::cmp::Ordering;

/// Declare the different categories of the double-double number. These
/// mirror the categories of the native double applied to the high word, with
/// the subnormal boundary moved up to `MIN_NORMAL_EXP`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Infinity,
    NaN,
    Normal,
    Subnormal,
    Zero,
}

/// The smallest binary exponent of `hi` at which the low word can still hold
/// a full 53-bit extension without entering the native subnormal range
/// (-1022 + 53). Finite non-zero values below it have less than the full
/// double-double precision.
pub const MIN_NORMAL_EXP: i32 = -969;

/// This is the main data structure of this library. It represents the
/// unevaluated sum `hi + lo` of two machine doubles, which gives roughly 106
/// bits (about 32 decimal digits) of significand with the exponent range of
/// a double.
///
/// The pair is kept regularized: `fl(hi + lo) == hi`, so `|lo|` is at most
/// half an ulp of `hi`. NaN, infinities and zeros live in `hi` with `lo`
/// set to zero. Values are immutable; every operation returns a new one.
///
/// # Examples
///
/// ```
///    use ddfloat::DDFloat;
///
///    let third = DDFloat::ONE / DDFloat::from(3);
///    let one = third * 3.0;
///    assert!((one - DDFloat::ONE).abs() < DDFloat::EPSILON);
///
///    // Prints: 1.41421356237309504880168872420969e0
///    println!("{}", DDFloat::from(2).sqrt());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DDFloat {
    // The leading word; carries the sign and the special values.
    hi: f64,
    // The trailing word, |lo| <= ulp(hi)/2.
    lo: f64,
}

impl DDFloat {
    pub const ZERO: Self = Self::raw(0.0, 0.0);
    pub const NEG_ZERO: Self = Self::raw(-0.0, 0.0);
    pub const ONE: Self = Self::raw(1.0, 0.0);
    pub const TWO: Self = Self::raw(2.0, 0.0);
    pub const HALF: Self = Self::raw(0.5, 0.0);
    pub const NAN: Self = Self::raw(f64::NAN, 0.0);
    pub const INFINITY: Self = Self::raw(f64::INFINITY, 0.0);
    pub const NEG_INFINITY: Self = Self::raw(f64::NEG_INFINITY, 0.0);
    /// The relative spacing of double-double numbers near one (2^-104).
    pub const EPSILON: Self = Self::raw(4.930380657631324e-32, 0.0);
    /// The largest finite value.
    pub const MAX: Self = Self::raw(f64::MAX, 9.979201547673598e291);
    /// The smallest positive value with full double-double precision.
    pub const MIN_POSITIVE: Self = Self::raw(2.004168360008973e-292, 0.0);

    /// Creates a number from two words that are already regularized. This is
    /// used by the arithmetic kernels whose output satisfies the invariant
    /// by construction.
    pub(crate) const fn raw(hi: f64, lo: f64) -> Self {
        DDFloat { hi, lo }
    }

    /// Create a new number with the value `hi + lo`. The pair does not need
    /// to be regularized: the leading word becomes the rounded sum and the
    /// trailing word the exact rounding error. Non-finite sums collapse to
    /// `(sum, 0)`.
    pub fn new(hi: f64, lo: f64) -> Self {
        if lo == 0.0 {
            // Keeps the sign of a zero leading word.
            return Self::raw(hi, 0.0);
        }
        let (s, e) = two_sum(hi, lo);
        if !s.is_finite() {
            return Self::raw(s, 0.0);
        }
        if !e.is_finite() {
            return Self::raw(hi, 0.0);
        }
        Self::raw(s, e)
    }

    /// Promote a machine double.
    pub const fn from_f64(val: f64) -> Self {
        Self::raw(val, 0.0)
    }

    /// Returns the leading word.
    pub fn hi(&self) -> f64 {
        self.hi
    }

    /// Returns the trailing word.
    pub fn lo(&self) -> f64 {
        self.lo
    }

    /// Returns the category of the number.
    pub fn category(&self) -> Category {
        if self.hi.is_nan() {
            Category::NaN
        } else if self.hi.is_infinite() {
            Category::Infinity
        } else if self.hi == 0.0 {
            Category::Zero
        } else if crate::utils::ilogb_f64(self.hi) < MIN_NORMAL_EXP {
            Category::Subnormal
        } else {
            Category::Normal
        }
    }

    /// Returns true if the number is a +- NaN.
    pub fn is_nan(&self) -> bool {
        self.hi.is_nan()
    }

    /// Returns true if the number is +-inf.
    pub fn is_inf(&self) -> bool {
        self.hi.is_infinite()
    }

    /// Returns true if the number is neither infinite nor NaN.
    pub fn is_finite(&self) -> bool {
        self.hi.is_finite()
    }

    /// Returns true if the number is +-0. Only the leading word is tested.
    pub fn is_zero(&self) -> bool {
        self.hi == 0.0
    }

    /// Returns true if this number is normal (not Zero, NaN, Inf, or below
    /// the double-double normal range).
    pub fn is_normal(&self) -> bool {
        self.category() == Category::Normal
    }

    pub fn is_subnormal(&self) -> bool {
        self.category() == Category::Subnormal
    }

    /// Returns true if the sign bit is set, including -0 and negative NaNs.
    pub fn is_negative(&self) -> bool {
        self.hi.is_sign_negative()
    }

    /// Returns -1, 0 or 1 following the sign of the value, or NaN.
    pub fn signum(&self) -> f64 {
        if self.hi.is_nan() {
            return f64::NAN;
        }
        if self.hi == 0.0 {
            return 0.0;
        }
        self.hi.signum()
    }

    /// Returns true if the pair satisfies the representation invariant. This
    /// is a self-check for debug assertions, not a runtime guard.
    pub fn is_regular(&self) -> bool {
        if !self.hi.is_finite() || self.hi == 0.0 {
            return self.lo == 0.0;
        }
        self.lo.is_finite() && self.hi + self.lo == self.hi
    }

    /// Prints the number using the internal representation.
    pub fn dump(&self) {
        println!(
            "DD[hi = {:e} ({:#018x}), lo = {:e} ({:#018x})]",
            self.hi,
            self.hi.to_bits(),
            self.lo,
            self.lo.to_bits()
        );
    }
}

impl Default for DDFloat {
    fn default() -> Self {
        Self::ZERO
    }
}

impl PartialEq for DDFloat {
    fn eq(&self, other: &Self) -> bool {
        self.hi == other.hi && self.lo == other.lo
    }
}

impl PartialEq<f64> for DDFloat {
    fn eq(&self, other: &f64) -> bool {
        self.hi == *other && self.lo == 0.0
    }
}

/// Order by the leading words, and only consult the trailing words when the
/// leading words tie.
impl PartialOrd for DDFloat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.hi.partial_cmp(&other.hi) {
            Some(Ordering::Equal) => self.lo.partial_cmp(&other.lo),
            ord => ord,
        }
    }
}

impl PartialOrd<f64> for DDFloat {
    fn partial_cmp(&self, other: &f64) -> Option<Ordering> {
        self.partial_cmp(&DDFloat::from_f64(*other))
    }
}

#[test]
fn test_comparisons() {
    use super::utils;

    // Compare a bunch of special values, using the <,>,== operators and check
    // that they match the comparison on doubles.
    for first in utils::get_special_test_values() {
        for second in utils::get_special_test_values() {
            let is_less = first < second;
            let is_eq = first == second;
            let is_gt = first > second;
            let first = DDFloat::from_f64(first);
            let second = DDFloat::from_f64(second);
            assert_eq!(is_less, first < second, "<");
            assert_eq!(is_eq, first == second, "==");
            assert_eq!(is_gt, first > second, ">");
        }
    }
}

#[test]
fn test_lo_breaks_ties() {
    let a = DDFloat::new(1.0, 1e-20);
    let b = DDFloat::new(1.0, -1e-20);
    assert!(b < a);
    assert!(a > 1.0);
    assert!(b < 1.0);
    assert!(a != b);
    assert_eq!(a, DDFloat::new(1.0, 1e-20));
}

#[test]
fn test_normalizing_constructor() {
    use super::utils::Lfsr;

    // The sum of a scaled 53-bit integer and a small integer is exact in
    // i128, which lets us check that no bits are lost.
    let mut lfsr = Lfsr::new();
    for _ in 0..20000 {
        let shift = (lfsr.get64() % 60) as i32;
        let m1 = (lfsr.get64() >> 11) as i64;
        let m2 = (lfsr.get64() >> 11) as i64;
        let neg1 = lfsr.get64() & 1 == 1;
        let neg2 = lfsr.get64() & 1 == 1;
        let hi0 = crate::utils::scalbn(if neg1 { -m1 } else { m1 } as f64, shift);
        let lo0 = if neg2 { -m2 } else { m2 } as f64;

        let x = DDFloat::new(hi0, lo0);
        assert!(x.is_regular());
        let exact = hi0 as i128 + lo0 as i128;
        assert_eq!(x.hi() as i128 + x.lo() as i128, exact);
    }
}

#[test]
fn test_non_finite_collapse() {
    let x = DDFloat::new(f64::INFINITY, 1.0);
    assert!(x.is_inf());
    assert_eq!(x.lo(), 0.0);
    let x = DDFloat::new(f64::NAN, 1.0);
    assert!(x.is_nan());
    assert_eq!(x.lo(), 0.0);
    let x = DDFloat::new(f64::MAX, f64::MAX);
    assert!(x.is_inf());
    assert_eq!(x.lo(), 0.0);

    // A non-finite trailing word makes the sum non-finite, and the sum wins.
    let x = DDFloat::new(1.0, f64::NAN);
    assert!(x.is_nan());
    assert_eq!(x.lo(), 0.0);
    let x = DDFloat::new(1.0, f64::NEG_INFINITY);
    assert_eq!(x, f64::NEG_INFINITY);
    assert_eq!(x.lo(), 0.0);
}

#[test]
fn test_classification() {
    assert_eq!(DDFloat::ZERO.category(), Category::Zero);
    assert_eq!(DDFloat::NEG_ZERO.category(), Category::Zero);
    assert_eq!(DDFloat::NAN.category(), Category::NaN);
    assert_eq!(DDFloat::NEG_INFINITY.category(), Category::Infinity);
    assert_eq!(DDFloat::ONE.category(), Category::Normal);
    assert_eq!(DDFloat::MIN_POSITIVE.category(), Category::Normal);
    assert_eq!(DDFloat::MAX.category(), Category::Normal);

    // Native normals below 2^-969 are subnormal for double-double.
    let x = DDFloat::from_f64(f64::MIN_POSITIVE);
    assert!(x.is_subnormal());
    assert!(!x.is_normal());
    let x = DDFloat::from_f64(-1e-300);
    assert!(x.is_subnormal());

    assert!(DDFloat::NEG_ZERO.is_negative());
    assert!(!DDFloat::ZERO.is_negative());
    assert_eq!(DDFloat::from_f64(-3.0).signum(), -1.0);
    assert_eq!(DDFloat::ZERO.signum(), 0.0);
    assert!(DDFloat::NAN.signum().is_nan());
    assert!(DDFloat::MAX.is_regular());
    assert!(DDFloat::EPSILON == crate::utils::scalbn(1.0, -104));
    assert!(DDFloat::MIN_POSITIVE == crate::utils::scalbn(1.0, MIN_NORMAL_EXP));
}
