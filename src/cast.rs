use super::arithmetic::quick_two_sum;
use super::float::DDFloat;
use super::utils;

impl DDFloat {
    /// Load the integer `val`. Integers wider than 53 bits are split between
    /// the two words, so the conversion is always exact.
    pub fn from_u64(val: u64) -> Self {
        let hi = val as f64;
        // `hi` can be 2^64 after rounding, which does not fit in u64.
        let lo = (val as i128 - hi as i128) as f64;
        Self::raw(hi, lo)
    }

    /// Load the integer `val`. The conversion is always exact.
    pub fn from_i64(val: i64) -> Self {
        let hi = val as f64;
        let lo = (val as i128 - hi as i128) as f64;
        Self::raw(hi, lo)
    }

    /// Load the integer `val`. Exact for values below 2^106, rounded
    /// otherwise.
    pub fn from_u128(val: u128) -> Self {
        let top = Self::from_u64((val >> 64) as u64);
        let bottom = Self::from_u64(val as u64);
        top.mul_pow2(18446744073709551616.0) + bottom
    }

    /// Loads and converts a native fp32 value. This is always exact.
    pub fn from_f32(val: f32) -> Self {
        Self::from_f64(val as f64)
    }

    /// Convert this number to fp64. Regularized numbers round to `hi`.
    pub fn to_f64(&self) -> f64 {
        self.hi()
    }

    /// Converts and returns the integral part, rounding towards zero. Values
    /// outside the range of i64 saturate, and NaN converts to zero.
    pub fn to_i64(&self) -> i64 {
        if self.is_nan() {
            return 0;
        }
        if self.is_inf() {
            return if self.is_negative() { i64::MIN } else { i64::MAX };
        }
        let t = self.trunc();
        // Both words of an integral value are integers.
        let val = t.hi() as i128 + t.lo() as i128;
        val.clamp(i64::MIN as i128, i64::MAX as i128) as i64
    }

    /// Returns the largest integer that is not larger than this number.
    pub fn floor(&self) -> Self {
        if !self.is_finite() || self.is_zero() {
            return *self;
        }
        let hi = self.hi().floor();
        if hi != self.hi() {
            // The leading word has a fraction, and the trailing word is too
            // small to move the value past the next integer.
            return Self::raw(hi, 0.0);
        }
        let (hi, lo) = quick_two_sum(hi, self.lo().floor());
        Self::raw(hi, lo)
    }

    /// Returns the smallest integer that is not smaller than this number.
    pub fn ceil(&self) -> Self {
        -(-*self).floor()
    }

    /// Returns a value that is rounded to the nearest integer that's not larger
    /// in magnitude than this number.
    pub fn trunc(&self) -> Self {
        if self.is_negative() {
            self.ceil()
        } else {
            self.floor()
        }
    }

    /// Rounds to the nearest integer, with ties going up: `floor(x + 0.5)`.
    /// Notice that this is not the rounding mode of `f64::round`, which rounds
    /// ties away from zero.
    pub fn round(&self) -> Self {
        (*self + 0.5).floor()
    }

    /// Returns the fractional part, with the sign of this number.
    pub fn fract(&self) -> Self {
        *self - self.trunc()
    }

    /// Returns the raw bits of the two words, leading word first.
    pub fn to_bits(&self) -> [u64; 2] {
        [self.hi().to_bits(), self.lo().to_bits()]
    }

    /// Build a number from the raw bits of its two words. The pair is
    /// regularized, so arbitrary bit patterns produce a valid number.
    pub fn from_bits(bits: [u64; 2]) -> Self {
        Self::new(f64::from_bits(bits[0]), f64::from_bits(bits[1]))
    }

    /// Returns the little-endian encoding: the leading word followed by the
    /// trailing word.
    pub fn to_le_bytes(&self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&self.hi().to_le_bytes());
        bytes[8..].copy_from_slice(&self.lo().to_le_bytes());
        bytes
    }

    /// Decode the little-endian encoding written by `to_le_bytes`.
    pub fn from_le_bytes(bytes: [u8; 16]) -> Self {
        let mut hi = [0u8; 8];
        let mut lo = [0u8; 8];
        hi.copy_from_slice(&bytes[..8]);
        lo.copy_from_slice(&bytes[8..]);
        Self::new(f64::from_le_bytes(hi), f64::from_le_bytes(lo))
    }
}

macro_rules! declare_from {
    ($ty:ty, $func:ident, $wide:ty) => {
        impl From<$ty> for DDFloat {
            fn from(val: $ty) -> Self {
                Self::$func(val as $wide)
            }
        }
    };
}

declare_from!(u128, from_u128, u128);
declare_from!(u64, from_u64, u64);
declare_from!(u32, from_u64, u64);
declare_from!(u16, from_u64, u64);
declare_from!(u8, from_u64, u64);
declare_from!(i64, from_i64, i64);
declare_from!(i32, from_i64, i64);
declare_from!(i16, from_i64, i64);
declare_from!(i8, from_i64, i64);
declare_from!(f32, from_f32, f32);
declare_from!(f64, from_f64, f64);

impl From<DDFloat> for f64 {
    fn from(val: DDFloat) -> f64 {
        val.to_f64()
    }
}

#[test]
fn test_cast_from_integers() {
    assert_eq!(DDFloat::from(0), 0.0);
    assert_eq!(DDFloat::from(-7), -7.0);
    assert_eq!(DDFloat::from(1u64 << 60), (1u64 << 60) as f64);

    // Wide integers keep every bit.
    let wide = (1i64 << 62) + 1;
    let x = DDFloat::from(wide);
    assert!(x.is_regular());
    assert_eq!(x.hi(), (1u64 << 62) as f64);
    assert_eq!(x.lo(), 1.0);
    assert_eq!(x.to_i64(), wide);

    let mut lfsr = utils::Lfsr::new();
    for _ in 0..10000 {
        let v = lfsr.get64();
        let x = DDFloat::from(v);
        assert!(x.is_regular());
        assert_eq!(x.hi() as i128 + x.lo() as i128, v as i128);
        let s = v as i64;
        assert_eq!(DDFloat::from(s).to_i64(), s);
    }

    assert_eq!(DDFloat::from(u64::MAX).to_i64(), i64::MAX);
    assert_eq!(DDFloat::from(i64::MIN).to_i64(), i64::MIN);

    // 32!/16! needs 74 bits.
    let v: u128 = (17..=32).product();
    let x = DDFloat::from(v);
    assert!(x.is_regular());
    assert_eq!(x.hi() as u128 as i128 + x.lo() as i128, v as i128);
    assert_eq!(DDFloat::from((1u128 << 100) + 3) - DDFloat::from_u128(1 << 100), 3.0);
}

#[test]
fn test_rounding_to_integer() {
    for i in 0..100 {
        let r = DDFloat::from_f64(i as f64 + 0.1).to_i64();
        assert_eq!(i, r);
    }
    assert_eq!(0, DDFloat::from_f64(0.9).to_i64());
    assert_eq!(99, DDFloat::from_f64(99.999).to_i64());
    assert_eq!(0, DDFloat::from_f64(-0.99).to_i64());
    assert_eq!(-3, DDFloat::from_f64(-3.5).to_i64());

    // Special values
    assert_eq!(0, DDFloat::NAN.to_i64());
    assert_eq!(i64::MIN, DDFloat::NEG_INFINITY.to_i64());
    assert_eq!(i64::MAX, DDFloat::INFINITY.to_i64());
    assert_eq!(i64::MAX, DDFloat::from_f64(1e300).to_i64());
}

#[test]
fn test_round_floor() {
    let large_integer = (1u64 << 52) as f64;
    assert_eq!(DDFloat::from_f64(0.4).trunc(), 0.);
    assert_eq!(DDFloat::from_f64(1.4).trunc(), 1.);
    assert_eq!(DDFloat::from_f64(1.99).trunc(), 1.);
    assert_eq!(DDFloat::from_f64(2.0).trunc(), 2.0);
    assert_eq!(DDFloat::from_f64(-2.4).trunc(), -2.0);
    assert_eq!(DDFloat::from_f64(large_integer).trunc(), large_integer);

    assert_eq!(DDFloat::from_f64(2.5).floor(), 2.0);
    assert_eq!(DDFloat::from_f64(2.5).round(), 3.0);
    assert_eq!(DDFloat::from_f64(-2.5).round(), -2.0);
    assert_eq!(DDFloat::from_f64(-2.5).floor(), -3.0);
    assert_eq!(DDFloat::from_f64(-2.5).ceil(), -2.0);
    assert_eq!(DDFloat::from_f64(2.25).fract(), 0.25);
    assert_eq!(DDFloat::from_f64(-2.25).fract(), -0.25);

    // The fraction lives in the trailing word.
    let x = DDFloat::new(1e20, 0.25);
    assert_eq!(x.floor(), 1e20);
    assert_eq!(x.ceil(), DDFloat::new(1e20, 1.0));
    let x = DDFloat::new(1e20, -0.25);
    assert_eq!(x.floor(), DDFloat::new(1e20, -1.0));
    assert_eq!(x.trunc(), DDFloat::new(1e20, -1.0));
    assert_eq!(x.round(), 1e20);

    assert!(DDFloat::NAN.floor().is_nan());
    assert!(DDFloat::INFINITY.ceil().is_inf());
    assert!(DDFloat::NEG_ZERO.floor().is_negative());
}

#[test]
fn test_binary_layout() {
    for v in utils::get_special_test_values() {
        let x = DDFloat::from_f64(v) / 3.0;
        if x.is_nan() {
            assert!(DDFloat::from_bits(x.to_bits()).is_nan());
            continue;
        }
        let y = DDFloat::from_bits(x.to_bits());
        assert_eq!(x.to_bits(), y.to_bits());
        let z = DDFloat::from_le_bytes(x.to_le_bytes());
        assert_eq!(x.to_bits(), z.to_bits());
    }

    let bytes = DDFloat::ONE.to_le_bytes();
    assert_eq!(&bytes[..8], &1.0f64.to_le_bytes());
    assert_eq!(&bytes[8..], &[0u8; 8]);

    // Unregularized input is repaired.
    let x = DDFloat::from_bits([1.0f64.to_bits(), 1.0f64.to_bits()]);
    assert_eq!(x, 2.0);
}
