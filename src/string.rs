//! This module contains the implementation of string conversion.
//!
//! Both directions go through exact big-integer arithmetic: a decimal
//! literal is scaled by a power of five and rounded once to a 105-bit
//! significand, and printing divides the exact binary value by a power of
//! ten and rounds once to the requested number of digits.

extern crate alloc;

use super::bigint::BigInt;
use super::error::{Error, ParseErrorKind, Result};
use super::float::DDFloat;
use super::utils::{decompose_f64, mask, scalbn};
use alloc::string::{String, ToString};
use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;

/// The number of significant decimal digits that are printed by default, and
/// that are kept when parsing. Printing this many digits is enough to read
/// back every value with a 105-bit significand.
pub const DECIMAL_DIGITS: usize = 33;

/// The number of bits in the significand of a parsed number.
const PARSED_BITS: usize = 105;

/// A decimal literal in the form `digits * 10^exp`.
#[derive(Debug)]
struct Decimal {
    negative: bool,
    digits: u128,
    // The number of significant digits in `digits`.
    count: i64,
    exp: i64,
}

/// The accepted exponent literal saturates here. Any exponent of this size
/// already produces an infinity or a zero.
const EXP_LIMIT: i64 = 1 << 20;

/// Parse the exponent part of a literal (the text after the 'e').
fn parse_exponent(input: &str, text: &str) -> Result<i64> {
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    if digits.is_empty() {
        return Err(Error::parse(input, ParseErrorKind::InvalidExponent));
    }
    let mut exp: i64 = 0;
    for c in digits.bytes() {
        if !c.is_ascii_digit() {
            return Err(Error::parse(input, ParseErrorKind::InvalidExponent));
        }
        exp = (exp * 10 + (c - b'0') as i64).min(EXP_LIMIT);
    }
    Ok(if negative { -exp } else { exp })
}

/// Split a finite literal into its significant digits and exponent. Digits
/// past the first `DECIMAL_DIGITS` significant ones are truncated.
fn parse_decimal(input: &str, negative: bool, body: &str) -> Result<Decimal> {
    let (mantissa, exp) = match body.find(['e', 'E']) {
        Some(idx) => (&body[..idx], parse_exponent(input, &body[idx + 1..])?),
        None => (body, 0),
    };
    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((l, r)) => (l, r),
        None => (mantissa, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(Error::parse(input, ParseErrorKind::InvalidDigit));
    }

    let mut dec = Decimal {
        negative,
        digits: 0,
        count: 0,
        exp,
    };
    for (part, is_fraction) in [(int_part, false), (frac_part, true)] {
        for c in part.bytes() {
            if !c.is_ascii_digit() {
                return Err(Error::parse(input, ParseErrorKind::InvalidDigit));
            }
            let d = (c - b'0') as u128;
            if dec.count < DECIMAL_DIGITS as i64 {
                // Leading zeros are not significant.
                if dec.digits != 0 || d != 0 {
                    dec.digits = dec.digits * 10 + d;
                    dec.count += 1;
                }
                if is_fraction {
                    dec.exp -= 1;
                }
            } else if !is_fraction {
                // A truncated digit of the integral part.
                dec.exp += 1;
            }
        }
    }
    Ok(dec)
}

/// Round `n` to at most `PARSED_BITS` bits, half to even. `sticky` reports
/// non-zero bits that were already dropped below `n`. Returns the rounded
/// significand and the number of bits that were shifted out.
fn round_significand(mut n: BigInt, sticky: bool) -> (u128, i32) {
    let mut shift = n.bits().saturating_sub(PARSED_BITS);
    let loss = n.loss_below(shift).with_sticky(sticky);
    n.shift_right(shift);
    let mut m = n.low_u128();
    if loss.rounds_up(m & 1 == 1) {
        m += 1;
        if m >> PARSED_BITS != 0 {
            m >>= 1;
            shift += 1;
        }
    }
    (m, shift as i32)
}

impl Decimal {
    /// Convert the literal to the nearest 105-bit binary value.
    fn to_dd(&self) -> DDFloat {
        let zero = if self.negative {
            DDFloat::NEG_ZERO
        } else {
            DDFloat::ZERO
        };
        if self.digits == 0 {
            return zero;
        }
        // The value is in [10^(top-1), 10^top).
        let top = self.count + self.exp;
        if top > 310 {
            return if self.negative {
                DDFloat::NEG_INFINITY
            } else {
                DDFloat::INFINITY
            };
        }
        if top < -330 {
            return zero;
        }

        let digits = BigInt::from_u128(self.digits);
        let (m, e2) = if self.exp >= 0 {
            // digits * 10^e == (digits * 5^e) * 2^e.
            let n = digits.mul(&BigInt::pow5(self.exp as u32));
            let (m, shift) = round_significand(n, false);
            (m, self.exp as i32 + shift)
        } else {
            // digits * 10^-k == (digits * 2^t / 5^k) * 2^(-k-t), where `t` is
            // large enough to leave two guard bits in the quotient.
            let k = (-self.exp) as u32;
            let d = BigInt::pow5(k);
            let t = (PARSED_BITS + 2 + d.bits()).saturating_sub(digits.bits());
            let mut n = digits;
            n.shift_left(t);
            let (q, r) = n.div_rem(&d);
            let (m, shift) = round_significand(q, !r.is_zero());
            (m, shift - k as i32 - t as i32)
        };

        // Split the significand into a 53-bit head and a 52-bit tail.
        let head = (m >> 52) as f64;
        let tail = (m as u64 & mask(52)) as f64;
        let x = DDFloat::new(scalbn(head, e2 + 52), scalbn(tail, e2));
        if self.negative {
            -x
        } else {
            x
        }
    }
}

impl DDFloat {
    /// Parse a decimal literal such as `-1.25e-3`, `.5`, `nan` or `inf`.
    /// The significand is truncated to `DECIMAL_DIGITS` digits and rounded
    /// once to the nearest 105-bit value. Exponents out of range saturate to
    /// infinity or zero.
    pub fn parse(input: &str) -> Result<Self> {
        if input.is_empty() {
            return Err(Error::parse(input, ParseErrorKind::Empty));
        }

        // Handle the plus or minus in front of the number.
        let (negative, body) = match input.as_bytes()[0] {
            b'-' => (true, &input[1..]),
            b'+' => (false, &input[1..]),
            _ => (false, input),
        };

        if body.eq_ignore_ascii_case("nan") {
            return Ok(Self::NAN);
        }
        if body.eq_ignore_ascii_case("inf")
            || body.eq_ignore_ascii_case("infinity")
        {
            return Ok(if negative {
                Self::NEG_INFINITY
            } else {
                Self::INFINITY
            });
        }

        let dec = parse_decimal(input, negative, body)?;
        log::trace!("parsed {input:?} as {dec:?}");
        Ok(dec.to_dd())
    }

    /// Returns the exact value `n * 2^e` of a finite non-zero number, with
    /// the sign of the leading word.
    fn exact_integer(&self) -> (bool, BigInt, i32) {
        let (sign_hi, m_hi, e_hi) = decompose_f64(self.hi());
        if self.lo() == 0.0 {
            return (sign_hi, BigInt::from_u128(m_hi as u128), e_hi);
        }
        let (sign_lo, m_lo, e_lo) = decompose_f64(self.lo());
        let e = e_hi.min(e_lo);
        let mut n = BigInt::from_u128(m_hi as u128);
        n.shift_left((e_hi - e) as usize);
        let mut tail = BigInt::from_u128(m_lo as u128);
        tail.shift_left((e_lo - e) as usize);
        if sign_hi == sign_lo {
            n.add_assign(&tail);
        } else {
            // The leading word dominates, so this never borrows.
            n.sub_assign(&tail);
        }
        (sign_hi, n, e)
    }

    /// Returns the decimal significand `q` with exactly `digits` digits, and
    /// the decimal exponent `k` of its leading digit, such that the value is
    /// `q * 10^(k - digits + 1)` rounded half to even. The number must be
    /// finite and non-zero.
    fn to_decimal(&self, digits: usize) -> (u128, i32) {
        debug_assert!(self.is_finite() && !self.is_zero());
        debug_assert!((1..=DECIMAL_DIGITS).contains(&digits));
        let (_, n, e) = self.exact_integer();
        let lower = 10u128.pow(digits as u32 - 1);
        let upper = lower * 10;

        // The estimate of the exponent can be off by one near powers of ten.
        let mut k = self.hi().abs().log10().floor() as i32;
        let mut q = lower;
        for _ in 0..4 {
            let s = k - (digits as i32 - 1);
            // value / 10^s == n * 2^(e - s) / 5^s.
            let mut num = n.clone();
            let mut den = BigInt::from_u128(1);
            if e >= s {
                num.shift_left((e - s) as usize);
            } else {
                den.shift_left((s - e) as usize);
            }
            if s >= 0 {
                den = den.mul(&BigInt::pow5(s as u32));
            } else {
                num = num.mul(&BigInt::pow5((-s) as u32));
            }
            let (quot, mut rem) = num.div_rem(&den);
            q = quot.low_u128();
            rem.shift_left(1);
            let round_up = match rem.cmp(&den) {
                Ordering::Greater => true,
                Ordering::Equal => q & 1 == 1,
                Ordering::Less => false,
            };
            if round_up {
                q += 1;
            }
            if q >= upper {
                k += 1;
            } else if q < lower {
                k -= 1;
            } else {
                break;
            }
        }
        (q, k)
    }

    /// Format the number in scientific notation: `[-]d[.ddd]e[-]x`. Without
    /// a precision, up to `DECIMAL_DIGITS` significant digits are printed and
    /// trailing zeros are removed. With a precision `p`, exactly `p` digits
    /// follow the point.
    fn to_scientific(&self, precision: Option<usize>) -> String {
        if self.is_nan() {
            return "NaN".to_string();
        }
        let mut out = String::new();
        if self.is_negative() {
            out.push('-');
        }
        if self.is_inf() {
            out.push_str("inf");
            return out;
        }

        let digits = precision.map_or(DECIMAL_DIGITS, |p| (p + 1).min(DECIMAL_DIGITS));
        let (mut body, k) = if self.is_zero() {
            ("0".repeat(digits), 0)
        } else {
            let (q, k) = self.to_decimal(digits);
            (q.to_string(), k)
        };
        match precision {
            Some(p) => {
                // Digits past the precision we can represent are zeros.
                while body.len() < p + 1 {
                    body.push('0');
                }
            }
            None => {
                let trimmed = body.trim_end_matches('0').len().max(1);
                body.truncate(trimmed);
            }
        }

        let (first, rest) = body.split_at(1);
        out.push_str(first);
        if !rest.is_empty() {
            out.push('.');
            out.push_str(rest);
        }
        out.push('e');
        out.push_str(&k.to_string());
        out
    }
}

impl fmt::Display for DDFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_scientific(f.precision()))
    }
}

impl fmt::LowerExp for DDFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_scientific(f.precision()))
    }
}

impl FromStr for DDFloat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for DDFloat {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

#[test]
fn test_parse_simple() {
    let parse = |s: &str| DDFloat::parse(s).unwrap();
    assert_eq!(parse("1"), 1.0);
    assert_eq!(parse("-2.5"), -2.5);
    assert_eq!(parse("1e3"), 1000.0);
    assert_eq!(parse(".5"), 0.5);
    assert_eq!(parse("5."), 5.0);
    assert_eq!(parse("+0.125E+1"), 1.25);
    assert_eq!(parse("000123.000"), 123.0);
    assert_eq!(parse("12345678901234567890"), DDFloat::from(12345678901234567890u64));

    assert!(parse("0").is_zero());
    assert!(!parse("0").is_negative());
    assert!(parse("-0.000").is_negative());
    assert!(parse("nan").is_nan());
    assert!(parse("NaN").is_nan());
    assert_eq!(parse("-INF"), f64::NEG_INFINITY);
    assert_eq!(parse("Infinity"), f64::INFINITY);

    let x: DDFloat = "0.375".parse().unwrap();
    assert_eq!(x, 0.375);
    let x = DDFloat::try_from("-1e-2").unwrap();
    assert_eq!(x.hi(), -0.01);
}

#[test]
fn test_parse_errors() {
    let kind = |s: &str| match DDFloat::parse(s) {
        Err(Error::Parse { kind, .. }) => Some(kind),
        _ => None,
    };
    assert_eq!(kind(""), Some(ParseErrorKind::Empty));
    assert_eq!(kind("-"), Some(ParseErrorKind::InvalidDigit));
    assert_eq!(kind("."), Some(ParseErrorKind::InvalidDigit));
    assert_eq!(kind("1.2.3"), Some(ParseErrorKind::InvalidDigit));
    assert_eq!(kind("abc"), Some(ParseErrorKind::InvalidDigit));
    assert_eq!(kind("1x"), Some(ParseErrorKind::InvalidDigit));
    assert_eq!(kind(" 1"), Some(ParseErrorKind::InvalidDigit));
    assert_eq!(kind("1e"), Some(ParseErrorKind::InvalidExponent));
    assert_eq!(kind("1e+"), Some(ParseErrorKind::InvalidExponent));
    assert_eq!(kind("1e5x"), Some(ParseErrorKind::InvalidExponent));
    assert_eq!(kind("e5"), Some(ParseErrorKind::InvalidDigit));
}

#[test]
fn test_parse_precision() {
    // 34 significant digits: the last one is truncated.
    let one = DDFloat::parse("1.000000000000000000000000000000000e0").unwrap();
    assert_eq!(one, DDFloat::ONE);
    assert_eq!(one.to_bits(), DDFloat::ONE.to_bits());

    let x = DDFloat::parse("0.1").unwrap();
    assert_eq!(x.hi(), 0.1);
    assert_eq!(x.lo(), -5.5511151231257815e-18);

    let pi = DDFloat::parse("3.14159265358979323846264338327950288").unwrap();
    assert_eq!(pi.hi(), 3.141592653589793);
    assert_eq!(pi.lo(), 1.2246467991473535e-16);

    // Saturation.
    assert!(DDFloat::parse("1e400").unwrap().is_inf());
    assert!(DDFloat::parse("-1e99999999999").unwrap().is_inf());
    assert!(DDFloat::parse("-1e99999999999").unwrap().is_negative());
    assert!(DDFloat::parse("1e-400").unwrap().is_zero());
    assert!(DDFloat::parse("-1e-400").unwrap().is_negative());
    assert_eq!(DDFloat::parse("5e-324").unwrap(), 5e-324);
}

#[test]
fn test_format() {
    use alloc::format;
    let s = |x: DDFloat| x.to_string();
    assert_eq!(s(DDFloat::ONE), "1e0");
    assert_eq!(s(DDFloat::ZERO), "0e0");
    assert_eq!(s(DDFloat::NEG_ZERO), "-0e0");
    assert_eq!(s(DDFloat::NAN), "NaN");
    assert_eq!(s(DDFloat::INFINITY), "inf");
    assert_eq!(s(DDFloat::NEG_INFINITY), "-inf");
    assert_eq!(s(DDFloat::from_f64(0.5)), "5e-1");
    assert_eq!(s(DDFloat::from_f64(-1234.5)), "-1.2345e3");
    assert_eq!(s(DDFloat::from(123456789)), "1.23456789e8");
    assert_eq!(
        s(DDFloat::new(1.4142135623730951, -9.667293313452913e-17)),
        "1.41421356237309504880168872420969e0"
    );
    assert_eq!(s(DDFloat::EPSILON), "4.93038065763132378382330353301741e-32");
    assert_eq!(s(DDFloat::MAX), "1.79769313486231580793728971405302e308");
    assert_eq!(s(DDFloat::parse("0.1").unwrap()), "1.00000000000000000000000000000001e-1");

    let sqrt2 = DDFloat::new(1.4142135623730951, -9.667293313452913e-17);
    assert_eq!(format!("{:.3e}", sqrt2), "1.414e0");
    assert_eq!(format!("{:.3}", -sqrt2), "-1.414e0");
    assert_eq!(format!("{:.2}", DDFloat::ZERO), "0.00e0");
    assert_eq!(format!("{:.40e}", DDFloat::ONE).len(), 44);
}

#[test]
fn test_round_trip() {
    use super::utils::Lfsr;

    // Printing and parsing any number with a 105-bit significand gives the
    // same number back.
    let mut lfsr = Lfsr::new();
    for i in 0..3000 {
        let m = ((lfsr.get64() as u128) << 64 | lfsr.get64() as u128) >> 23;
        let m = m | (1u128 << 104);
        let e = (lfsr.get64() % 1800) as i32 - 900 - 104;
        let head = (m >> 52) as f64;
        let tail = (m as u64 & mask(52)) as f64;
        let x = DDFloat::new(scalbn(head, e + 52), scalbn(tail, e));
        let x = if i % 2 == 0 { x } else { -x };
        let y = DDFloat::parse(&x.to_string()).unwrap();
        assert_eq!(x.to_bits(), y.to_bits(), "{}", x);
    }

    for v in super::utils::get_special_test_values() {
        let x = DDFloat::from_f64(v);
        let y = DDFloat::parse(&x.to_string()).unwrap();
        assert!(x.is_nan() && y.is_nan() || x.to_bits() == y.to_bits());
    }
    for x in [DDFloat::MAX, DDFloat::EPSILON, DDFloat::MIN_POSITIVE] {
        let y = DDFloat::parse(&x.to_string()).unwrap();
        assert_eq!(x.to_bits(), y.to_bits());
    }
}
