//! This module contains a small unsigned big-int that is used for exact
//! decimal conversion. Decimal scaling multiplies or divides the binary
//! significand by powers of five, which quickly outgrows any native integer.

extern crate alloc;

use alloc::vec::Vec;
use core::cmp::Ordering;

/// Reports the kind of values that are lost when we shift right bits. In some
/// context this used as the two guard bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LossFraction {
    ExactlyZero,  //0000000
    LessThanHalf, //0xxxxxx
    ExactlyHalf,  //1000000
    MoreThanHalf, //1xxxxxx
}

impl LossFraction {
    /// Fold a non-zero sticky remainder below the guard bits into the
    /// fraction.
    pub fn with_sticky(self, sticky: bool) -> LossFraction {
        if !sticky {
            return self;
        }
        match self {
            LossFraction::ExactlyZero => LossFraction::LessThanHalf,
            LossFraction::ExactlyHalf => LossFraction::MoreThanHalf,
            _ => self,
        }
    }

    /// Returns true if round-half-to-even bumps a significand whose lowest
    /// kept bit is `odd`.
    pub fn rounds_up(self, odd: bool) -> bool {
        match self {
            LossFraction::MoreThanHalf => true,
            LossFraction::ExactlyHalf => odd,
            _ => false,
        }
    }
}

/// An arbitrary-size unsigned integer, stored as little-endian 64-bit
/// words without leading zero words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct BigInt {
    parts: Vec<u64>,
}

impl BigInt {
    pub fn zero() -> Self {
        BigInt { parts: Vec::new() }
    }

    pub fn from_u128(val: u128) -> Self {
        let mut n = BigInt {
            parts: alloc::vec![val as u64, (val >> 64) as u64],
        };
        n.shrink();
        n
    }

    /// Returns 5^k.
    pub fn pow5(k: u32) -> Self {
        // 5^27 is the largest power of five that fits in a word.
        const POW5_27: u64 = 7_450_580_596_923_828_125;
        let mut n = Self::from_u128(1);
        for _ in 0..k / 27 {
            n.mul_small(POW5_27);
        }
        n.mul_small(5u64.pow(k % 27));
        n
    }

    pub fn is_zero(&self) -> bool {
        self.parts.is_empty()
    }

    /// Returns the number of significant bits (zero for zero).
    pub fn bits(&self) -> usize {
        match self.parts.last() {
            Some(top) => self.parts.len() * 64 - top.leading_zeros() as usize,
            None => 0,
        }
    }

    /// Returns the lowest 128 bits.
    pub fn low_u128(&self) -> u128 {
        let lo = self.parts.first().copied().unwrap_or(0) as u128;
        let hi = self.parts.get(1).copied().unwrap_or(0) as u128;
        lo | (hi << 64)
    }

    fn bit(&self, idx: usize) -> bool {
        match self.parts.get(idx / 64) {
            Some(w) => (w >> (idx % 64)) & 1 == 1,
            None => false,
        }
    }

    /// Returns true if any bit below `idx` is set.
    fn any_below(&self, idx: usize) -> bool {
        let words = idx / 64;
        if self.parts[..words.min(self.parts.len())].iter().any(|&w| w != 0) {
            return true;
        }
        let rem = idx % 64;
        rem != 0 && self.parts.get(words).is_some_and(|w| w & ((1u64 << rem) - 1) != 0)
    }

    /// Returns the fractional part that's lost when the lowest `bits` bits
    /// are shifted out.
    pub fn loss_below(&self, bits: usize) -> LossFraction {
        if bits == 0 {
            return LossFraction::ExactlyZero;
        }
        let half = self.bit(bits - 1);
        let rest = self.any_below(bits - 1);
        match (half, rest) {
            (false, false) => LossFraction::ExactlyZero,
            (false, true) => LossFraction::LessThanHalf,
            (true, false) => LossFraction::ExactlyHalf,
            (true, true) => LossFraction::MoreThanHalf,
        }
    }

    /// Remove the leading zero words.
    fn shrink(&mut self) {
        while self.parts.last() == Some(&0) {
            self.parts.pop();
        }
    }

    /// Multiply this number by a single word.
    pub fn mul_small(&mut self, rhs: u64) {
        let mut carry: u128 = 0;
        for w in self.parts.iter_mut() {
            let p = (*w as u128) * (rhs as u128) + carry;
            *w = p as u64;
            carry = p >> 64;
        }
        if carry != 0 {
            self.parts.push(carry as u64);
        }
        self.shrink();
    }

    /// Multiply this number by `rhs` using the schoolbook algorithm.
    pub fn mul(&self, rhs: &Self) -> Self {
        if self.is_zero() || rhs.is_zero() {
            return Self::zero();
        }
        let mut parts = alloc::vec![0u64; self.parts.len() + rhs.parts.len()];
        for (i, &a) in self.parts.iter().enumerate() {
            let mut carry: u128 = 0;
            for (j, &b) in rhs.parts.iter().enumerate() {
                let t = (a as u128) * (b as u128) + parts[i + j] as u128 + carry;
                parts[i + j] = t as u64;
                carry = t >> 64;
            }
            parts[i + rhs.parts.len()] = carry as u64;
        }
        let mut n = BigInt { parts };
        n.shrink();
        n
    }

    /// Add `rhs` to this number.
    pub fn add_assign(&mut self, rhs: &Self) {
        if self.parts.len() < rhs.parts.len() {
            self.parts.resize(rhs.parts.len(), 0);
        }
        let mut carry = false;
        for i in 0..self.parts.len() {
            let r = rhs.parts.get(i).copied().unwrap_or(0);
            let (s0, c0) = self.parts[i].overflowing_add(r);
            let (s1, c1) = s0.overflowing_add(carry as u64);
            self.parts[i] = s1;
            carry = c0 || c1;
        }
        if carry {
            self.parts.push(1);
        }
    }

    /// Subtract `rhs`, which must not be larger than this number.
    pub fn sub_assign(&mut self, rhs: &Self) {
        debug_assert!(*self >= *rhs);
        let mut borrow = false;
        for i in 0..self.parts.len() {
            let r = rhs.parts.get(i).copied().unwrap_or(0);
            let (d0, b0) = self.parts[i].overflowing_sub(r);
            let (d1, b1) = d0.overflowing_sub(borrow as u64);
            self.parts[i] = d1;
            borrow = b0 || b1;
        }
        debug_assert!(!borrow);
        self.shrink();
    }

    /// Shift the bits in the number `bits` to the left.
    pub fn shift_left(&mut self, bits: usize) {
        if self.is_zero() {
            return;
        }
        let words = bits / 64;
        let rem = bits % 64;
        let mut parts = alloc::vec![0u64; words];
        let mut carry = 0u64;
        for &w in &self.parts {
            if rem == 0 {
                parts.push(w);
            } else {
                parts.push((w << rem) | carry);
                carry = w >> (64 - rem);
            }
        }
        if carry != 0 {
            parts.push(carry);
        }
        self.parts = parts;
    }

    /// Shift the bits in the number `bits` to the right, dropping them.
    pub fn shift_right(&mut self, bits: usize) {
        let words = bits / 64;
        let rem = bits % 64;
        if words >= self.parts.len() {
            self.parts.clear();
            return;
        }
        let src = &self.parts[words..];
        let mut parts = Vec::with_capacity(src.len());
        for i in 0..src.len() {
            let next = src.get(i + 1).copied().unwrap_or(0);
            if rem == 0 {
                parts.push(src[i]);
            } else {
                parts.push((src[i] >> rem) | (next << (64 - rem)));
            }
        }
        self.parts = parts;
        self.shrink();
    }

    /// Divide this number by `divisor` with restoring long division. Returns
    /// the quotient and the remainder.
    pub fn div_rem(&self, divisor: &Self) -> (Self, Self) {
        debug_assert!(!divisor.is_zero(), "division by zero");
        if *self < *divisor {
            return (Self::zero(), self.clone());
        }

        // Align the first bit of the divisor with the first bit of the
        // dividend.
        let steps = self.bits() - divisor.bits();
        let mut rem = self.clone();
        let mut d = divisor.clone();
        d.shift_left(steps);
        let mut quotient = alloc::vec![0u64; steps / 64 + 1];
        for i in (0..=steps).rev() {
            if rem >= d {
                rem.sub_assign(&d);
                quotient[i / 64] |= 1u64 << (i % 64);
            }
            d.shift_right(1);
        }
        let mut q = BigInt { parts: quotient };
        q.shrink();
        (q, rem)
    }
}

impl PartialOrd for BigInt {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BigInt {
    fn cmp(&self, other: &Self) -> Ordering {
        // Both sides are shrunk, so the longer number is larger.
        match self.parts.len().cmp(&other.parts.len()) {
            Ordering::Equal => {}
            ord => return ord,
        }
        // Compare all of the digits, from MSB to LSB.
        for i in (0..self.parts.len()).rev() {
            match self.parts[i].cmp(&other.parts[i]) {
                Ordering::Equal => {}
                ord => return ord,
            }
        }
        Ordering::Equal
    }
}

#[test]
fn test_pow5() {
    assert_eq!(BigInt::pow5(0).low_u128(), 1);
    assert_eq!(BigInt::pow5(1).low_u128(), 5);
    assert_eq!(BigInt::pow5(27).low_u128(), 5u128.pow(27));
    assert_eq!(BigInt::pow5(54).low_u128(), 5u128.pow(54));
    assert_eq!(BigInt::pow5(55).low_u128(), 5u128.pow(55));
    assert_eq!(BigInt::pow5(100).bits(), 233);
}

#[test]
fn test_shifts() {
    let mut x = BigInt::from_u128(0xabcd_ef01_2345_6789_0000_1111_2222_3333);
    let orig = x.clone();
    for bits in [0, 1, 7, 63, 64, 65, 130, 200] {
        x.shift_left(bits);
        assert_eq!(x.bits(), orig.bits() + bits);
        x.shift_right(bits);
        assert_eq!(x, orig);
    }
    x.shift_right(128);
    assert!(x.is_zero());
    let mut z = BigInt::zero();
    z.shift_left(10);
    assert!(z.is_zero());
}

#[test]
fn test_mul_div_against_u128() {
    use super::utils::Lfsr;
    let mut lfsr = Lfsr::new();
    for _ in 0..2000 {
        let a = lfsr.get64() as u128;
        let b = (lfsr.get64() >> (lfsr.get64() % 63)) as u128 | 1;
        let c = (lfsr.get64() >> 3) as u128 | 1;
        let x = BigInt::from_u128(a).mul(&BigInt::from_u128(b));
        assert_eq!(x.low_u128(), a * b);
        let (q, r) = x.div_rem(&BigInt::from_u128(c));
        assert_eq!(q.low_u128(), (a * b) / c);
        assert_eq!(r.low_u128(), (a * b) % c);

        let mut y = BigInt::from_u128(a);
        y.mul_small(b as u64);
        assert_eq!(y.low_u128(), a * b);
    }
}

#[test]
fn test_wide_division() {
    // 8 * 5^80 = 13 * (3 * 5^79) + 5^79.
    let mut n = BigInt::pow5(80);
    n.shift_left(3);
    let d = BigInt::pow5(79).mul(&BigInt::from_u128(3));
    let (q, r) = n.div_rem(&d);
    assert_eq!(q.low_u128(), 13);
    assert_eq!(r, BigInt::pow5(79));

    let (q, r) = BigInt::pow5(200).div_rem(&BigInt::pow5(150));
    assert_eq!(q, BigInt::pow5(50));
    assert!(r.is_zero());
}

#[test]
fn test_add_sub() {
    let mut x = BigInt::from_u128(u128::MAX);
    x.add_assign(&BigInt::from_u128(1));
    assert_eq!(x.bits(), 129);
    x.sub_assign(&BigInt::from_u128(1));
    assert_eq!(x, BigInt::from_u128(u128::MAX));
    x.sub_assign(&BigInt::from_u128(u128::MAX));
    assert!(x.is_zero());
    x.add_assign(&BigInt::pow5(30));
    assert_eq!(x, BigInt::pow5(30));
}

#[test]
fn test_loss_below() {
    let x = BigInt::from_u128(0b1011_0000);
    assert_eq!(x.loss_below(4), LossFraction::ExactlyZero);
    assert_eq!(x.loss_below(5), LossFraction::ExactlyHalf);
    assert_eq!(x.loss_below(6), LossFraction::MoreThanHalf);
    assert_eq!(x.loss_below(7), LossFraction::LessThanHalf);
    assert_eq!(x.loss_below(0), LossFraction::ExactlyZero);

    let mut y = BigInt::from_u128(1);
    y.shift_left(200);
    assert_eq!(y.loss_below(201), LossFraction::ExactlyHalf);
    assert_eq!(y.loss_below(202), LossFraction::LessThanHalf);

    assert_eq!(
        LossFraction::ExactlyHalf.with_sticky(true),
        LossFraction::MoreThanHalf
    );
    assert!(LossFraction::ExactlyHalf.rounds_up(true));
    assert!(!LossFraction::ExactlyHalf.rounds_up(false));
    assert!(!LossFraction::LessThanHalf.rounds_up(true));
}
