// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use core::fmt;
use std::rc::Rc;

use num_bigint::BigInt;
use num_traits::{Pow, Signed, ToPrimitive, Zero};

/// ### [6.1.6.2 The BigInt Type](https://tc39.es/ecma262/#sec-ecmascript-language-types-bigint-type)
///
/// Arbitrary-precision integer tower. BigInt arithmetic never mixes
/// implicitly with Number; the mixing checks live in the evaluator's
/// operator code, not here.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct JsBigInt(Rc<BigInt>);

impl JsBigInt {
    pub fn new(value: BigInt) -> Self {
        Self(Rc::new(value))
    }

    pub fn as_inner(&self) -> &BigInt {
        &self.0
    }

    pub(crate) fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Parses the digits of a BigInt literal. `text` is the literal with any
    /// trailing `n` suffix and `_` separators removed by the caller; a
    /// `0x`/`0o`/`0b` prefix selects the radix.
    pub(crate) fn from_literal_digits(text: &str) -> Option<Self> {
        let (radix, digits) = match text.as_bytes() {
            [b'0', b'x' | b'X', ..] => (16, &text[2..]),
            [b'0', b'o' | b'O', ..] => (8, &text[2..]),
            [b'0', b'b' | b'B', ..] => (2, &text[2..]),
            _ => (10, text),
        };
        BigInt::parse_bytes(digits.as_bytes(), radix).map(Self::new)
    }

    pub(crate) fn add(&self, other: &Self) -> Self {
        Self::new(&*self.0 + &*other.0)
    }

    pub(crate) fn subtract(&self, other: &Self) -> Self {
        Self::new(&*self.0 - &*other.0)
    }

    pub(crate) fn multiply(&self, other: &Self) -> Self {
        Self::new(&*self.0 * &*other.0)
    }

    /// ### [6.1.6.2.12 BigInt::divide](https://tc39.es/ecma262/#sec-numeric-types-bigint-divide)
    ///
    /// Truncates toward zero. `None` on division by zero.
    pub(crate) fn divide(&self, other: &Self) -> Option<Self> {
        if other.is_zero() {
            return None;
        }
        Some(Self::new(&*self.0 / &*other.0))
    }

    pub(crate) fn remainder(&self, other: &Self) -> Option<Self> {
        if other.is_zero() {
            return None;
        }
        Some(Self::new(&*self.0 % &*other.0))
    }

    /// ### [6.1.6.2.3 BigInt::exponentiate](https://tc39.es/ecma262/#sec-numeric-types-bigint-exponentiate)
    ///
    /// `None` when the exponent is negative or absurdly large.
    pub(crate) fn exponentiate(&self, other: &Self) -> Option<Self> {
        if other.0.is_negative() {
            return None;
        }
        let exponent = other.0.to_u32()?;
        Some(Self::new(Pow::pow(&*self.0, exponent)))
    }

    pub(crate) fn bitwise_and(&self, other: &Self) -> Self {
        Self::new(&*self.0 & &*other.0)
    }

    pub(crate) fn bitwise_or(&self, other: &Self) -> Self {
        Self::new(&*self.0 | &*other.0)
    }

    pub(crate) fn bitwise_xor(&self, other: &Self) -> Self {
        Self::new(&*self.0 ^ &*other.0)
    }

    pub(crate) fn shift_left(&self, other: &Self) -> Option<Self> {
        let by = other.0.to_i64()?;
        Some(if by >= 0 {
            Self::new(&*self.0 << by as usize)
        } else {
            Self::new(&*self.0 >> (-by) as usize)
        })
    }

    pub(crate) fn shift_right(&self, other: &Self) -> Option<Self> {
        let by = other.0.to_i64()?;
        Some(if by >= 0 {
            Self::new(&*self.0 >> by as usize)
        } else {
            Self::new(&*self.0 << (-by) as usize)
        })
    }

    pub(crate) fn negate(&self) -> Self {
        Self::new(-&*self.0)
    }

    pub(crate) fn bitwise_not(&self) -> Self {
        Self::new(!&*self.0)
    }

    /// Lossy comparison against a Number, used by loose equality and the
    /// relational operators. NaN compares as `None`.
    pub(crate) fn compare_f64(&self, number: f64) -> Option<core::cmp::Ordering> {
        if number.is_nan() {
            return None;
        }
        if number == f64::INFINITY {
            return Some(core::cmp::Ordering::Less);
        }
        if number == f64::NEG_INFINITY {
            return Some(core::cmp::Ordering::Greater);
        }
        // Exact comparison through a scaled BigInt when the number is
        // integral, otherwise compare against the truncation and break ties
        // with the fractional part.
        let truncated = BigInt::from(number.trunc() as i128);
        let fractional = number.fract();
        match self.0.as_ref().cmp(&truncated) {
            core::cmp::Ordering::Equal if fractional > 0.0 => Some(core::cmp::Ordering::Less),
            core::cmp::Ordering::Equal if fractional < 0.0 => Some(core::cmp::Ordering::Greater),
            ordering => Some(ordering),
        }
    }

    pub(crate) fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(f64::NAN)
    }
}

impl fmt::Display for JsBigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for JsBigInt {
    fn from(value: i64) -> Self {
        Self::new(BigInt::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::JsBigInt;

    #[test]
    fn literal_radixes() {
        assert_eq!(
            JsBigInt::from_literal_digits("0x10").unwrap(),
            JsBigInt::from(16)
        );
        assert_eq!(
            JsBigInt::from_literal_digits("0b101").unwrap(),
            JsBigInt::from(5)
        );
        assert_eq!(
            JsBigInt::from_literal_digits("123").unwrap(),
            JsBigInt::from(123)
        );
    }

    #[test]
    fn division_truncates_toward_zero() {
        let a = JsBigInt::from(-7);
        let b = JsBigInt::from(2);
        assert_eq!(a.divide(&b).unwrap(), JsBigInt::from(-3));
        assert!(a.divide(&JsBigInt::from(0)).is_none());
    }

    #[test]
    fn exponentiate() {
        let two = JsBigInt::from(2);
        let ten = JsBigInt::from(10);
        assert_eq!(two.exponentiate(&ten).unwrap(), JsBigInt::from(1024));
        assert!(two.exponentiate(&JsBigInt::from(-1)).is_none());
    }
}
