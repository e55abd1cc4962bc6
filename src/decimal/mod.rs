//! Arbitrary-magnitude decimal numbers.
//!
//! Values below `1e300` in magnitude are held as a plain `f64` (exponent 0),
//! so integer amounts up to 2^53 stay exact. Larger (and vanishingly small)
//! values switch to a mantissa normalised to `1 <= |m| < 10` paired with an
//! `i64` power-of-ten exponent, keeping `f64` relative precision far past the
//! `f64` range. Every value has exactly one representation.

mod format;

use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};
use std::str::FromStr;
use std::sync::OnceLock;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

pub use format::SUFFIXES;

/// Magnitude (as a power of ten) where values leave the plain `f64` form.
const PLAIN_LIMIT: i64 = 300;

/// Exponent difference past which the smaller operand of an addition cannot
/// affect the mantissa of the larger one.
const MAX_SIGNIFICANT_DIGITS: i64 = 17;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecimalError {
    #[error("malformed decimal literal: {0:?}")]
    Parse(String),
    #[error("non-finite numeric value")]
    NonFinite,
    #[error("division by zero")]
    DivisionByZero,
}

#[derive(Clone, Copy, Default, PartialEq)]
pub struct Decimal {
    mantissa: f64,
    exponent: i64,
}

impl Decimal {
    pub const ZERO: Decimal = Decimal {
        mantissa: 0.0,
        exponent: 0,
    };
    pub const ONE: Decimal = Decimal {
        mantissa: 1.0,
        exponent: 0,
    };

    /// Builds `mantissa × 10^exponent`.
    pub fn new(mantissa: f64, exponent: i64) -> Result<Self, DecimalError> {
        if !mantissa.is_finite() {
            return Err(DecimalError::NonFinite);
        }
        Ok(Self::normalized(mantissa, exponent))
    }

    fn normalized(mantissa: f64, exponent: i64) -> Self {
        if mantissa == 0.0 || !mantissa.is_finite() {
            return Self::ZERO;
        }
        let (m, e) = split(mantissa, exponent);
        if (-PLAIN_LIMIT..PLAIN_LIMIT).contains(&e) {
            let plain = if exponent == 0 {
                mantissa
            } else {
                scale(mantissa, exponent)
            };
            return Self {
                mantissa: plain,
                exponent: 0,
            };
        }
        Self {
            mantissa: m,
            exponent: e,
        }
    }

    fn is_plain(&self) -> bool {
        self.exponent == 0
    }

    /// Scientific parts `(m, e)` with `1 <= |m| < 10`, whatever the storage form.
    fn parts(&self) -> (f64, i64) {
        if self.is_zero() {
            return (0.0, 0);
        }
        if self.is_plain() {
            split(self.mantissa, 0)
        } else {
            (self.mantissa, self.exponent)
        }
    }

    /// Normalised mantissa, `1 <= |m| < 10` (0 for zero).
    pub fn mantissa(&self) -> f64 {
        self.parts().0
    }

    /// Power of ten of the normalised mantissa.
    pub fn exponent(&self) -> i64 {
        self.parts().1
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa == 0.0
    }

    pub fn is_positive(&self) -> bool {
        self.mantissa > 0.0
    }

    pub fn is_negative(&self) -> bool {
        self.mantissa < 0.0
    }

    pub fn abs(self) -> Self {
        Self {
            mantissa: self.mantissa.abs(),
            exponent: self.exponent,
        }
    }

    /// Lossy conversion; saturates to `±f64::INFINITY` above the `f64` range.
    pub fn to_f64(&self) -> f64 {
        if self.is_plain() {
            return self.mantissa;
        }
        if self.exponent > 308 {
            return self.mantissa.signum() * f64::INFINITY;
        }
        if self.exponent < -330 {
            return 0.0;
        }
        scale(self.mantissa, self.exponent)
    }

    pub fn checked_div(self, rhs: Self) -> Result<Self, DecimalError> {
        if rhs.is_zero() {
            return Err(DecimalError::DivisionByZero);
        }
        if self.is_zero() {
            return Ok(Self::ZERO);
        }
        if self.is_plain() && rhs.is_plain() {
            let quotient = self.mantissa / rhs.mantissa;
            if quotient.is_normal() {
                return Ok(Self::normalized(quotient, 0));
            }
        }
        let (lm, le) = self.parts();
        let (rm, re) = rhs.parts();
        Ok(Self::normalized(lm / rm, le.saturating_sub(re)))
    }

    pub fn recip(self) -> Result<Self, DecimalError> {
        Self::ONE.checked_div(self)
    }

    /// Integer power; negative powers go through the reciprocal.
    pub fn powi(self, power: i64) -> Result<Self, DecimalError> {
        if power < 0 {
            return self.pow(power.unsigned_abs()).recip();
        }
        Ok(self.pow(power as u64))
    }

    /// Non-negative integer power: plain `f64` when the result fits, otherwise
    /// square-and-multiply over the scientific parts.
    pub fn pow(self, power: u64) -> Self {
        if power == 0 {
            return Self::ONE;
        }
        if self.is_plain() && power <= i32::MAX as u64 {
            let direct = self.mantissa.powi(power as i32);
            if direct.is_normal() {
                return Self::normalized(direct, 0);
            }
        }
        let mut result = Self::ONE;
        let mut base = self;
        let mut remaining = power;
        while remaining > 0 {
            if remaining & 1 == 1 {
                result = result * base;
            }
            remaining >>= 1;
            if remaining > 0 {
                base = base * base;
            }
        }
        result
    }

    pub fn floor(self) -> Self {
        if self.is_plain() {
            return Self::normalized(self.mantissa.floor(), 0);
        }
        if self.exponent > 0 {
            return self;
        }
        if self.is_negative() {
            Self::from(-1_i64)
        } else {
            Self::ZERO
        }
    }

    pub fn ceil(self) -> Self {
        if self.is_plain() {
            return Self::normalized(self.mantissa.ceil(), 0);
        }
        if self.exponent > 0 {
            return self;
        }
        if self.is_negative() {
            Self::ZERO
        } else {
            Self::ONE
        }
    }

    pub fn min(self, other: Self) -> Self {
        if other < self { other } else { self }
    }

    pub fn max(self, other: Self) -> Self {
        if other > self { other } else { self }
    }

    /// Clamps negative values to zero.
    pub fn non_negative(self) -> Self {
        if self.is_negative() { Self::ZERO } else { self }
    }

    /// Whether `self` and `other` agree to within `tolerance` relative error.
    pub fn approx_eq(self, other: Self, tolerance: f64) -> bool {
        if self == other {
            return true;
        }
        let diff = (self - other).abs();
        let scale = self.abs().max(other.abs());
        match diff.checked_div(scale) {
            Ok(ratio) => ratio.to_f64() <= tolerance,
            Err(_) => true,
        }
    }
}

/// Largest `f64` below 10.
const BELOW_TEN: f64 = 9.999999999999998;

/// Lowest power kept in the power-of-ten table; anything smaller is 0.
const MIN_TABLE_POWER: i64 = -330;

/// Splits `mantissa × 10^exponent` into `1 <= |m| < 10` and its exponent.
/// The exponent is exact with respect to the correctly rounded powers of
/// ten; the mantissa carries the usual one-ulp scaling error.
fn split(mantissa: f64, exponent: i64) -> (f64, i64) {
    let magnitude = mantissa.abs();
    let mut shift = magnitude.log10().floor() as i64;
    // log10 can land one off next to powers of ten
    if magnitude < power_of_ten(shift) {
        shift -= 1;
    } else if magnitude >= power_of_ten(shift + 1) {
        shift += 1;
    }
    let m = scale(magnitude, -shift).clamp(1.0, BELOW_TEN);
    (m.copysign(mantissa), exponent.saturating_add(shift))
}

/// `value × 10^power`, dividing by exact powers of ten where possible.
fn scale(value: f64, power: i64) -> f64 {
    if power == 0 {
        return value;
    }
    if power.unsigned_abs() > PLAIN_LIMIT as u64 {
        let half = power / 2;
        return scale(scale(value, half), power - half);
    }
    let factor = power_of_ten(power.abs());
    if power > 0 { value * factor } else { value / factor }
}

/// Correctly rounded `10^power`: 0 below the table, infinity above 308.
fn power_of_ten(power: i64) -> f64 {
    static TABLE: OnceLock<Vec<f64>> = OnceLock::new();
    let table = TABLE.get_or_init(|| {
        (MIN_TABLE_POWER..=308)
            .map(|k| format!("1e{k}").parse().unwrap_or(f64::INFINITY))
            .collect()
    });
    if power < MIN_TABLE_POWER {
        return 0.0;
    }
    table
        .get((power - MIN_TABLE_POWER) as usize)
        .copied()
        .unwrap_or(f64::INFINITY)
}

impl fmt::Debug for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Decimal({self})")
    }
}

/// Canonical form: `0`, the shortest round-tripping `f64` exponent form for
/// plain values (`1.5e3`), or `{mantissa}e{exponent}` past the plain range.
impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0");
        }
        if self.is_plain() {
            return write!(f, "{:e}", self.mantissa);
        }
        write!(f, "{}e{}", self.mantissa, self.exponent)
    }
}

impl FromStr for Decimal {
    type Err = DecimalError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let malformed = || DecimalError::Parse(raw.to_string());
        let text = raw.trim();
        let (mantissa_text, exponent_text) = match text.find(['e', 'E']) {
            Some(index) => (&text[..index], Some(&text[index + 1..])),
            None => (text, None),
        };
        let digits = mantissa_text
            .strip_prefix(['+', '-'])
            .unwrap_or(mantissa_text);
        let looks_numeric = digits.chars().all(|c| c.is_ascii_digit() || c == '.')
            && digits.chars().any(|c| c.is_ascii_digit());
        if !looks_numeric {
            return Err(malformed());
        }
        let mantissa: f64 = mantissa_text.parse().map_err(|_| malformed())?;
        if !mantissa.is_finite() {
            return Err(DecimalError::NonFinite);
        }
        let exponent = match exponent_text {
            Some(value) => {
                let unsigned = value.strip_prefix('+').unwrap_or(value);
                if unsigned.is_empty() || unsigned.starts_with('+') {
                    return Err(malformed());
                }
                unsigned.parse::<i64>().map_err(|_| malformed())?
            }
            None => 0,
        };
        if mantissa == 0.0 {
            return Ok(Self::ZERO);
        }

        let already_scientific = (1.0..10.0).contains(&mantissa.abs());
        if already_scientific && !(-PLAIN_LIMIT..PLAIN_LIMIT).contains(&exponent) {
            return Ok(Self { mantissa, exponent });
        }
        if exponent.unsigned_abs() <= 2 * PLAIN_LIMIT as u64 {
            // the whole literal through the std parser is correctly rounded
            if let Ok(plain) = text.parse::<f64>()
                && plain.is_normal()
            {
                return Ok(Self::normalized(plain, 0));
            }
        }
        Ok(Self::normalized(mantissa, exponent))
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Self::normalized(value as f64, 0)
    }
}

impl From<u64> for Decimal {
    fn from(value: u64) -> Self {
        Self::normalized(value as f64, 0)
    }
}

impl From<u32> for Decimal {
    fn from(value: u32) -> Self {
        Self::normalized(f64::from(value), 0)
    }
}

impl TryFrom<f64> for Decimal {
    type Error = DecimalError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value, 0)
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.total_cmp(other))
    }
}

impl Decimal {
    fn total_cmp(&self, other: &Self) -> Ordering {
        if self.is_plain() && other.is_plain() {
            return self.mantissa.total_cmp(&other.mantissa);
        }
        let sign = |d: &Decimal| {
            if d.is_negative() {
                -1
            } else if d.is_zero() {
                0
            } else {
                1
            }
        };
        let (lhs_sign, rhs_sign) = (sign(self), sign(other));
        if lhs_sign != rhs_sign || lhs_sign == 0 {
            return lhs_sign.cmp(&rhs_sign);
        }
        let (lm, le) = self.parts();
        let (rm, re) = other.parts();
        let magnitude = le.cmp(&re).then_with(|| lm.abs().total_cmp(&rm.abs()));
        if lhs_sign < 0 {
            magnitude.reverse()
        } else {
            magnitude
        }
    }
}

impl Neg for Decimal {
    type Output = Decimal;

    fn neg(self) -> Self::Output {
        if self.is_zero() {
            return self;
        }
        Self {
            mantissa: -self.mantissa,
            exponent: self.exponent,
        }
    }
}

impl Add for Decimal {
    type Output = Decimal;

    fn add(self, rhs: Self) -> Self::Output {
        if self.is_zero() {
            return rhs;
        }
        if rhs.is_zero() {
            return self;
        }
        if self.is_plain() && rhs.is_plain() {
            return Self::normalized(self.mantissa + rhs.mantissa, 0);
        }
        let (lm, le) = self.parts();
        let (rm, re) = rhs.parts();
        let ((big_m, big_e), (small_m, small_e)) = if le >= re {
            ((lm, le), (rm, re))
        } else {
            ((rm, re), (lm, le))
        };
        let gap = big_e.saturating_sub(small_e);
        if gap > MAX_SIGNIFICANT_DIGITS {
            return Self::normalized(big_m, big_e);
        }
        Self::normalized(big_m + scale(small_m, -gap), big_e)
    }
}

impl Sub for Decimal {
    type Output = Decimal;

    fn sub(self, rhs: Self) -> Self::Output {
        self + (-rhs)
    }
}

impl Mul for Decimal {
    type Output = Decimal;

    fn mul(self, rhs: Self) -> Self::Output {
        if self.is_zero() || rhs.is_zero() {
            return Self::ZERO;
        }
        if self.is_plain() && rhs.is_plain() {
            let product = self.mantissa * rhs.mantissa;
            if product.is_normal() {
                return Self::normalized(product, 0);
            }
        }
        let (lm, le) = self.parts();
        let (rm, re) = rhs.parts();
        Self::normalized(lm * rm, le.saturating_add(re))
    }
}

impl Div for Decimal {
    type Output = Decimal;

    /// # Panics
    ///
    /// Panics when `rhs` is zero, like integer division. Use
    /// [`Decimal::checked_div`] where the divisor is not already guarded.
    fn div(self, rhs: Self) -> Self::Output {
        match self.checked_div(rhs) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }
}

impl AddAssign for Decimal {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for Decimal {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl MulAssign for Decimal {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Sum for Decimal {
    fn sum<I: Iterator<Item = Decimal>>(iter: I) -> Self {
        iter.fold(Decimal::ZERO, |acc, value| acc + value)
    }
}

impl<'a> Sum<&'a Decimal> for Decimal {
    fn sum<I: Iterator<Item = &'a Decimal>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl Serialize for Decimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DecimalVisitor;

        impl Visitor<'_> for DecimalVisitor {
            type Value = Decimal;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a decimal string")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Decimal, E> {
                value.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(DecimalVisitor)
    }
}
