use std::cmp::Ordering;
use std::fmt;
use std::ops::Add;
use std::str::FromStr;

use memchr::memchr;

use crate::error::ParseError;

/// Most fractional digits accepted in one reading.
pub const MAX_SCALE: u32 = 9;
/// Most integer digits accepted in one reading.
pub const MAX_INT_DIGITS: usize = 18;

/// Exact decimal: `units / 10^scale`.
///
/// Always stored with trailing fractional zeros stripped, so two values are
/// equal exactly when their fields are. Sums of readings stay exact, which
/// keeps the aggregate independent of merge order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Decimal {
    units: i128,
    scale: u32,
}

impl Decimal {
    pub const ZERO: Decimal = Decimal { units: 0, scale: 0 };

    pub fn new(mut units: i128, mut scale: u32) -> Self {
        while scale > 0 && units % 10 == 0 {
            units /= 10;
            scale -= 1;
        }
        Self { units, scale }
    }

    /// `[+-]digits[.digits]`, nothing else: no whitespace, exponent or
    /// special values.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let (negative, digits) = match bytes.split_first() {
            Some((b'-', rest)) => (true, rest),
            Some((b'+', rest)) => (false, rest),
            _ => (false, bytes),
        };
        let (int, frac) = match memchr(b'.', digits) {
            Some(dot) => (&digits[..dot], &digits[dot + 1..]),
            None => (digits, &[][..]),
        };
        let has_dot = int.len() != digits.len();
        if int.is_empty() || int.len() > MAX_INT_DIGITS {
            return None;
        }
        if has_dot && (frac.is_empty() || frac.len() > MAX_SCALE as usize) {
            return None;
        }

        let mut units: i128 = 0;
        for &c in int.iter().chain(frac) {
            if !c.is_ascii_digit() {
                return None;
            }
            units = units * 10 + (c - b'0') as i128;
        }
        let units = if negative { -units } else { units };
        Some(Self::new(units, frac.len() as u32))
    }

    /// Value in tenths, rounded half-up (ties towards positive infinity).
    pub fn round_tenths(self) -> i128 {
        if self.scale <= 1 {
            return self.units_at(1);
        }
        let step = 10i128.pow(self.scale - 1);
        (self.units + step / 2).div_euclid(step)
    }

    fn units_at(self, scale: u32) -> i128 {
        self.units * 10i128.pow(scale - self.scale)
    }
}

impl Add for Decimal {
    type Output = Decimal;

    fn add(self, rhs: Decimal) -> Decimal {
        let scale = self.scale.max(rhs.scale);
        Decimal::new(self.units_at(scale) + rhs.units_at(scale), scale)
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        let scale = self.scale.max(other.scale);
        self.units_at(scale).cmp(&other.units_at(scale))
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Decimal::new(value as i128, 0)
    }
}

impl FromStr for Decimal {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::parse(s.as_bytes()).ok_or_else(|| ParseError::InvalidNumber(s.to_owned()))
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.units < 0 { "-" } else { "" };
        let abs = self.units.unsigned_abs();
        if self.scale == 0 {
            return write!(f, "{sign}{abs}");
        }
        let pow = 10u128.pow(self.scale);
        write!(
            f,
            "{sign}{}.{:0width$}",
            abs / pow,
            abs % pow,
            width = self.scale as usize
        )
    }
}

/// A count of tenths printed with exactly one fractional digit.
pub struct Tenths(pub i128);

impl fmt::Display for Tenths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{}", abs / 10, abs % 10)
    }
}
