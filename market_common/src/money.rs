use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

pub const DEFAULT_CURRENCY_CODE: &str = "INR";
pub const DEFAULT_CURRENCY_CODE_LOWER: &str = "inr";

//--------------------------------------       Money        ----------------------------------------------------------
/// An amount of money, stored as an integer count of minor currency units (cents / paise).
///
/// All arithmetic in the order flow happens in minor units so that totals are exact; the display form
/// (`40.00`) is only produced at the presentation boundary.
#[derive(Debug, Clone, Copy, Default, Type, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Money(i64);

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl std::ops::Mul<i64> for Money {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self::from(self.value() * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented as a money amount: {0}")]
pub struct MoneyConversionError(String);

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl TryFrom<u64> for Money {
    type Error = MoneyConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(MoneyConversionError(format!("Value {} is too large to convert to Money", value)))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl FromStr for Money {
    type Err = MoneyConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (units, cents) = match s.split_once('.') {
            Some((u, c)) => (u, c),
            None => (s, "0"),
        };
        if cents.len() > 2 {
            return Err(MoneyConversionError(format!("Too many decimal places in {s}")));
        }
        let units = units.parse::<i64>().map_err(|e| MoneyConversionError(format!("Invalid amount {s}: {e}")))?;
        let mut frac = cents.parse::<i64>().map_err(|e| MoneyConversionError(format!("Invalid amount {s}: {e}")))?;
        if cents.len() == 1 {
            frac *= 10;
        }
        if frac < 0 {
            return Err(MoneyConversionError(format!("Invalid amount {s}")));
        }
        let sign = if units < 0 || s.starts_with('-') { -1 } else { 1 };
        Ok(Self(sign * (units.abs() * 100 + frac)))
    }
}

impl Money {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub const fn from_minor(value: i64) -> Self {
        Self(value)
    }

    /// A whole number of major currency units, e.g. `Money::from_units(40)` is 40.00.
    pub fn from_units(units: i64) -> Self {
        Self(units * 100)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// A percentage of this amount, rounded half-up to the nearest minor unit.
    pub fn percent(&self, pct: i64) -> Self {
        let numerator = self.0 * pct;
        let rounded = if numerator >= 0 { (numerator + 50) / 100 } else { (numerator - 50) / 100 };
        Self(rounded)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display_money() {
        assert_eq!(Money::from(4000).to_string(), "40.00");
        assert_eq!(Money::from(720).to_string(), "7.20");
        assert_eq!(Money::from(5).to_string(), "0.05");
        assert_eq!(Money::from(-1500).to_string(), "-15.00");
    }

    #[test]
    fn parse_money() {
        assert_eq!("40".parse::<Money>().unwrap(), Money::from(4000));
        assert_eq!("7.2".parse::<Money>().unwrap(), Money::from(720));
        assert_eq!("112.20".parse::<Money>().unwrap(), Money::from(11220));
        assert!("1.999".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
    }

    #[test]
    fn percent_rounds_half_up() {
        assert_eq!(Money::from(9000).percent(8), Money::from(720));
        assert_eq!(Money::from(9999).percent(8), Money::from(800));
        assert_eq!(Money::from(1).percent(8), Money::from(0));
        assert_eq!(Money::from(7).percent(8), Money::from(1));
    }

    #[test]
    fn sum_and_multiply() {
        let total: Money = [Money::from(4000) * 2, Money::from(1000)].into_iter().sum();
        assert_eq!(total, Money::from(9000));
    }
}
