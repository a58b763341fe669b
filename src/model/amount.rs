//! Money types.
//!
//! The YNAB API encodes currency as integer *milliunits*, 1/1000 of the display unit
//! (`45230` is `$45.23`). `Milliunits` is that fixed-point wire representation; `Amount` is
//! the display-side value in major units that the `ViewModel` exposes.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg};

/// An integer amount of 1/1000ths of the display currency unit, exactly as the API sends it.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Milliunits(pub i64);

impl Milliunits {
    pub const ZERO: Milliunits = Milliunits(0);

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// The absolute value, used when normalizing a spending sign convention.
    pub fn magnitude(self) -> Milliunits {
        Milliunits(self.0.abs())
    }

    /// Converts to a display `Amount` in major currency units (milliunits ÷ 1000).
    pub fn amount(self) -> Amount {
        Amount::from_milliunits(self)
    }
}

impl Add for Milliunits {
    type Output = Milliunits;

    fn add(self, rhs: Milliunits) -> Milliunits {
        Milliunits(self.0 + rhs.0)
    }
}

impl AddAssign for Milliunits {
    fn add_assign(&mut self, rhs: Milliunits) {
        self.0 += rhs.0;
    }
}

impl Neg for Milliunits {
    type Output = Milliunits;

    fn neg(self) -> Milliunits {
        Milliunits(-self.0)
    }
}

impl Sum for Milliunits {
    fn sum<I: Iterator<Item = Milliunits>>(iter: I) -> Milliunits {
        iter.fold(Milliunits::ZERO, |acc, m| acc + m)
    }
}

/// A display amount in major currency units.
///
/// Wraps `Decimal` with three digits of scale so that no precision is lost converting from
/// milliunits. Formats (and serializes) as a dollar string with commas, e.g. `$1,234.56` or
/// `-$0.50`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    pub fn from_milliunits(m: Milliunits) -> Self {
        Amount(Decimal::new(m.0, 3))
    }

    /// Returns the underlying `Decimal` value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.0.is_sign_positive()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.is_zero()
    }
}

impl From<Milliunits> for Amount {
    fn from(m: Milliunits) -> Self {
        Amount::from_milliunits(m)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (sign, num) = if self.is_negative() {
            ("-", self.0.abs())
        } else {
            ("", self.0)
        };
        write!(
            f,
            "{sign}${}",
            format_num::format_num!(",.2", num.to_f64().unwrap_or_default())
        )
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use std::str::FromStr;
        let s = String::deserialize(deserializer)?;
        let cleaned = s.trim().replace(['$', ','], "");
        let value = Decimal::from_str(&cleaned).map_err(serde::de::Error::custom)?;
        Ok(Amount(value))
    }
}
