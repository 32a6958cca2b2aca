use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::EngineError;

/// Non-negative price represented as **integer cents**.
///
/// Prices travel over the API as decimal strings (`"12.50"`) and are stored
/// as cents to avoid floating-point drift.
///
/// # Examples
///
/// ```rust
/// use engine::Price;
///
/// let price = Price::from_cents(12_34).unwrap();
/// assert_eq!(price.cents(), 1234);
/// assert_eq!(price.to_string(), "12.34");
/// ```
///
/// Parsing accepts `.` or `,` as decimal separator and rejects more than two
/// decimals or a sign:
///
/// ```rust
/// use engine::Price;
///
/// assert_eq!("10".parse::<Price>().unwrap().cents(), 1000);
/// assert_eq!("10,5".parse::<Price>().unwrap().cents(), 1050);
/// assert!("12.345".parse::<Price>().is_err());
/// assert!("-1".parse::<Price>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Price(i64);

impl Price {
    pub const ZERO: Price = Price(0);

    /// Creates a price from integer cents, rejecting negative values.
    pub fn from_cents(cents: i64) -> Result<Self, EngineError> {
        if cents < 0 {
            return Err(EngineError::InvalidAmount(
                "price must not be negative".to_string(),
            ));
        }
        Ok(Self(cents))
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Price of `quantity` units, `None` on overflow.
    #[must_use]
    pub fn checked_mul(self, quantity: i32) -> Option<Price> {
        self.0.checked_mul(i64::from(quantity)).map(Price)
    }

    #[must_use]
    pub fn checked_add(self, rhs: Price) -> Option<Price> {
        self.0.checked_add(rhs.0).map(Price)
    }

    /// Converts a JSON number such as `12.5` into cents.
    pub fn from_decimal(value: f64) -> Result<Self, EngineError> {
        if !value.is_finite() {
            return Err(EngineError::InvalidAmount("invalid price".to_string()));
        }
        let cents = (value * 100.0).round();
        if (value * 100.0 - cents).abs() > 1e-6 {
            return Err(EngineError::InvalidAmount("too many decimals".to_string()));
        }
        if cents > i64::MAX as f64 {
            return Err(EngineError::InvalidAmount("price too large".to_string()));
        }
        Self::from_cents(cents as i64)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl TryFrom<i64> for Price {
    type Error = EngineError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::from_cents(value)
    }
}

impl From<Price> for i64 {
    fn from(value: Price) -> Self {
        value.0
    }
}

impl FromStr for Price {
    type Err = EngineError;

    /// Parses a decimal string into cents.
    ///
    /// Validation rules:
    /// - max 2 fractional digits (rejects `12.345`)
    /// - no sign, no exponent
    /// - rejects empty/invalid strings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidAmount("invalid price".to_string());
        let overflow = || EngineError::InvalidAmount("price too large".to_string());

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(EngineError::InvalidAmount("empty price".to_string()));
        }
        if trimmed.starts_with('-') {
            return Err(EngineError::InvalidAmount(
                "price must not be negative".to_string(),
            ));
        }

        let normalized = trimmed.replace(',', ".");
        let (units_str, frac_str) = match normalized.split_once('.') {
            Some((units, frac)) => (units, Some(frac)),
            None => (normalized.as_str(), None),
        };

        if units_str.is_empty() || !units_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let units: i64 = units_str.parse().map_err(|_| overflow())?;

        let cents: i64 = match frac_str {
            None | Some("") => 0,
            Some(frac) if !frac.chars().all(|c| c.is_ascii_digit()) => return Err(invalid()),
            Some(frac) if frac.len() == 1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
            Some(frac) if frac.len() == 2 => frac.parse::<i64>().map_err(|_| invalid())?,
            Some(_) => return Err(EngineError::InvalidAmount("too many decimals".to_string())),
        };

        units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .map(Price)
            .ok_or_else(overflow)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PriceVisitor;

        impl de::Visitor<'_> for PriceVisitor {
            type Value = Price;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative decimal price as string or number")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Price, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Price, E> {
                i64::try_from(v)
                    .ok()
                    .and_then(|units| units.checked_mul(100))
                    .map(Price)
                    .ok_or_else(|| E::custom("price too large"))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Price, E> {
                v.checked_mul(100)
                    .ok_or_else(|| E::custom("price too large"))
                    .and_then(|cents| Price::from_cents(cents).map_err(E::custom))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Price, E> {
                Price::from_decimal(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(PriceVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_two_decimals() {
        assert_eq!(Price::ZERO.to_string(), "0.00");
        assert_eq!(Price::from_cents(1).unwrap().to_string(), "0.01");
        assert_eq!(Price::from_cents(1050).unwrap().to_string(), "10.50");
        assert_eq!(Price::from_cents(123_456).unwrap().to_string(), "1234.56");
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!("10".parse::<Price>().unwrap().cents(), 1000);
        assert_eq!("10.5".parse::<Price>().unwrap().cents(), 1050);
        assert_eq!("10,50".parse::<Price>().unwrap().cents(), 1050);
        assert_eq!("  2.30 ".parse::<Price>().unwrap().cents(), 230);
        assert_eq!("7.".parse::<Price>().unwrap().cents(), 700);
    }

    #[test]
    fn parse_rejects_sign_garbage_and_extra_decimals() {
        assert!("12.345".parse::<Price>().is_err());
        assert!("-0.01".parse::<Price>().is_err());
        assert!("1e3".parse::<Price>().is_err());
        assert!("1.2.3".parse::<Price>().is_err());
        assert!("".parse::<Price>().is_err());
    }

    #[test]
    fn deserializes_strings_and_numbers() {
        let from_str: Price = serde_json::from_str("\"4.20\"").unwrap();
        let from_float: Price = serde_json::from_str("4.2").unwrap();
        let from_int: Price = serde_json::from_str("4").unwrap();
        assert_eq!(from_str.cents(), 420);
        assert_eq!(from_float.cents(), 420);
        assert_eq!(from_int.cents(), 400);
        assert!(serde_json::from_str::<Price>("-1").is_err());
        assert!(serde_json::from_str::<Price>("1.234").is_err());
    }

    #[test]
    fn serializes_as_decimal_string() {
        let price = Price::from_cents(999).unwrap();
        assert_eq!(serde_json::to_string(&price).unwrap(), "\"9.99\"");
    }
}
