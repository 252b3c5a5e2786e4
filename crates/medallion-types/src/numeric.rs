//! Lenient numeric values used for keys, prices, scores, and amounts.

use std::fmt;
use std::str::FromStr;

use bigdecimal::{BigDecimal, ParseBigDecimalError};
use serde::{Deserialize, Serialize};

/// An exact decimal number parsed from bronze text.
///
/// Values are held in normalized form, so `"5"`, `" 5 "` and `"5.0"` are
/// the same key and hash the same. Integer keys of any width survive
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Numeric(BigDecimal);

impl Numeric {
    /// Parse text the way the silver layer coerces numeric columns:
    /// surrounding whitespace is ignored and anything that is not a
    /// decimal number becomes `None`.
    #[must_use]
    pub fn parse_lenient(text: &str) -> Option<Self> {
        text.parse().ok()
    }

    #[must_use]
    pub fn as_decimal(&self) -> &BigDecimal {
        &self.0
    }

    /// Inclusive range check.
    #[must_use]
    pub fn between(&self, low: i64, high: i64) -> bool {
        self.0 >= BigDecimal::from(low) && self.0 <= BigDecimal::from(high)
    }
}

impl FromStr for Numeric {
    type Err = ParseBigDecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<BigDecimal>().map(Self::from)
    }
}

impl From<BigDecimal> for Numeric {
    fn from(value: BigDecimal) -> Self {
        Self(value.normalized())
    }
}

impl From<i64> for Numeric {
    fn from(value: i64) -> Self {
        Self::from(BigDecimal::from(value))
    }
}

impl TryFrom<String> for Numeric {
    type Error = ParseBigDecimalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Numeric> for String {
    fn from(value: Numeric) -> Self {
        value.to_string()
    }
}

/// Renders every digit. Normalization can leave a negative scale
/// (`500` is held as `5e2`), which is widened back to a plain integer.
impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (_, scale) = self.0.as_bigint_and_exponent();
        if scale < 0 {
            write!(f, "{}", self.0.with_scale(0))
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn num(text: &str) -> Numeric {
        text.parse().unwrap()
    }

    #[test]
    fn parses_integers_and_decimals() {
        assert_eq!(num("42"), Numeric::from(42));
        assert_eq!(num(" 49.99 ").to_string(), "49.99");
        assert_eq!(num("-3"), Numeric::from(-3));
    }

    #[test]
    fn unparseable_text_is_missing() {
        for text in ["", "   ", "abc", "12a", "NaN", "inf", "1,000"] {
            assert!(Numeric::parse_lenient(text).is_none(), "{text:?}");
        }
    }

    #[test]
    fn equal_values_hash_equal() {
        let keys: HashSet<Numeric> = ["5", "5.0", " 5", "5.000", "0", "-0", "0.00"]
            .iter()
            .filter_map(|t| Numeric::parse_lenient(t))
            .collect();
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn wide_integers_stay_distinct_and_exact() {
        let texts = ["9007199254740992", "9007199254740993", "12345678901234567891"];
        let keys: HashSet<Numeric> = texts.iter().map(|t| num(t)).collect();
        assert_eq!(keys.len(), 3);
        for text in texts {
            assert_eq!(num(text).to_string(), text);
        }
    }

    #[test]
    fn between_is_inclusive() {
        assert!(num("50").between(50, 500));
        assert!(num("500").between(50, 500));
        assert!(!num("500.01").between(50, 500));
        assert!(!num("49.99").between(50, 500));
    }

    #[test]
    fn display_is_exact() {
        assert_eq!(num("7.0").to_string(), "7");
        assert_eq!(num("7.25").to_string(), "7.25");
        assert_eq!(num("500").to_string(), "500");
        assert_eq!(num("1e3").to_string(), "1000");
        assert_eq!(num("9007199254740990").to_string(), "9007199254740990");
    }

    #[test]
    fn serializes_as_exact_text() {
        let value = num("12345678901234567891");
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, "\"12345678901234567891\"");
        let back: Numeric = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }
}
