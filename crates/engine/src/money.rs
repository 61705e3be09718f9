use std::{fmt, str::FromStr};

use crate::EngineError;

/// Money amount represented as **integer paise** (hundredths of a rupee).
///
/// Budgets, bid prices, contract values and wallet balances are all stored
/// as minor units; this type exists for display and for parsing operator
/// input.
///
/// ```rust
/// use engine::Money;
///
/// assert_eq!(Money::new(1_250_050).to_string(), "₹12500.50");
/// assert_eq!("99.9".parse::<Money>().unwrap().minor(), 9990);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    #[must_use]
    pub const fn new(minor: i64) -> Self {
        Self(minor)
    }

    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}₹{}.{:02}", abs / 100, abs % 100)
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl FromStr for Money {
    type Err = EngineError;

    /// Parses a non-negative decimal string (`.` or `,` separator, at most two
    /// fractional digits) into paise.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidInput(format!("invalid amount: {s}"));

        let normalized = s.trim().trim_start_matches('₹').replace(',', ".");
        let (units, fraction) = match normalized.split_once('.') {
            Some((units, fraction)) => (units, fraction),
            None => (normalized.as_str(), ""),
        };
        if units.is_empty() || !units.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        if fraction.len() > 2 || !fraction.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let units: i64 = units.parse().map_err(|_| invalid())?;
        let fraction: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };

        units
            .checked_mul(100)
            .and_then(|v| v.checked_add(fraction))
            .map(Money)
            .ok_or_else(invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_rupees() {
        assert_eq!(Money::new(0).to_string(), "₹0.00");
        assert_eq!(Money::new(5).to_string(), "₹0.05");
        assert_eq!(Money::new(123_456).to_string(), "₹1234.56");
        assert_eq!(Money::new(-1050).to_string(), "-₹10.50");
    }

    #[test]
    fn parse_accepts_common_inputs() {
        assert_eq!("10".parse::<Money>().unwrap().minor(), 1000);
        assert_eq!("10,5".parse::<Money>().unwrap().minor(), 1050);
        assert_eq!("₹ 7.25".replace(' ', "").parse::<Money>().unwrap().minor(), 725);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("".parse::<Money>().is_err());
        assert!("-3".parse::<Money>().is_err());
        assert!("1.234".parse::<Money>().is_err());
        assert!("1.2.3".parse::<Money>().is_err());
    }
}
