//! Atomic-unit amounts used for storage prices, balances and top-ups.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::ATOMIC_UNITS_PER_ETHER;

/// An amount in the network's smallest currency unit (wei for ethereum).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(u128);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid amount {input:?}: expected a non-negative integer")]
pub struct AmountParseError {
    pub input: String,
}

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn new(atomic: u128) -> Self {
        Amount(atomic)
    }

    pub fn saturating_sub(self, other: Amount) -> Amount {
        Amount(self.0.saturating_sub(other.0))
    }

    pub fn saturating_add(self, other: Amount) -> Amount {
        Amount(self.0.saturating_add(other.0))
    }

    /// `percent`% of this amount, rounded up so a non-zero margin never vanishes.
    pub fn percent(self, percent: u32) -> Amount {
        let scaled = self.0.saturating_mul(percent as u128);
        Amount(scaled.div_ceil(100))
    }

    /// Render as ether with six decimals, e.g. `0.000123`.
    pub fn format_ether(self) -> String {
        let whole = self.0 / ATOMIC_UNITS_PER_ETHER;
        let frac = self.0 % ATOMIC_UNITS_PER_ETHER;
        let frac = format!("{:018}", frac);
        format!("{}.{}", whole, &frac[..6])
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Amount(value)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Amount(value as u128)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u128>()
            .map(Amount)
            .map_err(|_| AmountParseError {
                input: s.to_string(),
            })
    }
}

// Amounts routinely exceed 2^53, so they travel as decimal strings.
impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!("1000".parse::<Amount>().unwrap(), Amount::new(1000));
        assert_eq!(" 42\n".parse::<Amount>().unwrap(), Amount::new(42));
        assert!("-1".parse::<Amount>().is_err());
        assert!("1.5".parse::<Amount>().is_err());
        assert!("".parse::<Amount>().is_err());
    }

    #[test]
    fn test_saturating_sub_never_underflows() {
        assert_eq!(Amount::new(1000).saturating_sub(Amount::new(200)), Amount::new(800));
        assert_eq!(Amount::new(5).saturating_sub(Amount::new(10)), Amount::ZERO);
    }

    #[test]
    fn test_percent_rounds_up() {
        assert_eq!(Amount::new(1000).percent(0), Amount::ZERO);
        assert_eq!(Amount::new(1000).percent(10), Amount::new(100));
        assert_eq!(Amount::new(1).percent(1), Amount::new(1));
    }

    #[test]
    fn test_format_ether() {
        assert_eq!(Amount::ZERO.format_ether(), "0.000000");
        assert_eq!(
            Amount::new(1_500_000_000_000_000_000).format_ether(),
            "1.500000"
        );
        assert_eq!(Amount::new(1_000_000_000_000).format_ether(), "0.000001");
    }
}
