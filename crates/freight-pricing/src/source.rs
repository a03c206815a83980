//! Provenance tag attached to every charge.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Where a charge's unit rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PricingSource {
    /// A rate negotiated for this customer.
    CustomerOverride,
    /// A tenant-wide configured rule.
    DefaultRate,
    /// The built-in tariff, used when no configured rule matched.
    FallbackTariff,
    /// An operator-entered charge with a recorded justification.
    ManualAdjustment,
}

impl PricingSource {
    /// Canonical wire/storage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CustomerOverride => "CUSTOMER_OVERRIDE",
            Self::DefaultRate => "DEFAULT_RATE",
            Self::FallbackTariff => "FALLBACK_TARIFF",
            Self::ManualAdjustment => "MANUAL_ADJUSTMENT",
        }
    }
}

impl std::fmt::Display for PricingSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PricingSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CUSTOMER_OVERRIDE" => Ok(Self::CustomerOverride),
            "DEFAULT_RATE" => Ok(Self::DefaultRate),
            "FALLBACK_TARIFF" => Ok(Self::FallbackTariff),
            "MANUAL_ADJUSTMENT" => Ok(Self::ManualAdjustment),
            other => Err(format!("unknown pricing source: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_through_str() {
        for source in [
            PricingSource::CustomerOverride,
            PricingSource::DefaultRate,
            PricingSource::FallbackTariff,
            PricingSource::ManualAdjustment,
        ] {
            assert_eq!(source.as_str().parse::<PricingSource>().unwrap(), source);
        }
        assert!("GUESSWORK".parse::<PricingSource>().is_err());
    }
}
