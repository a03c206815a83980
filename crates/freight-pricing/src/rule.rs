//! # Rate Rules and Customer Overrides
//!
//! A [`PricingRule`] is tenant-wide; a [`CustomerPricingOverride`] has the
//! same shape scoped to one customer. Both carry a [`RateTier`] that fixes
//! the mode they price: weight-banded USD/kg for air or flat USD/cbm for sea.
//!
//! [`RateTable`] bundles both lists for file-based configuration (YAML or
//! JSON) and answers the lookups the resolver needs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use freight_core::{CustomerId, Timestamp, TransportMode};

use crate::error::PricingError;

/// Rate basis for a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "basis", rename_all = "snake_case")]
pub enum RateTier {
    /// Air: USD per kilogram for weights in `[min_weight_kg, max_weight_kg]`.
    PerKg {
        min_weight_kg: Decimal,
        /// Unbounded when absent.
        #[serde(default)]
        max_weight_kg: Option<Decimal>,
        rate_usd_per_kg: Decimal,
    },
    /// Sea: flat USD per cubic metre.
    PerCbm { rate_usd_per_cbm: Decimal },
}

impl RateTier {
    /// The mode this tier prices.
    pub fn mode(&self) -> TransportMode {
        match self {
            Self::PerKg { .. } => TransportMode::Air,
            Self::PerCbm { .. } => TransportMode::Sea,
        }
    }

    /// USD per billing unit.
    pub fn unit_rate(&self) -> Decimal {
        match self {
            Self::PerKg {
                rate_usd_per_kg, ..
            } => *rate_usd_per_kg,
            Self::PerCbm { rate_usd_per_cbm } => *rate_usd_per_cbm,
        }
    }

    /// Lower bound of the weight band; zero for volume rates.
    pub fn min_weight(&self) -> Decimal {
        match self {
            Self::PerKg { min_weight_kg, .. } => *min_weight_kg,
            Self::PerCbm { .. } => Decimal::ZERO,
        }
    }

    /// Whether the band covers `quantity`. Volume rates cover any quantity.
    pub fn covers(&self, quantity: Decimal) -> bool {
        match self {
            Self::PerKg {
                min_weight_kg,
                max_weight_kg,
                ..
            } => *min_weight_kg <= quantity && max_weight_kg.map_or(true, |max| quantity <= max),
            Self::PerCbm { .. } => true,
        }
    }
}

/// Inclusive validity window. Either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityWindow {
    #[serde(default)]
    pub valid_from: Option<Timestamp>,
    #[serde(default)]
    pub valid_until: Option<Timestamp>,
}

impl ValidityWindow {
    /// A window with no bounds.
    pub fn open() -> Self {
        Self::default()
    }

    /// Whether `at` falls inside the window, bounds included.
    pub fn contains(&self, at: Timestamp) -> bool {
        self.valid_from.map_or(true, |from| from <= at)
            && self.valid_until.map_or(true, |until| at <= until)
    }
}

/// Tenant-wide default rate rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingRule {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    #[serde(flatten)]
    pub tier: RateTier,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
    #[serde(flatten)]
    pub window: ValidityWindow,
    #[serde(default = "Timestamp::now")]
    pub updated_at: Timestamp,
}

/// Rate negotiated for a single customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerPricingOverride {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub customer_id: CustomerId,
    pub name: String,
    #[serde(flatten)]
    pub tier: RateTier,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
    #[serde(flatten)]
    pub window: ValidityWindow,
    #[serde(default = "Timestamp::now")]
    pub updated_at: Timestamp,
}

fn active_by_default() -> bool {
    true
}

/// Common view of rules and overrides used by candidate selection.
pub trait RateCandidate {
    fn id(&self) -> Uuid;
    fn name(&self) -> &str;
    fn tier(&self) -> &RateTier;
    fn is_active(&self) -> bool;
    fn window(&self) -> &ValidityWindow;
    fn updated_at(&self) -> Timestamp;

    /// Active, in its window, positive rate, and for `mode`.
    fn is_eligible(&self, mode: TransportMode, at: Timestamp) -> bool {
        self.is_active()
            && self.tier().mode() == mode
            && self.tier().unit_rate() > Decimal::ZERO
            && self.window().contains(at)
    }
}

macro_rules! impl_rate_candidate {
    ($ty:ty) => {
        impl RateCandidate for $ty {
            fn id(&self) -> Uuid {
                self.id
            }
            fn name(&self) -> &str {
                &self.name
            }
            fn tier(&self) -> &RateTier {
                &self.tier
            }
            fn is_active(&self) -> bool {
                self.is_active
            }
            fn window(&self) -> &ValidityWindow {
                &self.window
            }
            fn updated_at(&self) -> Timestamp {
                self.updated_at
            }
        }
    };
}

impl_rate_candidate!(PricingRule);
impl_rate_candidate!(CustomerPricingOverride);

/// File-backed rate configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTable {
    #[serde(default)]
    pub rules: Vec<PricingRule>,
    #[serde(default)]
    pub overrides: Vec<CustomerPricingOverride>,
}

impl RateTable {
    /// Parse a YAML document.
    pub fn from_yaml_str(s: &str) -> Result<Self, PricingError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Parse a JSON document.
    pub fn from_json_str(s: &str) -> Result<Self, PricingError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Default rules for `mode`.
    pub fn default_rules(&self, mode: TransportMode) -> Vec<PricingRule> {
        self.rules
            .iter()
            .filter(|r| r.tier.mode() == mode)
            .cloned()
            .collect()
    }

    /// Overrides for `customer` and `mode`.
    pub fn overrides_for(
        &self,
        customer: CustomerId,
        mode: TransportMode,
    ) -> Vec<CustomerPricingOverride> {
        self.overrides
            .iter()
            .filter(|o| o.customer_id == customer && o.tier.mode() == mode)
            .cloned()
            .collect()
    }
}
