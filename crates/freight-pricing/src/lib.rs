//! # freight-pricing — Rate Resolution and Charge Calculation
//!
//! Two stages, both pure:
//!
//! 1. **Resolution** ([`resolver`]) picks a unit rate for a customer, mode,
//!    billable quantity and instant. Customer overrides win over default
//!    rules; when neither yields a match, or a table could not be read, the
//!    built-in [`tariff`] applies.
//!
//! 2. **Calculation** ([`calculator`]) multiplies the billable quantity by the
//!    unit rate and rounds to cents, tagging the result with its
//!    [`PricingSource`].
//!
//! Rate tables are handed in by the caller as slices. `None` means the
//! table was unavailable; the resolver logs the degradation and continues.
//! Resolution only fails on a non-positive quantity.

pub mod calculator;
pub mod error;
pub mod resolver;
pub mod rule;
pub mod source;
pub mod tariff;

pub use calculator::{calculate_default_pricing, calculate_pricing, quote, ManualAdjustment, PricingQuote};
pub use error::PricingError;
pub use resolver::{resolve_rate, RateQuery, ResolvedRate};
pub use rule::{CustomerPricingOverride, PricingRule, RateTable, RateTier, ValidityWindow};
pub use source::PricingSource;
pub use tariff::fallback_rate;
