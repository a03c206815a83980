//! # Rate Table Resolver
//!
//! Precedence: customer overrides, then default rules, then the built-in
//! tariff. Within a table:
//!
//! - **Air** picks the covering weight band with the highest minimum, so a
//!   narrow band nested inside a broader one wins. Ties go to the most
//!   recently updated rule.
//! - **Sea** picks the most recently updated eligible per-cbm rule.
//!
//! A table passed as `None` could not be read. That is logged as a
//! degradation and resolution continues with the next table; it never
//! aborts pricing.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use freight_core::{CustomerId, Timestamp, TransportMode};

use crate::error::PricingError;
use crate::rule::{CustomerPricingOverride, PricingRule, RateCandidate};
use crate::source::PricingSource;
use crate::tariff::fallback_rate;

/// What to price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateQuery {
    /// Customer whose overrides apply, if known.
    pub customer_id: Option<CustomerId>,
    pub mode: TransportMode,
    /// Billable weight in kg (air) or volume in cbm (sea).
    pub quantity: Decimal,
    /// Instant used for validity windows.
    pub as_of: Timestamp,
}

/// The unit rate chosen for a query and where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRate {
    pub unit_rate: Decimal,
    pub pricing_source: PricingSource,
    /// The matching rule or override, absent for the tariff.
    pub rule_id: Option<Uuid>,
    pub rule_name: Option<String>,
}

impl ResolvedRate {
    fn from_candidate<T: RateCandidate>(candidate: &T, source: PricingSource) -> Self {
        Self {
            unit_rate: candidate.tier().unit_rate(),
            pricing_source: source,
            rule_id: Some(candidate.id()),
            rule_name: Some(candidate.name().to_string()),
        }
    }

    fn fallback(mode: TransportMode, quantity: Decimal) -> Self {
        Self {
            unit_rate: fallback_rate(mode, quantity),
            pricing_source: PricingSource::FallbackTariff,
            rule_id: None,
            rule_name: None,
        }
    }
}

/// Reject non-positive billable quantities.
pub(crate) fn require_positive(mode: TransportMode, quantity: Decimal) -> Result<(), PricingError> {
    if quantity <= Decimal::ZERO {
        return Err(PricingError::NonPositiveQuantity {
            mode,
            unit: mode.billing_unit(),
            quantity,
        });
    }
    Ok(())
}

/// Pick the best eligible candidate for the query.
fn select<'a, T, I>(candidates: I, query: &RateQuery) -> Option<&'a T>
where
    T: RateCandidate + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let eligible = candidates
        .into_iter()
        .filter(|c| c.is_eligible(query.mode, query.as_of))
        .filter(|c| c.tier().covers(query.quantity));

    match query.mode {
        TransportMode::Air => eligible.max_by(|a, b| {
            a.tier()
                .min_weight()
                .cmp(&b.tier().min_weight())
                .then(a.updated_at().cmp(&b.updated_at()))
        }),
        TransportMode::Sea => eligible.max_by_key(|c| c.updated_at()),
    }
}

/// Resolve the unit rate for `query`.
///
/// `overrides` and `defaults` are the candidate rows for the query's
/// customer and mode; `None` marks a table that could not be read.
pub fn resolve_rate(
    query: &RateQuery,
    overrides: Option<&[CustomerPricingOverride]>,
    defaults: Option<&[PricingRule]>,
) -> Result<ResolvedRate, PricingError> {
    require_positive(query.mode, query.quantity)?;

    if let Some(customer) = query.customer_id {
        match overrides {
            Some(rows) => {
                let scoped = rows.iter().filter(|o| o.customer_id == customer);
                if let Some(hit) = select(scoped, query) {
                    tracing::debug!(
                        %customer,
                        mode = %query.mode,
                        rule = %hit.name,
                        "customer override matched"
                    );
                    return Ok(ResolvedRate::from_candidate(
                        hit,
                        PricingSource::CustomerOverride,
                    ));
                }
            }
            None => tracing::warn!(
                %customer,
                mode = %query.mode,
                "customer override table unavailable, pricing source degraded"
            ),
        }
    }

    match defaults {
        Some(rows) => {
            if let Some(hit) = select(rows, query) {
                tracing::debug!(mode = %query.mode, rule = %hit.name, "default rule matched");
                return Ok(ResolvedRate::from_candidate(hit, PricingSource::DefaultRate));
            }
        }
        None => tracing::warn!(
            mode = %query.mode,
            "default rate table unavailable, pricing source degraded"
        ),
    }

    tracing::debug!(
        mode = %query.mode,
        quantity = %query.quantity,
        "no configured rate matched, using fallback tariff"
    );
    Ok(ResolvedRate::fallback(query.mode, query.quantity))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::rule::{RateTier, ValidityWindow};

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn air_rule(name: &str, min: &str, max: Option<&str>, rate: &str) -> PricingRule {
        PricingRule {
            id: Uuid::new_v4(),
            name: name.into(),
            tier: RateTier::PerKg {
                min_weight_kg: d(min),
                max_weight_kg: max.map(d),
                rate_usd_per_kg: d(rate),
            },
            is_active: true,
            window: ValidityWindow::open(),
            updated_at: ts("2026-01-01T00:00:00Z"),
        }
    }

    fn sea_rule(name: &str, rate: &str, updated: &str) -> PricingRule {
        PricingRule {
            id: Uuid::new_v4(),
            name: name.into(),
            tier: RateTier::PerCbm {
                rate_usd_per_cbm: d(rate),
            },
            is_active: true,
            window: ValidityWindow::open(),
            updated_at: ts(updated),
        }
    }

    fn query(mode: TransportMode, quantity: &str) -> RateQuery {
        RateQuery {
            customer_id: None,
            mode,
            quantity: d(quantity),
            as_of: ts("2026-03-01T12:00:00Z"),
        }
    }

    #[test]
    fn no_rules_uses_fallback_tiers() {
        let light = resolve_rate(&query(TransportMode::Air, "50"), None, Some(&[])).unwrap();
        assert_eq!(light.unit_rate, d("13.5"));
        assert_eq!(light.pricing_source, PricingSource::FallbackTariff);

        let heavy = resolve_rate(&query(TransportMode::Air, "1600"), None, Some(&[])).unwrap();
        assert_eq!(heavy.unit_rate, d("9.8"));
    }

    #[test]
    fn highest_minimum_band_wins() {
        let rules = vec![
            air_rule("a", "1", Some("100"), "13.5"),
            air_rule("b", "101", Some("300"), "11.5"),
            air_rule("c", "301", Some("600"), "10.8"),
            air_rule("broad", "0", None, "15"),
        ];
        let resolved = resolve_rate(&query(TransportMode::Air, "320"), None, Some(&rules)).unwrap();
        assert_eq!(resolved.unit_rate, d("10.8"));
        assert_eq!(resolved.pricing_source, PricingSource::DefaultRate);
        assert_eq!(resolved.rule_name.as_deref(), Some("c"));
    }

    #[test]
    fn band_max_is_respected() {
        let rules = vec![air_rule("capped", "1", Some("100"), "12")];
        let resolved = resolve_rate(&query(TransportMode::Air, "150"), None, Some(&rules)).unwrap();
        assert_eq!(resolved.pricing_source, PricingSource::FallbackTariff);
        assert_eq!(resolved.unit_rate, d("11.5"));
    }

    #[test]
    fn sea_prefers_most_recently_updated() {
        let rules = vec![
            sea_rule("old", "500", "2025-06-01T00:00:00Z"),
            sea_rule("new", "520", "2026-02-01T00:00:00Z"),
            sea_rule("zero", "0", "2026-02-15T00:00:00Z"),
        ];
        let resolved = resolve_rate(&query(TransportMode::Sea, "2"), None, Some(&rules)).unwrap();
        assert_eq!(resolved.unit_rate, d("520"));
        assert_eq!(resolved.rule_name.as_deref(), Some("new"));
    }

    #[test]
    fn inactive_and_expired_rules_are_skipped() {
        let mut inactive = sea_rule("inactive", "400", "2026-02-01T00:00:00Z");
        inactive.is_active = false;
        let mut expired = sea_rule("expired", "410", "2026-02-01T00:00:00Z");
        expired.window.valid_until = Some(ts("2026-02-28T23:59:59Z"));
        let mut future = sea_rule("future", "420", "2026-02-01T00:00:00Z");
        future.window.valid_from = Some(ts("2026-04-01T00:00:00Z"));

        let rules = vec![inactive, expired, future];
        let resolved = resolve_rate(&query(TransportMode::Sea, "1"), None, Some(&rules)).unwrap();
        assert_eq!(resolved.pricing_source, PricingSource::FallbackTariff);
        assert_eq!(resolved.unit_rate, d("550"));
    }

    #[test]
    fn customer_override_beats_default() {
        let customer = CustomerId::new();
        let overrides = vec![CustomerPricingOverride {
            id: Uuid::new_v4(),
            customer_id: customer,
            name: "negotiated".into(),
            tier: RateTier::PerKg {
                min_weight_kg: d("0"),
                max_weight_kg: None,
                rate_usd_per_kg: d("8.75"),
            },
            is_active: true,
            window: ValidityWindow::open(),
            updated_at: ts("2026-01-01T00:00:00Z"),
        }];
        let defaults = vec![air_rule("std", "0", None, "12")];

        let mut q = query(TransportMode::Air, "42");
        q.customer_id = Some(customer);
        let resolved = resolve_rate(&q, Some(&overrides), Some(&defaults)).unwrap();
        assert_eq!(resolved.unit_rate, d("8.75"));
        assert_eq!(resolved.pricing_source, PricingSource::CustomerOverride);

        q.customer_id = Some(CustomerId::new());
        let other = resolve_rate(&q, Some(&overrides), Some(&defaults)).unwrap();
        assert_eq!(other.pricing_source, PricingSource::DefaultRate);
    }

    #[test]
    fn unavailable_tables_degrade_per_table() {
        let defaults = vec![air_rule("std", "0", None, "12")];
        let mut q = query(TransportMode::Air, "10");
        q.customer_id = Some(CustomerId::new());

        let resolved = resolve_rate(&q, None, Some(&defaults)).unwrap();
        assert_eq!(resolved.pricing_source, PricingSource::DefaultRate);

        let resolved = resolve_rate(&q, None, None).unwrap();
        assert_eq!(resolved.pricing_source, PricingSource::FallbackTariff);
        assert_eq!(resolved.unit_rate, d("13.5"));
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        for q in ["0", "-1"] {
            let err = resolve_rate(&query(TransportMode::Air, q), None, None).unwrap_err();
            assert!(matches!(err, PricingError::NonPositiveQuantity { .. }));
        }
        assert!(resolve_rate(&query(TransportMode::Sea, "0"), None, None).is_err());
    }
}
