//! # Aggregation and Billable Quantity
//!
//! Totals are checked sums over packages, rounded once at the end (weight
//! to 3 dp, cbm to 6 dp). A sum that overflows is rejected as out of range.
//!
//! Billable quantity:
//!
//! - **Air** bills the total weight. A zero total falls back to the weight
//!   already recorded on the shipment, if positive.
//! - **Sea** bills the total cbm, with no fallback.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use freight_core::{round_cbm, round_weight, TransportMode};

use crate::error::PackageError;
use crate::package::{NormalizedPackage, RawPackage};

/// Everything the normalizer needs from the request and the stored shipment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizationInput {
    /// Mode named in the request.
    pub requested_mode: Option<TransportMode>,
    /// Mode already recorded on the shipment.
    pub recorded_mode: Option<TransportMode>,
    /// Weight already recorded on the shipment.
    pub previous_weight_kg: Option<Decimal>,
    pub packages: Vec<RawPackage>,
}

/// Result of a successful normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedShipment {
    pub mode: TransportMode,
    pub packages: Vec<NormalizedPackage>,
    pub total_weight_kg: Decimal,
    pub total_cbm: Decimal,
    /// Weight (air) or volume (sea) to price.
    pub billable_quantity: Decimal,
    /// Air only: the billable weight came from the shipment, not the packages.
    pub used_previous_weight: bool,
}

/// Decide the shipment's mode. A recorded mode is immutable.
pub fn resolve_mode(
    requested: Option<TransportMode>,
    recorded: Option<TransportMode>,
) -> Result<TransportMode, PackageError> {
    match (requested, recorded) {
        (Some(requested), Some(recorded)) if requested != recorded => {
            Err(PackageError::ModeConflict {
                recorded,
                requested,
            })
        }
        (Some(mode), _) | (None, Some(mode)) => Ok(mode),
        (None, None) => Err(PackageError::ModeUnresolved),
    }
}

fn total(
    packages: &[NormalizedPackage],
    field: &'static str,
    measurement: impl Fn(&NormalizedPackage) -> Option<Decimal>,
) -> Result<Decimal, PackageError> {
    packages
        .iter()
        .enumerate()
        .try_fold(Decimal::ZERO, |sum, (index, package)| {
            match measurement(package) {
                Some(value) => sum
                    .checked_add(value)
                    .ok_or(PackageError::MeasurementOutOfRange { index, field }),
                None => Ok(sum),
            }
        })
}

/// Validate, aggregate, and pick the billable quantity.
pub fn normalize(input: &NormalizationInput) -> Result<NormalizedShipment, PackageError> {
    let mode = resolve_mode(input.requested_mode, input.recorded_mode)?;
    if input.packages.is_empty() {
        return Err(PackageError::EmptyPackageList);
    }

    let packages = input
        .packages
        .iter()
        .enumerate()
        .map(|(index, raw)| raw.validate(index))
        .collect::<Result<Vec<_>, _>>()?;

    let total_weight_kg = round_weight(total(&packages, "weight_kg", |p| p.weight_kg)?);
    let total_cbm = round_cbm(total(&packages, "cbm", |p| p.cbm)?);

    let (billable_quantity, used_previous_weight) = match mode {
        TransportMode::Air => {
            let previous = input
                .previous_weight_kg
                .filter(|w| *w > Decimal::ZERO);
            match previous {
                Some(previous) if total_weight_kg.is_zero() => {
                    tracing::debug!(
                        previous_weight_kg = %previous,
                        "packages carry no weight, billing previously recorded weight"
                    );
                    (previous, true)
                }
                _ if total_weight_kg > Decimal::ZERO => (total_weight_kg, false),
                _ => return Err(PackageError::NoBillableWeight { total_weight_kg }),
            }
        }
        TransportMode::Sea => {
            if total_cbm <= Decimal::ZERO {
                return Err(PackageError::NoBillableVolume { total_cbm });
            }
            (total_cbm, false)
        }
    };

    Ok(NormalizedShipment {
        mode,
        packages,
        total_weight_kg,
        total_cbm,
        billable_quantity,
        used_previous_weight,
    })
}
