//! # Package Entries
//!
//! [`RawPackage`] is what the warehouse operator submits. [`RawPackage::validate`]
//! checks one entry and produces a [`NormalizedPackage`] with the quantity
//! defaulted and cbm filled in where it can be derived.
//!
//! Derived cbm keeps full precision; only the shipment total is rounded.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PackageError;

/// Package entry as captured at the warehouse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPackage {
    /// Number of identical pieces. Defaults to 1.
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub length_cm: Option<Decimal>,
    #[serde(default)]
    pub width_cm: Option<Decimal>,
    #[serde(default)]
    pub height_cm: Option<Decimal>,
    #[serde(default)]
    pub weight_kg: Option<Decimal>,
    /// Measured volume. Takes precedence over dimensions.
    #[serde(default)]
    pub cbm: Option<Decimal>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_restricted: bool,
    #[serde(default)]
    pub restricted_override_approved: Option<bool>,
    #[serde(default)]
    pub restricted_override_reason: Option<String>,
}

/// Validated package ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedPackage {
    pub quantity: u32,
    pub length_cm: Option<Decimal>,
    pub width_cm: Option<Decimal>,
    pub height_cm: Option<Decimal>,
    pub weight_kg: Option<Decimal>,
    pub cbm: Option<Decimal>,
    pub description: Option<String>,
    pub is_restricted: bool,
    pub restricted_override_approved: bool,
    pub restricted_override_reason: Option<String>,
}

/// Volume in cubic metres from dimensions in centimetres, unrounded.
///
/// Returns `None` when the product does not fit in a `Decimal`.
pub fn derive_cbm(length_cm: Decimal, width_cm: Decimal, height_cm: Decimal) -> Option<Decimal> {
    length_cm
        .checked_mul(width_cm)?
        .checked_mul(height_cm)?
        .checked_div(Decimal::new(1_000_000, 0))
}

impl RawPackage {
    /// Validate this entry; `index` is its position in the submitted list.
    pub fn validate(&self, index: usize) -> Result<NormalizedPackage, PackageError> {
        let quantity = match self.quantity {
            None => 1,
            Some(q) if q >= 1 => u32::try_from(q)
                .map_err(|_| PackageError::InvalidQuantity { index, quantity: q })?,
            Some(q) => return Err(PackageError::InvalidQuantity { index, quantity: q }),
        };

        for (field, value) in [("weight_kg", self.weight_kg), ("cbm", self.cbm)] {
            if let Some(value) = value {
                if value < Decimal::ZERO {
                    return Err(PackageError::NegativeMeasurement {
                        index,
                        field,
                        value,
                    });
                }
            }
        }
        for (field, value) in [
            ("length_cm", self.length_cm),
            ("width_cm", self.width_cm),
            ("height_cm", self.height_cm),
        ] {
            if let Some(value) = value {
                if value <= Decimal::ZERO {
                    return Err(PackageError::NonPositiveDimension {
                        index,
                        field,
                        value,
                    });
                }
            }
        }

        let reason = self
            .restricted_override_reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty());
        let approved = self.restricted_override_approved.unwrap_or(false);
        if approved != reason.is_some() {
            return Err(PackageError::InconsistentRestrictedOverride { index });
        }

        let cbm = match (self.cbm, self.length_cm, self.width_cm, self.height_cm) {
            (Some(cbm), ..) => Some(cbm),
            (None, Some(l), Some(w), Some(h)) => Some(derive_cbm(l, w, h).ok_or(
                PackageError::MeasurementOutOfRange {
                    index,
                    field: "cbm",
                },
            )?),
            _ => None,
        };

        Ok(NormalizedPackage {
            quantity,
            length_cm: self.length_cm,
            width_cm: self.width_cm,
            height_cm: self.height_cm,
            weight_kg: self.weight_kg,
            cbm,
            description: self
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            is_restricted: self.is_restricted,
            restricted_override_approved: approved,
            restricted_override_reason: reason.map(str::to_string),
        })
    }
}
