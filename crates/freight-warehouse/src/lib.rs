//! # freight-warehouse — Warehouse Package Normalizer
//!
//! Turns the package list captured at the origin warehouse into validated
//! package records plus the shipment's billable quantity: total weight for
//! air, total volume for sea.
//!
//! Normalization is pure. Persisting the result (deleting the old package
//! rows and inserting the new ones alongside the shipment update) is the
//! lifecycle crate's job and happens in one transaction.

pub mod error;
pub mod normalize;
pub mod package;

pub use error::PackageError;
pub use normalize::{normalize, resolve_mode, NormalizationInput, NormalizedShipment};
pub use package::{derive_cbm, NormalizedPackage, RawPackage};
