//! # Lifecycle Errors
//!
//! [`LifecycleError`] wraps the domain crates' errors. [`ErrorKind`] is the
//! coarse classification a service layer maps onto responses: input and
//! transition problems are the caller's to fix and leave state untouched;
//! persistence failures are fatal for the request.

use thiserror::Error;

use freight_core::ShipmentId;
use freight_pricing::PricingError;
use freight_state::{ShipmentStatus, TransitionError};
use freight_warehouse::PackageError;

use crate::store::StoreError;

/// Failure of a lifecycle operation.
#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("{0} not found")]
    NotFound(ShipmentId),

    #[error(transparent)]
    Package(#[from] PackageError),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// Verification requested after the shipment left the warehouse.
    #[error("warehouse verification is not allowed while shipment is {status}")]
    VerificationNotAllowed { status: ShipmentStatus },

    #[error(transparent)]
    Conflict(StoreError),

    #[error("persistence failure: {0}")]
    Persistence(StoreError),
}

impl From<StoreError> for LifecycleError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => Self::NotFound(id),
            StoreError::Conflict { .. } => Self::Conflict(e),
            StoreError::Unavailable(_) | StoreError::Corrupt(_) => Self::Persistence(e),
        }
    }
}

/// Coarse error class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    TransitionNotAllowed,
    NotFound,
    Conflict,
    PersistenceFailure,
}

impl ErrorKind {
    /// HTTP-style status code for the service layer.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput => 422,
            Self::TransitionNotAllowed => 409,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::PersistenceFailure => 500,
        }
    }

    /// Machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput => "INVALID_INPUT",
            Self::TransitionNotAllowed => "TRANSITION_NOT_ALLOWED",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::PersistenceFailure => "PERSISTENCE_FAILURE",
        }
    }

    /// 4xx-class: the caller can fix the request.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::PersistenceFailure)
    }
}

impl LifecycleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Package(_) | Self::Pricing(_) => ErrorKind::InvalidInput,
            Self::Transition(_) | Self::VerificationNotAllowed { .. } => {
                ErrorKind::TransitionNotAllowed
            }
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Persistence(_) => ErrorKind::PersistenceFailure,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }
}
