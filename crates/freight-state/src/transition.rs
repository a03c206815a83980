//! # Status Transition Validator
//!
//! Checks, in order:
//!
//! 1. Exception targets are always accepted.
//! 2. Before a mode is known, only common-flow targets are reachable.
//! 3. The target must be on the shipment's ladder.
//! 4. `CANCELLED` and `RESTRICTED_ITEM_REJECTED` freeze the ladder.
//!    `ON_HOLD` and `RESTRICTED_ITEM_OVERRIDE_APPROVED` resume at or above
//!    the ladder status held before the exception (the resume point).
//! 5. Otherwise the target must rank strictly above the current status.
//!    Forward jumps over intermediate statuses are accepted.
//! 6. `READY_FOR_PICKUP` requires payment in full.
//!
//! The resume point is not derivable from the current status, so callers
//! persist it next to the status and pass it back in. [`resume_point`]
//! computes the value to store after a transition.

use thiserror::Error;

use freight_core::{PaymentCollectionStatus, TransportMode};

use crate::ladder::rank;
use crate::status::ShipmentStatus;

/// Reasons a requested status change is refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// A mode-dependent status was requested before the mode was assigned.
    #[error(
        "cannot move to {target} before a transport mode is assigned: \
         complete warehouse verification first"
    )]
    ModeNotAssigned {
        /// The requested status.
        target: ShipmentStatus,
    },

    /// Backward or repeated move on the ladder.
    #[error("cannot move from {} to {target}: only forward moves are allowed", status_name(.current))]
    OutOfSequence {
        /// Status at the time of the request.
        current: Option<ShipmentStatus>,
        /// The requested status.
        target: ShipmentStatus,
    },

    /// The status does not exist on this mode's ladder.
    #[error("{status} is not defined for {mode} shipments")]
    UndefinedForMode {
        /// The offending status.
        status: ShipmentStatus,
        /// The shipment's mode.
        mode: TransportMode,
    },

    /// The payment gate is closed.
    #[error("{target} requires payment in full (payment status is {payment})")]
    PaymentRequired {
        /// The gated status.
        target: ShipmentStatus,
        /// Collection state at the time of the request.
        payment: PaymentCollectionStatus,
    },

    /// Leaving a resumable exception below where the shipment already was.
    #[error("cannot resume at {target}: shipment had reached {resume_from} before the exception")]
    BackwardResume {
        /// Ladder status held before the exception.
        resume_from: ShipmentStatus,
        /// The requested status.
        target: ShipmentStatus,
    },

    /// The shipment sits in an exception that ends the ladder.
    #[error("shipment is {current}; it cannot move to {target}")]
    TerminalState {
        /// The terminal exception status.
        current: ShipmentStatus,
        /// The requested status.
        target: ShipmentStatus,
    },
}

fn status_name(status: &Option<ShipmentStatus>) -> &'static str {
    status.map_or("no status", |s| s.as_str())
}

/// Whether `next` ranks strictly above `current` on the ladder for `mode`.
///
/// A shipment without a status ranks below every ladder entry. Statuses
/// that are not on the ladder (exceptions, the other mode's statuses) are
/// never sequentially reachable.
pub fn can_transition_sequentially(
    mode: Option<TransportMode>,
    current: Option<ShipmentStatus>,
    next: ShipmentStatus,
) -> bool {
    let Some(next_rank) = rank(mode, next) else {
        return false;
    };
    match current {
        None => true,
        Some(current) => rank(mode, current).is_some_and(|r| next_rank > r),
    }
}

fn can_resume(
    mode: Option<TransportMode>,
    resume_from: Option<ShipmentStatus>,
    target: ShipmentStatus,
) -> bool {
    let Some(resume_from) = resume_from else {
        return true;
    };
    match (rank(mode, resume_from), rank(mode, target)) {
        (Some(from), Some(to)) => to >= from,
        _ => false,
    }
}

/// Validate a requested status change against the shipment's mode, current
/// status, resume point, and payment collection state.
///
/// `resume_from` is only consulted while `current` is a resumable exception.
pub fn validate_transition(
    mode: Option<TransportMode>,
    current: Option<ShipmentStatus>,
    resume_from: Option<ShipmentStatus>,
    target: ShipmentStatus,
    payment: PaymentCollectionStatus,
) -> Result<(), TransitionError> {
    if target.is_exception() {
        return Ok(());
    }

    match mode {
        None if !target.is_common_flow() => {
            return Err(TransitionError::ModeNotAssigned { target });
        }
        Some(mode) if rank(Some(mode), target).is_none() => {
            return Err(TransitionError::UndefinedForMode {
                status: target,
                mode,
            });
        }
        _ => {}
    }

    match current {
        Some(current) if current.is_terminal_exception() => {
            return Err(TransitionError::TerminalState { current, target });
        }
        Some(current) if current.is_exception() => {
            if !can_resume(mode, resume_from, target) {
                return Err(match resume_from {
                    Some(resume_from) => TransitionError::BackwardResume { resume_from, target },
                    None => TransitionError::OutOfSequence {
                        current: Some(current),
                        target,
                    },
                });
            }
        }
        _ => {
            if !can_transition_sequentially(mode, current, target) {
                return Err(TransitionError::OutOfSequence { current, target });
            }
        }
    }

    if target == ShipmentStatus::ReadyForPickup && !payment.is_paid_in_full() {
        return Err(TransitionError::PaymentRequired { target, payment });
    }

    Ok(())
}

/// Every status a shipment could move to right now.
pub fn allowed_targets(
    mode: Option<TransportMode>,
    current: Option<ShipmentStatus>,
    resume_from: Option<ShipmentStatus>,
    payment: PaymentCollectionStatus,
) -> Vec<ShipmentStatus> {
    ShipmentStatus::all()
        .iter()
        .copied()
        .filter(|target| validate_transition(mode, current, resume_from, *target, payment).is_ok())
        .collect()
}

/// The resume point to store once the shipment has moved from `current`
/// to `target`.
///
/// Entering an exception from a ladder status records that status. Moving
/// between exceptions keeps the recorded one. Any ladder target clears it.
pub fn resume_point(
    current: Option<ShipmentStatus>,
    resume_from: Option<ShipmentStatus>,
    target: ShipmentStatus,
) -> Option<ShipmentStatus> {
    if !target.is_exception() {
        return None;
    }
    match current {
        Some(current) if !current.is_exception() => Some(current),
        _ => resume_from,
    }
}

/// Whether warehouse verification may run at this position.
///
/// Verification re-prices the shipment and resets it to
/// `WAREHOUSE_VERIFIED_PRICED`, so it is only accepted in the common flow,
/// or while held in a resumable exception entered from the common flow.
pub fn accepts_warehouse_verification(
    current: Option<ShipmentStatus>,
    resume_from: Option<ShipmentStatus>,
) -> bool {
    match current {
        None => true,
        Some(status) if status.is_common_flow() => true,
        Some(status) if status.is_exception() && !status.is_terminal_exception() => {
            resume_from.map_or(true, |r| r.is_common_flow())
        }
        Some(_) => false,
    }
}
