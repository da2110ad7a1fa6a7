//! Override Ledger
//!
//! The single source of truth for "is this payment's amount allowed to
//! change automatically". A pinned payment keeps its amount through every
//! fee, percentage and schedule change until the pin is cleared.
//!
//! # Critical Invariants
//!
//! 1. **Atomicity**: setting an override writes the pin, the amount and the
//!    AGCI in one step; there is no state where the pin exists but the old
//!    amount is still live
//! 2. **Active Only**: overrides resolve against active payments; an id
//!    that is unknown or archived is rejected
//! 3. **Clear Does Not Recompute**: clearing a pin leaves the amount as-is;
//!    the caller runs the payment manager recompute afterwards

use crate::calc::derive_components;
use crate::models::state::DealState;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors for override operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OverrideError {
    #[error("payment {payment_id} does not resolve to an active payment")]
    PaymentNotFound { payment_id: String },

    #[error("override amount must not be negative, got {amount}")]
    NegativeAmount { amount: i64 },
}

/// Pin a payment's amount.
///
/// Writes the requested amount directly onto the payment, re-derives its
/// AGCI from the new amount with the deal's current referral percentage,
/// and stamps the audit fields. The caller is expected to re-propagate the
/// payment's splits afterwards.
///
/// # Arguments
/// * `state` - The payment's deal
/// * `payment_id` - Target payment (must be active)
/// * `amount` - Pinned amount (i64 cents, must not be negative)
/// * `actor` - Who requested the pin
/// * `at` - Host-supplied timestamp for the audit stamp
pub fn set_override(
    state: &mut DealState,
    payment_id: &str,
    amount: i64,
    actor: &str,
    at: DateTime<Utc>,
) -> Result<(), OverrideError> {
    if amount < 0 {
        return Err(OverrideError::NegativeAmount { amount });
    }
    let agci = derive_components(amount, state.inputs()).agci;
    let payment = state
        .payment_by_id_mut(payment_id)
        .filter(|p| p.is_active())
        .ok_or_else(|| OverrideError::PaymentNotFound {
            payment_id: payment_id.to_string(),
        })?;
    payment.pin(amount, agci, actor.to_string(), at);
    Ok(())
}

/// Remove a payment's pin.
///
/// Unpins only; the amount stays until the caller invokes the payment
/// manager recompute for the deal. Clearing a payment that is not pinned is
/// a no-op. Returns `true` if a pin was removed.
pub fn clear_override(state: &mut DealState, payment_id: &str) -> Result<bool, OverrideError> {
    let payment = state
        .payment_by_id_mut(payment_id)
        .filter(|p| p.is_active())
        .ok_or_else(|| OverrideError::PaymentNotFound {
            payment_id: payment_id.to_string(),
        })?;
    Ok(payment.unpin())
}

/// Check whether a payment's amount is pinned.
pub fn is_overridden(state: &DealState, payment_id: &str) -> Result<bool, OverrideError> {
    state
        .payment_by_id(payment_id)
        .filter(|p| p.is_active())
        .map(|p| p.is_overridden())
        .ok_or_else(|| OverrideError::PaymentNotFound {
            payment_id: payment_id.to_string(),
        })
}
