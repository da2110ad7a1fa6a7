//! Split Propagator
//!
//! Derives a payment's per-broker split rows from its *stored* amount and
//! the deal's current template set. The stored amount is used verbatim so
//! that a pinned payment's splits honor the override; the propagator never
//! recalculates the amount it is handed.
//!
//! # Derivation
//!
//! ```text
//! AGCI (stored on the payment)
//!   -> category pools via the deal-level percentages
//!   -> each pool allocated over broker template weights
//!      (largest remainder, so each category sums exactly)
//!   -> broker amount = origination + site + deal allocations
//! ```
//!
//! # Critical Invariants
//!
//! 1. **Stored Amount Only**: splits derive from the payment row, never
//!    from a fresh recalculation
//! 2. **Snapshot Percentages**: each split row carries the template
//!    percentages used to produce it
//! 3. **Reconciliation**: for a fully allocated deal (category percentages
//!    and template weights each summing to 100%) the split total must equal
//!    the payment's AGCI within one cent; a miss is a bug, logged loudly
//!    and surfaced as an error

use crate::calc::money::{allocate_by_weights, apply_bps};
use crate::models::deal::{DealInputs, FULL_PERCENT_BPS};
use crate::models::payment::Payment;
use crate::models::split::PaymentSplit;
use crate::models::template::{TemplateError, TemplateSet};
use thiserror::Error;
use tracing::error;

/// Errors for split propagation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PropagationError {
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    #[error("splits for payment {payment_id} total {actual} but must reconcile to AGCI {expected}")]
    InvariantViolation {
        payment_id: String,
        expected: i64,
        actual: i64,
    },
}

/// Derive a payment's split rows.
///
/// Produces one row per template broker, built from the payment's stored
/// AGCI and the current template percentages. The rows replace whatever the
/// payment had before; callers write them wholesale.
///
/// # Returns
/// - `Ok(rows)` - the new split rows (empty when the deal has no templates)
/// - `Err(PropagationError)` - over-allocated template set, or a
///   reconciliation miss (internal bug, never expected in correct operation)
pub fn propagate(
    payment: &Payment,
    inputs: &DealInputs,
    templates: &TemplateSet,
) -> Result<Vec<PaymentSplit>, PropagationError> {
    templates.verify()?;

    let agci = payment.agci();
    let origination_pool = apply_bps(agci, inputs.origination_bps);
    let site_pool = apply_bps(agci, inputs.site_bps);
    let deal_pool = apply_bps(agci, inputs.deal_bps);

    let rows = templates.rows();
    let origination_weights: Vec<i64> = rows.iter().map(|r| r.origination_bps).collect();
    let site_weights: Vec<i64> = rows.iter().map(|r| r.site_bps).collect();
    let deal_weights: Vec<i64> = rows.iter().map(|r| r.deal_bps).collect();

    let origination_alloc = allocate_by_weights(origination_pool, &origination_weights);
    let site_alloc = allocate_by_weights(site_pool, &site_weights);
    let deal_alloc = allocate_by_weights(deal_pool, &deal_weights);

    let splits: Vec<PaymentSplit> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| PaymentSplit {
            payment_id: payment.id().to_string(),
            broker_id: row.broker_id.clone(),
            origination_bps: row.origination_bps,
            site_bps: row.site_bps,
            deal_bps: row.deal_bps,
            amount: origination_alloc[i] + site_alloc[i] + deal_alloc[i],
        })
        .collect();

    verify_reconciliation(payment, inputs, templates, &splits)?;

    Ok(splits)
}

/// Check that the split total reconciles to the payment's AGCI.
///
/// Only applies when the deal's category percentages sum to 100% and every
/// template category is fully allocated; a partially allocated deal
/// legitimately distributes less than AGCI.
fn verify_reconciliation(
    payment: &Payment,
    inputs: &DealInputs,
    templates: &TemplateSet,
    splits: &[PaymentSplit],
) -> Result<(), PropagationError> {
    if inputs.category_total_bps() != FULL_PERCENT_BPS || !templates.is_fully_allocated() {
        return Ok(());
    }

    let expected = payment.agci();
    let actual: i64 = splits.iter().map(|s| s.amount).sum();
    if (actual - expected).abs() > 1 {
        error!(
            payment_id = payment.id(),
            expected, actual, "split total does not reconcile to AGCI"
        );
        return Err(PropagationError::InvariantViolation {
            payment_id: payment.id().to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}
